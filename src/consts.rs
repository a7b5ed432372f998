/// Hours credited to an honorarium day with no usable clock-out
pub const DEFAULT_HONORARIUM_HOURS: i64 = 8;

pub const SECONDS_PER_HOUR: i64 = 3_600;
