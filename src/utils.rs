use chrono::{Datelike as _, Days, NaiveDate, Weekday};

/// Counts Monday to Friday between `start` and `end`, both inclusive
pub fn count_working_days(mut start: NaiveDate, end: NaiveDate) -> i64 {
    let mut working_days = 0;

    while start <= end {
        if start.weekday() != Weekday::Sat && start.weekday() != Weekday::Sun {
            working_days += 1;
        }

        let Some(next) = start.checked_add_days(Days::new(1)) else {
            break;
        };
        start = next;
    }

    working_days
}

/// Integer division rounding half away from zero, for non-negative operands
pub fn div_round(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    if remainder >= denominator - remainder { quotient + 1 } else { quotient }
}
