//! Pay calculation engine.
//!
//! Pure functions turning an employee's contract and a month of attendance into the amount owed.
//! Callers are expected to hand over records that already passed the validation gate.

use crate::{
    consts::{DEFAULT_HONORARIUM_HOURS, SECONDS_PER_HOUR},
    entity::sea_orm_active_enums::AttendanceStatus,
    utils,
};

use super::{
    error::WorkflowError,
    model::{AttendanceRecord, Calculation, CalculationBreakdown, ContractType, Employee},
    period::Period,
};

pub fn compute(employee: &Employee, records: &[AttendanceRecord], period: Period) -> Result<Calculation, WorkflowError> {
    let contract_type = employee.contract_type.parse::<ContractType>()?;

    let breakdown = match contract_type {
        ContractType::Daily => {
            let daily_rate = required_rate(employee.daily_rate, contract_type, "daily_rate")?;
            compute_daily(daily_rate, records)?
        },
        ContractType::Honorarium => {
            let hourly_rate = required_rate(employee.base_salary, contract_type, "base_salary")?;
            compute_honorarium(hourly_rate, records)?
        },
        ContractType::Fixed => {
            let fixed_salary = required_rate(employee.base_salary, contract_type, "base_salary")?;
            compute_fixed(fixed_salary, records, period)?
        },
    };

    Ok(Calculation {
        amount_due: breakdown.amount(),
        breakdown,
    })
}

fn required_rate(rate: Option<i64>, contract_type: ContractType, field: &'static str) -> Result<i64, WorkflowError> {
    match rate {
        None => Err(WorkflowError::MissingRate { contract_type: contract_type.as_str(), field }),
        Some(value) if value < 0 => Err(WorkflowError::InvalidRate { field, value }),
        Some(value) => Ok(value),
    }
}

/// `rate * quantity`, a product past `i64` means the rate itself is unusable
fn scaled(rate: i64, quantity: i64, field: &'static str) -> Result<i64, WorkflowError> {
    rate.checked_mul(quantity)
        .ok_or(WorkflowError::InvalidRate { field, value: rate })
}

fn count_status(records: &[AttendanceRecord], predicate: impl Fn(AttendanceStatus) -> bool) -> u64 {
    records.iter().filter(|record| predicate(record.status)).count() as u64
}

fn compute_daily(daily_rate: i64, records: &[AttendanceRecord]) -> Result<CalculationBreakdown, WorkflowError> {
    let days_worked = count_status(records, AttendanceStatus::is_worked);
    let days_absent = count_status(records, |status| status == AttendanceStatus::Absent);

    Ok(CalculationBreakdown::Daily {
        daily_rate,
        days_worked,
        days_absent,
        total_days: records.len() as u64,
        gross_amount: scaled(daily_rate, days_worked as i64, "daily_rate")?,
    })
}

/// Seconds credited for one worked day
fn worked_seconds(record: &AttendanceRecord) -> i64 {
    match (record.arrival_time, record.departure_time) {
        (Some(arrival), Some(departure)) => (departure - arrival).num_seconds().max(0),
        _ => DEFAULT_HONORARIUM_HOURS * SECONDS_PER_HOUR,
    }
}

fn compute_honorarium(hourly_rate: i64, records: &[AttendanceRecord]) -> Result<CalculationBreakdown, WorkflowError> {
    let total_seconds: i64 = records.iter()
        .filter(|record| record.status.is_worked())
        .map(worked_seconds)
        .sum();

    // Hours are kept to two decimals
    let centi_hours = utils::div_round(total_seconds * 100, SECONDS_PER_HOUR);

    Ok(CalculationBreakdown::Honorarium {
        hourly_rate,
        hours_worked: centi_hours as f64 / 100.0,
        gross_amount: utils::div_round(scaled(hourly_rate, centi_hours, "base_salary")?, 100),
    })
}

fn compute_fixed(fixed_salary: i64, records: &[AttendanceRecord], period: Period) -> Result<CalculationBreakdown, WorkflowError> {
    let workable_days = period.workable_days();
    let days_absent = count_status(records, |status| status == AttendanceStatus::Absent);

    let absence_deduction = utils::div_round(scaled(fixed_salary, days_absent as i64, "base_salary")?, workable_days);

    Ok(CalculationBreakdown::Fixed {
        fixed_salary,
        workable_days,
        days_absent,
        absence_deduction,
        net_amount: (fixed_salary - absence_deduction).max(0),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone as _};

    use super::*;

    fn employee(contract_type: &str, base_salary: Option<i64>, daily_rate: Option<i64>) -> Employee {
        Employee {
            id: 1,
            entreprise_id: 1,
            full_name: "Ibrahima Diop".to_string(),
            contract_type: contract_type.to_string(),
            base_salary,
            daily_rate,
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 4, day, hour, minute, 0).unwrap()
    }

    fn record(day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: day as i32,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            status,
            arrival_time: None,
            departure_time: None,
            is_validated: true,
            validated_by: Some(10),
            validator_name: Some("Awa Ndiaye".to_string()),
            validated_at: None,
        }
    }

    fn timed(day: u32, arrival: (u32, u32), departure: Option<(u32, u32)>) -> AttendanceRecord {
        AttendanceRecord {
            arrival_time: Some(at(day, arrival.0, arrival.1)),
            departure_time: departure.map(|(h, m)| at(day, h, m)),
            ..record(day, AttendanceStatus::Present)
        }
    }

    fn april() -> Period {
        "2024-04".parse().unwrap()
    }

    #[test]
    fn test_daily() {
        let mut records = (1..=18).map(|day| record(day, AttendanceStatus::Present)).collect::<Vec<_>>();
        records[3].status = AttendanceStatus::Late;
        records.push(record(19, AttendanceStatus::Absent));
        records.push(record(20, AttendanceStatus::Absent));

        let calculation = compute(&employee("DAILY", None, Some(10_000)), &records, april()).unwrap();

        assert_eq!(calculation.amount_due, 180_000);
        assert_eq!(calculation.breakdown, CalculationBreakdown::Daily {
            daily_rate: 10_000,
            days_worked: 18,
            days_absent: 2,
            total_days: 20,
            gross_amount: 180_000,
        });

        records.reverse();
        let reversed = compute(&employee("DAILY", None, Some(10_000)), &records, april()).unwrap();
        assert_eq!(reversed, calculation);
    }

    #[test]
    fn test_daily_requires_daily_rate() {
        let result = compute(&employee("DAILY", Some(500_000), None), &[], april());

        assert!(matches!(result, Err(WorkflowError::MissingRate { field: "daily_rate", .. })));
    }

    #[test]
    fn test_honorarium() {
        let records = vec![
            timed(1, (8, 0), Some((12, 30))),
            timed(2, (9, 0), Some((10, 20))),
            // Departure before arrival is bad data, counts as nothing
            timed(3, (17, 0), Some((9, 0))),
            // No clock-out, default day
            timed(4, (8, 0), None),
            record(5, AttendanceStatus::Absent),
        ];

        let calculation = compute(&employee("HONORARIUM", Some(5_000), None), &records, april()).unwrap();

        // 4.5 + 1.333.. + 0 + 8 = 13.83 hours
        assert_eq!(calculation.breakdown, CalculationBreakdown::Honorarium {
            hourly_rate: 5_000,
            hours_worked: 13.83,
            gross_amount: 69_150,
        });
        assert_eq!(calculation.amount_due, 69_150);
    }

    #[test]
    fn test_honorarium_without_timestamps_uses_default_day() {
        let records = vec![record(1, AttendanceStatus::Present), record(2, AttendanceStatus::Late)];

        let calculation = compute(&employee("HONORARIUM", Some(2_500), None), &records, april()).unwrap();

        assert_eq!(calculation.amount_due, 2_500 * 16);
    }

    #[test]
    fn test_honorarium_requires_base_salary() {
        let result = compute(&employee("HONORARIUM", None, Some(10_000)), &[], april());

        assert!(matches!(result, Err(WorkflowError::MissingRate { contract_type: "HONORARIUM", field: "base_salary" })));
    }

    #[test]
    fn test_fixed() {
        let mut records = (1..=20).map(|day| record(day, AttendanceStatus::Present)).collect::<Vec<_>>();
        records[0].status = AttendanceStatus::Absent;
        records[1].status = AttendanceStatus::Absent;

        let calculation = compute(&employee("FIXED", Some(300_000), None), &records, april()).unwrap();

        // 300000 / 22 * 2 = 27272.72..
        assert_eq!(calculation.breakdown, CalculationBreakdown::Fixed {
            fixed_salary: 300_000,
            workable_days: 22,
            days_absent: 2,
            absence_deduction: 27_273,
            net_amount: 272_727,
        });
        assert_eq!(calculation.amount_due, 272_727);
    }

    #[test]
    fn test_fixed_without_absence_pays_full_salary() {
        let calculation = compute(&employee("FIXED", Some(450_000), None), &[record(1, AttendanceStatus::Late)], april()).unwrap();

        assert_eq!(calculation.amount_due, 450_000);
    }

    #[test]
    fn test_fixed_never_goes_negative() {
        let records = (1..=30).map(|day| record(day, AttendanceStatus::Absent)).collect::<Vec<_>>();

        let calculation = compute(&employee("FIXED", Some(220_000), None), &records, april()).unwrap();

        assert_eq!(calculation.amount_due, 0);
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let result = compute(&employee("FIXED", Some(-1), None), &[], april());

        assert!(matches!(result, Err(WorkflowError::InvalidRate { field: "base_salary", value: -1 })));
    }

    #[test]
    fn test_rate_too_large_is_rejected() {
        let records = (1..=3).map(|day| record(day, AttendanceStatus::Present)).collect::<Vec<_>>();

        let daily = compute(&employee("DAILY", None, Some(i64::MAX / 2)), &records, april());
        assert!(matches!(daily, Err(WorkflowError::InvalidRate { field: "daily_rate", value }) if value == i64::MAX / 2));

        let honorarium = compute(&employee("HONORARIUM", Some(i64::MAX / 100), None), &records, april());
        assert!(matches!(honorarium, Err(WorkflowError::InvalidRate { field: "base_salary", .. })));

        let absences = vec![record(1, AttendanceStatus::Absent), record(2, AttendanceStatus::Absent)];
        let fixed = compute(&employee("FIXED", Some(i64::MAX), None), &absences, april());
        assert!(matches!(fixed, Err(WorkflowError::InvalidRate { field: "base_salary", value: i64::MAX })));

        // A large salary with no absence does not multiply anything
        let full = compute(&employee("FIXED", Some(i64::MAX), None), &records, april()).unwrap();
        assert_eq!(full.amount_due, i64::MAX);
    }

    #[test]
    fn test_unsupported_contract_type() {
        let result = compute(&employee("STAGE", Some(100_000), Some(5_000)), &[], april());

        assert!(matches!(result, Err(WorkflowError::UnsupportedContractType(ref raw)) if raw == "STAGE"));
    }
}
