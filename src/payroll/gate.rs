//! Attendance validation gate.
//!
//! Answers whether an employee's month is fully approved, and performs the admin approval itself.
//! Approval is a one-way ratchet: records are only ever flipped to validated.

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::store::AttendanceStore;

use super::{
    actor::Actor,
    error::WorkflowError,
    model::{AttendanceRecord, ValidationOutcome, ValidationStatus},
    period::Period,
};

pub struct AttendanceValidationGate<'s, S: ?Sized> {
    store: &'s S,
}

impl<'s, S: AttendanceStore + Sync + ?Sized> AttendanceValidationGate<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    pub async fn records(&self, employee_id: i32, period: Period) -> Result<Vec<AttendanceRecord>, WorkflowError> {
        let records = self.store
            .find_by_employee_and_date_range(employee_id, period.first_day(), period.last_day())
            .await?;

        Ok(records)
    }

    pub async fn check_validation(&self, employee_id: i32, period: Period) -> Result<ValidationStatus, WorkflowError> {
        let records = self.records(employee_id, period).await?;

        Ok(validation_status(&records))
    }

    /// Caller is responsible for having checked that `admin` holds the admin role
    pub async fn validate_period(
        &self,
        employee_id: i32,
        period: Period,
        admin: &Actor,
        now: DateTime<FixedOffset>,
    ) -> Result<ValidationOutcome, WorkflowError> {
        let records = self.records(employee_id, period).await?;

        let pending = records.iter()
            .filter(|record| !record.is_validated)
            .map(|record| record.id)
            .collect::<Vec<_>>();

        if pending.is_empty() {
            let message = if records.is_empty() {
                format!("No attendance records for {period}, nothing to validate")
            } else {
                format!("Attendance for {period} is already validated")
            };

            return Ok(ValidationOutcome { validated_count: 0, message });
        }

        let validated_count = self.store.mark_validated(&pending, admin.id, now).await?;

        info!(employee_id, %period, admin_id = admin.id, validated_count, "attendance validated");

        Ok(ValidationOutcome {
            validated_count,
            message: format!("{validated_count} attendance records for {period} validated by {}", admin.display_name),
        })
    }
}

/// No records never counts as validated
pub fn validation_status(records: &[AttendanceRecord]) -> ValidationStatus {
    let total_count = records.len() as u64;
    let unvalidated_count = records.iter().filter(|record| !record.is_validated).count() as u64;

    let validator_name = records.iter()
        .filter(|record| record.is_validated)
        .find_map(|record| record.validator_name.clone());

    ValidationStatus {
        is_fully_validated: total_count > 0 && unvalidated_count == 0,
        unvalidated_count,
        total_count,
        validator_name,
    }
}
