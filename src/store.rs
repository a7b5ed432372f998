use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use sea_orm::DbErr;
use thiserror::Error;

use crate::payroll::{
    model::{AttendanceRecord, Employee, NewPayment, PaymentDetails, PaymentRecord, Settlement, SettlementOutcome},
    period::Period,
};

pub mod database;
#[cfg(test)]
pub mod memory;

pub use database::DatabaseStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Duplicate,

    #[error("stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("database error")]
    Database(#[from] DbErr),
}

#[async_trait]
pub trait AttendanceStore {
    /// Records of `employee_id` dated within `start..=end`, ordered by date then id
    async fn find_by_employee_and_date_range(
        &self,
        employee_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Stamps the still unvalidated records among `ids`, returns how many changed
    async fn mark_validated(
        &self,
        ids: &[i32],
        validator_id: i32,
        at: DateTime<FixedOffset>,
    ) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait EmployeeStore {
    async fn find_by_id(&self, employee_id: i32) -> Result<Option<Employee>, StoreError>;
}

#[async_trait]
pub trait PaymentStore {
    async fn find_by_employee_and_period(
        &self,
        employee_id: i32,
        period: Period,
    ) -> Result<Option<PaymentRecord>, StoreError>;

    /// Must fail with [`StoreError::Duplicate`] when (`employee_id`, `period`) is taken
    async fn create(&self, payment: NewPayment) -> Result<PaymentRecord, StoreError>;

    /// Adds to `amount_paid` and recomputes the status in one atomic step
    async fn apply_settlement(&self, settlement: Settlement) -> Result<SettlementOutcome, StoreError>;

    async fn find_by_id(&self, payment_id: i32) -> Result<Option<PaymentDetails>, StoreError>;

    /// Ordered by period descending, then employee name ascending
    async fn list_by_company(
        &self,
        entreprise_id: i32,
        period: Option<Period>,
    ) -> Result<Vec<PaymentDetails>, StoreError>;
}

pub trait PayrollStore: AttendanceStore + EmployeeStore + PaymentStore + Send + Sync {}

impl<T: AttendanceStore + EmployeeStore + PaymentStore + Send + Sync> PayrollStore for T {}
