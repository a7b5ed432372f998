use thiserror::Error;

use crate::{entity::sea_orm_active_enums::RoleType, store::StoreError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("role {actual:?} cannot perform an action reserved to {required:?}")]
    Forbidden { required: RoleType, actual: RoleType },

    #[error("{unvalidated_count} of {total_count} attendance records are not validated")]
    PointagesNotValidated { unvalidated_count: u64, total_count: u64 },

    #[error("{contract_type} contract requires `{field}` to be set")]
    MissingRate { contract_type: &'static str, field: &'static str },

    #[error("`{field}` must not be negative, got {value}")]
    InvalidRate { field: &'static str, value: i64 },

    #[error("unsupported contract type `{0}`")]
    UnsupportedContractType(String),

    #[error("a payment already exists for employee {employee_id} in {period}")]
    DuplicatePayment { employee_id: i32, period: String },

    #[error("payment {0} not found")]
    PaymentNotFound(i32),

    #[error("employee {0} not found")]
    EmployeeNotFound(i32),

    #[error("period `{0}` is not in the `YYYY-MM` format")]
    InvalidPeriodFormat(String),

    #[error("settlement amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("settling {amount} exceeds the {remaining} left to pay")]
    Overpayment { amount: i64, remaining: i64 },

    #[error("payment {0} is cancelled")]
    PaymentCancelled(i32),

    #[error(transparent)]
    Store(#[from] StoreError),
}
