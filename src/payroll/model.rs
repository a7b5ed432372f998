use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entity::sea_orm_active_enums::{AttendanceStatus, PaymentMethod, PaymentStatus};

use super::{error::WorkflowError, period::Period};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    Fixed,
    Daily,
    Honorarium,
}

impl ContractType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractType::Fixed => "FIXED",
            ContractType::Daily => "DAILY",
            ContractType::Honorarium => "HONORARIUM",
        }
    }
}

impl FromStr for ContractType {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIXED" => Ok(ContractType::Fixed),
            "DAILY" => Ok(ContractType::Daily),
            "HONORARIUM" => Ok(ContractType::Honorarium),
            other => Err(WorkflowError::UnsupportedContractType(other.to_string())),
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract attributes of an employee as read from the employee store.
///
/// `contract_type` stays raw text; the calculation engine is where an unknown value is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: i32,
    pub entreprise_id: i32,
    pub full_name: String,
    pub contract_type: String,
    /// Monthly salary for `FIXED`, hourly rate for `HONORARIUM`
    pub base_salary: Option<i64>,
    pub daily_rate: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub id: i32,
    pub employee_id: i32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub arrival_time: Option<DateTime<FixedOffset>>,
    pub departure_time: Option<DateTime<FixedOffset>>,
    pub is_validated: bool,
    pub validated_by: Option<i32>,
    pub validator_name: Option<String>,
    pub validated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationStatus {
    pub is_fully_validated: bool,
    pub unvalidated_count: u64,
    pub total_count: u64,
    /// Validator of the first validated record in retrieval order, not necessarily the latest one
    pub validator_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub validated_count: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationBreakdown {
    Daily {
        daily_rate: i64,
        days_worked: u64,
        days_absent: u64,
        total_days: u64,
        gross_amount: i64,
    },
    Honorarium {
        hourly_rate: i64,
        hours_worked: f64,
        gross_amount: i64,
    },
    Fixed {
        fixed_salary: i64,
        workable_days: i64,
        days_absent: u64,
        absence_deduction: i64,
        net_amount: i64,
    },
}

impl CalculationBreakdown {
    /// The authoritative amount owed for this computation
    pub fn amount(&self) -> i64 {
        match self {
            CalculationBreakdown::Daily { gross_amount, .. } => *gross_amount,
            CalculationBreakdown::Honorarium { gross_amount, .. } => *gross_amount,
            CalculationBreakdown::Fixed { net_amount, .. } => *net_amount,
        }
    }

    pub fn contract_type(&self) -> ContractType {
        match self {
            CalculationBreakdown::Daily { .. } => ContractType::Daily,
            CalculationBreakdown::Honorarium { .. } => ContractType::Honorarium,
            CalculationBreakdown::Fixed { .. } => ContractType::Fixed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    pub amount_due: i64,
    pub breakdown: CalculationBreakdown,
}

/// Unpersisted calculation result together with who approved the attendance behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationPreview {
    pub employee_id: i32,
    pub period: Period,
    pub amount_due: i64,
    pub breakdown: CalculationBreakdown,
    pub validation: ValidationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub id: i32,
    pub employee_id: i32,
    pub entreprise_id: i32,
    pub period: Period,
    pub amount_due: i64,
    pub amount_paid: i64,
    pub contract_type: ContractType,
    pub calculation_breakdown: CalculationBreakdown,
    pub status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub paid_at: Option<DateTime<FixedOffset>>,
    pub calculated_by: i32,
    pub paid_by: Option<i32>,
    pub notes: Option<String>,
}

/// A payment joined with the display names needed for traceability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDetails {
    #[serde(flatten)]
    pub payment: PaymentRecord,
    pub employee_name: String,
    pub calculated_by_name: Option<String>,
    pub paid_by_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub employee_id: i32,
    pub entreprise_id: i32,
    pub period: Period,
    pub calculation: Calculation,
    pub calculated_by: i32,
    pub created_at: DateTime<FixedOffset>,
}

/// How a settlement treats an amount that would take `amount_paid` past `amount_due`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverpaymentPolicy {
    #[default]
    Reject,
    Clamp,
    Allow,
}

impl FromStr for OverpaymentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(OverpaymentPolicy::Reject),
            "clamp" => Ok(OverpaymentPolicy::Clamp),
            "allow" => Ok(OverpaymentPolicy::Allow),
            other => Err(format!("unknown overpayment policy `{other}`")),
        }
    }
}

/// One installment, applied by the store as a single atomic add-and-recompute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub payment_id: i32,
    pub amount: i64,
    pub method: PaymentMethod,
    pub paid_by: i32,
    pub notes: Option<String>,
    pub at: DateTime<FixedOffset>,
    pub policy: OverpaymentPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    Applied(PaymentRecord),
    NotFound,
    Cancelled,
    ExceedsDue { remaining: i64 },
    /// `amount_paid + amount` does not fit in an `i64`
    AmountOverflow,
}
