use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct EmployeePeriod {
    pub(super) employee_id: i32,
    pub(super) period: String,
}

impl EmployeePeriod {
    pub(super) fn period(&self) -> Result<Period, WorkflowError> {
        self.period.parse()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct SettlePayment {
    pub(super) amount: i64,
    pub(super) method: PaymentMethod,
    pub(super) notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ListPayments {
    pub(super) entreprise_id: i32,
    pub(super) period: Option<String>,
}
