//! Two-role approval protocol.
//!
//! An admin validates a month of attendance, then a cashier may calculate, create and settle the payment.
//! Every entry point starts with its role check; nothing downstream re-checks.

use chrono::Local;
use tracing::{info, warn};

use crate::{
    entity::sea_orm_active_enums::{PaymentMethod, RoleType},
    store::{EmployeeStore, PayrollStore},
};

use super::{
    actor::Actor,
    engine,
    error::WorkflowError,
    gate::{self, AttendanceValidationGate},
    ledger::PaymentLedger,
    model::{Calculation, CalculationPreview, Employee, OverpaymentPolicy, PaymentDetails, PaymentRecord, ValidationOutcome, ValidationStatus},
    period::Period,
};

pub struct ApprovalWorkflow<S> {
    store: S,
    overpayment_policy: OverpaymentPolicy,
}

impl<S: PayrollStore> ApprovalWorkflow<S> {
    pub fn new(store: S, overpayment_policy: OverpaymentPolicy) -> Self {
        Self { store, overpayment_policy }
    }

    fn gate(&self) -> AttendanceValidationGate<'_, S> {
        AttendanceValidationGate::new(&self.store)
    }

    fn ledger(&self) -> PaymentLedger<'_, S> {
        PaymentLedger::new(&self.store, self.overpayment_policy)
    }

    fn authorize<'a>(&self, actor: &'a Actor, role: RoleType, action: &str) -> Result<&'a Actor, WorkflowError> {
        actor.require(role).inspect_err(|_| {
            warn!(actor_id = actor.id, role = ?actor.role, action, "forbidden");
        })
    }

    async fn employee(&self, employee_id: i32) -> Result<Employee, WorkflowError> {
        EmployeeStore::find_by_id(&self.store, employee_id).await?
            .ok_or(WorkflowError::EmployeeNotFound(employee_id))
    }

    pub async fn check_validation(&self, employee_id: i32, period: Period) -> Result<ValidationStatus, WorkflowError> {
        self.gate().check_validation(employee_id, period).await
    }

    pub async fn request_validation(&self, employee_id: i32, period: Period, actor: &Actor) -> Result<ValidationOutcome, WorkflowError> {
        let admin = self.authorize(actor, RoleType::Admin, "validate attendance")?;
        self.employee(employee_id).await?;

        self.gate().validate_period(employee_id, period, admin, Local::now().fixed_offset()).await
    }

    /// Loads the employee and attendance, refusing to go on unless every record is validated
    async fn calculate(&self, employee_id: i32, period: Period) -> Result<(Employee, Calculation, ValidationStatus), WorkflowError> {
        let employee = self.employee(employee_id).await?;

        let records = self.gate().records(employee_id, period).await?;
        let validation = gate::validation_status(&records);

        if !validation.is_fully_validated {
            warn!(employee_id, %period, unvalidated = validation.unvalidated_count, total = validation.total_count, "calculation blocked");

            return Err(WorkflowError::PointagesNotValidated {
                unvalidated_count: validation.unvalidated_count,
                total_count: validation.total_count,
            });
        }

        let calculation = engine::compute(&employee, &records, period)?;

        info!(employee_id, employee = %employee.full_name, %period, amount_due = calculation.amount_due, "payment calculated");

        Ok((employee, calculation, validation))
    }

    pub async fn request_calculation(&self, employee_id: i32, period: Period, actor: &Actor) -> Result<CalculationPreview, WorkflowError> {
        self.authorize(actor, RoleType::Caissier, "calculate payment")?;

        let (_, calculation, validation) = self.calculate(employee_id, period).await?;

        Ok(CalculationPreview {
            employee_id,
            period,
            amount_due: calculation.amount_due,
            breakdown: calculation.breakdown,
            validation,
        })
    }

    /// Recomputes from the stored attendance rather than trusting an earlier preview
    pub async fn request_payment_creation(&self, employee_id: i32, period: Period, actor: &Actor) -> Result<PaymentRecord, WorkflowError> {
        let cashier = self.authorize(actor, RoleType::Caissier, "create payment")?;

        let (employee, calculation, _) = self.calculate(employee_id, period).await?;

        self.ledger().create(&employee, period, calculation, cashier, Local::now().fixed_offset()).await
    }

    pub async fn request_settlement(
        &self,
        payment_id: i32,
        amount: i64,
        method: PaymentMethod,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<PaymentRecord, WorkflowError> {
        let cashier = self.authorize(actor, RoleType::Caissier, "settle payment")?;

        self.ledger().record_settlement(payment_id, amount, method, cashier, notes, Local::now().fixed_offset()).await
    }

    pub async fn list_for_company(&self, entreprise_id: i32, period: Option<Period>) -> Result<Vec<PaymentDetails>, WorkflowError> {
        self.ledger().list_for_company(entreprise_id, period).await
    }

    pub async fn get_details(&self, payment_id: i32) -> Result<PaymentDetails, WorkflowError> {
        let details = self.ledger().get_details(payment_id).await?;

        info!(payment_id, status = ?details.payment.status, "payment details read");

        Ok(details)
    }
}
