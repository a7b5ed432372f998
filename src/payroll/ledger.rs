//! Payment ledger: one payment per employee per period, settled in installments.

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::{
    entity::sea_orm_active_enums::{PaymentMethod, PaymentStatus},
    store::{PaymentStore, StoreError},
};

use super::{
    actor::Actor,
    error::WorkflowError,
    model::{Calculation, Employee, NewPayment, OverpaymentPolicy, PaymentDetails, PaymentRecord, Settlement, SettlementOutcome},
    period::Period,
};

pub struct PaymentLedger<'s, S: ?Sized> {
    store: &'s S,
    policy: OverpaymentPolicy,
}

impl<'s, S: PaymentStore + Sync + ?Sized> PaymentLedger<'s, S> {
    pub fn new(store: &'s S, policy: OverpaymentPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(
        &self,
        employee: &Employee,
        period: Period,
        calculation: Calculation,
        calculator: &Actor,
        now: DateTime<FixedOffset>,
    ) -> Result<PaymentRecord, WorkflowError> {
        let duplicate = || WorkflowError::DuplicatePayment {
            employee_id: employee.id,
            period: period.to_string(),
        };

        if self.store.find_by_employee_and_period(employee.id, period).await?.is_some() {
            return Err(duplicate());
        }

        // The unique index still decides when two creations race past the check above
        let payment = match self.store.create(NewPayment {
            employee_id: employee.id,
            entreprise_id: employee.entreprise_id,
            period,
            calculation,
            calculated_by: calculator.id,
            created_at: now,
        }).await {
            Ok(payment) => payment,
            Err(StoreError::Duplicate) => return Err(duplicate()),
            Err(err) => return Err(err.into()),
        };

        info!(payment_id = payment.id, employee_id = employee.id, %period, amount_due = payment.amount_due, calculator_id = calculator.id, "payment created");

        Ok(payment)
    }

    pub async fn record_settlement(
        &self,
        payment_id: i32,
        amount: i64,
        method: PaymentMethod,
        payer: &Actor,
        notes: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> Result<PaymentRecord, WorkflowError> {
        if amount <= 0 {
            return Err(WorkflowError::InvalidAmount(amount));
        }

        let outcome = self.store.apply_settlement(Settlement {
            payment_id,
            amount,
            method,
            paid_by: payer.id,
            notes,
            at: now,
            policy: self.policy,
        }).await?;

        match outcome {
            SettlementOutcome::Applied(payment) => {
                debug_assert_eq!(payment.status, PaymentStatus::from_amounts(payment.amount_paid, payment.amount_due));
                info!(payment_id, amount, amount_paid = payment.amount_paid, status = ?payment.status, payer_id = payer.id, "settlement recorded");
                Ok(payment)
            },
            SettlementOutcome::NotFound => Err(WorkflowError::PaymentNotFound(payment_id)),
            SettlementOutcome::Cancelled => Err(WorkflowError::PaymentCancelled(payment_id)),
            SettlementOutcome::ExceedsDue { remaining } => Err(WorkflowError::Overpayment { amount, remaining }),
            SettlementOutcome::AmountOverflow => Err(WorkflowError::InvalidAmount(amount)),
        }
    }

    pub async fn list_for_company(&self, entreprise_id: i32, period: Option<Period>) -> Result<Vec<PaymentDetails>, WorkflowError> {
        Ok(self.store.list_by_company(entreprise_id, period).await?)
    }

    pub async fn get_details(&self, payment_id: i32) -> Result<PaymentDetails, WorkflowError> {
        self.store.find_by_id(payment_id).await?
            .ok_or(WorkflowError::PaymentNotFound(payment_id))
    }
}
