//! In-process store backing the test suite.
//!
//! A single mutex guards everything, which gives the same atomicity the database store gets from
//! its unique index and single-statement updates.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::{
    entity::sea_orm_active_enums::{AttendanceStatus, PaymentStatus},
    payroll::{
        actor::Actor,
        model::{AttendanceRecord, Employee, NewPayment, OverpaymentPolicy, PaymentDetails, PaymentRecord, Settlement, SettlementOutcome},
        period::Period,
    },
};

use super::{AttendanceStore, EmployeeStore, PaymentStore, StoreError};

#[derive(Default)]
struct State {
    next_id: i32,
    users: HashMap<i32, Actor>,
    employees: HashMap<i32, Employee>,
    attendance: Vec<AttendanceRecord>,
    payments: Vec<PaymentRecord>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn user_name(&self, id: Option<i32>) -> Option<String> {
        id.and_then(|id| self.users.get(&id)).map(|user| user.display_name.clone())
    }

    fn details(&self, payment: &PaymentRecord) -> PaymentDetails {
        PaymentDetails {
            payment: payment.clone(),
            employee_name: self.employees.get(&payment.employee_id)
                .map(|employee| employee.full_name.clone())
                .unwrap_or_default(),
            calculated_by_name: self.user_name(Some(payment.calculated_by)),
            paid_by_name: self.user_name(payment.paid_by),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn insert_user(&self, actor: Actor) {
        self.state.lock().unwrap().users.insert(actor.id, actor);
    }

    pub fn insert_employee(
        &self,
        entreprise_id: i32,
        full_name: &str,
        contract_type: &str,
        base_salary: Option<i64>,
        daily_rate: Option<i64>,
    ) -> Employee {
        let mut state = self.state.lock().unwrap();

        let employee = Employee {
            id: state.next_id(),
            entreprise_id,
            full_name: full_name.to_string(),
            contract_type: contract_type.to_string(),
            base_salary,
            daily_rate,
        };
        state.employees.insert(employee.id, employee.clone());

        employee
    }

    pub fn insert_attendance(&self, employee_id: i32, date: NaiveDate, status: AttendanceStatus) -> i32 {
        let mut state = self.state.lock().unwrap();

        let id = state.next_id();
        state.attendance.push(AttendanceRecord {
            id,
            employee_id,
            date,
            status,
            arrival_time: None,
            departure_time: None,
            is_validated: false,
            validated_by: None,
            validator_name: None,
            validated_at: None,
        });

        id
    }

    pub fn validate_attendance(&self, id: i32, validator_id: i32) {
        let mut state = self.state.lock().unwrap();

        if let Some(record) = state.attendance.iter_mut().find(|record| record.id == id) {
            record.is_validated = true;
            record.validated_by = Some(validator_id);
        }
    }

    pub fn cancel_payment(&self, id: i32) {
        let mut state = self.state.lock().unwrap();

        if let Some(payment) = state.payments.iter_mut().find(|payment| payment.id == id) {
            payment.status = PaymentStatus::Cancelled;
        }
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_by_employee_and_date_range(
        &self,
        employee_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let state = self.state.lock().unwrap();

        let mut records = state.attendance.iter()
            .filter(|record| record.employee_id == employee_id && (start..=end).contains(&record.date))
            .map(|record| AttendanceRecord {
                validator_name: state.user_name(record.validated_by),
                ..record.clone()
            })
            .collect::<Vec<_>>();
        records.sort_by_key(|record| (record.date, record.id));

        Ok(records)
    }

    async fn mark_validated(
        &self,
        ids: &[i32],
        validator_id: i32,
        at: DateTime<FixedOffset>,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();

        let mut changed = 0;
        for record in state.attendance.iter_mut().filter(|record| ids.contains(&record.id) && !record.is_validated) {
            record.is_validated = true;
            record.validated_by = Some(validator_id);
            record.validated_at = Some(at);
            changed += 1;
        }

        Ok(changed)
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn find_by_id(&self, employee_id: i32) -> Result<Option<Employee>, StoreError> {
        Ok(self.state.lock().unwrap().employees.get(&employee_id).cloned())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn find_by_employee_and_period(
        &self,
        employee_id: i32,
        period: Period,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let state = self.state.lock().unwrap();

        Ok(state.payments.iter()
            .find(|payment| payment.employee_id == employee_id && payment.period == period)
            .cloned())
    }

    async fn create(&self, payment: NewPayment) -> Result<PaymentRecord, StoreError> {
        let mut state = self.state.lock().unwrap();

        if state.payments.iter().any(|p| p.employee_id == payment.employee_id && p.period == payment.period) {
            return Err(StoreError::Duplicate);
        }

        let record = PaymentRecord {
            id: state.next_id(),
            employee_id: payment.employee_id,
            entreprise_id: payment.entreprise_id,
            period: payment.period,
            amount_due: payment.calculation.amount_due,
            amount_paid: 0,
            contract_type: payment.calculation.breakdown.contract_type(),
            calculation_breakdown: payment.calculation.breakdown,
            status: PaymentStatus::Calculated,
            payment_method: None,
            paid_at: None,
            calculated_by: payment.calculated_by,
            paid_by: None,
            notes: None,
        };
        state.payments.push(record.clone());

        Ok(record)
    }

    async fn apply_settlement(&self, settlement: Settlement) -> Result<SettlementOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();

        let Some(payment) = state.payments.iter_mut().find(|payment| payment.id == settlement.payment_id) else {
            return Ok(SettlementOutcome::NotFound);
        };

        if payment.status == PaymentStatus::Cancelled {
            return Ok(SettlementOutcome::Cancelled);
        }

        let Some(added) = payment.amount_paid.checked_add(settlement.amount) else {
            return Ok(SettlementOutcome::AmountOverflow);
        };

        let amount_paid = match settlement.policy {
            OverpaymentPolicy::Reject if added > payment.amount_due => {
                return Ok(SettlementOutcome::ExceedsDue {
                    remaining: (payment.amount_due - payment.amount_paid).max(0),
                });
            },
            OverpaymentPolicy::Clamp => added.min(payment.amount_due).max(payment.amount_paid),
            _ => added,
        };

        let status = PaymentStatus::from_amounts(amount_paid, payment.amount_due);
        if status == PaymentStatus::Paid && payment.status != PaymentStatus::Paid {
            payment.paid_at = Some(settlement.at);
        }

        payment.amount_paid = amount_paid;
        payment.status = status;
        payment.payment_method = Some(settlement.method);
        payment.paid_by = Some(settlement.paid_by);
        if settlement.notes.is_some() {
            payment.notes = settlement.notes;
        }

        Ok(SettlementOutcome::Applied(payment.clone()))
    }

    async fn find_by_id(&self, payment_id: i32) -> Result<Option<PaymentDetails>, StoreError> {
        let state = self.state.lock().unwrap();

        Ok(state.payments.iter()
            .find(|payment| payment.id == payment_id)
            .map(|payment| state.details(payment)))
    }

    async fn list_by_company(
        &self,
        entreprise_id: i32,
        period: Option<Period>,
    ) -> Result<Vec<PaymentDetails>, StoreError> {
        let state = self.state.lock().unwrap();

        let mut listed = state.payments.iter()
            .filter(|payment| payment.entreprise_id == entreprise_id)
            .filter(|payment| period.is_none_or(|period| payment.period == period))
            .map(|payment| state.details(payment))
            .collect::<Vec<_>>();
        listed.sort_by(|a, b| {
            b.payment.period.cmp(&a.payment.period)
                .then_with(|| a.employee_name.cmp(&b.employee_name))
                .then_with(|| a.payment.id.cmp(&b.payment.id))
        });

        Ok(listed)
    }
}
