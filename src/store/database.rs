use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use sea_orm::{
    sea_query::{Expr, SimpleExpr}, ActiveEnum, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, SqlErr,
};

use crate::{
    entity::{attendance_record, employee, payment, prelude::*, sea_orm_active_enums::{PaymentMethod, PaymentStatus}, user},
    payroll::{
        model::{self, ContractType, NewPayment, OverpaymentPolicy, PaymentDetails, PaymentRecord, Settlement, SettlementOutcome},
        period::Period,
    },
};

use super::{AttendanceStore, EmployeeStore, PaymentStore, StoreError};

pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn user_names(&self, ids: impl IntoIterator<Item = i32>) -> Result<HashMap<i32, String>, StoreError> {
        let mut ids = ids.into_iter().collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db).await?;

        Ok(users.into_iter().map(|user| (user.id, user.name)).collect())
    }

    async fn employee_names(&self, ids: impl IntoIterator<Item = i32>) -> Result<HashMap<i32, String>, StoreError> {
        let mut ids = ids.into_iter().collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let employees = Employee::find()
            .filter(employee::Column::Id.is_in(ids))
            .all(&self.db).await?;

        Ok(employees.into_iter().map(|employee| (employee.id, employee.full_name)).collect())
    }

    /// Resolves the display names of a batch of payments, keeping their order
    async fn with_names(&self, payments: Vec<payment::Model>) -> Result<Vec<PaymentDetails>, StoreError> {
        let employees = self.employee_names(payments.iter().map(|p| p.employee_id)).await?;
        let users = self.user_names(
            payments.iter().flat_map(|p| std::iter::once(p.calculated_by).chain(p.paid_by))
        ).await?;

        payments.into_iter()
            .map(|payment| {
                let employee_name = employees.get(&payment.employee_id).cloned().unwrap_or_default();
                let calculated_by_name = users.get(&payment.calculated_by).cloned();
                let paid_by_name = payment.paid_by.and_then(|id| users.get(&id).cloned());

                Ok(PaymentDetails {
                    payment: payment_record(payment)?,
                    employee_name,
                    calculated_by_name,
                    paid_by_name,
                })
            })
            .collect()
    }
}

fn payment_record(model: payment::Model) -> Result<PaymentRecord, StoreError> {
    let period = model.period.parse::<Period>()
        .map_err(|err| StoreError::Corrupt(format!("payment {}: {err}", model.id)))?;
    let contract_type = model.contract_type.parse::<ContractType>()
        .map_err(|err| StoreError::Corrupt(format!("payment {}: {err}", model.id)))?;
    let calculation_breakdown = serde_json::from_value(model.calculation_breakdown)
        .map_err(|err| StoreError::Corrupt(format!("payment {}: {err}", model.id)))?;

    Ok(PaymentRecord {
        id: model.id,
        employee_id: model.employee_id,
        entreprise_id: model.entreprise_id,
        period,
        amount_due: model.amount_due,
        amount_paid: model.amount_paid,
        contract_type,
        calculation_breakdown,
        status: model.status,
        payment_method: model.payment_method,
        paid_at: model.paid_at,
        calculated_by: model.calculated_by,
        paid_by: model.paid_by,
        notes: model.notes,
    })
}

fn to_attendance(record: attendance_record::Model, validator: Option<user::Model>) -> model::AttendanceRecord {
    model::AttendanceRecord {
        id: record.id,
        employee_id: record.employee_id,
        date: record.date,
        status: record.status,
        arrival_time: record.arrival_time,
        departure_time: record.departure_time,
        is_validated: record.is_validated,
        validated_by: record.validated_by,
        validator_name: validator.map(|user| user.name),
        validated_at: record.validated_at,
    }
}

#[async_trait]
impl AttendanceStore for DatabaseStore {
    async fn find_by_employee_and_date_range(
        &self,
        employee_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<model::AttendanceRecord>, StoreError> {
        let records = AttendanceRecord::find()
            .filter(attendance_record::Column::EmployeeId.eq(employee_id))
            .filter(attendance_record::Column::Date.between(start, end))
            .order_by_asc(attendance_record::Column::Date)
            .order_by_asc(attendance_record::Column::Id)
            .find_also_related(User)
            .all(&self.db).await?;

        Ok(records.into_iter()
            .map(|(record, validator)| to_attendance(record, validator))
            .collect())
    }

    async fn mark_validated(
        &self,
        ids: &[i32],
        validator_id: i32,
        at: DateTime<FixedOffset>,
    ) -> Result<u64, StoreError> {
        let res = AttendanceRecord::update_many()
            .col_expr(attendance_record::Column::IsValidated, Expr::value(true))
            .col_expr(attendance_record::Column::ValidatedBy, Expr::value(validator_id))
            .col_expr(attendance_record::Column::ValidatedAt, Expr::value(at))
            .col_expr(attendance_record::Column::UpdatedAt, Expr::value(at))
            .filter(attendance_record::Column::Id.is_in(ids.iter().copied()))
            // Already validated rows keep their original stamp
            .filter(attendance_record::Column::IsValidated.eq(false))
            .exec(&self.db).await?;

        Ok(res.rows_affected)
    }
}

#[async_trait]
impl EmployeeStore for DatabaseStore {
    async fn find_by_id(&self, employee_id: i32) -> Result<Option<model::Employee>, StoreError> {
        let employee = Employee::find_by_id(employee_id)
            .one(&self.db).await?;

        Ok(employee.map(|employee| model::Employee {
            id: employee.id,
            entreprise_id: employee.entreprise_id,
            full_name: employee.full_name,
            contract_type: employee.contract_type,
            base_salary: employee.base_salary,
            daily_rate: employee.daily_rate,
        }))
    }
}

fn status_value(status: PaymentStatus) -> SimpleExpr {
    Expr::val(status.to_value()).as_enum(PaymentStatus::name())
}

/// The `amount_paid` a settlement of `amount` leads to, read from the row before the update
fn settled_amount(policy: OverpaymentPolicy, amount: i64) -> SimpleExpr {
    let added = Expr::col(payment::Column::AmountPaid).add(Expr::value(amount));

    match policy {
        OverpaymentPolicy::Clamp => Expr::case(
                Expr::col(payment::Column::AmountPaid).lte(Expr::col(payment::Column::AmountDue).sub(Expr::value(amount))),
                added,
            )
            .case(
                Expr::col(payment::Column::AmountPaid).gte(Expr::col(payment::Column::AmountDue)),
                Expr::col(payment::Column::AmountPaid),
            )
            .finally(Expr::col(payment::Column::AmountDue))
            .into(),
        OverpaymentPolicy::Reject | OverpaymentPolicy::Allow => added,
    }
}

#[async_trait]
impl PaymentStore for DatabaseStore {
    async fn find_by_employee_and_period(
        &self,
        employee_id: i32,
        period: Period,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let payment = Payment::find()
            .filter(payment::Column::EmployeeId.eq(employee_id))
            .filter(payment::Column::Period.eq(period.to_string()))
            .one(&self.db).await?;

        payment.map(payment_record).transpose()
    }

    async fn create(&self, new_payment: NewPayment) -> Result<PaymentRecord, StoreError> {
        let breakdown = &new_payment.calculation.breakdown;
        let calculation_breakdown = serde_json::to_value(breakdown)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        let model = payment::ActiveModel {
            created_at: Set(new_payment.created_at),
            updated_at: Set(new_payment.created_at),
            employee_id: Set(new_payment.employee_id),
            entreprise_id: Set(new_payment.entreprise_id),
            period: Set(new_payment.period.to_string()),
            amount_due: Set(new_payment.calculation.amount_due),
            amount_paid: Set(0),
            contract_type: Set(breakdown.contract_type().to_string()),
            calculation_breakdown: Set(calculation_breakdown),
            status: Set(PaymentStatus::Calculated),
            payment_method: Set(None),
            paid_at: Set(None),
            calculated_by: Set(new_payment.calculated_by),
            paid_by: Set(None),
            notes: Set(None),
            ..Default::default()
        };

        let res = Payment::insert(model)
            .exec_with_returning(&self.db).await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Duplicate,
                _ => StoreError::Database(err),
            })?;

        payment_record(res)
    }

    async fn apply_settlement(&self, settlement: Settlement) -> Result<SettlementOutcome, StoreError> {
        let amount = settlement.amount;
        let new_paid = settled_amount(settlement.policy, amount);

        let status = Expr::case(Expr::expr(new_paid.clone()).lte(Expr::value(0i64)), status_value(PaymentStatus::Calculated))
            .case(Expr::expr(new_paid.clone()).gte(Expr::col(payment::Column::AmountDue)), status_value(PaymentStatus::Paid))
            .finally(status_value(PaymentStatus::Partial));

        let reaches_paid = Expr::col(payment::Column::Status).ne(status_value(PaymentStatus::Paid))
            .and(Expr::expr(new_paid.clone()).gt(Expr::value(0i64)))
            .and(Expr::expr(new_paid.clone()).gte(Expr::col(payment::Column::AmountDue)));
        let paid_at = Expr::case(reaches_paid, Expr::value(settlement.at))
            .finally(Expr::col(payment::Column::PaidAt));

        // Every expression reads the row as it was before this update, so the whole settlement is one atomic step
        let mut update = Payment::update_many()
            .col_expr(payment::Column::AmountPaid, new_paid)
            .col_expr(payment::Column::Status, status.into())
            .col_expr(payment::Column::PaidAt, paid_at.into())
            .col_expr(payment::Column::PaymentMethod, Expr::val(settlement.method.to_value()).as_enum(PaymentMethod::name()))
            .col_expr(payment::Column::PaidBy, Expr::value(settlement.paid_by))
            .col_expr(payment::Column::UpdatedAt, Expr::value(settlement.at))
            .filter(payment::Column::Id.eq(settlement.payment_id))
            .filter(payment::Column::Status.ne(PaymentStatus::Cancelled))
            // Keeps `amount_paid + amount` inside bigint
            .filter(Expr::col(payment::Column::AmountPaid).lte(Expr::value(i64::MAX - amount)));

        if let Some(notes) = settlement.notes {
            update = update.col_expr(payment::Column::Notes, Expr::value(notes));
        }

        if settlement.policy == OverpaymentPolicy::Reject {
            update = update.filter(
                Expr::col(payment::Column::AmountPaid).lte(Expr::col(payment::Column::AmountDue).sub(Expr::value(amount)))
            );
        }

        if let Some(updated) = update.exec_with_returning(&self.db).await?.into_iter().next() {
            return Ok(SettlementOutcome::Applied(payment_record(updated)?));
        }

        // Nothing matched, find out why
        let Some(current) = Payment::find_by_id(settlement.payment_id).one(&self.db).await? else {
            return Ok(SettlementOutcome::NotFound);
        };

        if current.status == PaymentStatus::Cancelled {
            return Ok(SettlementOutcome::Cancelled);
        }

        if current.amount_paid.checked_add(amount).is_none() {
            return Ok(SettlementOutcome::AmountOverflow);
        }

        Ok(SettlementOutcome::ExceedsDue {
            remaining: (current.amount_due - current.amount_paid).max(0),
        })
    }

    async fn find_by_id(&self, payment_id: i32) -> Result<Option<PaymentDetails>, StoreError> {
        let Some(payment) = Payment::find_by_id(payment_id).one(&self.db).await? else {
            return Ok(None);
        };

        Ok(self.with_names(vec![payment]).await?.pop())
    }

    async fn list_by_company(
        &self,
        entreprise_id: i32,
        period: Option<Period>,
    ) -> Result<Vec<PaymentDetails>, StoreError> {
        let mut query = Payment::find()
            .join(JoinType::InnerJoin, payment::Relation::Employee.def())
            .filter(payment::Column::EntrepriseId.eq(entreprise_id));

        if let Some(period) = period {
            query = query.filter(payment::Column::Period.eq(period.to_string()));
        }

        let payments = query
            .order_by_desc(payment::Column::Period)
            .order_by_asc(employee::Column::FullName)
            .order_by_asc(payment::Column::Id)
            .all(&self.db).await?;

        self.with_names(payments).await
    }
}
