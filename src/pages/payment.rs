use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    entity::sea_orm_active_enums::PaymentMethod,
    payroll::{Actor, ApprovalWorkflow, Period, WorkflowError},
    store::PayrollStore,
};

use model::*;

mod model;

type Workflow<S> = web::Data<ApprovalWorkflow<S>>;

pub(super) fn config<S: PayrollStore + 'static>(cfg: &mut web::ServiceConfig) {
    // Fixed paths go first so they are not taken for a `payment_id`
    cfg
        .service(web::resource("")
            .route(web::get().to(list_payments::<S>))
            .route(web::post().to(create_payment::<S>)))
        .service(web::resource("/validation")
            .route(web::get().to(get_validation::<S>))
            .route(web::post().to(validate_attendance::<S>)))
        .service(web::resource("/calculate")
            .route(web::post().to(calculate_payment::<S>)))
        .service(web::resource("/{payment_id}")
            .route(web::get().to(get_payment::<S>)))
        .service(web::resource("/{payment_id}/settlements")
            .route(web::post().to(settle_payment::<S>)));
}

async fn get_validation<S: PayrollStore + 'static>(workflow: Workflow<S>, _actor: Actor, query: web::Query<EmployeePeriod>) -> Result<HttpResponse, WorkflowError> {
    let status = workflow.check_validation(query.employee_id, query.period()?).await?;

    Ok(HttpResponse::Ok().json(status))
}

async fn validate_attendance<S: PayrollStore + 'static>(workflow: Workflow<S>, actor: Actor, payload: web::Json<EmployeePeriod>) -> Result<HttpResponse, WorkflowError> {
    let outcome = workflow.request_validation(payload.employee_id, payload.period()?, &actor).await?;

    Ok(HttpResponse::Ok().json(outcome))
}

async fn calculate_payment<S: PayrollStore + 'static>(workflow: Workflow<S>, actor: Actor, payload: web::Json<EmployeePeriod>) -> Result<HttpResponse, WorkflowError> {
    let preview = workflow.request_calculation(payload.employee_id, payload.period()?, &actor).await?;

    Ok(HttpResponse::Ok().json(preview))
}

async fn create_payment<S: PayrollStore + 'static>(workflow: Workflow<S>, actor: Actor, payload: web::Json<EmployeePeriod>) -> Result<HttpResponse, WorkflowError> {
    let payment = workflow.request_payment_creation(payload.employee_id, payload.period()?, &actor).await?;

    Ok(HttpResponse::Created().json(payment))
}

async fn settle_payment<S: PayrollStore + 'static>(workflow: Workflow<S>, actor: Actor, payment_id: web::Path<i32>, payload: web::Json<SettlePayment>) -> Result<HttpResponse, WorkflowError> {
    let SettlePayment { amount, method, notes } = payload.into_inner();

    let payment = workflow.request_settlement(payment_id.into_inner(), amount, method, &actor, notes).await?;

    Ok(HttpResponse::Ok().json(payment))
}

async fn list_payments<S: PayrollStore + 'static>(workflow: Workflow<S>, _actor: Actor, query: web::Query<ListPayments>) -> Result<HttpResponse, WorkflowError> {
    let period = query.period.as_deref()
        .map(str::parse::<Period>)
        .transpose()?;

    let payments = workflow.list_for_company(query.entreprise_id, period).await?;

    Ok(HttpResponse::Ok().json(payments))
}

async fn get_payment<S: PayrollStore + 'static>(workflow: Workflow<S>, _actor: Actor, payment_id: web::Path<i32>) -> Result<HttpResponse, WorkflowError> {
    let details = workflow.get_details(payment_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(details))
}
