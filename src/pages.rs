use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::error;

use crate::{payroll::WorkflowError, store::PayrollStore};

mod payment;

pub fn config<S: PayrollStore + 'static>(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/payments")
            .configure(payment::config::<S>));
}

fn error_code(err: &WorkflowError) -> &'static str {
    match err {
        WorkflowError::Forbidden { .. } => "forbidden",
        WorkflowError::PointagesNotValidated { .. } => "pointages_not_validated",
        WorkflowError::MissingRate { .. } => "missing_rate",
        WorkflowError::InvalidRate { .. } => "invalid_rate",
        WorkflowError::UnsupportedContractType(_) => "unsupported_contract_type",
        WorkflowError::DuplicatePayment { .. } => "duplicate_payment",
        WorkflowError::PaymentNotFound(_) => "payment_not_found",
        WorkflowError::EmployeeNotFound(_) => "employee_not_found",
        WorkflowError::InvalidPeriodFormat(_) => "invalid_period_format",
        WorkflowError::InvalidAmount(_) => "invalid_amount",
        WorkflowError::Overpayment { .. } => "overpayment",
        WorkflowError::PaymentCancelled(_) => "payment_cancelled",
        WorkflowError::Store(_) => "internal",
    }
}

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Forbidden { .. } => StatusCode::FORBIDDEN,
            WorkflowError::PointagesNotValidated { .. }
            | WorkflowError::DuplicatePayment { .. }
            | WorkflowError::PaymentCancelled(_) => StatusCode::CONFLICT,
            WorkflowError::MissingRate { .. }
            | WorkflowError::InvalidRate { .. }
            | WorkflowError::UnsupportedContractType(_)
            | WorkflowError::Overpayment { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::PaymentNotFound(_) | WorkflowError::EmployeeNotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::InvalidPeriodFormat(_) | WorkflowError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": error_code(self),
            "message": self.to_string(),
        });

        match self {
            WorkflowError::PointagesNotValidated { unvalidated_count, total_count } => {
                body["unvalidated_count"] = json!(unvalidated_count);
                body["total_count"] = json!(total_count);
            },
            WorkflowError::Overpayment { amount, remaining } => {
                body["amount"] = json!(amount);
                body["remaining"] = json!(remaining);
            },
            WorkflowError::Store(err) => {
                error!(error = ?err, "store failure");
                body["message"] = json!("internal error");
            },
            _ => {},
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
