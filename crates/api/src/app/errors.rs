use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use navguard_auth::{AuthzError, CascadeError};
use navguard_core::DomainError;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Authz(e) => authz_error_to_response(e),
        ServiceError::Cascade(CascadeError::NodeNotFound(url)) => json_error(
            StatusCode::NOT_FOUND,
            "unknown_node",
            format!("unknown navigation node '{url}'"),
        ),
        ServiceError::Navigation(e) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_navigation", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
        DomainError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::Unauthorized(_) => json_error(StatusCode::FORBIDDEN, "unauthorized", message),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
