//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_reimbursement::{AppointmentEligibility, ReimbursementError};
use domain_reporting::ReportingError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// Ownership failures are uniform: never confirm the resource exists
    #[error("Not authorized")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more appointments failed the eligibility filter
    #[error("Appointments not eligible for reimbursement")]
    Eligibility(Vec<AppointmentEligibility>),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<EligibilityDetail>>,
}

/// Per-appointment reason in an eligibility failure
#[derive(Debug, Serialize)]
pub struct EligibilityDetail {
    pub appointment_id: String,
    pub reason: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Not authorized".to_string(),
                None,
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
                None,
            ),
            ApiError::Eligibility(failures) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "not_eligible",
                format!("{} appointment(s) not eligible", failures.len()),
                Some(
                    failures
                        .iter()
                        .map(|f| EligibilityDetail {
                            appointment_id: f.appointment_id.to_string(),
                            reason: f.reason.message(),
                        })
                        .collect(),
                ),
            ),
            ApiError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    msg.clone(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ReimbursementError> for ApiError {
    fn from(err: ReimbursementError) -> Self {
        match err {
            ReimbursementError::Validation(msg) => ApiError::Validation(msg),
            ReimbursementError::Eligibility(failures) => ApiError::Eligibility(failures),
            ReimbursementError::InvalidTransition { from, to } => {
                ApiError::Conflict(format!("invalid status transition from {from} to {to}"))
            }
            ReimbursementError::NotAuthorized => ApiError::Forbidden,
            ReimbursementError::NotFound(msg) => ApiError::NotFound(msg),
            ReimbursementError::Conflict(msg) => ApiError::Conflict(msg),
            ReimbursementError::Port(err) => err.into(),
        }
    }
}

impl From<ReportingError> for ApiError {
    fn from(err: ReportingError) -> Self {
        match err {
            ReportingError::Validation(msg) => ApiError::Validation(msg),
            ReportingError::NotFound(msg) => ApiError::NotFound(msg),
            ReportingError::Conflict(msg) => ApiError::Conflict(msg),
            ReportingError::Billing(err) => ApiError::Internal(err.to_string()),
            ReportingError::Port(err) => err.into(),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id}"))
            }
            PortError::Validation { message, .. } => ApiError::Validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Unauthorized { .. } => ApiError::Forbidden,
            PortError::Connection { message, .. } => ApiError::Unavailable(message),
            PortError::ServiceUnavailable { service } => ApiError::Unavailable(service),
            PortError::Internal { message, .. } => ApiError::Internal(message),
        }
    }
}
