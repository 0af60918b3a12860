//! Reimbursement domain errors

use thiserror::Error;

use crate::eligibility::IneligibilityReason;
use core_kernel::{AppointmentId, PortError};

/// An appointment that failed the eligibility check, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentEligibility {
    pub appointment_id: AppointmentId,
    pub reason: IneligibilityReason,
}

/// Errors raised by reimbursement operations
#[derive(Debug, Error)]
pub enum ReimbursementError {
    /// Malformed input, surfaced with a field-level reason
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more appointments failed the eligibility filter; the whole
    /// create operation is rejected
    #[error("{} appointment(s) not eligible for reimbursement", .0.len())]
    Eligibility(Vec<AppointmentEligibility>),

    /// Illegal lifecycle move
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Caller does not own the resource; deliberately generic
    #[error("Not authorized")]
    NotAuthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Idempotency violation, retryable
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Port(PortError),
}

impl From<PortError> for ReimbursementError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ReimbursementError::NotFound(format!("{entity_type} {id}"))
            }
            PortError::Conflict { message } => ReimbursementError::Conflict(message),
            PortError::Unauthorized { .. } => ReimbursementError::NotAuthorized,
            PortError::Validation { message, .. } => ReimbursementError::Validation(message),
            other => ReimbursementError::Port(other),
        }
    }
}
