//! Reporting domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError, TemporalError};
use domain_billing::BillingError;

/// Errors raised by reporting operations
#[derive(Debug, Error)]
pub enum ReportingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A concurrent generation won the natural-key race; retryable
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Port(PortError),
}

impl From<TemporalError> for ReportingError {
    fn from(err: TemporalError) -> Self {
        ReportingError::Validation(err.to_string())
    }
}

impl From<MoneyError> for ReportingError {
    fn from(err: MoneyError) -> Self {
        ReportingError::Validation(err.to_string())
    }
}

impl From<PortError> for ReportingError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ReportingError::NotFound(format!("{entity_type} {id}"))
            }
            PortError::Conflict { message } => ReportingError::Conflict(message),
            PortError::Validation { message, .. } => ReportingError::Validation(message),
            other => ReportingError::Port(other),
        }
    }
}
