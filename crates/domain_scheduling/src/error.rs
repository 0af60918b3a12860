//! Scheduling domain errors

use thiserror::Error;

/// Errors raised by the appointment aggregate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Appointment is already linked to reimbursement request {request_id}")]
    AlreadyLinked { request_id: String },

    #[error("Appointment is not linked to reimbursement request {request_id}")]
    NotLinked { request_id: String },

    #[error("Only completed appointments can be linked to a reimbursement request")]
    LinkRequiresCompleted,

    #[error("Invalid session duration: {minutes} minutes")]
    InvalidDuration { minutes: u32 },
}
