//! Billing domain errors

use thiserror::Error;

/// Errors raised by billing operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    #[error("Invalid gross amount: {0}")]
    InvalidGrossAmount(String),

    #[error("No rate schedule effective on {date}")]
    NoEffectiveSchedule { date: String },

    #[error("Invalid payment status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invoice {invoice_id} cannot be modified in status {status}")]
    InvoiceNotModifiable { invoice_id: String, status: String },
}
