//! Request handlers

pub mod coverage;
pub mod health;
pub mod payments;
pub mod reimbursements;
pub mod reports;
