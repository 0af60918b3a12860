//! Request/response data transfer objects

pub mod coverage;
pub mod payments;
pub mod reimbursements;
pub mod reports;
