//! Reimbursement Domain
//!
//! This crate implements the reimbursement side of the marketplace: which
//! completed sessions a patient can claim from their Isapre or Fonasa, how
//! much they can expect back, and the lifecycle of a claim request.
//!
//! # Request Lifecycle
//!
//! ```text
//! Draft -> Pending -> InReview -> Approved -> Paid
//!                         |
//!                         +-> Rejected
//! Cancelled reachable from any non-terminal state
//! ```
//!
//! Rejection and cancellation release the linked appointments, so the
//! sessions become claimable again on a fresh request.

pub mod coverage;
pub mod eligibility;
pub mod error;
pub mod ports;
pub mod request;
pub mod service;

pub use coverage::{
    coverage_guide, CoverageGuide, Estimate, EstimateBasis, EstimatorConfig, FonasaEstimateMode,
    InsurerGuideEntry,
};
pub use eligibility::{
    check_eligibility, list_eligible, EligibleSession, EligibleSessions, IneligibilityReason,
    SessionRecord,
};
pub use error::{AppointmentEligibility, ReimbursementError};
pub use ports::ReimbursementStore;
pub use request::{ReimbursementRequest, RequestPatch, RequestStatus};
pub use service::ReimbursementService;
