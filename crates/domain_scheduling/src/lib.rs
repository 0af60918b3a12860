//! Scheduling Domain
//!
//! This crate implements the appointment lifecycle from booking through
//! completion or cancellation.
//!
//! # Appointment Lifecycle
//!
//! ```text
//! Pending -> Confirmed -> Completed
//!    |           |
//!    +-----------+--> Cancelled (with audit fields)
//! ```
//!
//! Confirmation happens when the session payment completes; completion is
//! recorded after the session takes place. A completed appointment may be
//! linked to at most one reimbursement request at a time.

pub mod appointment;
pub mod error;

pub use appointment::{Appointment, AppointmentStatus, CancelledBy, Modality};
pub use error::SchedulingError;
