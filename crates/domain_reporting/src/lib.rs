//! Reporting Domain
//!
//! This crate builds a professional's monthly financial report: session
//! counts and attendance, gross partitioned by the patients' health
//! systems, SII retention and platform commission, productivity figures,
//! and the boletas issued for sessions that lacked one.
//!
//! Generation is idempotent per (professional, year, month): the first
//! call computes and persists the snapshot, later calls return it
//! unchanged.

pub mod aggregator;
pub mod error;
pub mod export;
pub mod ports;
pub mod report;

pub use aggregator::{summarize, ActivityRecord, ReportingService};
pub use error::ReportingError;
pub use export::{render_csv, ReportRenderer};
pub use ports::ReportingStore;
pub use report::{HealthSystemBreakdown, MonthlyReport};
