//! Core Kernel - Foundational types for the PsyConnect marketplace
//!
//! This crate provides the fundamental building blocks used across all
//! domain modules:
//! - Money types with precise decimal arithmetic (CLP-centric)
//! - Calendar-month periods in Chilean local time
//! - Strongly-typed identifiers
//! - Port abstractions shared by all storage and gateway adapters

pub mod health;
pub mod identifiers;
pub mod money;
pub mod ports;
pub mod temporal;

pub use health::{CoverageProfile, FonasaTramo, HealthSystem};
pub use identifiers::{
    AppointmentId, InsurerId, InvoiceId, MonthlyReportId, PatientId, PaymentId, ProfessionalId,
    ReimbursementRequestId,
};
pub use money::{Currency, Money, MoneyError, Rate};
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
pub use temporal::{MonthPeriod, TemporalError, Timezone};
