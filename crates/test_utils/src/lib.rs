//! Shared test utilities
//!
//! Builders assemble consistent appointment/payment/invoice triples with
//! sensible defaults, fixtures hold the constants tests reach for, and
//! generators provide proptest strategies for domain values.

pub mod builders;
pub mod fixtures;
pub mod generators;

pub use builders::CompletedSessionBuilder;
pub use fixtures::{IdFixtures, MoneyFixtures, TemporalFixtures};
