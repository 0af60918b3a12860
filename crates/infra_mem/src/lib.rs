//! In-memory infrastructure adapters
//!
//! `InMemoryStore` implements the reimbursement, reporting, and billing
//! store ports over a single `tokio::sync::RwLock`, which gives each port
//! method transactional semantics: appointment claiming and report
//! persistence are all-or-nothing, and concurrent writers serialise so a
//! natural-key race has exactly one winner.
//!
//! `InMemoryGateway` is the matching payment-gateway stand-in.
//!
//! These adapters back the API server in development and the integration
//! test suites; a persistent backend would implement the same ports.

pub mod gateway;
pub mod store;

pub use gateway::InMemoryGateway;
pub use store::InMemoryStore;
