//! Billing Domain
//!
//! This crate implements the money side of a therapy session:
//!
//! - **Tariff**: subscription tiers and effective-dated rate schedules for
//!   platform commission and SII tax retention
//! - **Split calculator**: gross -> commission/net at payment level and
//!   gross -> retention/net at invoice level
//! - **Payment**: the gateway-backed payment aggregate with idempotent
//!   webhook confirmation
//! - **Invoice**: the boleta de honorarios, numbered per professional and
//!   calendar month
//!
//! # Two nets, never conflated
//!
//! The payment net (gross minus platform commission) is what the gateway
//! settles to the professional's balance. The invoice net (gross minus
//! 15.25% SII retention) is what the tax receipt reports. They are separate
//! types so call sites cannot mix them up.

pub mod error;
pub mod invoice;
pub mod payment;
pub mod ports;
pub mod tariff;

pub use error::BillingError;
pub use invoice::{Invoice, InvoiceSequence, InvoiceStatus};
pub use payment::{Payment, PaymentConfirmation, PaymentStatus};
pub use ports::{
    BillingStore, GatewayOrder, GatewayStatus, OrderRequest, PaymentGateway,
};
pub use tariff::{
    compute_invoice_split, compute_split, InvoiceSplit, PaymentSplit, RateBook, RateSchedule,
    SubscriptionTier,
};
