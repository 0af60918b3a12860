//! Billing ports
//!
//! The payment gateway (Flow.cl) and the billing store are external
//! collaborators behind these traits. Webhook signature validation happens
//! upstream of this crate; by the time `BillingStore` is consulted the
//! callback is authenticated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::payment::Payment;
use core_kernel::{AppointmentId, DomainPort, Money, PortError};

/// Outbound order creation request for the payment gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub amount: Money,
    pub description: String,
    pub payer_email: String,
    pub confirmation_url: String,
    pub return_url: String,
}

/// The gateway's response to order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Opaque token identifying the order at the gateway
    pub token: String,
    /// URL the payer is redirected to
    pub redirect_url: String,
}

/// Gateway-reported payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayStatus {
    Pending,
    Paid,
    Rejected,
    Voided,
}

/// Outbound interface to the payment gateway
#[async_trait]
pub trait PaymentGateway: DomainPort {
    /// Creates a payment order and returns the redirect token
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder, PortError>;

    /// Queries the current status of an order
    async fn get_status(&self, token: &str) -> Result<GatewayStatus, PortError>;
}

/// Storage interface for payments
#[async_trait]
pub trait BillingStore: DomainPort {
    /// Loads the payment identified by a gateway token
    async fn find_payment_by_token(&self, token: &str) -> Result<Option<Payment>, PortError>;

    /// Persists a payment
    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError>;

    /// Marks the paid appointment as confirmed
    async fn mark_appointment_confirmed(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<(), PortError>;
}
