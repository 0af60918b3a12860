//! Payment webhook DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_billing::{Payment, PaymentStatus};

/// Gateway confirmation callback body; signature validation happened in
/// the upstream proxy
#[derive(Debug, Deserialize, Validate)]
pub struct WebhookRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub payment_id: String,
    pub appointment_id: String,
    pub status: PaymentStatus,
}

impl From<Payment> for WebhookResponse {
    fn from(payment: Payment) -> Self {
        Self {
            payment_id: payment.id.to_string(),
            appointment_id: payment.appointment_id.to_string(),
            status: payment.status,
        }
    }
}
