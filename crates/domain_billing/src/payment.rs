//! Session payments
//!
//! One payment per appointment. Commission is computed exactly once, when
//! the payment is created, from the professional's tier and the rate
//! schedule effective on that date; it is never recomputed, so reports
//! built months later reproduce the historical value even if the
//! professional has since changed tier.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use crate::ports::BillingStore;
use crate::tariff::{compute_split, RateBook, SubscriptionTier};
use core_kernel::{AppointmentId, Money, PaymentId, PortError};

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Awaiting gateway confirmation
    Pending,
    /// Gateway confirmed the charge
    Completed,
    /// Gateway rejected or the order expired
    Failed,
    /// Charge was returned to the payer
    Refunded,
}

/// A payment for a single session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// The appointment this payment covers (one-to-one)
    pub appointment_id: AppointmentId,
    /// Gross session price
    pub amount: Money,
    /// Platform commission, fixed at creation
    pub commission: Money,
    /// amount - commission
    pub net_amount: Money,
    /// Status
    pub status: PaymentStatus,
    /// Gateway order token
    pub gateway_token: Option<String>,
    /// When the gateway confirmed the charge
    pub paid_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a pending payment, computing the commission split once
    pub fn create(
        appointment_id: AppointmentId,
        gross: Money,
        tier: SubscriptionTier,
        date: NaiveDate,
        rates: &RateBook,
    ) -> Result<Self, BillingError> {
        let split = compute_split(gross, tier, date, rates)?;
        let now = Utc::now();

        Ok(Self {
            id: PaymentId::new_v7(),
            appointment_id,
            amount: split.gross,
            commission: split.commission,
            net_amount: split.net,
            status: PaymentStatus::Pending,
            gateway_token: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Attaches the gateway order token after order creation
    pub fn with_gateway_token(mut self, token: impl Into<String>) -> Self {
        self.gateway_token = Some(token.into());
        self
    }

    /// Confirms the payment
    ///
    /// Idempotent: confirming an already-completed payment is a no-op and
    /// returns `false`, so a webhook delivered twice never double-credits.
    pub fn confirm(&mut self, paid_at: DateTime<Utc>) -> Result<bool, BillingError> {
        match self.status {
            PaymentStatus::Completed => Ok(false),
            PaymentStatus::Pending => {
                self.status = PaymentStatus::Completed;
                self.paid_at = Some(paid_at);
                self.updated_at = Utc::now();
                Ok(true)
            }
            _ => Err(BillingError::InvalidStatusTransition {
                from: format!("{:?}", self.status),
                to: "Completed".to_string(),
            }),
        }
    }

    /// Marks the payment as failed
    pub fn fail(&mut self) -> Result<(), BillingError> {
        if self.status != PaymentStatus::Pending {
            return Err(BillingError::InvalidStatusTransition {
                from: format!("{:?}", self.status),
                to: "Failed".to_string(),
            });
        }
        self.status = PaymentStatus::Failed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Refunds a completed payment
    pub fn refund(&mut self) -> Result<(), BillingError> {
        if self.status != PaymentStatus::Completed {
            return Err(BillingError::InvalidStatusTransition {
                from: format!("{:?}", self.status),
                to: "Refunded".to_string(),
            });
        }
        self.status = PaymentStatus::Refunded;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

/// Webhook-driven payment confirmation
///
/// Consumes authenticated gateway callbacks: loads the payment by token,
/// confirms it, and on first confirmation promotes the appointment to
/// Confirmed. Replayed webhooks are absorbed as no-ops.
pub struct PaymentConfirmation<S> {
    store: S,
}

impl<S: BillingStore> PaymentConfirmation<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Processes a gateway confirmation callback for the given token
    ///
    /// Returns the payment after confirmation. A second delivery for an
    /// already-completed payment returns the unchanged payment.
    pub async fn confirm_by_token(&self, token: &str) -> Result<Payment, PortError> {
        let mut payment = self
            .store
            .find_payment_by_token(token)
            .await?
            .ok_or_else(|| PortError::not_found("Payment", token))?;

        let newly_confirmed = payment
            .confirm(Utc::now())
            .map_err(|e| PortError::validation(e.to_string()))?;

        if newly_confirmed {
            self.store.save_payment(&payment).await?;
            self.store
                .mark_appointment_confirmed(payment.appointment_id)
                .await?;
            tracing::info!(
                payment_id = %payment.id,
                appointment_id = %payment.appointment_id,
                "payment confirmed"
            );
        } else {
            tracing::debug!(payment_id = %payment.id, "duplicate webhook ignored");
        }

        Ok(payment)
    }
}
