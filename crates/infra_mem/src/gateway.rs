//! In-memory payment gateway
//!
//! Stands in for the Flow.cl gateway: order creation hands out an opaque
//! token, and the status can be flipped from tests or demos to drive the
//! webhook path.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use core_kernel::{DomainPort, PortError};
use domain_billing::{GatewayOrder, GatewayStatus, OrderRequest, PaymentGateway};

#[derive(Clone, Default)]
pub struct InMemoryGateway {
    orders: Arc<RwLock<HashMap<String, GatewayStatus>>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the payer completing the charge
    pub async fn settle_order(&self, token: &str) -> Result<(), PortError> {
        let mut orders = self.orders.write().await;
        let status = orders
            .get_mut(token)
            .ok_or_else(|| PortError::not_found("GatewayOrder", token))?;
        *status = GatewayStatus::Paid;
        Ok(())
    }
}

impl DomainPort for InMemoryGateway {}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder, PortError> {
        if !request.amount.is_positive() {
            return Err(PortError::validation("order amount must be positive"));
        }
        let token = format!("tok_{}", Uuid::new_v4().simple());
        self.orders
            .write()
            .await
            .insert(token.clone(), GatewayStatus::Pending);
        Ok(GatewayOrder {
            redirect_url: format!("https://gateway.example/pay/{token}"),
            token,
        })
    }

    async fn get_status(&self, token: &str) -> Result<GatewayStatus, PortError> {
        let orders = self.orders.read().await;
        orders
            .get(token)
            .copied()
            .ok_or_else(|| PortError::not_found("GatewayOrder", token))
    }
}
