//! Payment webhook handler

use axum::{extract::State, Json};
use validator::Validate;

use domain_billing::PaymentConfirmation;

use crate::dto::payments::{WebhookRequest, WebhookResponse};
use crate::{error::ApiError, AppState};

/// Gateway payment confirmation callback
///
/// Idempotent: replays of an already-confirmed token return the stored
/// payment unchanged.
pub async fn webhook(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let payment = PaymentConfirmation::new(state.store.clone())
        .confirm_by_token(&request.token)
        .await?;
    Ok(Json(payment.into()))
}
