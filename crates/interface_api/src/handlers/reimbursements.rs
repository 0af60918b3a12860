//! Reimbursement handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::{AppointmentId, MonthPeriod, ReimbursementRequestId};
use domain_reimbursement::{coverage_guide, ReimbursementService, RequestPatch};

use crate::auth::AuthenticatedPatient;
use crate::dto::reimbursements::*;
use crate::{error::ApiError, AppState};

fn service(state: &AppState) -> ReimbursementService<infra_mem::InMemoryStore> {
    ReimbursementService::new(
        state.store.clone(),
        coverage_guide(),
        state.config.estimator_config(),
    )
}

fn period_filter(query: &EligibleSessionsQuery) -> Result<Option<MonthPeriod>, ApiError> {
    match (query.year, query.month) {
        (None, None) => Ok(None),
        (Some(year), Some(month)) => MonthPeriod::new(year, month)
            .map(Some)
            .map_err(|e| ApiError::Validation(e.to_string())),
        _ => Err(ApiError::Validation(
            "month and year must be provided together".to_string(),
        )),
    }
}

/// Lists the patient's claimable sessions, optionally for one month
pub async fn list_eligible_sessions(
    State(state): State<AppState>,
    AuthenticatedPatient(patient_id): AuthenticatedPatient,
    Query(query): Query<EligibleSessionsQuery>,
) -> Result<Json<EligibleSessionsResponse>, ApiError> {
    let period = period_filter(&query)?;
    let listing = service(&state)
        .list_eligible_sessions(patient_id, period)
        .await?;
    Ok(Json(listing.into()))
}

/// Creates a reimbursement request
pub async fn create_request(
    State(state): State<AppState>,
    AuthenticatedPatient(patient_id): AuthenticatedPatient,
    Json(request): Json<CreateReimbursementRequest>,
) -> Result<(StatusCode, Json<ReimbursementRequestResponse>), ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let appointment_ids: Vec<AppointmentId> = request
        .appointment_ids
        .iter()
        .map(|id| {
            id.parse()
                .map_err(|_| ApiError::Validation(format!("invalid appointment id: {id}")))
        })
        .collect::<Result<_, _>>()?;

    let created = service(&state)
        .create_request(
            patient_id,
            &appointment_ids,
            request.has_medical_referral,
            request.notes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Lists the patient's requests
pub async fn list_requests(
    State(state): State<AppState>,
    AuthenticatedPatient(patient_id): AuthenticatedPatient,
) -> Result<Json<Vec<ReimbursementRequestResponse>>, ApiError> {
    let requests = service(&state).list_requests(patient_id).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// Gets a request by ID
pub async fn get_request(
    State(state): State<AppState>,
    AuthenticatedPatient(patient_id): AuthenticatedPatient,
    Path(id): Path<String>,
) -> Result<Json<ReimbursementRequestResponse>, ApiError> {
    let request_id: ReimbursementRequestId = id
        .parse()
        .map_err(|_| ApiError::Validation(format!("invalid request id: {id}")))?;
    let request = service(&state).get_request(request_id, patient_id).await?;
    Ok(Json(request.into()))
}

/// Updates a request's status and/or tracking fields
pub async fn update_request(
    State(state): State<AppState>,
    AuthenticatedPatient(patient_id): AuthenticatedPatient,
    Path(id): Path<String>,
    Json(update): Json<UpdateReimbursementRequest>,
) -> Result<Json<ReimbursementRequestResponse>, ApiError> {
    update
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let request_id: ReimbursementRequestId = id
        .parse()
        .map_err(|_| ApiError::Validation(format!("invalid request id: {id}")))?;

    let reimbursed_amount = match update.reimbursed_amount {
        Some(pesos) if pesos < 0 => {
            return Err(ApiError::Validation(
                "reimbursed amount must not be negative".to_string(),
            ))
        }
        Some(pesos) => Some(core_kernel::Money::pesos(pesos)),
        None => None,
    };

    let patch = RequestPatch {
        status: update.status,
        tracking_number: update.tracking_number,
        notes: update.notes,
        reimbursed_amount,
    };

    let updated = service(&state)
        .update_request(request_id, patient_id, patch)
        .await?;
    Ok(Json(updated.into()))
}
