//! Caller identity
//!
//! Authentication lives in the upstream proxy; by the time a request
//! reaches this service the caller has been verified and their identity
//! travels in trusted headers. These extractors read those headers and
//! reject requests that arrive without one.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use core_kernel::{PatientId, ProfessionalId};

pub const PATIENT_HEADER: &str = "x-patient-id";
pub const PROFESSIONAL_HEADER: &str = "x-professional-id";

/// The authenticated patient making the request
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedPatient(pub PatientId);

/// The authenticated professional making the request
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedProfessional(pub ProfessionalId);

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedPatient {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = header_value(parts, PATIENT_HEADER)?;
        let id: PatientId = value.parse().map_err(|_| ApiError::Unauthorized)?;
        Ok(AuthenticatedPatient(id))
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedProfessional {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = header_value(parts, PROFESSIONAL_HEADER)?;
        let id: ProfessionalId = value.parse().map_err(|_| ApiError::Unauthorized)?;
        Ok(AuthenticatedProfessional(id))
    }
}
