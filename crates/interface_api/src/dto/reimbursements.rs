//! Reimbursement DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::HealthSystem;
use domain_reimbursement::{
    EligibleSession, EligibleSessions, Estimate, EstimateBasis, ReimbursementRequest,
    RequestStatus,
};
use domain_scheduling::Modality;

#[derive(Debug, Deserialize)]
pub struct EligibleSessionsQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReimbursementRequest {
    /// Prefixed ("APT-...") or bare UUID strings
    #[validate(length(min = 1, message = "at least one appointment id is required"))]
    pub appointment_ids: Vec<String>,
    #[serde(default)]
    pub has_medical_referral: bool,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReimbursementRequest {
    pub status: Option<RequestStatus>,
    #[validate(length(max = 100))]
    pub tracking_number: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Whole pesos actually reimbursed by the insurer
    pub reimbursed_amount: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PeriodResponse {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub amount: Decimal,
    pub basis: EstimateBasis,
}

impl From<Estimate> for EstimateResponse {
    fn from(estimate: Estimate) -> Self {
        Self {
            amount: estimate.amount.amount(),
            basis: estimate.basis,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EligibleSessionResponse {
    pub appointment_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub professional_id: String,
    pub professional_name: String,
    pub duration_minutes: u32,
    pub modality: Modality,
    pub invoice_number: String,
    pub invoice_gross: Decimal,
    pub invoice_sii_retention: Decimal,
    pub invoice_net: Decimal,
    pub invoice_issue_date: NaiveDate,
    pub payment_amount: Decimal,
}

impl From<EligibleSession> for EligibleSessionResponse {
    fn from(session: EligibleSession) -> Self {
        Self {
            appointment_id: session.appointment_id.to_string(),
            scheduled_at: session.scheduled_at,
            professional_id: session.professional_id.to_string(),
            professional_name: session.professional_name,
            duration_minutes: session.duration_minutes,
            modality: session.modality,
            invoice_number: session.invoice_number,
            invoice_gross: session.invoice_gross.amount(),
            invoice_sii_retention: session.invoice_sii_retention.amount(),
            invoice_net: session.invoice_net.amount(),
            invoice_issue_date: session.invoice_issue_date,
            payment_amount: session.payment_amount.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EligibleSessionsResponse {
    pub sessions: Vec<EligibleSessionResponse>,
    pub total_count: usize,
    pub total_amount: Decimal,
    pub currency: String,
}

impl From<EligibleSessions> for EligibleSessionsResponse {
    fn from(listing: EligibleSessions) -> Self {
        Self {
            total_count: listing.total_count,
            total_amount: listing.total_amount.amount(),
            currency: listing.total_amount.currency().code().to_string(),
            sessions: listing.sessions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReimbursementRequestResponse {
    pub id: String,
    pub status: RequestStatus,
    pub period: PeriodResponse,
    pub appointment_ids: Vec<String>,
    pub total_amount: Decimal,
    pub currency: String,
    pub estimated_reimbursement: EstimateResponse,
    pub health_system: HealthSystem,
    pub has_medical_referral: bool,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub reimbursed_amount: Option<Decimal>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ReimbursementRequest> for ReimbursementRequestResponse {
    fn from(request: ReimbursementRequest) -> Self {
        Self {
            id: request.id.to_string(),
            status: request.status,
            period: PeriodResponse {
                year: request.period.year,
                month: request.period.month,
            },
            appointment_ids: request
                .appointment_ids
                .iter()
                .map(|id| id.to_string())
                .collect(),
            total_amount: request.total_amount.amount(),
            currency: request.total_amount.currency().code().to_string(),
            estimated_reimbursement: request.estimated_reimbursement.into(),
            health_system: request.coverage.health_system,
            has_medical_referral: request.has_medical_referral,
            notes: request.notes,
            tracking_number: request.tracking_number,
            reimbursed_amount: request.reimbursed_amount.map(|m| m.amount()),
            submitted_at: request.submitted_at,
            processed_at: request.processed_at,
            created_at: request.created_at,
        }
    }
}
