//! Reimbursement request aggregate
//!
//! A request bundles one or more claimed sessions for submission to the
//! patient's insurer. The total is fixed at creation from the linked
//! invoices and never recomputed; status moves through an explicit
//! transition table, and the submission/processing timestamps are stamped
//! exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coverage::Estimate;
use crate::error::ReimbursementError;
use core_kernel::{
    AppointmentId, CoverageProfile, Money, MonthPeriod, PatientId, ReimbursementRequestId,
};

/// Request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Assembled, not yet submitted to the insurer
    Draft,
    /// Submitted, awaiting the insurer's intake
    Pending,
    /// Under review by the insurer
    InReview,
    /// Approved, awaiting payout
    Approved,
    /// Rejected by the insurer
    Rejected,
    /// Reimbursement paid out
    Paid,
    /// Cancelled by the patient
    Cancelled,
}

impl RequestStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Paid | RequestStatus::Rejected | RequestStatus::Cancelled
        )
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        use RequestStatus::*;
        if *self == target {
            return true; // repeated updates to the same status are no-ops
        }
        matches!(
            (*self, target),
            (Draft, Pending)
                | (Pending, InReview)
                | (InReview, Approved)
                | (InReview, Rejected)
                | (Approved, Paid)
        ) || (!self.is_terminal() && target == Cancelled)
    }
}

/// Outcome of a status update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: RequestStatus,
    pub to: RequestStatus,
    /// True when the linked appointments must be released so the sessions
    /// become claimable again
    pub releases_appointments: bool,
}

/// Free-form updates applied alongside (or independently of) a status move
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestPatch {
    pub status: Option<RequestStatus>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub reimbursed_amount: Option<Money>,
}

/// A reimbursement claim for one or more completed sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReimbursementRequest {
    /// Unique identifier
    pub id: ReimbursementRequestId,
    /// Owning patient
    pub patient_id: PatientId,
    /// Claim period, derived from the earliest linked session
    pub period: MonthPeriod,
    /// Linked sessions
    pub appointment_ids: Vec<AppointmentId>,
    /// Sum of the linked invoices' gross amounts, fixed at creation
    pub total_amount: Money,
    /// Estimate computed at creation from the coverage snapshot
    pub estimated_reimbursement: Estimate,
    /// Patient coverage at creation time
    pub coverage: CoverageProfile,
    /// Status
    pub status: RequestStatus,
    pub has_medical_referral: bool,
    pub notes: Option<String>,
    /// Insurer-side tracking number, once assigned
    pub tracking_number: Option<String>,
    /// What the insurer actually reimbursed
    pub reimbursed_amount: Option<Money>,
    /// First transition to Pending
    pub submitted_at: Option<DateTime<Utc>>,
    /// First transition to Approved or Paid
    pub processed_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl ReimbursementRequest {
    /// Assembles a new draft request
    ///
    /// Eligibility of the appointments is the creation service's job; this
    /// constructor only records the already-validated data.
    #[allow(clippy::too_many_arguments)]
    pub fn draft(
        patient_id: PatientId,
        period: MonthPeriod,
        appointment_ids: Vec<AppointmentId>,
        total_amount: Money,
        estimated_reimbursement: Estimate,
        coverage: CoverageProfile,
        has_medical_referral: bool,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ReimbursementRequestId::new_v7(),
            patient_id,
            period,
            appointment_ids,
            total_amount,
            estimated_reimbursement,
            coverage,
            status: RequestStatus::Draft,
            has_medical_referral,
            notes,
            tracking_number: None,
            reimbursed_amount: None,
            submitted_at: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the request to a new status
    ///
    /// Stamps `submitted_at` on the first arrival at Pending and
    /// `processed_at` on the first arrival at Approved or Paid; repeated
    /// transitions to the same status leave the stamps untouched.
    pub fn update_status(
        &mut self,
        target: RequestStatus,
    ) -> Result<StatusChange, ReimbursementError> {
        if !self.status.can_transition_to(target) {
            return Err(ReimbursementError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", target),
            });
        }

        let from = self.status;
        let now = Utc::now();

        if target == RequestStatus::Pending && self.submitted_at.is_none() {
            self.submitted_at = Some(now);
        }
        if matches!(target, RequestStatus::Approved | RequestStatus::Paid)
            && self.processed_at.is_none()
        {
            self.processed_at = Some(now);
        }

        self.status = target;
        self.updated_at = now;

        Ok(StatusChange {
            from,
            to: target,
            releases_appointments: from != target
                && matches!(target, RequestStatus::Rejected | RequestStatus::Cancelled),
        })
    }

    /// Applies the free-form parts of a patch (status is handled by
    /// `update_status`)
    pub fn apply_patch_fields(&mut self, patch: &RequestPatch) {
        if let Some(tracking) = &patch.tracking_number {
            self.tracking_number = Some(tracking.clone());
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(amount) = patch.reimbursed_amount {
            self.reimbursed_amount = Some(amount);
        }
        self.updated_at = Utc::now();
    }
}
