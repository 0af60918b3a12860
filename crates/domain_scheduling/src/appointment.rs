//! Appointment aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;
use core_kernel::{AppointmentId, PatientId, ProfessionalId, ReimbursementRequestId};

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    /// Booked, awaiting payment
    Pending,
    /// Payment completed, session scheduled
    Confirmed,
    /// Session took place
    Completed,
    /// Cancelled before completion
    Cancelled,
}

/// Session modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    Online,
    InPerson,
}

/// Who initiated a cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelledBy {
    Patient,
    Professional,
    Platform,
}

/// A booked therapy session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique identifier
    pub id: AppointmentId,
    /// Patient who booked the session
    pub patient_id: PatientId,
    /// Professional delivering the session
    pub professional_id: ProfessionalId,
    /// Scheduled start time
    pub scheduled_at: DateTime<Utc>,
    /// Session duration in minutes
    pub duration_minutes: u32,
    /// Modality
    pub modality: Modality,
    /// Status
    pub status: AppointmentStatus,
    /// Active reimbursement request, at most one at a time
    pub reimbursement_request_id: Option<ReimbursementRequestId>,
    /// Cancellation audit fields
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<CancelledBy>,
    pub cancellation_reason: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Books a new appointment in Pending status
    pub fn book(
        patient_id: PatientId,
        professional_id: ProfessionalId,
        scheduled_at: DateTime<Utc>,
        duration_minutes: u32,
        modality: Modality,
    ) -> Result<Self, SchedulingError> {
        if duration_minutes == 0 || duration_minutes > 240 {
            return Err(SchedulingError::InvalidDuration {
                minutes: duration_minutes,
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: AppointmentId::new_v7(),
            patient_id,
            professional_id,
            scheduled_at,
            duration_minutes,
            modality,
            status: AppointmentStatus::Pending,
            reimbursement_request_id: None,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Confirms the appointment once its payment has completed
    pub fn confirm(&mut self) -> Result<(), SchedulingError> {
        self.transition_to(AppointmentStatus::Confirmed)
    }

    /// Marks the session as having taken place
    pub fn complete(&mut self) -> Result<(), SchedulingError> {
        self.transition_to(AppointmentStatus::Completed)
    }

    /// Cancels the appointment, recording who cancelled and why
    pub fn cancel(
        &mut self,
        by: CancelledBy,
        reason: impl Into<String>,
    ) -> Result<(), SchedulingError> {
        self.transition_to(AppointmentStatus::Cancelled)?;
        self.cancelled_at = Some(Utc::now());
        self.cancelled_by = Some(by);
        self.cancellation_reason = Some(reason.into());
        Ok(())
    }

    /// Links this appointment to a reimbursement request
    ///
    /// Only valid while Completed and not already linked. Payment and
    /// invoice preconditions are checked by the eligibility filter before
    /// this is called.
    pub fn link_reimbursement(
        &mut self,
        request_id: ReimbursementRequestId,
    ) -> Result<(), SchedulingError> {
        if self.status != AppointmentStatus::Completed {
            return Err(SchedulingError::LinkRequiresCompleted);
        }
        if let Some(existing) = self.reimbursement_request_id {
            return Err(SchedulingError::AlreadyLinked {
                request_id: existing.to_string(),
            });
        }
        self.reimbursement_request_id = Some(request_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Releases the link to a reimbursement request
    ///
    /// Used when a request is rejected or cancelled so the session becomes
    /// eligible for a new request.
    pub fn unlink_reimbursement(
        &mut self,
        request_id: ReimbursementRequestId,
    ) -> Result<(), SchedulingError> {
        if self.reimbursement_request_id != Some(request_id) {
            return Err(SchedulingError::NotLinked {
                request_id: request_id.to_string(),
            });
        }
        self.reimbursement_request_id = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Session duration expressed in hours
    pub fn duration_hours(&self) -> f64 {
        f64::from(self.duration_minutes) / 60.0
    }

    fn transition_to(&mut self, target: AppointmentStatus) -> Result<(), SchedulingError> {
        if !self.can_transition_to(target) {
            return Err(SchedulingError::InvalidStatusTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", target),
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self.status, target),
            (Pending, Confirmed)
                | (Confirmed, Completed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }
}
