//! Reimbursement application service
//!
//! Orchestrates the pure pieces (eligibility filter, estimator, request
//! aggregate) over the storage port. Creation validates every appointment
//! atomically: either all pass eligibility and the store links them in one
//! transaction, or the whole request is rejected with a per-appointment
//! reason list.

use std::collections::HashMap;

use crate::coverage::{estimate_reimbursement, CoverageGuide, EstimatorConfig};
use crate::eligibility::{
    check_eligibility, list_eligible, EligibleSessions, IneligibilityReason, SessionRecord,
};
use crate::error::{AppointmentEligibility, ReimbursementError};
use crate::ports::ReimbursementStore;
use crate::request::{ReimbursementRequest, RequestPatch};
use core_kernel::{AppointmentId, MonthPeriod, PatientId, ReimbursementRequestId, Timezone};

/// Reimbursement use cases exposed to the API layer
pub struct ReimbursementService<S> {
    store: S,
    guide: &'static CoverageGuide,
    estimator_config: EstimatorConfig,
    tz: Timezone,
}

impl<S: ReimbursementStore> ReimbursementService<S> {
    pub fn new(store: S, guide: &'static CoverageGuide, estimator_config: EstimatorConfig) -> Self {
        Self {
            store,
            guide,
            estimator_config,
            tz: Timezone::santiago(),
        }
    }

    /// Lists the patient's claimable sessions, optionally for one month
    pub async fn list_eligible_sessions(
        &self,
        patient_id: PatientId,
        period: Option<MonthPeriod>,
    ) -> Result<EligibleSessions, ReimbursementError> {
        let records = self.store.load_sessions(patient_id).await?;
        Ok(list_eligible(&records, period, self.tz))
    }

    /// Creates a reimbursement request over the given appointments
    ///
    /// Validates eligibility of every appointment as of now and rejects
    /// the whole request if any fails; on success the store links the
    /// appointments and inserts the request atomically.
    pub async fn create_request(
        &self,
        patient_id: PatientId,
        appointment_ids: &[AppointmentId],
        has_medical_referral: bool,
        notes: Option<String>,
    ) -> Result<ReimbursementRequest, ReimbursementError> {
        if appointment_ids.is_empty() {
            return Err(ReimbursementError::Validation(
                "appointment list must not be empty".to_string(),
            ));
        }

        let records = self.store.load_sessions(patient_id).await?;
        let by_id: HashMap<AppointmentId, &SessionRecord> = records
            .iter()
            .map(|r| (r.appointment.id, r))
            .collect();

        let mut failures = Vec::new();
        let mut claimed = Vec::new();
        for &id in appointment_ids {
            match by_id.get(&id) {
                None => failures.push(AppointmentEligibility {
                    appointment_id: id,
                    reason: IneligibilityReason::UnknownAppointment,
                }),
                Some(record) => match check_eligibility(record) {
                    Ok(()) => claimed.push(*record),
                    Err(reason) => failures.push(AppointmentEligibility {
                        appointment_id: id,
                        reason,
                    }),
                },
            }
        }
        if !failures.is_empty() {
            return Err(ReimbursementError::Eligibility(failures));
        }

        // Both unwraps guarded by check_eligibility above
        let total_amount = claimed
            .iter()
            .map(|r| r.invoice.as_ref().expect("eligibility checked").gross_amount)
            .fold(core_kernel::Money::pesos(0), |acc, gross| acc + gross);

        let earliest = claimed
            .iter()
            .map(|r| r.appointment.scheduled_at)
            .min()
            .expect("at least one appointment");
        let period = MonthPeriod::containing(earliest, self.tz);

        let coverage = self.store.patient_coverage(patient_id).await?;
        let estimate =
            estimate_reimbursement(total_amount, &coverage, self.guide, &self.estimator_config)?;

        let request = ReimbursementRequest::draft(
            patient_id,
            period,
            appointment_ids.to_vec(),
            total_amount,
            estimate,
            coverage,
            has_medical_referral,
            notes,
        );

        self.store.create_request(&request).await?;
        tracing::info!(
            request_id = %request.id,
            patient_id = %patient_id,
            appointments = request.appointment_ids.len(),
            total = %request.total_amount,
            "reimbursement request created"
        );
        Ok(request)
    }

    /// Loads a request, enforcing ownership
    pub async fn get_request(
        &self,
        request_id: ReimbursementRequestId,
        patient_id: PatientId,
    ) -> Result<ReimbursementRequest, ReimbursementError> {
        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or_else(|| ReimbursementError::NotFound(format!("request {request_id}")))?;

        if request.patient_id != patient_id {
            // Uniform response; never confirm the request exists
            return Err(ReimbursementError::NotAuthorized);
        }
        Ok(request)
    }

    /// Lists the patient's requests
    pub async fn list_requests(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ReimbursementRequest>, ReimbursementError> {
        Ok(self.store.list_requests(patient_id).await?)
    }

    /// Applies a patch (status and/or free-form fields) to a request
    ///
    /// Transitions to Rejected or Cancelled release the linked
    /// appointments so the sessions become claimable again.
    pub async fn update_request(
        &self,
        request_id: ReimbursementRequestId,
        patient_id: PatientId,
        patch: RequestPatch,
    ) -> Result<ReimbursementRequest, ReimbursementError> {
        let mut request = self.get_request(request_id, patient_id).await?;

        let change = match patch.status {
            Some(target) => Some(request.update_status(target)?),
            None => None,
        };
        request.apply_patch_fields(&patch);

        self.store.update_request(&request).await?;

        if change.is_some_and(|c| c.releases_appointments) {
            self.store.release_appointments(request.id).await?;
            tracing::info!(
                request_id = %request.id,
                status = ?request.status,
                "appointments released from terminal request"
            );
        }

        Ok(request)
    }
}
