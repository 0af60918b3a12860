//! Reimbursement storage port

use async_trait::async_trait;

use crate::eligibility::SessionRecord;
use crate::request::ReimbursementRequest;
use core_kernel::{CoverageProfile, DomainPort, PatientId, PortError, ReimbursementRequestId};

/// Storage interface for the reimbursement domain
///
/// `create_request` is the atomicity boundary: claiming the appointments
/// and inserting the request happen as one multi-row update. Two requests
/// racing for the same appointment produce exactly one winner; the loser
/// gets a `Conflict`.
#[async_trait]
pub trait ReimbursementStore: DomainPort {
    /// Loads all of a patient's sessions with their payment and invoice
    async fn load_sessions(&self, patient_id: PatientId) -> Result<Vec<SessionRecord>, PortError>;

    /// Current coverage profile for the patient
    async fn patient_coverage(&self, patient_id: PatientId) -> Result<CoverageProfile, PortError>;

    /// Atomically claims the request's appointments and inserts the request
    ///
    /// All-or-nothing: if any appointment is already claimed (or no longer
    /// eligible), nothing is linked and nothing is inserted.
    async fn create_request(&self, request: &ReimbursementRequest) -> Result<(), PortError>;

    /// Loads a request by id
    async fn get_request(
        &self,
        id: ReimbursementRequestId,
    ) -> Result<Option<ReimbursementRequest>, PortError>;

    /// Lists a patient's requests, newest first
    async fn list_requests(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ReimbursementRequest>, PortError>;

    /// Persists an updated request
    async fn update_request(&self, request: &ReimbursementRequest) -> Result<(), PortError>;

    /// Clears the request link on all appointments claimed by the request
    async fn release_appointments(
        &self,
        request_id: ReimbursementRequestId,
    ) -> Result<(), PortError>;
}
