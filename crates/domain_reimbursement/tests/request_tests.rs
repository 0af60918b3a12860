//! Reimbursement service integration tests
//!
//! Runs the service against an in-memory fake store to exercise the full
//! create / inspect / update flow, including appointment claiming and the
//! release on rejection or cancellation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use core_kernel::{
    AppointmentId, CoverageProfile, DomainPort, InsurerId, Money, PatientId, PortError,
    ReimbursementRequestId,
};
use domain_reimbursement::{
    coverage_guide, EstimateBasis, EstimatorConfig, IneligibilityReason, ReimbursementError,
    ReimbursementRequest, ReimbursementService, ReimbursementStore, RequestPatch, RequestStatus,
    SessionRecord,
};
use test_utils::{CompletedSessionBuilder, IdFixtures};

#[derive(Default)]
struct FakeState {
    sessions: Vec<SessionRecord>,
    coverage: HashMap<PatientId, CoverageProfile>,
    requests: HashMap<ReimbursementRequestId, ReimbursementRequest>,
}

/// In-memory stand-in for the reimbursement store
#[derive(Clone, Default)]
struct FakeStore {
    state: Arc<Mutex<FakeState>>,
}

impl FakeStore {
    fn with_sessions(
        patient_id: PatientId,
        coverage: CoverageProfile,
        sessions: Vec<SessionRecord>,
    ) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            state.sessions = sessions;
            state.coverage.insert(patient_id, coverage);
        }
        store
    }
}

impl DomainPort for FakeStore {}

#[async_trait]
impl ReimbursementStore for FakeStore {
    async fn load_sessions(&self, patient_id: PatientId) -> Result<Vec<SessionRecord>, PortError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sessions
            .iter()
            .filter(|r| r.appointment.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn patient_coverage(&self, patient_id: PatientId) -> Result<CoverageProfile, PortError> {
        let state = self.state.lock().unwrap();
        state
            .coverage
            .get(&patient_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Patient", patient_id))
    }

    async fn create_request(&self, request: &ReimbursementRequest) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();

        // All-or-nothing: refuse before mutating anything
        for id in &request.appointment_ids {
            let record = state
                .sessions
                .iter()
                .find(|r| r.appointment.id == *id)
                .ok_or_else(|| PortError::not_found("Appointment", id))?;
            if record.appointment.reimbursement_request_id.is_some() {
                return Err(PortError::conflict(format!("appointment {id} already claimed")));
            }
        }
        for id in &request.appointment_ids {
            let record = state
                .sessions
                .iter_mut()
                .find(|r| r.appointment.id == *id)
                .expect("checked above");
            record
                .appointment
                .link_reimbursement(request.id)
                .map_err(|e| PortError::conflict(e.to_string()))?;
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn get_request(
        &self,
        id: ReimbursementRequestId,
    ) -> Result<Option<ReimbursementRequest>, PortError> {
        let state = self.state.lock().unwrap();
        Ok(state.requests.get(&id).cloned())
    }

    async fn list_requests(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ReimbursementRequest>, PortError> {
        let state = self.state.lock().unwrap();
        let mut requests: Vec<_> = state
            .requests
            .values()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn update_request(&self, request: &ReimbursementRequest) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        if !state.requests.contains_key(&request.id) {
            return Err(PortError::not_found("ReimbursementRequest", request.id));
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn release_appointments(
        &self,
        request_id: ReimbursementRequestId,
    ) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        for record in &mut state.sessions {
            if record.appointment.reimbursement_request_id == Some(request_id) {
                record
                    .appointment
                    .unlink_reimbursement(request_id)
                    .map_err(|e| PortError::internal(e.to_string()))?;
            }
        }
        Ok(())
    }
}

fn session_record(builder: CompletedSessionBuilder) -> SessionRecord {
    let session = builder.build();
    SessionRecord {
        appointment: session.appointment,
        professional_name: session.professional_name,
        payment: session.payment,
        invoice: session.invoice,
    }
}

fn colmena_coverage() -> CoverageProfile {
    CoverageProfile::isapre(InsurerId::new(), "colmena")
}

fn service(store: FakeStore) -> ReimbursementService<FakeStore> {
    ReimbursementService::new(store, coverage_guide(), EstimatorConfig::default())
}

fn two_session_setup() -> (FakeStore, PatientId, Vec<AppointmentId>) {
    let patient = IdFixtures::patient();
    let records = vec![
        session_record(
            CompletedSessionBuilder::new()
                .patient(patient)
                .invoice_suffix(1),
        ),
        session_record(
            CompletedSessionBuilder::new()
                .patient(patient)
                .invoice_suffix(2),
        ),
    ];
    let ids = records.iter().map(|r| r.appointment.id).collect();
    let store = FakeStore::with_sessions(patient, colmena_coverage(), records);
    (store, patient, ids)
}

#[tokio::test]
async fn create_request_claims_sessions_and_fixes_total() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store.clone());

    let request = svc
        .create_request(patient, &ids, true, Some("January claim".to_string()))
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Draft);
    assert_eq!(request.total_amount, Money::pesos(90000));
    // Colmena midpoint is 57.5%
    assert_eq!(request.estimated_reimbursement.amount, Money::pesos(51750));
    assert_eq!(request.estimated_reimbursement.basis, EstimateBasis::CoverageTable);
    assert_eq!(request.period.year, 2025);
    assert_eq!(request.period.month, 1);

    // Both appointments are now claimed
    let listing = svc.list_eligible_sessions(patient, None).await.unwrap();
    assert_eq!(listing.total_count, 0);
}

#[tokio::test]
async fn create_rejects_whole_batch_when_one_session_lacks_invoice() {
    let patient = IdFixtures::patient();
    let good = session_record(
        CompletedSessionBuilder::new()
            .patient(patient)
            .invoice_suffix(1),
    );
    let no_boleta =
        session_record(CompletedSessionBuilder::new().patient(patient).without_invoice());

    let good_id = good.appointment.id;
    let bad_id = no_boleta.appointment.id;
    let store = FakeStore::with_sessions(patient, colmena_coverage(), vec![good, no_boleta]);
    let svc = service(store.clone());

    let err = svc
        .create_request(patient, &[good_id, bad_id], false, None)
        .await
        .unwrap_err();

    match err {
        ReimbursementError::Eligibility(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].appointment_id, bad_id);
            assert_eq!(failures[0].reason, IneligibilityReason::InvoiceMissing);
        }
        other => panic!("expected eligibility error, got {other:?}"),
    }

    // Nothing was claimed: the good session is still listed
    let listing = svc.list_eligible_sessions(patient, None).await.unwrap();
    assert_eq!(listing.total_count, 1);
    assert_eq!(listing.sessions[0].appointment_id, good_id);
}

#[tokio::test]
async fn create_rejects_unknown_appointment() {
    let (store, patient, mut ids) = two_session_setup();
    let svc = service(store);
    let stranger = AppointmentId::new();
    ids.push(stranger);

    let err = svc.create_request(patient, &ids, false, None).await.unwrap_err();
    match err {
        ReimbursementError::Eligibility(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].appointment_id, stranger);
            assert_eq!(failures[0].reason, IneligibilityReason::UnknownAppointment);
        }
        other => panic!("expected eligibility error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_rejects_empty_appointment_list() {
    let (store, patient, _) = two_session_setup();
    let svc = service(store);

    let err = svc.create_request(patient, &[], false, None).await.unwrap_err();
    assert!(matches!(err, ReimbursementError::Validation(_)));
}

#[tokio::test]
async fn double_claim_of_same_session_rejected() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store);

    svc.create_request(patient, &ids[..1], false, None).await.unwrap();
    let err = svc.create_request(patient, &ids[..1], false, None).await.unwrap_err();

    match err {
        ReimbursementError::Eligibility(failures) => {
            assert!(matches!(
                failures[0].reason,
                IneligibilityReason::AlreadyClaimed { .. }
            ));
        }
        other => panic!("expected eligibility error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejection_releases_sessions_for_a_new_request() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store);

    let request = svc.create_request(patient, &ids, false, None).await.unwrap();
    for status in [RequestStatus::Pending, RequestStatus::InReview, RequestStatus::Rejected] {
        svc.update_request(
            request.id,
            patient,
            RequestPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    // Released sessions are claimable again
    let listing = svc.list_eligible_sessions(patient, None).await.unwrap();
    assert_eq!(listing.total_count, 2);

    let second = svc.create_request(patient, &ids, false, None).await.unwrap();
    assert_ne!(second.id, request.id);
}

#[tokio::test]
async fn cancellation_releases_sessions() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store);

    let request = svc.create_request(patient, &ids, false, None).await.unwrap();
    let updated = svc
        .update_request(
            request.id,
            patient,
            RequestPatch {
                status: Some(RequestStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, RequestStatus::Cancelled);
    let listing = svc.list_eligible_sessions(patient, None).await.unwrap();
    assert_eq!(listing.total_count, 2);
}

#[tokio::test]
async fn approval_keeps_sessions_claimed() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store);

    let request = svc.create_request(patient, &ids, false, None).await.unwrap();
    for status in [RequestStatus::Pending, RequestStatus::InReview, RequestStatus::Approved] {
        svc.update_request(
            request.id,
            patient,
            RequestPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let listing = svc.list_eligible_sessions(patient, None).await.unwrap();
    assert_eq!(listing.total_count, 0);
}

#[tokio::test]
async fn invalid_transition_surfaces_and_persists_nothing() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store.clone());

    let request = svc.create_request(patient, &ids, false, None).await.unwrap();
    let err = svc
        .update_request(
            request.id,
            patient,
            RequestPatch {
                status: Some(RequestStatus::Paid),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ReimbursementError::InvalidTransition { .. }));
    let reloaded = svc.get_request(request.id, patient).await.unwrap();
    assert_eq!(reloaded.status, RequestStatus::Draft);
}

#[tokio::test]
async fn ownership_is_enforced_without_leaking_existence() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store);

    let request = svc.create_request(patient, &ids, false, None).await.unwrap();
    let stranger = PatientId::new();

    let err = svc.get_request(request.id, stranger).await.unwrap_err();
    assert!(matches!(err, ReimbursementError::NotAuthorized));
}

#[tokio::test]
async fn patch_updates_tracking_and_reimbursed_amount() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store);

    let request = svc.create_request(patient, &ids, false, None).await.unwrap();
    let updated = svc
        .update_request(
            request.id,
            patient,
            RequestPatch {
                status: Some(RequestStatus::Pending),
                tracking_number: Some("ISP-2025-0042".to_string()),
                notes: None,
                reimbursed_amount: Some(Money::pesos(48000)),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.tracking_number.as_deref(), Some("ISP-2025-0042"));
    assert_eq!(updated.reimbursed_amount, Some(Money::pesos(48000)));
    assert!(updated.submitted_at.is_some());
}

#[tokio::test]
async fn list_requests_returns_only_own_requests() {
    let (store, patient, ids) = two_session_setup();
    let svc = service(store);

    svc.create_request(patient, &ids, false, None).await.unwrap();

    let own = svc.list_requests(patient).await.unwrap();
    assert_eq!(own.len(), 1);

    let other = svc.list_requests(PatientId::new()).await.unwrap();
    assert!(other.is_empty());
}
