//! Concurrency semantics of the in-memory adapter
//!
//! Two racing reimbursement requests over the same session must produce
//! exactly one winner, and two racing report generations for the same
//! period must produce exactly one stored report.

use chrono::{TimeZone, Utc};

use core_kernel::{CoverageProfile, InsurerId, Money, ProfessionalId};
use domain_reimbursement::{
    coverage_guide, EstimatorConfig, ReimbursementError, ReimbursementService,
};
use domain_reporting::ReportingService;
use infra_mem::InMemoryStore;
use test_utils::{CompletedSessionBuilder, IdFixtures};

async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    let patient = IdFixtures::patient();
    let professional = IdFixtures::professional();

    store.seed_professional(professional, "Dra. Rojas").await;
    store
        .seed_coverage(
            patient,
            CoverageProfile::isapre(InsurerId::new(), "colmena"),
        )
        .await;

    let session = CompletedSessionBuilder::new()
        .patient(patient)
        .professional(professional)
        .invoice_suffix(1)
        .build();
    store
        .seed_session(session.appointment, session.payment, session.invoice)
        .await;

    store
}

fn reimbursement_service(store: InMemoryStore) -> ReimbursementService<InMemoryStore> {
    ReimbursementService::new(store, coverage_guide(), EstimatorConfig::default())
}

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    let store = seeded_store().await;
    let patient = IdFixtures::patient();
    let sessions = reimbursement_service(store.clone())
        .list_eligible_sessions(patient, None)
        .await
        .unwrap();
    let ids = vec![sessions.sessions[0].appointment_id];

    let svc_a = reimbursement_service(store.clone());
    let svc_b = reimbursement_service(store.clone());

    let (a, b) = tokio::join!(
        svc_a.create_request(patient, &ids, false, None),
        svc_b.create_request(patient, &ids, false, None),
    );

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one claim must win");

    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(
        matches!(
            loser,
            ReimbursementError::Conflict(_) | ReimbursementError::Eligibility(_)
        ),
        "loser must see the session as taken: {loser:?}"
    );

    // The surviving request owns the appointment
    let requests = reimbursement_service(store.clone())
        .list_requests(patient)
        .await
        .unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn concurrent_report_generation_has_one_stored_report() {
    let store = seeded_store().await;
    let professional = IdFixtures::professional();

    let svc_a = ReportingService::new(store.clone());
    let svc_b = ReportingService::new(store.clone());

    let (a, b) = tokio::join!(
        svc_a.generate(professional, 2025, 1),
        svc_b.generate(professional, 2025, 1),
    );

    // At least one generation succeeds; a loser only ever sees a
    // retryable conflict, and a retry returns the stored report
    let ok_ids: Vec<_> = [&a, &b].iter().filter_map(|r| r.as_ref().ok()).map(|r| r.id).collect();
    assert!(!ok_ids.is_empty());
    assert!(ok_ids.windows(2).all(|w| w[0] == w[1]));

    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(err, domain_reporting::ReportingError::Conflict(_)));
        }
    }

    let retry = ReportingService::new(store.clone())
        .generate(professional, 2025, 1)
        .await
        .unwrap();
    assert_eq!(retry.id, ok_ids[0]);
    assert_eq!(retry.total_gross, Money::pesos(45000));
}

#[tokio::test]
async fn duplicate_boleta_number_rejected_on_persist() {
    use chrono::NaiveDate;
    use core_kernel::{AppointmentId, HealthSystem, MonthPeriod, PatientId, PortError};
    use domain_billing::{Invoice, InvoiceSequence, RateBook};
    use domain_reporting::{summarize, ReportingStore};

    // The seeded store already holds BH-202501-001
    let store = seeded_store().await;
    let professional = ProfessionalId::new();
    let period = MonthPeriod::new(2025, 1).unwrap();

    let report = summarize(professional, period, &[], &RateBook::chilean()).unwrap();
    let colliding = Invoice::issue(
        AppointmentId::new(),
        professional,
        PatientId::new(),
        Money::pesos(45000),
        HealthSystem::Private,
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        InvoiceSequence::new(period, 1),
        &RateBook::chilean(),
    )
    .unwrap();

    let err = store
        .persist_report(&report, &[colliding])
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Conflict { .. }));
}

#[tokio::test]
async fn partial_claim_failure_links_nothing() {
    let store = seeded_store().await;
    let patient = IdFixtures::patient();

    // Second session without a boleta makes the batch fail
    let incomplete = CompletedSessionBuilder::new()
        .patient(patient)
        .professional(IdFixtures::professional())
        .without_invoice()
        .scheduled_at(Utc.with_ymd_and_hms(2025, 1, 20, 20, 0, 0).unwrap())
        .build();
    let incomplete_id = incomplete.appointment.id;
    store
        .seed_session(incomplete.appointment, incomplete.payment, None)
        .await;

    let svc = reimbursement_service(store.clone());
    let eligible = svc.list_eligible_sessions(patient, None).await.unwrap();
    let good_id = eligible.sessions[0].appointment_id;

    let err = svc
        .create_request(patient, &[good_id, incomplete_id], false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ReimbursementError::Eligibility(_)));

    // The good session is still unclaimed
    let after = svc.list_eligible_sessions(patient, None).await.unwrap();
    assert_eq!(after.total_count, 1);
    assert_eq!(after.sessions[0].appointment_id, good_id);
}
