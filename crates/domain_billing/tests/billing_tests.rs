//! Billing integration tests
//!
//! Exercises the split calculators and the webhook confirmation service
//! end to end:
//! - payment and invoice splits on the documented worked example
//! - effective-dated rate lookups across the tariff change
//! - idempotent webhook confirmation through the `BillingStore` port

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Mutex;

use core_kernel::{
    AppointmentId, DomainPort, HealthSystem, Money, MonthPeriod, PatientId, PortError,
    ProfessionalId,
};
use domain_billing::{
    compute_invoice_split, compute_split, BillingStore, Invoice, InvoiceSequence, Payment,
    PaymentConfirmation, PaymentStatus, RateBook, SubscriptionTier,
};

mod split_scenarios {
    use super::*;

    /// Worked example: 45,000 CLP session on the Premium tier
    #[test]
    fn test_premium_session_full_split() {
        let rates = RateBook::chilean();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let gross = Money::pesos(45000);

        let payment = compute_split(gross, SubscriptionTier::Premium, date, &rates).unwrap();
        assert_eq!(payment.commission, Money::pesos(2250));
        assert_eq!(payment.net, Money::pesos(42750));

        let invoice = compute_invoice_split(gross, date, &rates).unwrap();
        assert_eq!(invoice.sii_retention, Money::pesos(6863));
        assert_eq!(invoice.net, Money::pesos(38137));

        // The two nets serve different purposes and differ by design
        assert_ne!(payment.net, invoice.net);
    }

    /// A payment created under the legacy tariff keeps its historical
    /// commission even though the current tariff differs
    #[test]
    fn test_historical_payment_reproduces_legacy_rate() {
        let rates = RateBook::chilean();
        let legacy_date = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();

        let payment = Payment::create(
            AppointmentId::new(),
            Money::pesos(40000),
            SubscriptionTier::Pro,
            legacy_date,
            &rates,
        )
        .unwrap();

        // 40000 * 0.114 = 4560
        assert_eq!(payment.commission, Money::pesos(4560));
    }

    #[test]
    fn test_invoice_issue_matches_split_function() {
        let rates = RateBook::chilean();
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let gross = Money::pesos(30000);

        let invoice = Invoice::issue(
            AppointmentId::new(),
            ProfessionalId::new(),
            PatientId::new(),
            gross,
            HealthSystem::Fonasa,
            date,
            InvoiceSequence::new(MonthPeriod::new(2025, 3).unwrap(), 1),
            &rates,
        )
        .unwrap();

        let split = compute_invoice_split(gross, date, &rates).unwrap();
        assert_eq!(invoice.sii_retention, split.sii_retention);
        assert_eq!(invoice.net_amount, split.net);
        assert_eq!(invoice.invoice_number, "BH-202503-001");
    }
}

mod webhook_confirmation {
    use super::*;

    /// In-test store tracking saves and appointment confirmations
    struct RecordingStore {
        payment: Mutex<Payment>,
        saves: Mutex<u32>,
        confirmed_appointments: Mutex<Vec<AppointmentId>>,
    }

    impl RecordingStore {
        fn new(payment: Payment) -> Self {
            Self {
                payment: Mutex::new(payment),
                saves: Mutex::new(0),
                confirmed_appointments: Mutex::new(Vec::new()),
            }
        }
    }

    impl DomainPort for &'static RecordingStore {}

    #[async_trait]
    impl BillingStore for &'static RecordingStore {
        async fn find_payment_by_token(
            &self,
            token: &str,
        ) -> Result<Option<Payment>, PortError> {
            let payment = self.payment.lock().unwrap().clone();
            let matches = payment.gateway_token.as_deref() == Some(token);
            Ok(matches.then_some(payment))
        }

        async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
            *self.payment.lock().unwrap() = payment.clone();
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }

        async fn mark_appointment_confirmed(
            &self,
            appointment_id: AppointmentId,
        ) -> Result<(), PortError> {
            self.confirmed_appointments.lock().unwrap().push(appointment_id);
            Ok(())
        }
    }

    fn leaked_store() -> &'static RecordingStore {
        let payment = Payment::create(
            AppointmentId::new(),
            Money::pesos(45000),
            SubscriptionTier::Starter,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            &RateBook::chilean(),
        )
        .unwrap()
        .with_gateway_token("tok_flow_1");

        Box::leak(Box::new(RecordingStore::new(payment)))
    }

    /// A webhook delivered twice confirms exactly once
    #[tokio::test]
    async fn test_duplicate_webhook_is_noop() {
        let store = leaked_store();
        let service = PaymentConfirmation::new(store);

        let first = service.confirm_by_token("tok_flow_1").await.unwrap();
        assert_eq!(first.status, PaymentStatus::Completed);

        let second = service.confirm_by_token("tok_flow_1").await.unwrap();
        assert_eq!(second.status, PaymentStatus::Completed);
        assert_eq!(second.paid_at, first.paid_at);

        // One save, one appointment confirmation
        assert_eq!(*store.saves.lock().unwrap(), 1);
        assert_eq!(store.confirmed_appointments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let store = leaked_store();
        let service = PaymentConfirmation::new(store);

        let err = service.confirm_by_token("tok_unknown").await.unwrap_err();
        assert!(err.is_not_found());
    }
}

mod payment_lifecycle {
    use super::*;

    #[test]
    fn test_paid_at_set_on_confirmation() {
        let mut payment = Payment::create(
            AppointmentId::new(),
            Money::pesos(25000),
            SubscriptionTier::Pro,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            &RateBook::chilean(),
        )
        .unwrap();

        assert!(payment.paid_at.is_none());
        let paid_at = Utc::now();
        payment.confirm(paid_at).unwrap();
        assert_eq!(payment.paid_at, Some(paid_at));
        assert!(payment.is_completed());
    }
}
