//! Test data builders
//!
//! `CompletedSessionBuilder` assembles the appointment/payment/invoice
//! triple most reimbursement and reporting tests start from, walking each
//! aggregate through its real lifecycle so the resulting state is one the
//! production code can actually reach.

use chrono::{DateTime, Utc};
use fake::faker::name::en::Name;
use fake::Fake;

use core_kernel::{HealthSystem, Money, MonthPeriod, PatientId, ProfessionalId, Timezone};
use domain_billing::{Invoice, InvoiceSequence, Payment, RateBook, SubscriptionTier};
use domain_scheduling::{Appointment, Modality};

use crate::fixtures::{MoneyFixtures, TemporalFixtures};

/// A fully materialised session: completed appointment, completed
/// payment, and issued invoice (both optional by configuration)
#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub appointment: Appointment,
    pub payment: Option<Payment>,
    pub invoice: Option<Invoice>,
    pub professional_name: String,
}

/// Builder for a completed, paid, invoiced session
pub struct CompletedSessionBuilder {
    patient_id: PatientId,
    professional_id: ProfessionalId,
    scheduled_at: DateTime<Utc>,
    duration_minutes: u32,
    modality: Modality,
    price: Money,
    tier: SubscriptionTier,
    health_system: HealthSystem,
    invoice_suffix: u32,
    with_payment: bool,
    confirm_payment: bool,
    with_invoice: bool,
    complete_appointment: bool,
}

impl Default for CompletedSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletedSessionBuilder {
    pub fn new() -> Self {
        Self {
            patient_id: PatientId::new(),
            professional_id: ProfessionalId::new(),
            scheduled_at: TemporalFixtures::mid_january_session(),
            duration_minutes: 50,
            modality: Modality::Online,
            price: MoneyFixtures::session_price(),
            tier: SubscriptionTier::Pro,
            health_system: HealthSystem::Isapre,
            invoice_suffix: 1,
            with_payment: true,
            confirm_payment: true,
            with_invoice: true,
            complete_appointment: true,
        }
    }

    pub fn patient(mut self, id: PatientId) -> Self {
        self.patient_id = id;
        self
    }

    pub fn professional(mut self, id: ProfessionalId) -> Self {
        self.professional_id = id;
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = at;
        self
    }

    pub fn duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    pub fn price(mut self, price: Money) -> Self {
        self.price = price;
        self
    }

    pub fn tier(mut self, tier: SubscriptionTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn health_system(mut self, system: HealthSystem) -> Self {
        self.health_system = system;
        self
    }

    pub fn invoice_suffix(mut self, suffix: u32) -> Self {
        self.invoice_suffix = suffix;
        self
    }

    /// Leave the session without a payment record
    pub fn without_payment(mut self) -> Self {
        self.with_payment = false;
        self
    }

    /// Keep the payment in Pending status
    pub fn payment_pending(mut self) -> Self {
        self.confirm_payment = false;
        self
    }

    /// Leave the session without an invoice
    pub fn without_invoice(mut self) -> Self {
        self.with_invoice = false;
        self
    }

    /// Keep the appointment in Confirmed status (session not yet held)
    pub fn not_completed(mut self) -> Self {
        self.complete_appointment = false;
        self
    }

    pub fn build(self) -> CompletedSession {
        let rates = RateBook::chilean();
        let tz = Timezone::santiago();
        let local_date = tz.to_local(self.scheduled_at).date_naive();

        let mut appointment = Appointment::book(
            self.patient_id,
            self.professional_id,
            self.scheduled_at,
            self.duration_minutes,
            self.modality,
        )
        .expect("valid appointment");

        let payment = if self.with_payment {
            let mut payment = Payment::create(
                appointment.id,
                self.price,
                self.tier,
                local_date,
                &rates,
            )
            .expect("valid payment");

            if self.confirm_payment {
                payment.confirm(self.scheduled_at).expect("confirmable");
                appointment.confirm().expect("confirmable");
            }
            Some(payment)
        } else {
            None
        };

        if self.complete_appointment {
            if appointment.status == domain_scheduling::AppointmentStatus::Pending {
                appointment.confirm().expect("confirmable");
            }
            appointment.complete().expect("completable");
        }

        let invoice = if self.with_invoice {
            let period = MonthPeriod::containing(self.scheduled_at, tz);
            Some(
                Invoice::issue(
                    appointment.id,
                    self.professional_id,
                    self.patient_id,
                    self.price,
                    self.health_system,
                    local_date,
                    InvoiceSequence::new(period, self.invoice_suffix),
                    &rates,
                )
                .expect("valid invoice"),
            )
        } else {
            None
        };

        CompletedSession {
            appointment,
            payment,
            invoice,
            professional_name: Name().fake(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_scheduling::AppointmentStatus;

    #[test]
    fn test_default_build_yields_completed_invoiced_session() {
        let session = CompletedSessionBuilder::new().build();

        assert_eq!(session.appointment.status, AppointmentStatus::Completed);
        assert!(session.payment.is_some());
        assert!(session.invoice.is_some());
        assert!(!session.professional_name.is_empty());
    }

    #[test]
    fn test_without_invoice_leaves_session_uninvoiced() {
        let session = CompletedSessionBuilder::new().without_invoice().build();
        assert!(session.invoice.is_none());
        assert!(session.payment.is_some());
    }
}
