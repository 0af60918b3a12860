//! Reimbursement eligibility filter
//!
//! A completed session qualifies for a reimbursement request when its
//! payment completed, a boleta was issued, and no request has claimed it
//! yet. Attachment to *any* request excludes a session, whatever that
//! request's status; only an explicit release (on rejection or
//! cancellation) frees it again.
//!
//! Everything here is pure: the store hands over session records, the
//! filter classifies them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    AppointmentId, Money, MonthPeriod, PaymentId, ProfessionalId, Timezone,
};
use domain_billing::{Invoice, Payment, PaymentStatus};
use domain_scheduling::{Appointment, AppointmentStatus, Modality};

/// A patient session as loaded from storage: the appointment plus its
/// payment and invoice, when they exist
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub appointment: Appointment,
    /// Professional display name, denormalised for listings
    pub professional_name: String,
    pub payment: Option<Payment>,
    pub invoice: Option<Invoice>,
}

/// Why a session cannot be claimed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IneligibilityReason {
    /// The session did not take place (or not yet)
    NotCompleted { status: String },
    /// Already attached to a reimbursement request
    AlreadyClaimed { request_id: String },
    /// No payment record exists
    PaymentMissing,
    /// Payment exists but did not complete
    PaymentNotCompleted { status: String },
    /// No boleta was issued
    InvoiceMissing,
    /// The id does not belong to any of the patient's sessions
    UnknownAppointment,
}

impl IneligibilityReason {
    /// Human-readable reason surfaced to the caller
    pub fn message(&self) -> String {
        match self {
            IneligibilityReason::NotCompleted { status } => {
                format!("session is {status}, not completed")
            }
            IneligibilityReason::AlreadyClaimed { request_id } => {
                format!("already claimed by request {request_id}")
            }
            IneligibilityReason::PaymentMissing => "no payment on record".to_string(),
            IneligibilityReason::PaymentNotCompleted { status } => {
                format!("payment is {status}, not completed")
            }
            IneligibilityReason::InvoiceMissing => "no boleta issued".to_string(),
            IneligibilityReason::UnknownAppointment => {
                "appointment does not belong to this patient".to_string()
            }
        }
    }
}

/// Checks all four eligibility criteria for one session
pub fn check_eligibility(record: &SessionRecord) -> Result<(), IneligibilityReason> {
    if record.appointment.status != AppointmentStatus::Completed {
        return Err(IneligibilityReason::NotCompleted {
            status: format!("{:?}", record.appointment.status),
        });
    }
    if let Some(request_id) = record.appointment.reimbursement_request_id {
        return Err(IneligibilityReason::AlreadyClaimed {
            request_id: request_id.to_string(),
        });
    }
    match &record.payment {
        None => return Err(IneligibilityReason::PaymentMissing),
        Some(payment) if payment.status != PaymentStatus::Completed => {
            return Err(IneligibilityReason::PaymentNotCompleted {
                status: format!("{:?}", payment.status),
            });
        }
        Some(_) => {}
    }
    if record.invoice.is_none() {
        return Err(IneligibilityReason::InvoiceMissing);
    }
    Ok(())
}

/// One claimable session in a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleSession {
    pub appointment_id: AppointmentId,
    pub scheduled_at: DateTime<Utc>,
    pub professional_id: ProfessionalId,
    pub professional_name: String,
    pub duration_minutes: u32,
    pub modality: Modality,
    /// Boleta summary
    pub invoice_number: String,
    pub invoice_gross: Money,
    pub invoice_sii_retention: Money,
    pub invoice_net: Money,
    pub invoice_issue_date: NaiveDate,
    /// Payment summary
    pub payment_id: PaymentId,
    pub payment_amount: Money,
}

/// The result of an eligibility listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleSessions {
    pub sessions: Vec<EligibleSession>,
    pub total_count: usize,
    /// Sum of the eligible sessions' invoice gross amounts
    pub total_amount: Money,
}

/// Lists the sessions a patient can claim, optionally restricted to one
/// calendar month (in Chilean local time)
///
/// Pure read with no side effects; safe to call repeatedly.
pub fn list_eligible(
    records: &[SessionRecord],
    period: Option<MonthPeriod>,
    tz: Timezone,
) -> EligibleSessions {
    let mut sessions = Vec::new();
    let mut total_amount = Money::pesos(0);

    for record in records {
        if let Some(period) = period {
            if !period.contains(record.appointment.scheduled_at, tz) {
                continue;
            }
        }
        if check_eligibility(record).is_err() {
            continue;
        }

        // Both unwraps guarded by check_eligibility
        let invoice = record.invoice.as_ref().expect("eligibility checked");
        let payment = record.payment.as_ref().expect("eligibility checked");

        total_amount = total_amount + invoice.gross_amount;
        sessions.push(EligibleSession {
            appointment_id: record.appointment.id,
            scheduled_at: record.appointment.scheduled_at,
            professional_id: record.appointment.professional_id,
            professional_name: record.professional_name.clone(),
            duration_minutes: record.appointment.duration_minutes,
            modality: record.appointment.modality,
            invoice_number: invoice.invoice_number.clone(),
            invoice_gross: invoice.gross_amount,
            invoice_sii_retention: invoice.sii_retention,
            invoice_net: invoice.net_amount,
            invoice_issue_date: invoice.issue_date,
            payment_id: payment.id,
            payment_amount: payment.amount,
        });
    }

    sessions.sort_by_key(|s| s.scheduled_at);
    EligibleSessions {
        total_count: sessions.len(),
        sessions,
        total_amount,
    }
}
