//! Boleta de honorarios
//!
//! One invoice per completed appointment. The SII retention (15.25%) is
//! computed at issue time from the rate schedule effective on the issue
//! date; the invoice net is gross minus retention and nothing else.
//! Numbers follow `BH-YYYYMM-NNN`, where the sequence suffix is drawn
//! from a single platform-wide pool per calendar month and backed by a
//! storage uniqueness constraint on the number.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use crate::tariff::{compute_invoice_split, RateBook};
use core_kernel::{
    AppointmentId, HealthSystem, InvoiceId, MonthPeriod, MonthlyReportId, Money, PatientId,
    ProfessionalId,
};

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Cancelled,
}

/// A boleta issued for one completed session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Human-readable number, unique platform-wide (`BH-YYYYMM-NNN`)
    pub invoice_number: String,
    /// The appointment this boleta covers (one-to-one)
    pub appointment_id: AppointmentId,
    /// Issuing professional
    pub professional_id: ProfessionalId,
    /// Billed patient
    pub patient_id: PatientId,
    /// Issue date
    pub issue_date: NaiveDate,
    /// Gross (brut) session amount
    pub gross_amount: Money,
    /// SII retention withheld
    pub sii_retention: Money,
    /// gross - retention
    pub net_amount: Money,
    /// Patient's health system at issue time
    pub health_system: HealthSystem,
    /// Status
    pub status: InvoiceStatus,
    /// Set once the invoice is rolled into a monthly report
    pub monthly_report_id: Option<MonthlyReportId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Issues a boleta for a completed session
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        appointment_id: AppointmentId,
        professional_id: ProfessionalId,
        patient_id: PatientId,
        gross: Money,
        health_system: HealthSystem,
        issue_date: NaiveDate,
        sequence: InvoiceSequence,
        rates: &RateBook,
    ) -> Result<Self, BillingError> {
        let split = compute_invoice_split(gross, issue_date, rates)?;
        let now = Utc::now();

        Ok(Self {
            id: InvoiceId::new_v7(),
            invoice_number: sequence.number(),
            appointment_id,
            professional_id,
            patient_id,
            issue_date,
            gross_amount: split.gross,
            sii_retention: split.sii_retention,
            net_amount: split.net,
            health_system,
            status: InvoiceStatus::Pending,
            monthly_report_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Marks the boleta as paid out
    pub fn mark_paid(&mut self) -> Result<(), BillingError> {
        self.require_modifiable()?;
        self.status = InvoiceStatus::Paid;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Voids the boleta
    pub fn cancel(&mut self) -> Result<(), BillingError> {
        self.require_modifiable()?;
        self.status = InvoiceStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Links the invoice to the monthly report that owns it
    pub fn attach_to_report(&mut self, report_id: MonthlyReportId) {
        self.monthly_report_id = Some(report_id);
        self.updated_at = Utc::now();
    }

    fn require_modifiable(&self) -> Result<(), BillingError> {
        if self.status == InvoiceStatus::Cancelled {
            return Err(BillingError::InvoiceNotModifiable {
                invoice_id: self.id.to_string(),
                status: format!("{:?}", self.status),
            });
        }
        Ok(())
    }
}

/// A period-scoped invoice number
///
/// Storage hands out the next free suffix for the period, shared across
/// all professionals, under its uniqueness constraint on the formatted
/// number; this type only formats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSequence {
    pub period: MonthPeriod,
    /// 1-based suffix within the period
    pub suffix: u32,
}

impl InvoiceSequence {
    pub fn new(period: MonthPeriod, suffix: u32) -> Self {
        Self { period, suffix }
    }

    /// Formats the full invoice number, e.g. `BH-202501-007`
    pub fn number(&self) -> String {
        format!("BH-{}-{:03}", self.period.label(), self.suffix)
    }
}
