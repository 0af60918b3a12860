//! Monthly report aggregation
//!
//! `summarize` is the pure half: it folds a month's activity records into
//! the report figures. `ReportingService::generate` is the orchestrating
//! half: idempotent fast path, boleta generation for completed sessions
//! that lack one, and the atomic persist keyed on the
//! (professional, year, month) natural key.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::ReportingError;
use crate::export::ReportRenderer;
use crate::ports::ReportingStore;
use crate::report::{HealthSystemBreakdown, MonthlyReport};
use core_kernel::{HealthSystem, Money, MonthPeriod, MonthlyReportId, ProfessionalId};
use domain_billing::{Invoice, InvoiceSequence, Payment, RateBook};
use domain_scheduling::{Appointment, AppointmentStatus};

/// One appointment's worth of reporting input: the appointment plus the
/// health-system snapshot and the payment/invoice, when they exist
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub appointment: Appointment,
    /// Patient's health system at session time
    pub health_system: HealthSystem,
    pub payment: Option<Payment>,
    pub invoice: Option<Invoice>,
}

impl ActivityRecord {
    fn is_completed(&self) -> bool {
        self.appointment.status == AppointmentStatus::Completed
    }

    /// Gross for reporting: the boleta when issued, otherwise the payment
    fn gross(&self) -> Option<Money> {
        self.invoice
            .as_ref()
            .map(|i| i.gross_amount)
            .or_else(|| self.payment.as_ref().map(|p| p.amount))
    }
}

fn percentage_of(part: Money, total: Money) -> Decimal {
    if total.is_zero() {
        return dec!(0);
    }
    (part.amount() / total.amount() * dec!(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Folds a month's activity into a report
///
/// Pure function of its inputs; the caller has already restricted the
/// records to the Santiago-local calendar month.
pub fn summarize(
    professional_id: ProfessionalId,
    period: MonthPeriod,
    records: &[ActivityRecord],
    rates: &RateBook,
) -> Result<MonthlyReport, ReportingError> {
    let completed: Vec<&ActivityRecord> = records.iter().filter(|r| r.is_completed()).collect();
    let cancelled = records
        .iter()
        .filter(|r| r.appointment.status == AppointmentStatus::Cancelled)
        .count() as u32;
    let completed_count = completed.len() as u32;

    let attendance_rate = if completed_count + cancelled == 0 {
        dec!(0)
    } else {
        (Decimal::from(completed_count) / Decimal::from(completed_count + cancelled) * dec!(100))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    let mut total_gross = Money::pesos(0);
    let mut total_commission = Money::pesos(0);
    let mut total_minutes: u64 = 0;
    let mut partitions: Vec<(HealthSystem, u32, Money)> = vec![
        (HealthSystem::Isapre, 0, Money::pesos(0)),
        (HealthSystem::Fonasa, 0, Money::pesos(0)),
        (HealthSystem::Private, 0, Money::pesos(0)),
    ];

    for record in &completed {
        let Some(gross) = record.gross() else {
            tracing::warn!(
                appointment_id = %record.appointment.id,
                "completed session has neither boleta nor payment, excluded from totals"
            );
            continue;
        };

        total_gross = total_gross.checked_add(&gross)?;
        if let Some(payment) = &record.payment {
            total_commission = total_commission.checked_add(&payment.commission)?;
        }
        total_minutes += u64::from(record.appointment.duration_minutes);

        let slot = partitions
            .iter_mut()
            .find(|(system, _, _)| *system == record.health_system)
            .expect("all systems present");
        slot.1 += 1;
        slot.2 = slot.2.checked_add(&gross)?;
    }

    let sii_rate = rates.schedule_for(period.last_day())?.sii_retention;
    let sii_retention = sii_rate.apply(&total_gross);
    let total_net = total_gross.checked_sub(&sii_retention)?;

    let total_hours = Decimal::from(total_minutes) / dec!(60);
    let average_net_per_hour = if total_hours.is_zero() {
        Money::pesos(0)
    } else {
        total_net.divide(total_hours)?.round_half_up()
    };

    let breakdowns = partitions
        .into_iter()
        .filter(|(_, count, _)| *count > 0)
        .map(|(health_system, session_count, gross_amount)| {
            let net_amount = gross_amount.checked_sub(&sii_rate.apply(&gross_amount))?;
            Ok(HealthSystemBreakdown {
                health_system,
                session_count,
                gross_amount,
                net_amount,
                percentage: percentage_of(gross_amount, total_gross),
            })
        })
        .collect::<Result<Vec<_>, ReportingError>>()?;

    Ok(MonthlyReport {
        id: MonthlyReportId::new_v7(),
        professional_id,
        period,
        completed_sessions: completed_count,
        cancelled_sessions: cancelled,
        attendance_rate,
        breakdowns,
        total_gross,
        sii_retention,
        total_net,
        total_commission,
        total_hours,
        average_net_per_hour,
        invoice_ids: Vec::new(),
        generated_at: Utc::now(),
    })
}

/// Monthly report use cases
pub struct ReportingService<S> {
    store: S,
    rates: RateBook,
    renderer: Option<Arc<dyn ReportRenderer>>,
}

impl<S: ReportingStore> ReportingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            rates: RateBook::chilean(),
            renderer: None,
        }
    }

    /// Attaches a renderer notified after generation (fire-and-forget)
    pub fn with_renderer(mut self, renderer: Arc<dyn ReportRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Generates (or returns) the report for a professional's month
    ///
    /// Idempotent on the (professional, year, month) key: an existing
    /// report is returned as-is. Generation issues a boleta for every
    /// completed session that lacks one and persists report plus boletas
    /// atomically; a concurrent duplicate surfaces as a retryable
    /// `Conflict`.
    pub async fn generate(
        &self,
        professional_id: ProfessionalId,
        year: i32,
        month: u32,
    ) -> Result<MonthlyReport, ReportingError> {
        let period = MonthPeriod::new(year, month)?;

        if let Some(existing) = self.store.find_report(professional_id, period).await? {
            tracing::debug!(
                professional_id = %professional_id,
                %period,
                report_id = %existing.id,
                "returning existing monthly report"
            );
            return Ok(existing);
        }

        let mut records = self.store.load_activity(professional_id, period).await?;
        let new_invoices = self
            .issue_missing_invoices(professional_id, period, &mut records)
            .await?;

        let mut report = summarize(professional_id, period, &records, &self.rates)?;
        report.invoice_ids = records
            .iter()
            .filter(|r| r.is_completed())
            .filter_map(|r| r.invoice.as_ref().map(|i| i.id))
            .collect();

        let new_invoices: Vec<Invoice> = new_invoices
            .into_iter()
            .map(|mut invoice| {
                invoice.attach_to_report(report.id);
                invoice
            })
            .collect();

        self.store.persist_report(&report, &new_invoices).await?;
        tracing::info!(
            professional_id = %professional_id,
            %period,
            report_id = %report.id,
            sessions = report.completed_sessions,
            total_gross = %report.total_gross,
            boletas_issued = new_invoices.len(),
            "monthly report generated"
        );

        if let Some(renderer) = &self.renderer {
            // Render failures never fail the generation
            if let Err(err) = renderer.render(&report).await {
                tracing::warn!(report_id = %report.id, error = %err, "report rendering failed");
            }
        }

        Ok(report)
    }

    /// Fetches a previously generated report
    pub async fn get(
        &self,
        professional_id: ProfessionalId,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyReport>, ReportingError> {
        let period = MonthPeriod::new(year, month)?;
        Ok(self.store.find_report(professional_id, period).await?)
    }

    /// Issues a boleta for every completed session missing one, numbered
    /// from the period's next free suffix. Sessions without a payment have
    /// no gross to bill and are skipped with a warning.
    async fn issue_missing_invoices(
        &self,
        professional_id: ProfessionalId,
        period: MonthPeriod,
        records: &mut [ActivityRecord],
    ) -> Result<Vec<Invoice>, ReportingError> {
        let mut suffix = self.store.next_invoice_suffix(period).await?;
        let issue_date = period.last_day();
        let mut issued = Vec::new();

        for record in records.iter_mut() {
            if !record.is_completed() || record.invoice.is_some() {
                continue;
            }
            let Some(payment) = &record.payment else {
                tracing::warn!(
                    appointment_id = %record.appointment.id,
                    "completed session has no payment, boleta not issued"
                );
                continue;
            };

            let invoice = Invoice::issue(
                record.appointment.id,
                professional_id,
                record.appointment.patient_id,
                payment.amount,
                record.health_system,
                issue_date,
                InvoiceSequence::new(period, suffix),
                &self.rates,
            )?;
            suffix += 1;
            record.invoice = Some(invoice.clone());
            issued.push(invoice);
        }

        Ok(issued)
    }
}
