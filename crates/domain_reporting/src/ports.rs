//! Reporting storage port

use async_trait::async_trait;

use crate::aggregator::ActivityRecord;
use crate::report::MonthlyReport;
use core_kernel::{DomainPort, MonthPeriod, PortError, ProfessionalId};
use domain_billing::Invoice;

/// Storage interface for the reporting domain
///
/// `persist_report` is the atomicity boundary: the report row and any
/// newly issued boletas land together or not at all, under uniqueness
/// constraints on (professional, year, month) and on the boleta number.
/// The loser of a concurrent generation gets a `Conflict`.
#[async_trait]
pub trait ReportingStore: DomainPort {
    /// Loads an existing report for the period, if one was generated
    async fn find_report(
        &self,
        professional_id: ProfessionalId,
        period: MonthPeriod,
    ) -> Result<Option<MonthlyReport>, PortError>;

    /// Loads the professional's Completed and Cancelled appointments whose
    /// `scheduled_at` falls in the Santiago-local month, with payments and
    /// boletas attached
    async fn load_activity(
        &self,
        professional_id: ProfessionalId,
        period: MonthPeriod,
    ) -> Result<Vec<ActivityRecord>, PortError>;

    /// First free boleta-number suffix for the period, platform-wide:
    /// the suffix pool is shared by every professional issuing in the
    /// same calendar month
    async fn next_invoice_suffix(&self, period: MonthPeriod) -> Result<u32, PortError>;

    /// Atomically inserts the report and its newly issued boletas
    async fn persist_report(
        &self,
        report: &MonthlyReport,
        new_invoices: &[Invoice],
    ) -> Result<(), PortError>;
}
