//! Monthly report aggregate
//!
//! A report snapshots one professional's financial month: session counts,
//! gross partitioned by the patients' health systems, the SII retention on
//! the month's gross, the platform commission as recorded on each payment,
//! and the attendance and productivity figures. Once generated for a
//! (professional, year, month) key it is immutable; regeneration returns
//! the stored snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{HealthSystem, InvoiceId, Money, MonthPeriod, MonthlyReportId, ProfessionalId};

/// One health-system partition of the month's completed sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSystemBreakdown {
    pub health_system: HealthSystem,
    pub session_count: u32,
    pub gross_amount: Money,
    /// Partition gross minus SII retention at the period-end rate. The
    /// retention rounds per partition, so the nets can differ from
    /// `total_net` by a peso when the partitions are summed.
    pub net_amount: Money,
    /// Share of the month's total gross, in percent (2 decimals)
    pub percentage: Decimal,
}

/// A professional's monthly financial report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Unique identifier
    pub id: MonthlyReportId,
    /// The professional this report belongs to
    pub professional_id: ProfessionalId,
    /// Calendar month, Chilean local time
    pub period: MonthPeriod,
    /// Sessions that took place
    pub completed_sessions: u32,
    /// Sessions cancelled during the month
    pub cancelled_sessions: u32,
    /// completed / (completed + cancelled) × 100; 0 when there were no
    /// sessions at all
    pub attendance_rate: Decimal,
    /// Gross per health system, non-empty partitions only
    pub breakdowns: Vec<HealthSystemBreakdown>,
    /// Sum of the completed sessions' gross amounts
    pub total_gross: Money,
    /// SII retention on the total gross, at the rate effective at period end
    pub sii_retention: Money,
    /// total_gross - sii_retention
    pub total_net: Money,
    /// Platform commission summed from the stored payments, never
    /// recomputed from the professional's current tier
    pub total_commission: Money,
    /// Hours of completed sessions
    pub total_hours: Decimal,
    /// round_half_up(total_net / total_hours); zero when no hours
    pub average_net_per_hour: Money,
    /// Boletas belonging to this month, including any generated with the
    /// report
    pub invoice_ids: Vec<InvoiceId>,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
}

impl MonthlyReport {
    /// Breakdown for one health system, if the partition is non-empty
    pub fn breakdown_for(&self, system: HealthSystem) -> Option<&HealthSystemBreakdown> {
        self.breakdowns.iter().find(|b| b.health_system == system)
    }
}
