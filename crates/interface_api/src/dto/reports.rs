//! Monthly report DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::HealthSystem;
use domain_reporting::{HealthSystemBreakdown, MonthlyReport};

use super::reimbursements::PeriodResponse;

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub health_system: HealthSystem,
    pub session_count: u32,
    pub gross_amount: Decimal,
    pub net_amount: Decimal,
    pub percentage: Decimal,
}

impl From<HealthSystemBreakdown> for BreakdownResponse {
    fn from(breakdown: HealthSystemBreakdown) -> Self {
        Self {
            health_system: breakdown.health_system,
            session_count: breakdown.session_count,
            gross_amount: breakdown.gross_amount.amount(),
            net_amount: breakdown.net_amount.amount(),
            percentage: breakdown.percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyReportResponse {
    pub id: String,
    pub professional_id: String,
    pub period: PeriodResponse,
    pub completed_sessions: u32,
    pub cancelled_sessions: u32,
    pub attendance_rate: Decimal,
    pub breakdowns: Vec<BreakdownResponse>,
    pub total_gross: Decimal,
    pub sii_retention: Decimal,
    pub total_net: Decimal,
    pub total_commission: Decimal,
    pub total_hours: Decimal,
    pub average_net_per_hour: Decimal,
    pub currency: String,
    pub invoice_ids: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl From<MonthlyReport> for MonthlyReportResponse {
    fn from(report: MonthlyReport) -> Self {
        Self {
            id: report.id.to_string(),
            professional_id: report.professional_id.to_string(),
            period: PeriodResponse {
                year: report.period.year,
                month: report.period.month,
            },
            completed_sessions: report.completed_sessions,
            cancelled_sessions: report.cancelled_sessions,
            attendance_rate: report.attendance_rate,
            breakdowns: report.breakdowns.into_iter().map(Into::into).collect(),
            total_gross: report.total_gross.amount(),
            sii_retention: report.sii_retention.amount(),
            total_net: report.total_net.amount(),
            total_commission: report.total_commission.amount(),
            total_hours: report.total_hours,
            average_net_per_hour: report.average_net_per_hour.amount(),
            currency: report.total_gross.currency().code().to_string(),
            invoice_ids: report.invoice_ids.iter().map(|id| id.to_string()).collect(),
            generated_at: report.generated_at,
        }
    }
}
