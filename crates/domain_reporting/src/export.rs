//! Report export
//!
//! CSV rendering for download plus the `ReportRenderer` port for PDF or
//! email delivery. Rendering is fire-and-forget: a failed renderer is
//! logged and never fails report generation.

use async_trait::async_trait;

use crate::report::MonthlyReport;
use core_kernel::{DomainPort, PortError};

/// Outbound rendering port (PDF generation, email delivery)
#[async_trait]
pub trait ReportRenderer: DomainPort {
    async fn render(&self, report: &MonthlyReport) -> Result<(), PortError>;
}

/// Renders a report as CSV: a summary section followed by the
/// health-system breakdown rows
pub fn render_csv(report: &MonthlyReport) -> String {
    let mut out = String::new();

    out.push_str(
        "period,completed_sessions,cancelled_sessions,attendance_rate,\
         total_gross,sii_retention,total_net,total_commission,\
         total_hours,average_net_per_hour\n",
    );
    out.push_str(&format!(
        "{},{},{},{},{},{},{},{},{},{}\n",
        report.period,
        report.completed_sessions,
        report.cancelled_sessions,
        report.attendance_rate,
        report.total_gross.amount(),
        report.sii_retention.amount(),
        report.total_net.amount(),
        report.total_commission.amount(),
        format!("{:.2}", report.total_hours),
        report.average_net_per_hour.amount(),
    ));

    out.push('\n');
    out.push_str("health_system,session_count,gross_amount,net_amount,percentage\n");
    for breakdown in &report.breakdowns {
        out.push_str(&format!(
            "{:?},{},{},{},{}\n",
            breakdown.health_system,
            breakdown.session_count,
            breakdown.gross_amount.amount(),
            breakdown.net_amount.amount(),
            breakdown.percentage,
        ));
    }

    out
}
