//! Monthly report handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use domain_reporting::{render_csv, ReportingService};

use crate::auth::AuthenticatedProfessional;
use crate::dto::reports::MonthlyReportResponse;
use crate::{error::ApiError, AppState};

/// Gets (generating on first access) a professional's monthly report
pub async fn get_report(
    State(state): State<AppState>,
    AuthenticatedProfessional(professional_id): AuthenticatedProfessional,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthlyReportResponse>, ApiError> {
    let report = ReportingService::new(state.store.clone())
        .generate(professional_id, year, month)
        .await?;
    Ok(Json(report.into()))
}

/// Monthly report as CSV
pub async fn get_report_csv(
    State(state): State<AppState>,
    AuthenticatedProfessional(professional_id): AuthenticatedProfessional,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    let report = ReportingService::new(state.store.clone())
        .generate(professional_id, year, month)
        .await?;
    let csv = render_csv(&report);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"report-{}.csv\"",
                    report.period.label()
                ),
            ),
        ],
        csv,
    ))
}
