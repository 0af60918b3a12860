//! Coverage guide handlers

use axum::{extract::Path, Json};

use domain_reimbursement::coverage_guide;

use crate::dto::coverage::CoverageGuideEntryResponse;
use crate::error::ApiError;

/// Lists the published insurer coverage table
pub async fn list_guide() -> Json<Vec<CoverageGuideEntryResponse>> {
    let entries = coverage_guide()
        .entries()
        .iter()
        .map(Into::into)
        .collect();
    Json(entries)
}

/// Gets a single insurer's guide entry
pub async fn get_guide_entry(
    Path(slug): Path<String>,
) -> Result<Json<CoverageGuideEntryResponse>, ApiError> {
    coverage_guide()
        .lookup(&slug)
        .map(|entry| Json(entry.into()))
        .ok_or_else(|| ApiError::NotFound(format!("insurer {slug}")))
}
