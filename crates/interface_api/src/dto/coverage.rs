//! Coverage guide DTOs

use rust_decimal::Decimal;
use serde::Serialize;

use domain_reimbursement::InsurerGuideEntry;

#[derive(Debug, Serialize)]
pub struct CoverageGuideEntryResponse {
    pub slug: String,
    pub name: String,
    /// Published coverage range, in percent
    pub coverage_min_pct: Decimal,
    pub coverage_max_pct: Decimal,
    /// Point estimate used by the platform (range midpoint)
    pub typical_pct: Decimal,
    pub required_documents: Vec<String>,
}

impl From<&InsurerGuideEntry> for CoverageGuideEntryResponse {
    fn from(entry: &InsurerGuideEntry) -> Self {
        Self {
            slug: entry.slug.to_string(),
            name: entry.name.to_string(),
            coverage_min_pct: entry.coverage_min.as_percentage(),
            coverage_max_pct: entry.coverage_max.as_percentage(),
            typical_pct: entry.point_estimate_rate().as_percentage(),
            required_documents: entry
                .required_documents
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}
