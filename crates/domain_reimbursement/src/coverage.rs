//! Insurer coverage guide and the reimbursement estimator
//!
//! The guide is static reference data: per insurer, the documents the
//! insurer asks for and the coverage percentage range it publishes for
//! out-of-network psychotherapy. The estimator turns that range into a
//! single deterministic point estimate (the midpoint).
//!
//! Fonasa has no retroactive reimbursement in the real world (the bono is
//! pre-authorised), so Fonasa estimates are either suppressed or computed
//! as an explicitly illustrative figure, depending on configuration.

use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ReimbursementError;
use core_kernel::{CoverageProfile, FonasaTramo, HealthSystem, Money, Rate};

/// Guide entry for one insurer
#[derive(Debug, Clone, Serialize)]
pub struct InsurerGuideEntry {
    /// Stable key, e.g. "colmena"
    pub slug: &'static str,
    /// Display name
    pub name: &'static str,
    /// Lower bound of the published coverage range
    pub coverage_min: Rate,
    /// Upper bound of the published coverage range
    pub coverage_max: Rate,
    /// Documents the insurer requires with a claim
    pub required_documents: &'static [&'static str],
}

impl InsurerGuideEntry {
    /// The deterministic point estimate for this insurer: the midpoint of
    /// the published range
    pub fn point_estimate_rate(&self) -> Rate {
        Rate::new((self.coverage_min.as_decimal() + self.coverage_max.as_decimal()) / dec!(2))
    }
}

/// The static per-insurer coverage table
#[derive(Debug, Clone)]
pub struct CoverageGuide {
    entries: Vec<InsurerGuideEntry>,
}

impl CoverageGuide {
    pub fn lookup(&self, slug: &str) -> Option<&InsurerGuideEntry> {
        self.entries.iter().find(|e| e.slug == slug)
    }

    pub fn entries(&self) -> &[InsurerGuideEntry] {
        &self.entries
    }
}

static GUIDE: Lazy<CoverageGuide> = Lazy::new(|| {
    const BOLETA_AND_REPORT: &[&str] = &["boleta de honorarios", "informe de atención"];
    const WITH_REFERRAL: &[&str] = &[
        "boleta de honorarios",
        "informe de atención",
        "orden médica",
    ];

    CoverageGuide {
        entries: vec![
            InsurerGuideEntry {
                slug: "banmedica",
                name: "Banmédica",
                coverage_min: Rate::new(dec!(0.40)),
                coverage_max: Rate::new(dec!(0.70)),
                required_documents: BOLETA_AND_REPORT,
            },
            InsurerGuideEntry {
                slug: "colmena",
                name: "Colmena Golden Cross",
                coverage_min: Rate::new(dec!(0.45)),
                coverage_max: Rate::new(dec!(0.70)),
                required_documents: WITH_REFERRAL,
            },
            InsurerGuideEntry {
                slug: "cruz-blanca",
                name: "Cruz Blanca",
                coverage_min: Rate::new(dec!(0.40)),
                coverage_max: Rate::new(dec!(0.65)),
                required_documents: BOLETA_AND_REPORT,
            },
            InsurerGuideEntry {
                slug: "consalud",
                name: "Consalud",
                coverage_min: Rate::new(dec!(0.40)),
                coverage_max: Rate::new(dec!(0.60)),
                required_documents: WITH_REFERRAL,
            },
            InsurerGuideEntry {
                slug: "vida-tres",
                name: "Vida Tres",
                coverage_min: Rate::new(dec!(0.45)),
                coverage_max: Rate::new(dec!(0.65)),
                required_documents: BOLETA_AND_REPORT,
            },
            InsurerGuideEntry {
                slug: "nueva-masvida",
                name: "Nueva Masvida",
                coverage_min: Rate::new(dec!(0.40)),
                coverage_max: Rate::new(dec!(0.60)),
                required_documents: BOLETA_AND_REPORT,
            },
            InsurerGuideEntry {
                slug: "esencial",
                name: "Esencial",
                coverage_min: Rate::new(dec!(0.35)),
                coverage_max: Rate::new(dec!(0.55)),
                required_documents: WITH_REFERRAL,
            },
        ],
    }
});

/// Returns the static coverage guide
pub fn coverage_guide() -> &'static CoverageGuide {
    &GUIDE
}

/// Fallback rate when the patient's Isapre is unknown or unlisted
fn default_isapre_rate() -> Rate {
    Rate::new(dec!(0.55))
}

/// Illustrative Fonasa rate for tramos B-D (tramo A is not eligible for
/// libre elección, so it estimates zero)
fn fonasa_illustrative_rate() -> Rate {
    Rate::new(dec!(0.50))
}

/// How Fonasa estimates are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FonasaEstimateMode {
    /// Compute a nominal figure, labelled illustrative
    #[default]
    Illustrative,
    /// Do not estimate; Fonasa has no retroactive reimbursement
    Suppressed,
}

/// Estimator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EstimatorConfig {
    pub fonasa_mode: FonasaEstimateMode,
}

/// What an estimate is based on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimateBasis {
    /// Midpoint of the insurer's published coverage range
    CoverageTable,
    /// Nominal Fonasa figure for display only; the real-world bono is
    /// pre-authorised, not retroactive
    IllustrativeOnly,
    /// No insurer relationship; reimbursement is always zero
    NotApplicable,
    /// Estimation suppressed by configuration
    NotEstimable,
}

/// A reimbursement estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub amount: Money,
    pub basis: EstimateBasis,
}

/// Estimates the reimbursement for a claim total
///
/// Pure function of its inputs and the static guide. The result is always
/// within `[0, gross_total]`.
pub fn estimate_reimbursement(
    gross_total: Money,
    profile: &CoverageProfile,
    guide: &CoverageGuide,
    config: &EstimatorConfig,
) -> Result<Estimate, ReimbursementError> {
    if gross_total.is_negative() {
        return Err(ReimbursementError::Validation(format!(
            "gross total must not be negative, got {gross_total}"
        )));
    }

    let estimate = match profile.health_system {
        HealthSystem::Private => Estimate {
            amount: Money::zero(gross_total.currency()),
            basis: EstimateBasis::NotApplicable,
        },
        HealthSystem::Isapre => {
            let rate = profile
                .insurer_slug
                .as_deref()
                .and_then(|slug| guide.lookup(slug))
                .map(|entry| entry.point_estimate_rate())
                .unwrap_or_else(default_isapre_rate);
            Estimate {
                amount: rate.apply(&gross_total),
                basis: EstimateBasis::CoverageTable,
            }
        }
        HealthSystem::Fonasa => match config.fonasa_mode {
            FonasaEstimateMode::Suppressed => Estimate {
                amount: Money::zero(gross_total.currency()),
                basis: EstimateBasis::NotEstimable,
            },
            FonasaEstimateMode::Illustrative => {
                let rate = match profile.tramo {
                    Some(FonasaTramo::A) => Rate::new(dec!(0)),
                    _ => fonasa_illustrative_rate(),
                };
                Estimate {
                    amount: rate.apply(&gross_total),
                    basis: EstimateBasis::IllustrativeOnly,
                }
            }
        },
    };

    Ok(estimate)
}
