//! Shared health-system vocabulary
//!
//! Chilean patients are covered by an Isapre (private insurer), Fonasa
//! (the public fund), or pay privately with no insurer relationship.
//! Billing snapshots, reimbursement estimation, and monthly reporting all
//! partition on this enum, so it lives in the kernel.

use serde::{Deserialize, Serialize};

use crate::identifiers::InsurerId;

/// A patient's health coverage system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthSystem {
    /// Private Chilean health insurer
    Isapre,
    /// Public health insurance fund
    Fonasa,
    /// No insurer relationship (also models "unset")
    Private,
}

/// Fonasa income-based beneficiary tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FonasaTramo {
    A,
    B,
    C,
    D,
}

/// Snapshot of a patient's coverage at a point in time
///
/// Reimbursement requests and invoices store this snapshot rather than
/// re-reading the live profile, so historical records stay reproducible
/// when a patient changes insurer. The insurer slug keys the static
/// coverage guide table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageProfile {
    pub health_system: HealthSystem,
    /// Set only for Isapre coverage
    pub insurer_id: Option<InsurerId>,
    /// Guide-table key for the insurer, e.g. "colmena"
    pub insurer_slug: Option<String>,
    /// Set only for Fonasa coverage
    pub tramo: Option<FonasaTramo>,
}

impl CoverageProfile {
    pub fn isapre(insurer_id: InsurerId, slug: impl Into<String>) -> Self {
        Self {
            health_system: HealthSystem::Isapre,
            insurer_id: Some(insurer_id),
            insurer_slug: Some(slug.into()),
            tramo: None,
        }
    }

    pub fn fonasa(tramo: FonasaTramo) -> Self {
        Self {
            health_system: HealthSystem::Fonasa,
            insurer_id: None,
            insurer_slug: None,
            tramo: Some(tramo),
        }
    }

    pub fn private() -> Self {
        Self {
            health_system: HealthSystem::Private,
            insurer_id: None,
            insurer_slug: None,
            tramo: None,
        }
    }
}
