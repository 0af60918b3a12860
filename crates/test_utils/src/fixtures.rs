//! Test fixtures
//!
//! Common constants for tests: typical session prices, the reference
//! period most scenarios use, and stable identifiers.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Money, MonthPeriod, PatientId, ProfessionalId};
use once_cell::sync::Lazy;

/// Money amounts that show up across test scenarios
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Typical online session price
    pub fn session_price() -> Money {
        Money::pesos(45000)
    }

    /// Lower in-person price used for Fonasa scenarios
    pub fn fonasa_session_price() -> Money {
        Money::pesos(25000)
    }

    /// Isapre-partition price used in report scenarios
    pub fn isapre_session_price() -> Money {
        Money::pesos(30000)
    }
}

/// Dates and periods for tests
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The reference period most scenarios run in
    pub fn january() -> MonthPeriod {
        MonthPeriod::new(2025, 1).unwrap()
    }

    /// Mid-January session time (17:00 Santiago = 20:00 UTC)
    pub fn mid_january_session() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 20, 0, 0).unwrap()
    }

    /// Issue date at the end of the reference period
    pub fn january_issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }
}

static PATIENT: Lazy<PatientId> = Lazy::new(PatientId::new);
static PROFESSIONAL: Lazy<ProfessionalId> = Lazy::new(ProfessionalId::new);

/// Stable identifiers shared within a test process
pub struct IdFixtures;

impl IdFixtures {
    pub fn patient() -> PatientId {
        *PATIENT
    }

    pub fn professional() -> ProfessionalId {
        *PROFESSIONAL
    }
}
