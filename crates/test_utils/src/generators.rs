//! Proptest strategies for domain values

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use core_kernel::{CoverageProfile, FonasaTramo, HealthSystem, InsurerId, Money};
use domain_billing::SubscriptionTier;

/// Any of the three subscription tiers
pub fn tier_strategy() -> impl Strategy<Value = SubscriptionTier> {
    prop_oneof![
        Just(SubscriptionTier::Starter),
        Just(SubscriptionTier::Pro),
        Just(SubscriptionTier::Premium),
    ]
}

/// Positive CLP session prices, up to an implausibly expensive session
pub fn session_price_strategy() -> impl Strategy<Value = Money> {
    (1i64..10_000_000i64).prop_map(Money::pesos)
}

/// Any health system
pub fn health_system_strategy() -> impl Strategy<Value = HealthSystem> {
    prop_oneof![
        Just(HealthSystem::Isapre),
        Just(HealthSystem::Fonasa),
        Just(HealthSystem::Private),
    ]
}

/// Coverage profiles spanning listed and unlisted isapres, all Fonasa
/// tramos, and private payers
pub fn coverage_profile_strategy() -> impl Strategy<Value = CoverageProfile> {
    prop_oneof![
        Just(CoverageProfile::private()),
        fonasa_tramo_strategy().prop_map(CoverageProfile::fonasa),
        prop_oneof![
            Just("banmedica"),
            Just("colmena"),
            Just("cruz-blanca"),
            Just("consalud"),
            Just("vida-tres"),
            Just("nueva-masvida"),
            Just("esencial"),
            Just("unlisted-isapre"),
        ]
        .prop_map(|slug| CoverageProfile::isapre(InsurerId::new(), slug)),
    ]
}

pub fn fonasa_tramo_strategy() -> impl Strategy<Value = FonasaTramo> {
    prop_oneof![
        Just(FonasaTramo::A),
        Just(FonasaTramo::B),
        Just(FonasaTramo::C),
        Just(FonasaTramo::D),
    ]
}

/// Session start times inside January 2025, Chilean local time
/// (UTC-3 in summer, so 12:00-23:00 UTC keeps the local date)
pub fn january_session_time_strategy() -> impl Strategy<Value = chrono::DateTime<Utc>> {
    (1u32..=31u32, 12u32..23u32).prop_map(|(day, hour)| {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    })
}
