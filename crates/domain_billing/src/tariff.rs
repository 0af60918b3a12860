//! Commission tariffs and the money split calculator
//!
//! Rates are versioned, effective-dated configuration rather than
//! hard-coded constants: every lookup is keyed by the payment or invoice
//! date, so a historical payment reproduces the same split even after the
//! tariff changes. The legacy 11.4% Pro commission lives in the schedule
//! effective before July 2024; the canonical 8% applies from then on.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use core_kernel::{Money, Rate};

/// A professional's subscription tier, which determines the platform's
/// commission on each session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionTier {
    Starter,
    Pro,
    Premium,
}

/// A versioned set of rates, effective from a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// First date (inclusive) on which this schedule applies
    pub effective_from: NaiveDate,
    pub starter_commission: Rate,
    pub pro_commission: Rate,
    pub premium_commission: Rate,
    /// Mandatory SII withholding on independent professional income
    pub sii_retention: Rate,
}

impl RateSchedule {
    /// Commission rate for the given tier
    pub fn commission_for(&self, tier: SubscriptionTier) -> Rate {
        match tier {
            SubscriptionTier::Starter => self.starter_commission,
            SubscriptionTier::Pro => self.pro_commission,
            SubscriptionTier::Premium => self.premium_commission,
        }
    }
}

/// The ordered history of rate schedules
///
/// Schedules are kept sorted by effective date; `schedule_for` returns the
/// latest schedule effective on or before the given date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateBook {
    schedules: Vec<RateSchedule>,
}

impl RateBook {
    /// Builds a rate book from a set of schedules
    pub fn new(mut schedules: Vec<RateSchedule>) -> Self {
        schedules.sort_by_key(|s| s.effective_from);
        Self { schedules }
    }

    /// The platform's rate history
    ///
    /// The pre-2024-07 schedule carries the legacy 11.4% Pro commission;
    /// payments from that era must keep reproducing it.
    pub fn chilean() -> Self {
        Self::new(vec![
            RateSchedule {
                effective_from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                starter_commission: Rate::new(dec!(0.12)),
                pro_commission: Rate::new(dec!(0.114)),
                premium_commission: Rate::new(dec!(0.05)),
                sii_retention: Rate::new(dec!(0.1525)),
            },
            RateSchedule {
                effective_from: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                starter_commission: Rate::new(dec!(0.12)),
                pro_commission: Rate::new(dec!(0.08)),
                premium_commission: Rate::new(dec!(0.05)),
                sii_retention: Rate::new(dec!(0.1525)),
            },
        ])
    }

    /// Returns the schedule effective on the given date
    pub fn schedule_for(&self, date: NaiveDate) -> Result<&RateSchedule, BillingError> {
        self.schedules
            .iter()
            .rev()
            .find(|s| s.effective_from <= date)
            .ok_or_else(|| BillingError::NoEffectiveSchedule {
                date: date.to_string(),
            })
    }
}

impl Default for RateBook {
    fn default() -> Self {
        Self::chilean()
    }
}

/// Payment-level split: the platform's commission and what the
/// professional is credited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub gross: Money,
    pub commission: Money,
    /// gross - commission
    pub net: Money,
}

/// Invoice-level split: the SII retention and the boleta's net
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSplit {
    pub gross: Money,
    pub sii_retention: Money,
    /// gross - sii_retention; commission is never subtracted here
    pub net: Money,
}

/// Computes the payment-level split for a session price
///
/// `commission = round_half_up(gross * rate)`, `net = gross - commission`,
/// so `commission + net == gross` always holds.
pub fn compute_split(
    gross: Money,
    tier: SubscriptionTier,
    date: NaiveDate,
    rates: &RateBook,
) -> Result<PaymentSplit, BillingError> {
    validate_gross(gross)?;
    let schedule = rates.schedule_for(date)?;
    let commission = schedule.commission_for(tier).apply(&gross);
    Ok(PaymentSplit {
        gross,
        commission,
        net: gross - commission,
    })
}

/// Computes the invoice-level split for a boleta
pub fn compute_invoice_split(
    gross: Money,
    date: NaiveDate,
    rates: &RateBook,
) -> Result<InvoiceSplit, BillingError> {
    validate_gross(gross)?;
    let schedule = rates.schedule_for(date)?;
    let sii_retention = schedule.sii_retention.apply(&gross);
    Ok(InvoiceSplit {
        gross,
        sii_retention,
        net: gross - sii_retention,
    })
}

fn validate_gross(gross: Money) -> Result<(), BillingError> {
    if !gross.is_positive() {
        return Err(BillingError::InvalidGrossAmount(format!(
            "gross must be positive, got {}",
            gross
        )));
    }
    Ok(())
}
