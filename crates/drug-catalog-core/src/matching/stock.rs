//! Stock depletion estimates and dosage-text parsing.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Rgb;

/// Below this many days of supply the stock is critical.
pub const CRITICAL_DAYS: u64 = 3;
/// Below this many days of supply the stock needs attention.
pub const WARNING_DAYS: u64 = 7;

/// Severity bucket for remaining supply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SupplyTier {
    Critical,
    Warning,
    Healthy,
}

impl SupplyTier {
    pub fn from_days(days: u64) -> Self {
        if days < CRITICAL_DAYS {
            SupplyTier::Critical
        } else if days < WARNING_DAYS {
            SupplyTier::Warning
        } else {
            SupplyTier::Healthy
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            SupplyTier::Critical => Rgb::LIGHT_CORAL,
            SupplyTier::Warning => Rgb::LIGHT_YELLOW,
            SupplyTier::Healthy => Rgb::LIGHT_GREEN,
        }
    }
}

/// Outcome of the dosage calculator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum SupplyEstimate {
    /// Nothing on hand
    EmptyStock,
    /// Dose or frequency is zero or negative, so consumption can't be computed
    InsufficientInput,
    /// Whole days of supply left
    Lasts {
        days: u64,
        tier: SupplyTier,
        runs_out_on: NaiveDate,
    },
}

impl SupplyEstimate {
    pub fn days(&self) -> Option<u64> {
        match self {
            SupplyEstimate::Lasts { days, .. } => Some(*days),
            _ => None,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            SupplyEstimate::EmptyStock => Rgb::LIGHT_CORAL,
            SupplyEstimate::InsufficientInput => Rgb::LIGHT_GREEN,
            SupplyEstimate::Lasts { tier, .. } => tier.color(),
        }
    }
}

/// Full days of supply: `floor(quantity / (dose * times_per_day))`.
pub fn estimate_supply(quantity: u32, dose: f64, times_per_day: f64, today: NaiveDate) -> SupplyEstimate {
    if quantity == 0 {
        return SupplyEstimate::EmptyStock;
    }
    if !(dose.is_finite() && times_per_day.is_finite()) || dose <= 0.0 || times_per_day <= 0.0 {
        return SupplyEstimate::InsufficientInput;
    }

    let daily = dose * times_per_day;
    let days = (f64::from(quantity) / daily).floor() as u64;
    let runs_out_on = today
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX);

    SupplyEstimate::Lasts {
        days,
        tier: SupplyTier::from_days(days),
        runs_out_on,
    }
}

/// Units to deduct for a free-text dosage such as "2 tablets" or "1,5 ml".
///
/// Reads the first whitespace-separated token, accepting a comma as decimal
/// separator, and rounds up. Anything unparseable or non-positive yields 0.
pub fn parse_dosage_amount(dosage: &str) -> u32 {
    let Some(token) = dosage.split_whitespace().next() else {
        return 0;
    };

    match token.replace(',', ".").parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => {
            amount.ceil().min(f64::from(u32::MAX)) as u32
        }
        _ => 0,
    }
}
