// Stay pricing over a unit's piecewise nightly price list
//
// Every night from the first day up to and including the last day is charged at
// the rate of the first price interval (in list order) whose half-open
// [start, end) range covers it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AccommodationUnit, UnitId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("No nightly rate covers {date}")]
    PricingGap { date: NaiveDate },

    #[error("Stay ends on {end}, before it starts on {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Stay of {nights} nights exceeds the limit of {max}")]
    StayTooLong { nights: i64, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub max_nights: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { max_nights: 366 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightlyCharge {
    pub date: NaiveDate,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayQuote {
    pub unit_id: UnitId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub nights: Vec<NightlyCharge>,
    pub total: Decimal,
}

impl StayQuote {
    pub fn night_count(&self) -> usize {
        self.nights.len()
    }

    pub fn average_nightly_rate(&self) -> Decimal {
        if self.nights.is_empty() {
            return Decimal::ZERO;
        }
        self.total / Decimal::from(self.nights.len())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceCalculator {
    config: PricingConfig,
}

impl PriceCalculator {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price the stay from `start` through `end`, both days charged.
    ///
    /// Fails on the first night that no price interval covers instead of
    /// returning a partial total.
    pub fn price_stay(
        &self,
        unit: &AccommodationUnit,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<StayQuote, PricingError> {
        if end < start {
            return Err(PricingError::InvalidRange { start, end });
        }

        let night_count = (end - start).num_days() + 1;
        if night_count > i64::from(self.config.max_nights) {
            return Err(PricingError::StayTooLong {
                nights: night_count,
                max: self.config.max_nights,
            });
        }

        let mut nights = Vec::with_capacity(usize::try_from(night_count).unwrap_or_default());
        let mut total = Decimal::ZERO;

        for night in start.iter_days().take_while(|night| *night <= end) {
            let Some(rate) = nightly_rate_at(unit, night) else {
                tracing::debug!(unit_id = %unit.id, date = %night, "night has no rate");
                return Err(PricingError::PricingGap { date: night });
            };
            total += rate;
            nights.push(NightlyCharge { date: night, rate });
        }

        tracing::trace!(unit_id = %unit.id, nights = nights.len(), %total, "priced stay");

        Ok(StayQuote {
            unit_id: unit.id.clone(),
            start_date: start,
            end_date: end,
            nights,
            total,
        })
    }
}

/// Price a stay with the default limits.
pub fn price_stay(
    unit: &AccommodationUnit,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<StayQuote, PricingError> {
    PriceCalculator::default().price_stay(unit, start, end)
}

/// Rate charged for `night`: the first interval in list order wins on overlap.
pub fn nightly_rate_at(unit: &AccommodationUnit, night: NaiveDate) -> Option<Decimal> {
    unit.price_list
        .iter()
        .find(|interval| interval.covers_night(night))
        .map(|interval| interval.price_per_night)
}

/// Cheapest and dearest nightly rate anywhere in the price list.
pub fn price_range(unit: &AccommodationUnit) -> Option<PriceRange> {
    let mut rates = unit.price_list.iter().map(|interval| interval.price_per_night);
    let first = rates.next()?;
    Some(rates.fold(PriceRange { min: first, max: first }, |range, rate| PriceRange {
        min: range.min.min(rate),
        max: range.max.max(rate),
    }))
}
