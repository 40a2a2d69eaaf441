// Presentation-facing view of a search: listing cards and the reservation summary

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::criteria::FilterCriteria;
use crate::filter::filter_catalog_refs;
use crate::model::{AccommodationUnit, Amenity, UnitId};
use crate::pricing::{price_range, PriceCalculator, PriceRange, PricingError, StayQuote};

// What a listing card shows in its price slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PriceDisplay {
    /// No stay chosen yet.
    Range(PriceRange),
    /// No stay chosen and the unit has no price list.
    NotPriced,
    Total(StayQuote),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: UnitId,
    pub title: String,
    pub image: String,
    pub capacity: u32,
    pub beach_distance_meters: Option<f64>,
    pub amenities: Vec<(Amenity, bool)>,
    pub price: PriceDisplay,
}

impl ListingView {
    pub fn build(
        unit: &AccommodationUnit,
        stay: Option<(NaiveDate, NaiveDate)>,
        calculator: &PriceCalculator,
    ) -> Self {
        let price = match stay {
            Some((start, end)) => match calculator.price_stay(unit, start, end) {
                Ok(quote) => PriceDisplay::Total(quote),
                Err(err) => PriceDisplay::Unavailable {
                    reason: err.to_string(),
                },
            },
            None => price_range(unit).map_or(PriceDisplay::NotPriced, PriceDisplay::Range),
        };

        Self {
            id: unit.id.clone(),
            title: unit.title.clone(),
            image: unit.image.clone(),
            capacity: unit.capacity,
            beach_distance_meters: unit.beach_distance_meters,
            amenities: unit.amenities.flags().collect(),
            price,
        }
    }

    pub fn quote(&self) -> Option<&StayQuote> {
        match &self.price {
            PriceDisplay::Total(quote) => Some(quote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub listings: Vec<ListingView>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn find(&self, id: &UnitId) -> Option<&ListingView> {
        self.listings.iter().find(|listing| &listing.id == id)
    }
}

/// Filter the catalog and build a card for every surviving unit.
///
/// Each card is priced for its own unit when the criteria carry a full stay.
pub fn search(
    catalog: &[AccommodationUnit],
    criteria: &FilterCriteria,
    calculator: &PriceCalculator,
) -> SearchResults {
    let stay = criteria.stay();
    let listings = filter_catalog_refs(catalog, criteria)
        .into_iter()
        .map(|unit| ListingView::build(unit, stay, calculator))
        .collect();
    SearchResults { listings }
}

// Confirmation shown once a unit is reserved. Nothing is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    pub unit_id: UnitId,
    pub title: String,
    pub image: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: Decimal,
}

impl ReservationSummary {
    pub fn prepare(unit: &AccommodationUnit, quote: &StayQuote) -> Self {
        Self {
            unit_id: unit.id.clone(),
            title: unit.title.clone(),
            image: unit.image.clone(),
            start_date: quote.start_date,
            end_date: quote.end_date,
            total: quote.total,
        }
    }

    /// Price the stay and build the summary in one step.
    pub fn for_stay(
        unit: &AccommodationUnit,
        start: NaiveDate,
        end: NaiveDate,
        calculator: &PriceCalculator,
    ) -> Result<Self, PricingError> {
        let quote = calculator.price_stay(unit, start, end)?;
        Ok(Self::prepare(unit, &quote))
    }
}

impl fmt::Display for ReservationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Thank you for your reservation!")?;
        writeln!(f, "Reservation for {} successfully completed!", self.title)?;
        writeln!(f, "Chosen Dates: {} - {}", self.start_date, self.end_date)?;
        write!(f, "Total Price: {} €", self.total)
    }
}
