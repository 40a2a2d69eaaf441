// Accommodation catalog data model shared by the availability filter and the price calculator

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// Fixed amenity enumeration, in the order the search form lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Amenity {
    ParkingSpace,
    Pets,
    AirConditioning,
    Pool,
    Wifi,
    Tv,
}

impl Amenity {
    pub const ALL: [Amenity; 6] = [
        Amenity::ParkingSpace,
        Amenity::Pets,
        Amenity::AirConditioning,
        Amenity::Pool,
        Amenity::Wifi,
        Amenity::Tv,
    ];

    /// Key used by the listing feed and the search form.
    pub fn key(self) -> &'static str {
        match self {
            Amenity::ParkingSpace => "parkingSpace",
            Amenity::Pets => "pets",
            Amenity::AirConditioning => "airConditioning",
            Amenity::Pool => "pool",
            Amenity::Wifi => "wifi",
            Amenity::Tv => "tv",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Amenity::ParkingSpace => "Parking Space",
            Amenity::Pets => "Pets",
            Amenity::AirConditioning => "Air Conditioning",
            Amenity::Pool => "Pool",
            Amenity::Wifi => "Wifi",
            Amenity::Tv => "TV",
        }
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown amenity: {0}")]
pub struct UnknownAmenity(pub String);

impl FromStr for Amenity {
    type Err = UnknownAmenity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amenity::ALL
            .into_iter()
            .find(|amenity| amenity.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAmenity(s.to_string()))
    }
}

// Amenity flags of a unit. Keys outside the enumeration are dropped on the way in,
// missing keys read as false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, bool>", into = "BTreeMap<String, bool>")]
pub struct Amenities(BTreeMap<Amenity, bool>);

impl Amenities {
    pub fn has(&self, amenity: Amenity) -> bool {
        self.0.get(&amenity).copied().unwrap_or(false)
    }

    pub fn set(&mut self, amenity: Amenity, present: bool) {
        self.0.insert(amenity, present);
    }

    /// Every amenity of the enumeration with its flag, in display order.
    pub fn flags(&self) -> impl Iterator<Item = (Amenity, bool)> + '_ {
        Amenity::ALL
            .into_iter()
            .map(move |amenity| (amenity, self.has(amenity)))
    }
}

impl FromIterator<Amenity> for Amenities {
    fn from_iter<I: IntoIterator<Item = Amenity>>(iter: I) -> Self {
        Amenities(iter.into_iter().map(|amenity| (amenity, true)).collect())
    }
}

impl From<BTreeMap<String, bool>> for Amenities {
    fn from(raw: BTreeMap<String, bool>) -> Self {
        let mut flags = BTreeMap::new();
        for (key, present) in raw {
            match key.parse::<Amenity>() {
                Ok(amenity) => {
                    flags.insert(amenity, present);
                }
                Err(_) => tracing::debug!(key = %key, "ignoring unknown amenity key"),
            }
        }
        Amenities(flags)
    }
}

impl From<Amenities> for BTreeMap<String, bool> {
    fn from(amenities: Amenities) -> Self {
        amenities
            .0
            .into_iter()
            .map(|(amenity, present)| (amenity.key().to_string(), present))
            .collect()
    }
}

// Opaque unit identifier; the feed sends numbers, other sources send strings
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        UnitId(value.to_string())
    }
}

impl From<String> for UnitId {
    fn from(value: String) -> Self {
        UnitId(value)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UnitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Number(number) => UnitId(number.to_string()),
            WireId::Text(text) => UnitId(text),
        })
    }
}

/// Parse a calendar day, dropping any time-of-day component.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times (the day is taken in the value's own
/// offset) and naive `YYYY-MM-DDTHH:MM:SS[.fff]`. Returns `None` for anything else.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|moment| moment.date())
}

fn deserialize_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognised date `{raw}`")))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// Availability window, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    #[serde(rename = "intervalStart", alias = "start", deserialize_with = "deserialize_day")]
    pub start: NaiveDate,
    #[serde(rename = "intervalEnd", alias = "end", deserialize_with = "deserialize_day")]
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains_stay(&self, stay_start: NaiveDate, stay_end: NaiveDate) -> bool {
        stay_start >= self.start && stay_end <= self.end
    }
}

// Nightly rate window, end-exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInterval {
    #[serde(rename = "intervalStart", alias = "start", deserialize_with = "deserialize_day")]
    pub start: NaiveDate,
    #[serde(rename = "intervalEnd", alias = "end", deserialize_with = "deserialize_day")]
    pub end: NaiveDate,
    #[serde(rename = "pricePerNight")]
    pub price_per_night: Decimal,
}

impl PriceInterval {
    pub fn new(start: NaiveDate, end: NaiveDate, price_per_night: Decimal) -> Self {
        Self {
            start,
            end,
            price_per_night,
        }
    }

    pub fn covers_night(&self, night: NaiveDate) -> bool {
        night >= self.start && night < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationUnit {
    pub id: UnitId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    pub capacity: u32,
    #[serde(
        default,
        rename = "beachDistanceInMeters",
        skip_serializing_if = "Option::is_none"
    )]
    pub beach_distance_meters: Option<f64>,
    #[serde(default)]
    pub amenities: Amenities,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub available_dates: Vec<DateInterval>,
    #[serde(
        default,
        rename = "pricelistInEuros",
        alias = "priceList",
        deserialize_with = "null_as_empty"
    )]
    pub price_list: Vec<PriceInterval>,
}

// Data-model violations. Reported, never required by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("capacity must be at least 1")]
    ZeroCapacity,

    #[error("beach distance must not be negative")]
    NegativeBeachDistance,

    #[error("price list is empty")]
    EmptyPriceList,

    #[error("availability interval #{index} ends before it starts")]
    InvertedAvailability { index: usize },

    #[error("price interval #{index} ends before it starts")]
    InvertedPriceInterval { index: usize },

    #[error("price interval #{index} has a negative nightly rate")]
    NegativeRate { index: usize },
}

impl AccommodationUnit {
    pub fn new(id: impl Into<UnitId>, title: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: String::new(),
            capacity,
            beach_distance_meters: None,
            amenities: Amenities::default(),
            available_dates: Vec::new(),
            price_list: Vec::new(),
        }
    }

    pub fn with_availability(mut self, intervals: Vec<DateInterval>) -> Self {
        self.available_dates = intervals;
        self
    }

    pub fn with_prices(mut self, intervals: Vec<PriceInterval>) -> Self {
        self.price_list = intervals;
        self
    }

    pub fn with_amenities(mut self, amenities: impl IntoIterator<Item = Amenity>) -> Self {
        self.amenities = amenities.into_iter().collect();
        self
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        if self.capacity == 0 {
            issues.push(ValidationIssue::ZeroCapacity);
        }
        if self.beach_distance_meters.is_some_and(|meters| meters < 0.0) {
            issues.push(ValidationIssue::NegativeBeachDistance);
        }
        if self.price_list.is_empty() {
            issues.push(ValidationIssue::EmptyPriceList);
        }
        for (index, interval) in self.available_dates.iter().enumerate() {
            if interval.end < interval.start {
                issues.push(ValidationIssue::InvertedAvailability { index });
            }
        }
        for (index, interval) in self.price_list.iter().enumerate() {
            if interval.end < interval.start {
                issues.push(ValidationIssue::InvertedPriceInterval { index });
            }
            if interval.price_per_night < Decimal::ZERO {
                issues.push(ValidationIssue::NegativeRate { index });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Collect the validation issues of every unit in the catalog.
pub fn validate_catalog(catalog: &[AccommodationUnit]) -> Vec<(UnitId, ValidationIssue)> {
    catalog
        .iter()
        .filter_map(|unit| unit.validate().err().map(|issues| (unit, issues)))
        .flat_map(|(unit, issues)| issues.into_iter().map(move |issue| (unit.id.clone(), issue)))
        .collect()
}
