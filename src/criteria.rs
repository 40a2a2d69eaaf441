// Filter criteria and the tolerant conversion from raw search-form input

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{parse_day, Amenity};

// Range of days the search form accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindow {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl BookingWindow {
    pub fn calendar_year(year: i32) -> Option<Self> {
        Some(Self {
            first_day: NaiveDate::from_ymd_opt(year, 1, 1)?,
            last_day: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    pub fn unbounded() -> Self {
        Self {
            first_day: NaiveDate::MIN,
            last_day: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.first_day && day <= self.last_day
    }
}

impl Default for BookingWindow {
    fn default() -> Self {
        Self::calendar_year(2024).unwrap_or_else(Self::unbounded)
    }
}

/// Constraints applied by the availability filter.
///
/// Every field is optional. The date criterion only applies when both ends are
/// present, and a `min_guests` of zero imposes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_guests: Option<u32>,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_min_guests(mut self, guests: u32) -> Self {
        self.min_guests = Some(guests);
        self
    }

    pub fn requiring(mut self, amenity: Amenity) -> Self {
        self.amenities.insert(amenity);
        self
    }

    /// The requested stay, when both dates are known.
    pub fn stay(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.stay().is_none() && self.min_guests.unwrap_or(0) == 0 && self.amenities.is_empty()
    }

    /// Build criteria from raw form values, dropping any field that does not parse.
    pub fn from_input(input: &FilterInput, window: &BookingWindow) -> Self {
        let amenities = input
            .amenities
            .iter()
            .filter(|(_, selected)| **selected)
            .filter_map(|(key, _)| match key.parse::<Amenity>() {
                Ok(amenity) => Some(amenity),
                Err(_) => {
                    tracing::debug!(key = %key, "ignoring unknown amenity in search input");
                    None
                }
            })
            .collect();

        Self {
            start_date: parse_form_day("startDate", &input.start_date, window),
            end_date: parse_form_day("endDate", &input.end_date, window),
            min_guests: parse_guests(&input.num_guests),
            amenities,
        }
    }
}

// Search form values exactly as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterInput {
    pub start_date: String,
    pub end_date: String,
    pub num_guests: String,
    pub amenities: BTreeMap<String, bool>,
}

fn parse_form_day(field: &'static str, raw: &str, window: &BookingWindow) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }
    let Some(day) = parse_day(raw) else {
        tracing::debug!(field, raw, "ignoring unparsable date");
        return None;
    };
    if !window.contains(day) {
        tracing::debug!(field, %day, "ignoring date outside the booking window");
        return None;
    }
    Some(day)
}

fn parse_guests(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(guests) if guests > 0 => u32::try_from(guests).ok(),
        Ok(_) => None,
        Err(_) => {
            tracing::debug!(raw, "ignoring unparsable guest count");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(start: &str, end: &str, guests: &str) -> FilterInput {
        FilterInput {
            start_date: start.to_string(),
            end_date: end.to_string(),
            num_guests: guests.to_string(),
            amenities: BTreeMap::new(),
        }
    }

    #[test]
    fn test_default_window_is_2024() {
        let window = BookingWindow::default();
        assert_eq!(window.first_day, day(2024, 1, 1));
        assert_eq!(window.last_day, day(2024, 12, 31));
        assert!(window.contains(day(2024, 12, 31)));
        assert!(!window.contains(day(2025, 1, 1)));
    }

    #[test]
    fn test_empty_input_is_unconstrained() {
        let criteria = FilterCriteria::from_input(&FilterInput::default(), &BookingWindow::default());
        assert_eq!(criteria, FilterCriteria::default());
        assert!(criteria.is_unconstrained());
    }

    #[test]
    fn test_well_formed_input() {
        let mut raw = input("2024-06-09", "2024-06-11", "3");
        raw.amenities.insert("pool".to_string(), true);
        raw.amenities.insert("wifi".to_string(), false);

        let criteria = FilterCriteria::from_input(&raw, &BookingWindow::default());
        assert_eq!(criteria.stay(), Some((day(2024, 6, 9), day(2024, 6, 11))));
        assert_eq!(criteria.min_guests, Some(3));
        assert_eq!(criteria.amenities, BTreeSet::from([Amenity::Pool]));
    }

    #[test_case("not-a-date", "2024-06-11"; "malformed start")]
    #[test_case("2024-06-09", "2024-02-30"; "impossible end")]
    #[test_case("2023-12-30", "2024-01-02"; "start before window")]
    #[test_case("2024-12-30", "2025-01-02"; "end after window")]
    fn test_bad_date_drops_only_that_field(start: &str, end: &str) {
        let criteria =
            FilterCriteria::from_input(&input(start, end, "2"), &BookingWindow::default());
        assert!(criteria.stay().is_none());
        assert_eq!(criteria.min_guests, Some(2));
    }

    #[test_case("", None; "empty")]
    #[test_case(" 4 ", Some(4); "padded")]
    #[test_case("0", None; "zero")]
    #[test_case("-2", None; "negative")]
    #[test_case("two", None; "words")]
    #[test_case("2.5", None; "fractional")]
    fn test_guest_parsing(raw: &str, expected: Option<u32>) {
        let criteria = FilterCriteria::from_input(&input("", "", raw), &BookingWindow::default());
        assert_eq!(criteria.min_guests, expected);
    }

    #[test]
    fn test_unknown_amenity_is_ignored() {
        let mut raw = FilterInput::default();
        raw.amenities.insert("jacuzzi".to_string(), true);
        raw.amenities.insert("airConditioning".to_string(), true);

        let criteria = FilterCriteria::from_input(&raw, &BookingWindow::default());
        assert_eq!(criteria.amenities, BTreeSet::from([Amenity::AirConditioning]));
    }

    #[test]
    fn test_inverted_dates_pass_through() {
        let criteria = FilterCriteria::from_input(
            &input("2024-06-20", "2024-06-10", ""),
            &BookingWindow::default(),
        );
        assert_eq!(criteria.stay(), Some((day(2024, 6, 20), day(2024, 6, 10))));
    }

    #[test]
    fn test_unbounded_window_accepts_any_year() {
        let criteria = FilterCriteria::from_input(
            &input("2031-03-01", "2031-03-04", ""),
            &BookingWindow::unbounded(),
        );
        assert_eq!(criteria.stay(), Some((day(2031, 3, 1), day(2031, 3, 4))));
    }

    #[test]
    fn test_deserialize_form_json() {
        let raw: FilterInput = serde_json::from_str(
            r#"{"startDate": "2024-07-01", "numGuests": "2", "amenities": {"tv": true}}"#,
        )
        .unwrap();
        assert_eq!(raw.end_date, "");
        let criteria = FilterCriteria::from_input(&raw, &BookingWindow::default());
        assert_eq!(criteria.start_date, Some(day(2024, 7, 1)));
        assert!(criteria.end_date.is_none());
        assert!(criteria.stay().is_none());
    }
}
