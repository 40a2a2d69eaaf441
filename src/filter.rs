// Availability filter: narrows the catalog to the units that satisfy every supplied criterion

use crate::criteria::FilterCriteria;
use crate::model::AccommodationUnit;

/// Keep the units matching `criteria`, in catalog order.
pub fn filter_catalog(
    catalog: &[AccommodationUnit],
    criteria: &FilterCriteria,
) -> Vec<AccommodationUnit> {
    filter_catalog_refs(catalog, criteria)
        .into_iter()
        .cloned()
        .collect()
}

/// Same as [`filter_catalog`] without cloning the survivors.
pub fn filter_catalog_refs<'a>(
    catalog: &'a [AccommodationUnit],
    criteria: &FilterCriteria,
) -> Vec<&'a AccommodationUnit> {
    let filtered: Vec<_> = catalog
        .iter()
        .filter(|unit| matches(unit, criteria))
        .collect();

    tracing::debug!(
        catalog = catalog.len(),
        matched = filtered.len(),
        "filtered catalog"
    );
    filtered
}

// Date containment, then capacity, then amenities.
pub fn matches(unit: &AccommodationUnit, criteria: &FilterCriteria) -> bool {
    if !available_for_stay(unit, criteria) {
        return false;
    }

    if !fits_guests(unit, criteria) {
        return false;
    }

    has_required_amenities(unit, criteria)
}

fn available_for_stay(unit: &AccommodationUnit, criteria: &FilterCriteria) -> bool {
    let Some((start, end)) = criteria.stay() else {
        return true;
    };
    unit.available_dates.is_empty()
        || unit
            .available_dates
            .iter()
            .any(|interval| interval.contains_stay(start, end))
}

fn fits_guests(unit: &AccommodationUnit, criteria: &FilterCriteria) -> bool {
    criteria
        .min_guests
        .filter(|guests| *guests > 0)
        .map_or(true, |guests| unit.capacity >= guests)
}

fn has_required_amenities(unit: &AccommodationUnit, criteria: &FilterCriteria) -> bool {
    criteria
        .amenities
        .iter()
        .all(|amenity| unit.amenities.has(*amenity))
}
