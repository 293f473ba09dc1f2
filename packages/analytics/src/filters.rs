//! Simple attribute filters used alongside the statistical passes.

use std::cmp::Ordering;

use acquisitions_analytics_models::{LargeLandCriteria, LargeLandResult};
use acquisitions_geography::distance_miles;
use acquisitions_geography_models::GeoPoint;
use acquisitions_parcel_models::{Parcel, normalize_subdivision};

/// Parcels in `subdivision` rated in "Poor" condition.
#[must_use]
pub fn find_poor_condition(subdivision: &str, parcels: &[Parcel]) -> Vec<Parcel> {
    let key = normalize_subdivision(subdivision);
    parcels
        .iter()
        .filter(|parcel| parcel.subdivision_key() == key && parcel.has_condition("Poor"))
        .cloned()
        .collect()
}

/// Whether a parcel's acreage falls within the large-land bounds. Useful as
/// a [`acquisitions_source::ParcelSource::filtered`] predicate before the
/// distance check.
#[must_use]
pub fn is_large_land(parcel: &Parcel, criteria: &LargeLandCriteria) -> bool {
    parcel
        .land_acres()
        .is_some_and(|acres| acres >= criteria.min_acres && acres <= criteria.max_acres)
}

/// Parcels with acreage in `[min_acres, max_acres]` lying strictly farther
/// than `min_miles` from the reference point. Sorted by acreage descending,
/// then distance ascending.
#[must_use]
pub fn find_large_land_far(parcels: &[Parcel], criteria: &LargeLandCriteria) -> Vec<LargeLandResult> {
    let mut results: Vec<LargeLandResult> = parcels
        .iter()
        .filter_map(|parcel| {
            let acres = parcel.land_acres()?;
            if acres < criteria.min_acres || acres > criteria.max_acres {
                return None;
            }
            let (lat, lon) = parcel.coordinates()?;
            let distance = distance_miles(criteria.reference, GeoPoint::new(lat, lon));
            (distance > criteria.min_miles).then(|| LargeLandResult {
                parcel: parcel.clone(),
                acres,
                distance_miles: distance,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.acres
            .partial_cmp(&a.acres)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.distance_miles
                    .partial_cmp(&b.distance_miles)
                    .unwrap_or(Ordering::Equal)
            })
    });
    results
}
