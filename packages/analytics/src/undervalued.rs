//! Improvement values far below nearby comps.
//!
//! A candidate is compared against every parcel in the universe within a
//! small radius (the candidate itself included), regardless of
//! subdivision. It is undervalued when its improvement value is strictly
//! below one standard deviation under the neighbor mean.

use acquisitions_analytics_models::{UndervaluationCriteria, UndervaluedResult};
use acquisitions_geography::NeighborIndex;
use acquisitions_geography_models::GeoPoint;
use acquisitions_parcel_models::{Parcel, normalize_subdivision};

use crate::stats::mean_std_dev;

/// Candidates from `universe` whose subdivision matches `subdivision`
/// (case-insensitive, trimmed), checked against the whole universe.
#[must_use]
pub fn find_undervalued_in_subdivision(
    subdivision: &str,
    universe: &[Parcel],
    criteria: &UndervaluationCriteria,
) -> Vec<UndervaluedResult> {
    let key = normalize_subdivision(subdivision);
    let candidates: Vec<&Parcel> = universe
        .iter()
        .filter(|parcel| parcel.subdivision_key() == key)
        .collect();
    find_undervalued(candidates, universe, criteria)
}

/// Runs the undervaluation test for each candidate against `universe`.
///
/// Candidates or neighbors without coordinates or a parseable improvement
/// value are skipped. Results keep candidate order.
pub fn find_undervalued<'a>(
    candidates: impl IntoIterator<Item = &'a Parcel>,
    universe: &[Parcel],
    criteria: &UndervaluationCriteria,
) -> Vec<UndervaluedResult> {
    let index = NeighborIndex::new(universe.iter().filter_map(|parcel| {
        let (lat, lon) = parcel.coordinates()?;
        let value = parcel.improvement_value()?;
        Some((GeoPoint::new(lat, lon), value))
    }));
    log::debug!("Indexed {} comparable parcels", index.len());

    candidates
        .into_iter()
        .filter_map(|candidate| {
            let (lat, lon) = candidate.coordinates()?;
            let value = candidate.improvement_value()?;

            let neighbors: Vec<f64> = index
                .within_radius(GeoPoint::new(lat, lon), criteria.radius_miles)
                .map(|(comp, _)| *comp)
                .collect();
            if neighbors.len() < criteria.min_neighbors {
                return None;
            }

            let stat = mean_std_dev(&neighbors)?;
            (value < stat.lower_bound()).then(|| UndervaluedResult {
                parcel: candidate.clone(),
                neighbor_count: stat.count,
                mean: stat.mean,
                std_dev: stat.std_dev,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAT: f64 = 32.75;
    const LON: f64 = -97.33;

    fn parcel(address: &str, subdivision: &str, value: &str, lat: f64, lon: f64) -> Parcel {
        Parcel {
            situs_address: address.to_string(),
            subdivision: subdivision.to_string(),
            improvement_value: value.to_string(),
            latitude: lat.to_string(),
            longitude: lon.to_string(),
            ..Parcel::default()
        }
    }

    fn addresses(results: &[UndervaluedResult]) -> Vec<&str> {
        results
            .iter()
            .map(|r| r.parcel.situs_address.as_str())
            .collect()
    }

    #[test]
    fn flags_values_below_one_sigma() {
        let universe = vec![
            parcel("1 LOW ST", "OAK HILLS", "50,000", LAT, LON),
            parcel("2 MID ST", "OAK HILLS", "100,000", LAT, LON),
            parcel("3 MID ST", "ELM PARK", "100,000", LAT, LON),
            parcel("4 MID ST", "ELM PARK", "$100,000", LAT, LON),
        ];
        let results =
            find_undervalued_in_subdivision(" oak hills ", &universe, &UndervaluationCriteria::default());
        assert_eq!(addresses(&results), vec!["1 LOW ST"]);

        let result = &results[0];
        assert_eq!(result.neighbor_count, 4);
        assert!((result.mean - 87_500.0).abs() < 1e-6);
        let expected_std = 468_750_000f64.sqrt();
        assert!((result.std_dev - expected_std).abs() < 1e-6);
    }

    #[test]
    fn value_equal_to_lower_bound_is_not_undervalued() {
        // Values 0, 2, 2, 4: mean 2, population std sqrt(2).
        let universe = vec![
            parcel("A", "S", "0", LAT, LON),
            parcel("B", "S", "2", LAT, LON),
            parcel("C", "S", "2", LAT, LON),
            parcel("D", "S", "4", LAT, LON),
        ];
        let results =
            find_undervalued_in_subdivision("S", &universe, &UndervaluationCriteria::default());
        // 0 < 2 - 1.414 holds; 2 does not.
        assert_eq!(addresses(&results), vec!["A"]);
    }

    #[test]
    fn fewer_than_three_neighbors_is_never_undervalued() {
        let universe = vec![
            parcel("1 LOW ST", "OAK HILLS", "1", LAT, LON),
            parcel("2 MID ST", "OAK HILLS", "1000000", LAT, LON),
            // About a mile north, outside the radius.
            parcel("3 FAR ST", "OAK HILLS", "1000000", LAT + 0.015, LON),
        ];
        let results =
            find_undervalued_in_subdivision("OAK HILLS", &universe, &UndervaluationCriteria::default());
        assert!(results.is_empty());
    }

    #[test]
    fn skips_parcels_missing_coordinates_or_value() {
        let mut no_coords = parcel("5 NOWHERE", "OAK HILLS", "1", LAT, LON);
        no_coords.latitude.clear();
        let mut no_value = parcel("6 BLANK ST", "OAK HILLS", "", LAT, LON);
        no_value.improvement_value = "n/a".to_string();

        let universe = vec![
            no_coords,
            no_value,
            parcel("2 MID ST", "OAK HILLS", "100", LAT, LON),
            parcel("3 MID ST", "OAK HILLS", "100", LAT, LON),
        ];
        let results =
            find_undervalued_in_subdivision("OAK HILLS", &universe, &UndervaluationCriteria::default());
        assert!(results.is_empty());
    }

    #[test]
    fn neighbors_come_from_the_whole_universe() {
        let candidate = parcel("1 LOW ST", "OAK HILLS", "10", LAT, LON);
        let universe = vec![
            candidate.clone(),
            parcel("2", "ELM PARK", "100", LAT, LON),
            parcel("3", "ELM PARK", "100", LAT, LON),
            parcel("4", "ELM PARK", "100", LAT, LON),
        ];
        let results = find_undervalued([&candidate], &universe, &UndervaluationCriteria::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].neighbor_count, 4);
    }
}
