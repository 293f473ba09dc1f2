//! Multi-factor distress scoring.
//!
//! Baselines are built per subdivision over every parcel supplied, then
//! applied to the target subdivision. A parcel qualifies when it is priced
//! well below its subdivision per square foot, shows a structural signal
//! (older, more depreciated, or in poor physical shape), and trips at least
//! one ownership or finance signal.

use std::collections::BTreeMap;

use acquisitions_analytics_models::{DistressCriteria, DistressFlag, DistressedResult};
use acquisitions_parcel_models::{Parcel, normalize_subdivision};
use acquisitions_source::ParcelSource;
use chrono::NaiveDate;

/// Running sums for one subdivision. Each field tracks its own parsed
/// count so a missing value never drags a mean toward zero.
#[derive(Debug, Default)]
struct GroupAccumulator {
    price_sqft_sum: f64,
    price_sqft_count: usize,
    year_built_sum: f64,
    year_built_count: usize,
    depreciation_sum: f64,
    depreciation_count: usize,
    count: usize,
}

impl GroupAccumulator {
    fn add(&mut self, parcel: &Parcel) {
        if let Some(price) = parcel.price_per_sqft() {
            self.price_sqft_sum += price;
            self.price_sqft_count += 1;
        }
        if let Some(year) = parcel.year_built() {
            self.year_built_sum += f64::from(year);
            self.year_built_count += 1;
        }
        if let Some(depreciation) = parcel.depreciation_percent() {
            self.depreciation_sum += depreciation;
            self.depreciation_count += 1;
        }
        self.count += 1;
    }

    fn baseline(&self) -> GroupBaseline {
        GroupBaseline {
            price_sqft: mean(self.price_sqft_sum, self.price_sqft_count),
            year_built: mean(self.year_built_sum, self.year_built_count),
            depreciation: mean(self.depreciation_sum, self.depreciation_count),
            count: self.count,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

/// Per-subdivision means. A mean is `None` when no member had that field.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GroupBaseline {
    price_sqft: Option<f64>,
    year_built: Option<f64>,
    depreciation: Option<f64>,
    count: usize,
}

fn build_baselines(parcels: &[Parcel]) -> BTreeMap<String, GroupBaseline> {
    let mut groups = BTreeMap::<String, GroupAccumulator>::new();
    for parcel in parcels {
        let key = parcel.subdivision_key();
        if key.is_empty() {
            continue;
        }
        groups.entry(key).or_default().add(parcel);
    }
    groups
        .into_iter()
        .map(|(key, group)| (key, group.baseline()))
        .collect()
}

/// Scores every parcel of `subdivision` against baselines computed over all
/// of `parcels`.
///
/// `prior` is the previous appraisal period, consulted for the tax-shock
/// signal; a failed lookup is logged and counts as no signal. `today` is
/// the evaluation date for the long-hold signal.
#[must_use]
pub fn find_distressed(
    subdivision: &str,
    parcels: &[Parcel],
    prior: Option<&dyn ParcelSource>,
    today: NaiveDate,
    criteria: &DistressCriteria,
) -> Vec<DistressedResult> {
    let target = normalize_subdivision(subdivision);
    let baselines = build_baselines(parcels);

    let Some(baseline) = baselines.get(&target).copied() else {
        log::debug!("No parcels in subdivision {target}");
        return Vec::new();
    };
    if baseline.count < criteria.min_group_size {
        log::debug!(
            "Subdivision {target} has {} parcels, fewer than the {} needed for a baseline",
            baseline.count,
            criteria.min_group_size
        );
        return Vec::new();
    }
    let Some(group_price_sqft) = baseline.price_sqft.filter(|price| *price > 0.0) else {
        log::debug!("Subdivision {target} has no usable price per square foot");
        return Vec::new();
    };

    parcels
        .iter()
        .filter(|parcel| parcel.subdivision_key() == target)
        .filter_map(|parcel| {
            score_parcel(parcel, &baseline, group_price_sqft, prior, today, criteria)
        })
        .collect()
}

fn score_parcel(
    parcel: &Parcel,
    baseline: &GroupBaseline,
    group_price_sqft: f64,
    prior: Option<&dyn ParcelSource>,
    today: NaiveDate,
    criteria: &DistressCriteria,
) -> Option<DistressedResult> {
    let price_ratio = parcel.price_per_sqft()? / group_price_sqft;
    if price_ratio > criteria.max_price_ratio {
        return None;
    }

    let age_gap = baseline
        .year_built
        .zip(parcel.year_built())
        .map_or(0.0, |(group, own)| group - f64::from(own));
    let depreciation = parcel.depreciation_percent();
    let depr_gap = baseline
        .depreciation
        .zip(depreciation)
        .map_or(0.0, |(group, own)| own - group);

    let physical = parcel.has_condition("Poor")
        || parcel.has_condition("Fair")
        || depreciation.is_some_and(|d| d >= criteria.physical_depreciation);

    if age_gap < criteria.min_age_gap && depr_gap < criteria.min_depr_gap && !physical {
        return None;
    }

    let mut flags = Vec::new();
    if is_absentee(parcel) {
        flags.push(DistressFlag::Absentee);
    }
    if is_long_hold(parcel, today, criteria.long_hold_days) {
        flags.push(DistressFlag::LongHold);
    }
    if let Some(prior) = prior
        && is_tax_shock(parcel, prior, criteria.tax_shock_factor)
    {
        flags.push(DistressFlag::TaxShock);
    }
    if parcel.is_protested() {
        flags.push(DistressFlag::TaxProtest);
    }
    if flags.is_empty() {
        return None;
    }
    if physical {
        flags.push(DistressFlag::Physical);
    }

    Some(DistressedResult {
        parcel: parcel.clone(),
        price_ratio,
        age_gap,
        depr_gap,
        flags,
        neighborhood_count: baseline.count,
    })
}

/// Owner's mailing city/state does not mention the property's city. Never
/// absentee when the property city is blank.
fn is_absentee(parcel: &Parcel) -> bool {
    let city = parcel.city.trim();
    !city.is_empty()
        && !parcel
            .owner_city_state
            .to_uppercase()
            .contains(&city.to_uppercase())
}

fn is_long_hold(parcel: &Parcel, today: NaiveDate, min_days: i64) -> bool {
    parcel
        .deed_date()
        .is_some_and(|deed| (today - deed).num_days() >= min_days)
}

fn is_tax_shock(parcel: &Parcel, prior: &dyn ParcelSource, factor: f64) -> bool {
    let Some(current) = parcel.total_value() else {
        return false;
    };
    match prior.by_address(&parcel.address_key()) {
        Ok(Some(previous)) => previous
            .total_value()
            .is_some_and(|previous| previous > 0.0 && previous * factor < current),
        Ok(None) => false,
        Err(e) => {
            log::warn!(
                "Prior-period lookup failed for {}: {e}",
                parcel.situs_address
            );
            false
        }
    }
}
