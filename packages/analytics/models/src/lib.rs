#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result and criteria types for the comparative analytics passes.
//!
//! Results are plain values handed to the presentation layer; nothing here
//! is cached between calls. Criteria structs deserialize from the CLI's
//! TOML config and default to the thresholds the analyses are tuned for.

use acquisitions_geography_models::GeoPoint;
use acquisitions_parcel_models::Parcel;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter};

/// Mean and population standard deviation of one numeric attribute over a
/// neighbor set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborStat {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl NeighborStat {
    /// One standard deviation below the mean.
    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.mean - self.std_dev
    }
}

/// A parcel whose improvement value sits more than one standard deviation
/// below its neighbors'.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndervaluedResult {
    pub parcel: Parcel,
    /// Neighbors within the search radius, including the parcel itself.
    pub neighbor_count: usize,
    /// Mean neighbor improvement value.
    pub mean: f64,
    /// Population standard deviation of neighbor improvement values.
    pub std_dev: f64,
}

/// An independent distress signal.
///
/// Variant order is the order flags are reported in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DistressFlag {
    /// Owner's mailing city differs from the property's city.
    Absentee,
    /// Deed recorded at least ten years ago.
    LongHold,
    /// Appraised value jumped since the prior period.
    TaxShock,
    /// Owner protested the appraisal.
    TaxProtest,
    /// Poor/fair condition or heavy depreciation.
    Physical,
}

/// A parcel priced well below its subdivision with structural and
/// ownership signs of distress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistressedResult {
    pub parcel: Parcel,
    /// Parcel price per square foot over the subdivision mean.
    pub price_ratio: f64,
    /// Subdivision mean year built minus the parcel's. Positive means older.
    pub age_gap: f64,
    /// Parcel depreciation minus the subdivision mean.
    pub depr_gap: f64,
    /// Tripped flags, sorted.
    pub flags: Vec<DistressFlag>,
    /// Number of parcels in the subdivision baseline.
    pub neighborhood_count: usize,
}

impl DistressedResult {
    /// Comma-joined flag names, e.g. `absentee,longHold,physical`.
    #[must_use]
    pub fn flags_label(&self) -> String {
        self.flags
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(",")
    }
}

/// A large tract far from the reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeLandResult {
    pub parcel: Parcel,
    pub acres: f64,
    pub distance_miles: f64,
}

/// Thresholds for undervaluation detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndervaluationCriteria {
    /// Neighbor search radius in miles (inclusive).
    pub radius_miles: f64,
    /// Fewer neighbors than this and the candidate is skipped.
    pub min_neighbors: usize,
}

impl Default for UndervaluationCriteria {
    fn default() -> Self {
        Self {
            radius_miles: 0.1,
            min_neighbors: 3,
        }
    }
}

/// Thresholds for distress scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistressCriteria {
    /// Subdivisions smaller than this have no usable baseline.
    pub min_group_size: usize,
    /// Price ratios above this are not distressed.
    pub max_price_ratio: f64,
    pub min_age_gap: f64,
    pub min_depr_gap: f64,
    /// Depreciation at or above this sets the physical flag.
    pub physical_depreciation: f64,
    pub long_hold_days: i64,
    /// Current value must exceed prior value times this factor.
    pub tax_shock_factor: f64,
}

impl Default for DistressCriteria {
    fn default() -> Self {
        Self {
            min_group_size: 10,
            max_price_ratio: 0.70,
            min_age_gap: 20.0,
            min_depr_gap: 15.0,
            physical_depreciation: 40.0,
            long_hold_days: 3650,
            tax_shock_factor: 1.15,
        }
    }
}

/// Downtown Fort Worth.
pub const DEFAULT_REFERENCE_POINT: GeoPoint = GeoPoint::new(32.760_089, -97.319_828);

/// Bounds for the large-land search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LargeLandCriteria {
    pub min_acres: f64,
    pub max_acres: f64,
    /// Parcels must be strictly farther than this from `reference`.
    pub min_miles: f64,
    pub reference: GeoPoint,
}

impl Default for LargeLandCriteria {
    fn default() -> Self {
        Self {
            min_acres: 10.0,
            max_acres: 200.0,
            min_miles: 10.0,
            reference: DEFAULT_REFERENCE_POINT,
        }
    }
}
