#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate types shared by the projection, neighbor search and zoning
//! resolver.
//!
//! Parcels are geocoded in WGS-84 degrees ([`GeoPoint`]); zoning layers are
//! stored in a state-plane Lambert Conformal Conic system ([`PlanarPoint`],
//! US survey feet). [`LambertParams`] describes that projection.

use serde::{Deserialize, Serialize};

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A position in a projected plane.
///
/// Northing is the vertical axis and easting the horizontal one, matching
/// the `(latitude, longitude)` ordering the zoning layers use for their
/// vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    /// Vertical coordinate.
    pub northing: f64,
    /// Horizontal coordinate.
    pub easting: f64,
}

impl PlanarPoint {
    #[must_use]
    pub const fn new(northing: f64, easting: f64) -> Self {
        Self { northing, easting }
    }

    /// A point that never lies inside any polygon.
    #[must_use]
    pub const fn nan() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    /// Whether both coordinates are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.northing.is_finite() && self.easting.is_finite()
    }
}

/// Defining constants of a two-parallel Lambert Conformal Conic projection.
///
/// Angles are in degrees; false easting/northing are in output units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LambertParams {
    /// Latitude of the projection origin.
    pub origin_latitude: f64,
    /// First standard parallel.
    pub standard_parallel_1: f64,
    /// Second standard parallel.
    pub standard_parallel_2: f64,
    /// Central meridian.
    pub central_meridian: f64,
    /// False easting added to every easting.
    pub false_easting: f64,
    /// False northing added to every northing.
    pub false_northing: f64,
    /// Ellipsoid semi-major axis in metres.
    pub semi_major_axis_m: f64,
    /// Ellipsoid eccentricity squared.
    pub eccentricity_squared: f64,
    /// Output units per metre.
    pub units_per_meter: f64,
}

/// Metres to US survey feet.
pub const US_SURVEY_FEET_PER_METER: f64 = 3.280_833_333_333_333_4;

impl LambertParams {
    /// NAD83 / Texas North Central (EPSG:2276), US survey feet.
    pub const TEXAS_NORTH_CENTRAL: Self = Self {
        origin_latitude: 31.666_666_666_666_67,
        standard_parallel_1: 32.133_333_333_333_33,
        standard_parallel_2: 33.966_666_666_666_67,
        central_meridian: -98.5,
        false_easting: 1_968_500.0,
        false_northing: 6_561_666.666_666_666,
        semi_major_axis_m: 6_378_137.0,
        eccentricity_squared: 0.006_694_380_022_90,
        units_per_meter: US_SURVEY_FEET_PER_METER,
    };
}

impl Default for LambertParams {
    fn default() -> Self {
        Self::TEXAS_NORTH_CENTRAL
    }
}
