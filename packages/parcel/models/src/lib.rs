#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parcel record type shared across the acquisitions toolchain.
//!
//! Appraisal district exports store every value as display text (dollar
//! amounts with thousands separators, blank years, etc.). [`Parcel`] keeps
//! those strings verbatim and exposes typed accessors that parse on use and
//! return `None` when a field is blank or malformed, so a single bad column
//! never disqualifies a record from computations that do not need it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used by the appraisal district for deed dates (`MM-DD-YYYY`).
pub const DEED_DATE_FORMAT: &str = "%m-%d-%Y";

/// One real-property account as exported by the appraisal district.
///
/// Values are kept as the raw strings from the source; use the typed
/// accessors (e.g. [`Parcel::total_value`]) to read them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    /// Appraisal district account number.
    pub account_num: String,
    /// Physical (situs) address of the property.
    pub situs_address: String,
    /// Owner of record.
    pub owner_name: String,
    /// Owner mailing street address.
    pub owner_address: String,
    /// Owner mailing city and state (e.g. "DALLAS, TX").
    pub owner_city_state: String,
    /// Owner mailing ZIP code.
    pub owner_zip: String,
    /// Subdivision / neighborhood name.
    pub subdivision: String,

    /// Date of the last recorded sale.
    pub last_sale_date: String,
    /// Appraiser's condition rating (e.g. "Poor", "Fair", "Average").
    pub condition: String,
    /// Depreciation percentage applied to the improvements.
    pub depreciation_percent: String,
    /// Construction quality rating.
    pub quality: String,

    /// Total appraised value.
    pub total_value: String,
    /// Improvement (structure) value.
    pub improvement_value: String,
    /// Land value.
    pub land_value: String,

    /// Year the main structure was built.
    pub year_built: String,
    /// Living area in square feet.
    pub living_area: String,
    /// Number of bedrooms.
    pub num_bedrooms: String,
    /// Number of bathrooms.
    pub num_bathrooms: String,

    /// Site class description.
    pub site_class_descr: String,
    /// Property class code.
    pub property_class: String,
    /// State use code.
    pub state_use_code: String,
    /// Land area in acres.
    pub land_acres: String,
    /// Land area in square feet.
    pub land_sq_ft: String,
    /// Site class code.
    pub site_class_cd: String,
    /// Land use code.
    pub land_use_code: String,

    /// County name.
    pub county: String,
    /// City the property is located in.
    pub city: String,
    /// School district.
    pub school_district: String,

    /// Deed date (`MM-DD-YYYY`).
    pub deed_date: String,
    /// Appraisal review board (protest) indicator, `"Y"` when protested.
    pub arb_indicator: String,

    /// WGS-84 latitude in decimal degrees, blank when not geocoded.
    pub latitude: String,
    /// WGS-84 longitude in decimal degrees, blank when not geocoded.
    pub longitude: String,
}

impl Parcel {
    /// Returns `(latitude, longitude)` when both fields parse as numbers.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        parse_lat_lon(&self.latitude, &self.longitude)
    }

    /// Total appraised value, if parseable.
    #[must_use]
    pub fn total_value(&self) -> Option<f64> {
        parse_dollar(&self.total_value)
    }

    /// Improvement value, if parseable.
    #[must_use]
    pub fn improvement_value(&self) -> Option<f64> {
        parse_dollar(&self.improvement_value)
    }

    /// Living area in square feet, if parseable.
    #[must_use]
    pub fn living_area(&self) -> Option<f64> {
        parse_dollar(&self.living_area)
    }

    /// Land area in acres, if parseable.
    #[must_use]
    pub fn land_acres(&self) -> Option<f64> {
        parse_dollar(&self.land_acres)
    }

    /// Depreciation percentage, if parseable.
    #[must_use]
    pub fn depreciation_percent(&self) -> Option<f64> {
        parse_dollar(&self.depreciation_percent)
    }

    /// Year built, if the field is a plain integer.
    #[must_use]
    pub fn year_built(&self) -> Option<i32> {
        self.year_built.trim().parse().ok()
    }

    /// Total value divided by living area. `None` unless both parse and the
    /// living area is positive.
    #[must_use]
    pub fn price_per_sqft(&self) -> Option<f64> {
        let total = self.total_value()?;
        let living = self.living_area()?;
        (living > 0.0).then(|| total / living)
    }

    /// Deed date, if it matches [`DEED_DATE_FORMAT`].
    #[must_use]
    pub fn deed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.deed_date.trim(), DEED_DATE_FORMAT).ok()
    }

    /// Whether the owner protested the appraisal.
    #[must_use]
    pub fn is_protested(&self) -> bool {
        self.arb_indicator.trim().eq_ignore_ascii_case("Y")
    }

    /// Case-insensitive comparison of the condition rating.
    #[must_use]
    pub fn has_condition(&self, condition: &str) -> bool {
        self.condition.trim().eq_ignore_ascii_case(condition)
    }

    /// Grouping key for the subdivision (see [`normalize_subdivision`]).
    #[must_use]
    pub fn subdivision_key(&self) -> String {
        normalize_subdivision(&self.subdivision)
    }

    /// Lookup key for the situs address (see [`normalize_address`]).
    #[must_use]
    pub fn address_key(&self) -> String {
        normalize_address(&self.situs_address)
    }
}

/// Canonical address key: uppercase, commas removed, runs of whitespace
/// collapsed to a single space.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address
        .to_uppercase()
        .replace(',', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical subdivision key: trimmed and uppercased.
#[must_use]
pub fn normalize_subdivision(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Parses a display-formatted amount such as `"$1,234.50"`.
///
/// Returns `None` for blank or malformed input.
#[must_use]
pub fn parse_dollar(s: &str) -> Option<f64> {
    let cleaned = s.replace(',', "");
    let cleaned = cleaned.trim();
    let cleaned = cleaned.strip_prefix('$').unwrap_or(cleaned);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Parses a latitude/longitude pair. Returns `None` if either is missing or
/// unparseable.
#[must_use]
pub fn parse_lat_lon(lat: &str, lon: &str) -> Option<(f64, f64)> {
    let latitude = lat.trim().parse::<f64>().ok()?;
    let longitude = lon.trim().parse::<f64>().ok()?;
    Some((latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_address() {
        assert_eq!(
            normalize_address("  123  Main St,\tFort Worth, TX "),
            "123 MAIN ST FORT WORTH TX"
        );
    }

    #[test]
    fn normalizes_subdivision() {
        assert_eq!(normalize_subdivision("  Oak Hills "), "OAK HILLS");
    }

    #[test]
    fn parses_dollar_amounts() {
        assert_eq!(parse_dollar("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_dollar(" $250,000.50 "), Some(250_000.5));
        assert_eq!(parse_dollar(""), None);
        assert_eq!(parse_dollar("   "), None);
        assert_eq!(parse_dollar("N/A"), None);
    }

    #[test]
    fn parses_lat_lon_pairs() {
        let (lat, lon) = parse_lat_lon("32.7555", " -97.3308").unwrap();
        assert!((lat - 32.7555).abs() < f64::EPSILON);
        assert!((lon - -97.3308).abs() < f64::EPSILON);
        assert!(parse_lat_lon("", "-97.3").is_none());
        assert!(parse_lat_lon("32.7", "abc").is_none());
    }

    #[test]
    fn price_per_sqft_requires_positive_living_area() {
        let parcel = Parcel {
            total_value: "150,000".to_string(),
            living_area: "1500".to_string(),
            ..Parcel::default()
        };
        assert_eq!(parcel.price_per_sqft(), Some(100.0));

        let zero = Parcel {
            living_area: "0".to_string(),
            ..parcel.clone()
        };
        assert_eq!(zero.price_per_sqft(), None);

        let blank = Parcel {
            total_value: String::new(),
            ..parcel
        };
        assert_eq!(blank.price_per_sqft(), None);
    }

    #[test]
    fn parses_deed_date_and_year() {
        let parcel = Parcel {
            deed_date: "03-15-1994".to_string(),
            year_built: " 1962 ".to_string(),
            ..Parcel::default()
        };
        assert_eq!(parcel.deed_date(), NaiveDate::from_ymd_opt(1994, 3, 15));
        assert_eq!(parcel.year_built(), Some(1962));

        let bad = Parcel {
            deed_date: "1994-03-15".to_string(),
            year_built: "19xx".to_string(),
            ..Parcel::default()
        };
        assert!(bad.deed_date().is_none());
        assert!(bad.year_built().is_none());
    }

    #[test]
    fn protest_and_condition_are_case_insensitive() {
        let parcel = Parcel {
            arb_indicator: " y".to_string(),
            condition: "POOR".to_string(),
            ..Parcel::default()
        };
        assert!(parcel.is_protested());
        assert!(parcel.has_condition("Poor"));
        assert!(!parcel.has_condition("Fair"));
    }
}
