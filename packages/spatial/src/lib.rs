#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zoning polygon store and containment resolver.
//!
//! Zoning layers are loaded once at startup into an immutable
//! [`PolygonSet`] whose load order doubles as priority order. Query points
//! arrive as latitude/longitude, are projected into the layers' state-plane
//! system, and resolved against the set with a bounding-box check followed
//! by ray casting.

use std::collections::BTreeMap;

pub mod layer;
pub mod polygon;
pub mod resolver;
pub mod set;

pub use layer::{LayerError, LoadError, load_layer, load_layers};
pub use polygon::{BoundingBox, Ring, ZoningPolygon, point_in_ring};
pub use resolver::{ZoningLookup, ZoningResolver};
pub use set::PolygonSet;

/// Attribute-table row of a zoning polygon, field name to string value.
pub type ZoningAttributes = BTreeMap<String, String>;

/// Primary zoning-code field.
pub const ZONING_FIELD: &str = "ZONING";

/// Fallback field used by overlay layers (truncated to ten characters by
/// the dBASE format).
pub const BASE_ZONING_FIELD: &str = "BASE_ZONIN";

/// Extracts the zoning code from a polygon's attributes: the trimmed
/// `ZONING` value, else the trimmed `BASE_ZONIN` value. Blank values are
/// treated as missing.
#[must_use]
pub fn zoning_code(attributes: &ZoningAttributes) -> Option<&str> {
    [ZONING_FIELD, BASE_ZONING_FIELD]
        .iter()
        .filter_map(|field| attributes.get(*field))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> ZoningAttributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn prefers_zoning_field() {
        let a = attrs(&[("ZONING", " A-5 "), ("BASE_ZONIN", "PD-1")]);
        assert_eq!(zoning_code(&a), Some("A-5"));
    }

    #[test]
    fn falls_back_to_base_zoning() {
        assert_eq!(zoning_code(&attrs(&[("BASE_ZONIN", "PD-1")])), Some("PD-1"));
        assert_eq!(
            zoning_code(&attrs(&[("ZONING", "  "), ("BASE_ZONIN", "PD-1")])),
            Some("PD-1")
        );
    }

    #[test]
    fn missing_code_is_none() {
        assert_eq!(zoning_code(&attrs(&[("OBJECTID", "12")])), None);
        assert_eq!(zoning_code(&ZoningAttributes::new()), None);
    }
}
