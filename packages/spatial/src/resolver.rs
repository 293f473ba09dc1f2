//! Geographic point to zoning designation.

use acquisitions_geography::LambertConformalConic;
use acquisitions_geography_models::{GeoPoint, PlanarPoint};
use serde::Serialize;

use crate::set::PolygonSet;
use crate::{ZoningAttributes, zoning_code};

/// Outcome of a zoning lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ZoningLookup<'a> {
    /// A polygon contains the point. `code` is `None` when the polygon
    /// carries neither zoning field.
    #[serde(rename_all = "camelCase")]
    Found {
        code: Option<&'a str>,
        attributes: &'a ZoningAttributes,
    },
    /// No polygon contains the point, or it could not be projected.
    NotFound,
}

impl ZoningLookup<'_> {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Projects query points and resolves them against a [`PolygonSet`].
///
/// Read-only after construction; share it by reference across threads.
pub struct ZoningResolver {
    projection: LambertConformalConic,
    polygons: PolygonSet,
}

impl ZoningResolver {
    #[must_use]
    pub const fn new(projection: LambertConformalConic, polygons: PolygonSet) -> Self {
        Self {
            projection,
            polygons,
        }
    }

    /// Projects `point` into the layers' plane.
    #[must_use]
    pub fn project(&self, point: GeoPoint) -> PlanarPoint {
        self.projection.project(point)
    }

    /// The zoning polygon covering `point`, first-loaded first.
    #[must_use]
    pub fn resolve(&self, point: GeoPoint) -> ZoningLookup<'_> {
        let planar = self.project(point);
        match self.polygons.find_zoning(planar) {
            Some(attributes) => ZoningLookup::Found {
                code: zoning_code(attributes),
                attributes,
            },
            None => {
                log::debug!(
                    "No zoning polygon at {}, {} (planar {}, {})",
                    point.lat,
                    point.lon,
                    planar.northing,
                    planar.easting
                );
                ZoningLookup::NotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::ZoningPolygon;

    fn square_around(center: PlanarPoint, half: f64) -> Vec<PlanarPoint> {
        vec![
            PlanarPoint::new(center.northing - half, center.easting - half),
            PlanarPoint::new(center.northing - half, center.easting + half),
            PlanarPoint::new(center.northing + half, center.easting + half),
            PlanarPoint::new(center.northing + half, center.easting - half),
        ]
    }

    fn resolver_with(polygons: Vec<ZoningPolygon>) -> ZoningResolver {
        ZoningResolver::new(
            LambertConformalConic::texas_north_central(),
            PolygonSet::new(polygons),
        )
    }

    const FORT_WORTH: GeoPoint = GeoPoint::new(32.7555, -97.3308);

    #[test]
    fn resolves_projected_point_inside_layer_polygon() {
        let projection = LambertConformalConic::texas_north_central();
        let center = projection.project(FORT_WORTH);
        let polygon = ZoningPolygon::new(
            vec![square_around(center, 500.0)],
            ZoningAttributes::from([("ZONING".to_string(), "CB".to_string())]),
        );
        let resolver = resolver_with(vec![polygon]);

        match resolver.resolve(FORT_WORTH) {
            ZoningLookup::Found { code, attributes } => {
                assert_eq!(code, Some("CB"));
                assert_eq!(attributes.len(), 1);
            }
            ZoningLookup::NotFound => panic!("expected a match"),
        }

        // Roughly a mile north, well outside the 1000 ft square.
        let north = GeoPoint::new(FORT_WORTH.lat + 0.015, FORT_WORTH.lon);
        assert_eq!(resolver.resolve(north), ZoningLookup::NotFound);
    }

    #[test]
    fn match_without_code_reports_missing_code() {
        let projection = LambertConformalConic::texas_north_central();
        let center = projection.project(FORT_WORTH);
        let polygon = ZoningPolygon::new(
            vec![square_around(center, 500.0)],
            ZoningAttributes::from([("OBJECTID".to_string(), "7".to_string())]),
        );
        let resolver = resolver_with(vec![polygon]);

        let lookup = resolver.resolve(FORT_WORTH);
        assert!(lookup.is_found());
        assert!(matches!(lookup, ZoningLookup::Found { code: None, .. }));
    }

    #[test]
    fn degenerate_latitude_is_not_found() {
        let everywhere = ZoningPolygon::new(
            vec![square_around(PlanarPoint::new(0.0, 0.0), 1e12)],
            ZoningAttributes::new(),
        );
        let resolver = resolver_with(vec![everywhere]);
        assert!(!resolver.resolve(GeoPoint::new(90.0, -97.0)).is_found());
        assert!(!resolver.resolve(GeoPoint::new(f64::NAN, -97.0)).is_found());
    }

    #[test]
    fn empty_store_never_finds_anything() {
        let resolver = resolver_with(Vec::new());
        assert_eq!(resolver.resolve(FORT_WORTH), ZoningLookup::NotFound);
    }

    #[test]
    fn serializes_for_output() {
        let attributes = ZoningAttributes::from([("ZONING".to_string(), "A-5".to_string())]);
        let found = ZoningLookup::Found {
            code: Some("A-5"),
            attributes: &attributes,
        };
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["code"], "A-5");
        assert_eq!(
            serde_json::to_value(ZoningLookup::NotFound).unwrap()["status"],
            "notFound"
        );
    }
}
