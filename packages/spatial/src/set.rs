//! The ordered collection of zoning polygons loaded at startup.

use std::fmt;

use acquisitions_geography_models::PlanarPoint;
use rstar::{AABB, RTree, RTreeObject};

use crate::ZoningAttributes;
use crate::polygon::ZoningPolygon;

/// R-tree entry pointing back at a polygon's load position.
struct PolygonEnvelope {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for PolygonEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Zoning polygons in load order, with an R-tree over their bounding boxes.
///
/// Load order is priority: when polygons overlap (e.g. an overlay district
/// on top of a base zone), the one loaded first wins. The set is immutable
/// once built and safe to share across threads.
pub struct PolygonSet {
    polygons: Vec<ZoningPolygon>,
    index: RTree<PolygonEnvelope>,
}

impl fmt::Debug for PolygonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolygonSet")
            .field("polygons", &self.polygons.len())
            .field("indexed", &self.index.size())
            .finish()
    }
}

impl PolygonSet {
    /// Indexes `polygons`, keeping their order as priority order.
    #[must_use]
    pub fn new(polygons: Vec<ZoningPolygon>) -> Self {
        let entries = polygons
            .iter()
            .enumerate()
            .filter(|(_, polygon)| !polygon.bbox().is_empty())
            .map(|(position, polygon)| {
                let bbox = polygon.bbox();
                PolygonEnvelope {
                    position,
                    envelope: AABB::from_corners(
                        [bbox.min_easting, bbox.min_northing],
                        [bbox.max_easting, bbox.max_northing],
                    ),
                }
            })
            .collect();

        Self {
            polygons,
            index: RTree::bulk_load(entries),
        }
    }

    /// A set with no polygons. Every lookup reports "not found".
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Polygons in load order.
    #[must_use]
    pub fn polygons(&self) -> &[ZoningPolygon] {
        &self.polygons
    }

    /// The first-loaded polygon containing `point`, with its load position.
    ///
    /// Non-finite points (e.g. from an unprojectable latitude) are never
    /// contained.
    #[must_use]
    pub fn find_polygon(&self, point: PlanarPoint) -> Option<(usize, &ZoningPolygon)> {
        if !point.is_finite() {
            return None;
        }

        let query = AABB::from_point([point.easting, point.northing]);
        self.index
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.position)
            .filter(|&position| self.polygons[position].contains(point))
            .min()
            .map(|position| (position, &self.polygons[position]))
    }

    /// Attributes of the first-loaded polygon containing `point`, or `None`
    /// when no polygon contains it.
    #[must_use]
    pub fn find_zoning(&self, point: PlanarPoint) -> Option<&ZoningAttributes> {
        self.find_polygon(point)
            .map(|(_, polygon)| polygon.attributes())
    }
}

impl Default for PolygonSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<ZoningPolygon> for PolygonSet {
    fn from_iter<I: IntoIterator<Item = ZoningPolygon>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Ring;

    fn p(northing: f64, easting: f64) -> PlanarPoint {
        PlanarPoint::new(northing, easting)
    }

    fn square(min: f64, max: f64) -> Ring {
        vec![p(min, min), p(min, max), p(max, max), p(max, min)]
    }

    fn zone(code: &str, ring: Ring) -> ZoningPolygon {
        ZoningPolygon::new(
            vec![ring],
            ZoningAttributes::from([("ZONING".to_string(), code.to_string())]),
        )
    }

    fn code(set: &PolygonSet, point: PlanarPoint) -> Option<&str> {
        set.find_zoning(point)
            .and_then(|attrs| attrs.get("ZONING"))
            .map(String::as_str)
    }

    #[test]
    fn first_loaded_overlapping_polygon_wins() {
        let set = PolygonSet::new(vec![
            zone("PD-1", square(4.0, 6.0)),
            zone("A-5", square(0.0, 10.0)),
        ]);
        assert_eq!(code(&set, p(5.0, 5.0)), Some("PD-1"));
        assert_eq!(code(&set, p(1.0, 1.0)), Some("A-5"));

        let reversed = PolygonSet::new(vec![
            zone("A-5", square(0.0, 10.0)),
            zone("PD-1", square(4.0, 6.0)),
        ]);
        assert_eq!(code(&reversed, p(5.0, 5.0)), Some("A-5"));
    }

    #[test]
    fn bbox_hit_without_containment_falls_through() {
        let triangle = vec![p(0.0, 0.0), p(0.0, 10.0), p(10.0, 0.0)];
        let set = PolygonSet::new(vec![zone("MU-1", triangle), zone("B", square(5.0, 20.0))]);
        // Inside the triangle's bbox but past its hypotenuse.
        assert_eq!(code(&set, p(8.0, 8.0)), Some("B"));
        assert_eq!(code(&set, p(1.0, 1.0)), Some("MU-1"));
        assert_eq!(set.find_polygon(p(8.0, 8.0)).map(|(i, _)| i), Some(1));
    }

    #[test]
    fn misses_report_not_found() {
        let set = PolygonSet::new(vec![zone("A-5", square(0.0, 10.0))]);
        assert!(set.find_zoning(p(50.0, 50.0)).is_none());
        assert!(set.find_zoning(PlanarPoint::nan()).is_none());
    }

    #[test]
    fn empty_set_never_matches() {
        let set = PolygonSet::empty();
        assert!(set.is_empty());
        assert!(set.find_zoning(p(0.0, 0.0)).is_none());
    }

    #[test]
    fn debug_output_summarizes_the_index() {
        let set = PolygonSet::new(vec![zone("A", square(0.0, 1.0)), zone("B", Vec::new())]);
        assert_eq!(format!("{set:?}"), "PolygonSet { polygons: 2, indexed: 1 }");
    }

    #[test]
    fn collects_from_iterator_in_order() {
        let set: PolygonSet = [zone("A", square(0.0, 1.0)), zone("B", square(2.0, 3.0))]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.polygons()[1].attributes().get("ZONING").map(String::as_str),
            Some("B")
        );
    }
}
