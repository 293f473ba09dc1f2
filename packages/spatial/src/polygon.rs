//! A single zoning polygon and the ray-casting containment test.

use acquisitions_geography_models::PlanarPoint;

use crate::ZoningAttributes;

/// One closed ring of vertices. The first vertex need not repeat as the
/// last; the closing edge is implied.
pub type Ring = Vec<PlanarPoint>;

/// Axis-aligned bounds of a polygon's vertices, inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_northing: f64,
    pub max_northing: f64,
    pub min_easting: f64,
    pub max_easting: f64,
}

impl BoundingBox {
    /// A box containing nothing. Including any point makes it that point.
    pub const EMPTY: Self = Self {
        min_northing: f64::MAX,
        max_northing: f64::MIN,
        min_easting: f64::MAX,
        max_easting: f64::MIN,
    };

    /// Grows the box to cover `point`.
    pub fn include(&mut self, point: PlanarPoint) {
        self.min_northing = self.min_northing.min(point.northing);
        self.max_northing = self.max_northing.max(point.northing);
        self.min_easting = self.min_easting.min(point.easting);
        self.max_easting = self.max_easting.max(point.easting);
    }

    /// Whether no point has been included.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_northing > self.max_northing || self.min_easting > self.max_easting
    }

    /// Inclusive containment. Always `false` for NaN coordinates.
    #[must_use]
    pub fn contains(&self, point: PlanarPoint) -> bool {
        point.northing >= self.min_northing
            && point.northing <= self.max_northing
            && point.easting >= self.min_easting
            && point.easting <= self.max_easting
    }
}

/// A zoning district boundary with its attribute-table row.
///
/// Rings are independent: a point inside any ring is inside the polygon.
/// Inner rings are not treated as holes.
#[derive(Debug, Clone)]
pub struct ZoningPolygon {
    rings: Vec<Ring>,
    bbox: BoundingBox,
    attributes: ZoningAttributes,
}

impl ZoningPolygon {
    /// Builds a polygon from its rings, computing the bounding box.
    #[must_use]
    pub fn new(rings: Vec<Ring>, attributes: ZoningAttributes) -> Self {
        let mut bbox = BoundingBox::EMPTY;
        for point in rings.iter().flatten() {
            bbox.include(*point);
        }
        Self {
            rings,
            bbox,
            attributes,
        }
    }

    /// Builds a polygon from a flat vertex list and the index at which each
    /// ring starts, as stored in shapefile records. Each ring runs up to the
    /// next offset (or the end of `points`). Offsets past the end, or lower
    /// than their predecessor, produce empty rings.
    #[must_use]
    pub fn from_parts(
        points: &[PlanarPoint],
        part_offsets: &[usize],
        attributes: ZoningAttributes,
    ) -> Self {
        let mut bbox = BoundingBox::EMPTY;
        let mut rings = Vec::with_capacity(part_offsets.len());

        for (i, &start) in part_offsets.iter().enumerate() {
            let start = start.min(points.len());
            let end = part_offsets
                .get(i + 1)
                .map_or(points.len(), |&next| next.min(points.len()))
                .max(start);

            let mut ring = Vec::with_capacity(end - start);
            for &point in &points[start..end] {
                bbox.include(point);
                ring.push(point);
            }
            rings.push(ring);
        }

        Self {
            rings,
            bbox,
            attributes,
        }
    }

    #[must_use]
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    #[must_use]
    pub const fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    #[must_use]
    pub const fn attributes(&self) -> &ZoningAttributes {
        &self.attributes
    }

    /// Bounding-box rejection followed by a per-ring ray-casting test.
    /// Non-finite points are never contained.
    #[must_use]
    pub fn contains(&self, point: PlanarPoint) -> bool {
        point.is_finite()
            && self.bbox.contains(point)
            && self.rings.iter().any(|ring| point_in_ring(point, ring))
    }
}

/// Even-odd ray-casting test against a horizontal ray running from `point`
/// towards increasing easting.
///
/// An edge counts as crossed when exactly one of its endpoints lies strictly
/// north of the point and the crossing is strictly east of it. This makes
/// points on a ring's southern and western edges inside and points on its
/// northern and eastern edges outside, so two polygons that share an edge
/// never both claim a point on it.
#[must_use]
pub fn point_in_ring(point: PlanarPoint, ring: &[PlanarPoint]) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };

    let mut inside = false;
    let mut previous = last;
    for &current in ring {
        if (current.northing > point.northing) != (previous.northing > point.northing) {
            let crossing = (previous.easting - current.easting)
                * (point.northing - current.northing)
                / (previous.northing - current.northing)
                + current.easting;
            if point.easting < crossing {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}
