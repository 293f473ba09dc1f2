//! Great-circle distances and radius queries over geocoded points.
//!
//! [`NeighborIndex`] bulk-loads points into an R-tree keyed by
//! longitude/latitude. A radius query first selects candidates from a
//! degree-space envelope that is guaranteed to enclose the search circle,
//! then keeps only those whose haversine distance is `<=` the radius.

use acquisitions_geography_models::GeoPoint;
use geo::{Distance as _, Haversine, Point};
use rstar::{AABB, RTree, RTreeObject};

/// Mean earth radius used by [`geo::Haversine`], in metres.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Metres per statute mile.
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Slack applied to the candidate envelope so rounding never drops a point
/// that is inside the radius.
const ENVELOPE_SLACK: f64 = 1.01;

/// Great-circle distance between two points, in miles.
#[must_use]
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(to_point(a), to_point(b)) / METERS_PER_MILE
}

fn to_point(p: GeoPoint) -> Point<f64> {
    Point::new(p.lon, p.lat)
}

struct IndexedPoint<T> {
    location: GeoPoint,
    item: T,
}

impl<T> RTreeObject for IndexedPoint<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.lon, self.location.lat])
    }
}

/// Spatial index answering "everything within N miles of here".
pub struct NeighborIndex<T> {
    tree: RTree<IndexedPoint<T>>,
}

impl<T> NeighborIndex<T> {
    /// Bulk-loads the index. Points with non-finite coordinates are dropped.
    pub fn new(items: impl IntoIterator<Item = (GeoPoint, T)>) -> Self {
        let entries: Vec<_> = items
            .into_iter()
            .filter(|(location, _)| location.lat.is_finite() && location.lon.is_finite())
            .map(|(location, item)| IndexedPoint { location, item })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Yields every indexed item whose distance from `center` is at most
    /// `radius_miles`, together with that distance.
    pub fn within_radius(
        &self,
        center: GeoPoint,
        radius_miles: f64,
    ) -> impl Iterator<Item = (&T, f64)> {
        let envelope = search_envelope(center, radius_miles);
        envelope
            .into_iter()
            .flat_map(move |envelope| self.tree.locate_in_envelope(&envelope))
            .filter_map(move |entry| {
                let distance = distance_miles(center, entry.location);
                (distance <= radius_miles).then_some((&entry.item, distance))
            })
    }
}

/// Degree-space box enclosing every point within `radius_miles` of
/// `center`, or `None` for an invalid query.
fn search_envelope(center: GeoPoint, radius_miles: f64) -> Option<AABB<[f64; 2]>> {
    if !center.lat.is_finite()
        || !center.lon.is_finite()
        || radius_miles.is_nan()
        || radius_miles < 0.0
    {
        return None;
    }

    let earth_radius_miles = MEAN_EARTH_RADIUS_M / METERS_PER_MILE;
    let lat_margin = (radius_miles / earth_radius_miles).to_degrees() * ENVELOPE_SLACK;

    let widest_lat = (center.lat.abs() + lat_margin).min(90.0);
    let cos = widest_lat.to_radians().cos();
    let lon_margin = if cos > 1e-9 {
        (lat_margin / cos).min(360.0)
    } else {
        360.0
    };

    Some(AABB::from_corners(
        [center.lon - lon_margin, center.lat - lat_margin],
        [center.lon + lon_margin, center.lat + lat_margin],
    ))
}
