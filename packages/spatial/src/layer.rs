//! Zoning layer loaders.
//!
//! A layer is either an ESRI shapefile (`.shp` with its `.dbf` attribute
//! table alongside) or a `GeoJSON` feature collection. Layers are expected
//! to already be in the projected plane; vertices are copied as stored with
//! `y` as northing and `x` as easting. Non-polygon geometries are skipped.

use std::path::{Path, PathBuf};

use acquisitions_geography_models::PlanarPoint;
use geojson::GeoJson;
use shapefile::{PolygonRing, Shape};
use shapefile::dbase::FieldValue;

use crate::ZoningAttributes;
use crate::polygon::{Ring, ZoningPolygon};
use crate::set::PolygonSet;

/// Errors raised while reading a single layer file.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// I/O error reading the layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shapefile or attribute table could not be decoded.
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// `GeoJSON` could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The file extension is not a known layer format.
    #[error("Unsupported layer format: {extension:?}")]
    UnsupportedFormat {
        /// Extension of the offending file.
        extension: String,
    },
}

/// A layer failed to load. Aborts the whole polygon store build.
#[derive(Debug, thiserror::Error)]
#[error("Failed to load zoning layer {}: {source}", .path.display())]
pub struct LoadError {
    /// Layer that failed.
    pub path: PathBuf,
    /// Underlying failure.
    #[source]
    pub source: LayerError,
}

/// Loads every layer in order into one [`PolygonSet`]. Earlier layers take
/// priority over later ones where polygons overlap.
///
/// # Errors
///
/// Returns [`LoadError`] naming the first layer that could not be read.
pub fn load_layers<P: AsRef<Path>>(paths: &[P]) -> Result<PolygonSet, LoadError> {
    let mut polygons = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let layer = load_layer(path).map_err(|source| LoadError {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Loaded {} zoning polygons from {}",
            layer.len(),
            path.display()
        );
        polygons.extend(layer);
    }
    Ok(PolygonSet::new(polygons))
}

/// Reads one layer, choosing the format from the file extension.
///
/// # Errors
///
/// Returns [`LayerError`] if the file is missing, corrupt, or of an
/// unknown format.
pub fn load_layer(path: &Path) -> Result<Vec<ZoningPolygon>, LayerError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "shp" => read_shapefile(path),
        "geojson" | "json" => read_geojson(path),
        _ => Err(LayerError::UnsupportedFormat { extension }),
    }
}

fn read_shapefile(path: &Path) -> Result<Vec<ZoningPolygon>, LayerError> {
    let mut reader = shapefile::Reader::from_path(path)?;
    let mut polygons = Vec::new();
    let mut skipped = 0usize;

    for shape_record in reader.iter_shapes_and_records() {
        let (shape, record) = shape_record?;
        let attributes: ZoningAttributes = record
            .into_iter()
            .map(|(name, value)| (name, field_text(value)))
            .collect();
        let polygon = match shape {
            Shape::Polygon(polygon) => split_rings(polygon.rings(), |p| (p.x, p.y), attributes),
            Shape::PolygonM(polygon) => split_rings(polygon.rings(), |p| (p.x, p.y), attributes),
            Shape::PolygonZ(polygon) => split_rings(polygon.rings(), |p| (p.x, p.y), attributes),
            _ => {
                skipped += 1;
                continue;
            }
        };
        polygons.push(polygon);
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {skipped} non-polygon shapes in {}",
            path.display()
        );
    }

    Ok(polygons)
}

/// Flattens a record's rings back into one vertex list with part offsets, the
/// shapefile's on-disk layout, and splits it into a polygon.
fn split_rings<P>(
    rings: &[PolygonRing<P>],
    xy: impl Fn(&P) -> (f64, f64),
    attributes: ZoningAttributes,
) -> ZoningPolygon {
    let mut points = Vec::new();
    let mut part_offsets = Vec::with_capacity(rings.len());
    for ring in rings {
        part_offsets.push(points.len());
        points.extend(ring.points().iter().map(|point| {
            let (x, y) = xy(point);
            PlanarPoint::new(y, x)
        }));
    }
    ZoningPolygon::from_parts(&points, &part_offsets, attributes)
}

fn field_text(value: FieldValue) -> String {
    match value {
        FieldValue::Character(text) => text.unwrap_or_default().trim().to_string(),
        FieldValue::Memo(text) => text.trim().to_string(),
        FieldValue::Numeric(number) => number.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::Float(number) => number.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::Integer(number) => number.to_string(),
        FieldValue::Double(number) => number.to_string(),
        FieldValue::Logical(flag) => flag
            .map(|b| if b { "T" } else { "F" }.to_string())
            .unwrap_or_default(),
        other => format!("{other:?}"),
    }
}

fn read_geojson(path: &Path) -> Result<Vec<ZoningPolygon>, LayerError> {
    let text = std::fs::read_to_string(path)?;
    let geojson: GeoJson = text.parse()?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            log::warn!(
                "{} holds a bare geometry with no attributes; no polygons loaded",
                path.display()
            );
            Vec::new()
        }
    };

    let mut polygons = Vec::new();
    let mut skipped = 0usize;

    for feature in features {
        let Some(geometry) = feature.geometry else {
            skipped += 1;
            continue;
        };
        let rings: Vec<Ring> = match geo::Geometry::<f64>::try_from(geometry) {
            Ok(geo::Geometry::Polygon(polygon)) => polygon_rings(&polygon),
            Ok(geo::Geometry::MultiPolygon(multi)) => multi.iter().flat_map(polygon_rings).collect(),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let attributes: ZoningAttributes = feature
            .properties
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name, json_text(value)))
            .collect();
        polygons.push(ZoningPolygon::new(rings, attributes));
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {skipped} non-polygon features in {}",
            path.display()
        );
    }

    Ok(polygons)
}

fn polygon_rings(polygon: &geo::Polygon<f64>) -> Vec<Ring> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| {
            ring.coords()
                .map(|c| PlanarPoint::new(c.y, c.x))
                .collect()
        })
        .collect()
}

fn json_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.trim().to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
