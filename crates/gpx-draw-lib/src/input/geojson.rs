//! GeoJSON boundary loading
//!
//! Accepts a `FeatureCollection`, a single `Feature` or a bare geometry. `Polygon`,
//! `MultiPolygon` and `GeometryCollection` geometries become regions (one region per
//! feature); any other geometry type is ignored.

use crate::{Region, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::path::Path;

/// `[lon, lat]` with optional extra members (altitude) that are ignored
type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection { features: Vec<Feature> },
    Feature(Feature),
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
    #[serde(other)]
    Unsupported,
}

fn ring(positions: &[Position]) -> LineString<f64> {
    positions
        .iter()
        .filter_map(|position| match position.as_slice() {
            [lon, lat, ..] => Some(Coord { x: *lon, y: *lat }),
            _ => {
                tracing::warn!("Skipping GeoJSON position with fewer than 2 values");
                None
            }
        })
        .collect()
}

/// First ring is the exterior, the rest are holes; `geo` closes every ring
fn polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    Some(Polygon::new(ring(exterior), holes.iter().map(|h| ring(h)).collect()))
}

impl Geometry {
    /// Append the polygons of this geometry to `out`
    fn collect_polygons(&self, out: &mut Vec<Polygon<f64>>) {
        match self {
            Geometry::Polygon { coordinates } => out.extend(polygon(coordinates)),
            Geometry::MultiPolygon { coordinates } => {
                out.extend(coordinates.iter().filter_map(|rings| polygon(rings)));
            }
            Geometry::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.collect_polygons(out);
                }
            }
            Geometry::Unsupported => {
                tracing::debug!("Ignoring non-polygon GeoJSON geometry");
            }
        }
    }

    fn into_region(self) -> Option<Region> {
        let mut polygons = Vec::new();
        self.collect_polygons(&mut polygons);
        Region::try_from(&MultiPolygon::new(polygons)).ok()
    }
}

impl Feature {
    fn into_region(self) -> Option<Region> {
        self.geometry.and_then(Geometry::into_region)
    }
}

/// Parse GeoJSON text into regions, in document order
pub fn regions_from_str(text: &str) -> Result<Vec<Region>> {
    let document: Document = serde_json::from_str(text)?;
    let regions: Vec<Region> = match document {
        Document::FeatureCollection { features } => features
            .into_iter()
            .filter_map(Feature::into_region)
            .collect(),
        Document::Feature(feature) => feature.into_region().into_iter().collect(),
        Document::Polygon { coordinates } => Geometry::Polygon { coordinates }
            .into_region()
            .into_iter()
            .collect(),
        Document::MultiPolygon { coordinates } => Geometry::MultiPolygon { coordinates }
            .into_region()
            .into_iter()
            .collect(),
        Document::GeometryCollection { geometries } => Geometry::GeometryCollection { geometries }
            .into_region()
            .into_iter()
            .collect(),
        Document::Unsupported => Vec::new(),
    };
    tracing::debug!("Parsed {} GeoJSON regions", regions.len());
    Ok(regions)
}

/// Read a GeoJSON file into regions
pub fn load_regions(path: &Path) -> Result<Vec<Region>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("input::geojson::load_regions");

    let text = std::fs::read_to_string(path)?;
    let regions = regions_from_str(&text)?;
    if regions.is_empty() {
        tracing::warn!("No polygon geometry found in {}", path.display());
    }
    Ok(regions)
}
