//! Geometry model shared by traces and boundary regions
//!
//! All coordinates are geographic: x is longitude and y is latitude, in degrees.
//! Instances are immutable after construction and can be shared between renders.

use crate::{RenderError, Result};
use geo::Coord;
use time::OffsetDateTime;

/// A single geographic position, optionally timestamped
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Recording instant (only present on trace points)
    pub time: Option<OffsetDateTime>,
}

impl GeoPoint {
    /// Create an untimed point
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            time: None,
        }
    }

    /// Create a timestamped point
    #[inline]
    pub fn timed(lon: f64, lat: f64, time: OffsetDateTime) -> Self {
        Self {
            lon,
            lat,
            time: Some(time),
        }
    }

    /// The position as a `geo` coordinate (x = lon, y = lat)
    #[inline]
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        GeoPoint::new(coord.x, coord.y)
    }
}

/// An ordered point sequence recorded from one source (one input file)
#[derive(Clone, Debug)]
pub struct Trace {
    name: Option<String>,
    points: Vec<GeoPoint>,
}

impl Trace {
    /// Create a trace from its points in recording order
    ///
    /// Fails with [`RenderError::EmptyGeometry`] when `points` is empty.
    pub fn new(points: Vec<GeoPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(RenderError::EmptyGeometry(
                "a trace needs at least one point".to_string(),
            ));
        }
        Ok(Self { name: None, points })
    }

    /// Attach a human readable source name (used in log messages)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Source name, if any
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// All points in sequence order
    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false, a trace holds at least one point
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A closed boundary area made of one or more polygons
///
/// Each polygon is a list of rings: the first ring is the exterior and any further
/// rings are holes. Rings do not need to repeat their first vertex at the end.
#[derive(Clone, Debug)]
pub struct Region {
    polygons: Vec<Vec<Vec<GeoPoint>>>,
}

impl Region {
    /// Create a region from raw polygons (each a list of rings)
    ///
    /// Empty rings and polygons are dropped; the region must keep at least one ring.
    pub fn new(polygons: Vec<Vec<Vec<GeoPoint>>>) -> Result<Self> {
        let polygons: Vec<Vec<Vec<GeoPoint>>> = polygons
            .into_iter()
            .map(|rings| {
                rings
                    .into_iter()
                    .filter(|ring| !ring.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|rings| !rings.is_empty())
            .collect();

        if polygons.is_empty() {
            return Err(RenderError::EmptyGeometry(
                "a region needs at least one non-empty ring".to_string(),
            ));
        }
        Ok(Self { polygons })
    }

    /// Create a single-polygon region from (lon, lat) rings
    pub fn from_rings(rings: Vec<Vec<(f64, f64)>>) -> Result<Self> {
        let rings = rings
            .into_iter()
            .map(|ring| {
                ring.into_iter()
                    .map(|(lon, lat)| GeoPoint::new(lon, lat))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        Self::new(vec![rings])
    }

    /// Polygons of this region, each a slice of rings
    #[inline]
    pub fn polygons(&self) -> &[Vec<Vec<GeoPoint>>] {
        &self.polygons
    }

    /// Iterate over every ring of every polygon
    pub fn rings(&self) -> impl Iterator<Item = &[GeoPoint]> {
        self.polygons
            .iter()
            .flat_map(|rings| rings.iter().map(Vec::as_slice))
    }
}

fn ring_points(ring: &geo::LineString<f64>) -> Vec<GeoPoint> {
    ring.coords().copied().map(GeoPoint::from).collect()
}

fn polygon_rings(polygon: &geo::Polygon<f64>) -> Vec<Vec<GeoPoint>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_points)
        .collect()
}

impl TryFrom<&geo::Polygon<f64>> for Region {
    type Error = RenderError;

    fn try_from(polygon: &geo::Polygon<f64>) -> Result<Self> {
        Region::new(vec![polygon_rings(polygon)])
    }
}

impl TryFrom<&geo::MultiPolygon<f64>> for Region {
    type Error = RenderError;

    fn try_from(multi: &geo::MultiPolygon<f64>) -> Result<Self> {
        Region::new(multi.iter().map(polygon_rings).collect())
    }
}

/// Any drawable geometry, projected through the same routine
#[derive(Clone, Copy, Debug)]
pub enum Geometry<'a> {
    Trace(&'a Trace),
    Region(&'a Region),
}

impl<'a> Geometry<'a> {
    /// Iterate over every point that takes part in projection
    pub fn points(&self) -> Box<dyn Iterator<Item = &'a GeoPoint> + 'a> {
        match *self {
            Geometry::Trace(trace) => Box::new(trace.points().iter()),
            Geometry::Region(region) => Box::new(region.rings().flatten()),
        }
    }
}
