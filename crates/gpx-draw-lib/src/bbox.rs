//! Bounding box resolution
//!
//! Either validates an explicit box or computes one that frames the input geometry,
//! then widens any degenerate axis so the projector never divides by zero.

use crate::{Geometry, Region, RenderError, Result, Trace};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Smallest extent (in degrees) an axis may have before projection, roughly 11 m of latitude
pub const MIN_EXTENT_DEG: f64 = 1e-4;

/// Geographic extent in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

/// Which geometry drives autoscaling when no explicit box is given
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum AutoscaleSource {
    /// Only traces are framed; regions may extend beyond the view
    #[default]
    Traces,
    /// Traces and regions are framed together
    TracesAndRegions,
}

impl BoundingBox {
    /// Create a box in the `(min_lon, max_lon, min_lat, max_lat)` order used on the command line
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    /// Check that every bound is finite and min <= max on each axis
    pub fn validate(&self) -> Result<()> {
        let bounds = [self.min_lon, self.max_lon, self.min_lat, self.max_lat];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::InvalidBoundingBox(format!(
                "non-finite bound in {self:?}"
            )));
        }
        if self.min_lon > self.max_lon {
            return Err(RenderError::InvalidBoundingBox(format!(
                "min_lon {} > max_lon {}",
                self.min_lon, self.max_lon
            )));
        }
        if self.min_lat > self.max_lat {
            return Err(RenderError::InvalidBoundingBox(format!(
                "min_lat {} > max_lat {}",
                self.min_lat, self.max_lat
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn lon_extent(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    #[inline]
    pub fn lat_extent(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Whether the point lies inside the box (edges included)
    #[inline]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Widen every axis narrower than [`MIN_EXTENT_DEG`] symmetrically around its center
    pub fn expand_degenerate(self) -> Self {
        let (min_lon, max_lon) = expand_axis(self.min_lon, self.max_lon);
        let (min_lat, max_lat) = expand_axis(self.min_lat, self.max_lat);
        let expanded = Self::new(min_lon, max_lon, min_lat, max_lat);
        if expanded != self {
            tracing::debug!("Expanded degenerate bounding box {self:?} to {expanded:?}");
        }
        expanded
    }

    /// Grow the box so it also encloses the given point
    fn include(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
    }

    fn empty() -> Self {
        Self::new(
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        )
    }
}

fn expand_axis(min: f64, max: f64) -> (f64, f64) {
    if max - min >= MIN_EXTENT_DEG {
        return (min, max);
    }
    let center = (min + max) / 2.0;
    (center - MIN_EXTENT_DEG / 2.0, center + MIN_EXTENT_DEG / 2.0)
}

/// Resolve the extent to render, autoscaling from traces only
///
/// See [`resolve_with`] to let regions take part in autoscaling.
pub fn resolve(
    explicit: Option<BoundingBox>,
    traces: &[Trace],
    regions: &[Region],
) -> Result<BoundingBox> {
    resolve_with(explicit, traces, regions, AutoscaleSource::Traces)
}

/// Resolve the extent to render
///
/// An explicit box is validated and used as-is (apart from degenerate-axis expansion).
/// Otherwise the minimal box enclosing the selected geometry is computed.
pub fn resolve_with(
    explicit: Option<BoundingBox>,
    traces: &[Trace],
    regions: &[Region],
    source: AutoscaleSource,
) -> Result<BoundingBox> {
    #[cfg(feature = "profiling")]
    profiling::scope!("bbox::resolve");

    if let Some(bbox) = explicit {
        bbox.validate()?;
        return Ok(bbox.expand_degenerate());
    }

    let mut geometries: Vec<Geometry<'_>> = traces.iter().map(Geometry::Trace).collect();
    if source == AutoscaleSource::TracesAndRegions {
        geometries.extend(regions.iter().map(Geometry::Region));
    }

    let mut bbox = BoundingBox::empty();
    let mut found_point = false;
    for geometry in &geometries {
        for point in geometry.points() {
            if !point.lon.is_finite() || !point.lat.is_finite() {
                tracing::warn!(
                    "Skipping non-finite point ({}, {}) while autoscaling",
                    point.lon,
                    point.lat
                );
                continue;
            }
            bbox.include(point.lon, point.lat);
            found_point = true;
        }
    }

    if !found_point {
        return Err(RenderError::EmptyInput);
    }

    tracing::debug!("Autoscaled bounding box: {bbox:?}");
    Ok(bbox.expand_degenerate())
}
