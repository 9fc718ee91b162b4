//! Linear geographic to pixel mapping
//!
//! Longitude grows left to right and latitude grows bottom to top, so the y axis is
//! inverted with respect to pixel rows. No cartographic projection is applied.

use crate::{BoundingBox, GeoPoint, RenderError, Result};

/// Maps geographic coordinates into the pixel grid of one render
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    bbox: BoundingBox,
    width: u32,
    height: u32,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Projector {
    /// Build a projector whose longer geographic axis spans `longest_edge_pixels`
    ///
    /// The shorter axis is scaled by the ratio of degree extents and rounded (minimum 1).
    pub fn new(bbox: BoundingBox, longest_edge_pixels: u32) -> Result<Self> {
        Self::with_aspect(bbox, longest_edge_pixels, 1.0)
    }

    /// Like [`Projector::new`] but shrinks the longitude extent by `cos(mean latitude)`
    ///
    /// A degree of longitude covers less ground than a degree of latitude away from the
    /// equator; this keeps regional maps from looking stretched horizontally.
    pub fn with_latitude_correction(bbox: BoundingBox, longest_edge_pixels: u32) -> Result<Self> {
        let mean_lat = (bbox.min_lat + bbox.max_lat) / 2.0;
        let factor = mean_lat.to_radians().cos().abs().max(f64::EPSILON);
        Self::with_aspect(bbox, longest_edge_pixels, factor)
    }

    fn with_aspect(bbox: BoundingBox, longest_edge_pixels: u32, lon_factor: f64) -> Result<Self> {
        if longest_edge_pixels == 0 {
            return Err(RenderError::InvalidResolution(
                "longest edge must be at least 1 pixel".to_string(),
            ));
        }
        bbox.validate()?;
        let bbox = bbox.expand_degenerate();

        let lon_extent = bbox.lon_extent() * lon_factor;
        let lat_extent = bbox.lat_extent();
        let longest = f64::from(longest_edge_pixels);

        let (width, height) = if lon_extent >= lat_extent {
            (longest_edge_pixels, scaled_edge(longest, lat_extent / lon_extent))
        } else {
            (scaled_edge(longest, lon_extent / lat_extent), longest_edge_pixels)
        };

        tracing::debug!("Projector {width}x{height} px for {bbox:?}");
        Ok(Self {
            bbox,
            width,
            height,
        })
    }

    /// The (expanded) bounding box this projector maps from
    #[inline]
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Project a point to the nearest pixel; may fall outside the buffer
    ///
    /// Returns `None` for a point with a non-finite coordinate.
    #[inline]
    pub fn project(&self, point: &GeoPoint) -> Option<(i64, i64)> {
        self.project_lon_lat(point.lon, point.lat)
    }

    /// Project raw coordinates to the nearest pixel
    #[inline]
    pub fn project_lon_lat(&self, lon: f64, lat: f64) -> Option<(i64, i64)> {
        if !(lon.is_finite() && lat.is_finite()) {
            return None;
        }
        let (x, y) = self.project_f64(lon, lat);
        // `as` saturates, far away points stay far away
        Some((x.round() as i64, y.round() as i64))
    }

    /// Unrounded pixel position, pixel centers lie on integer values
    #[inline]
    pub fn project_f64(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon - self.bbox.min_lon) / self.bbox.lon_extent() * f64::from(self.width - 1);
        let y = (self.bbox.max_lat - lat) / self.bbox.lat_extent() * f64::from(self.height - 1);
        (x, y)
    }
}

fn scaled_edge(longest: f64, ratio: f64) -> u32 {
    // `as` saturates, the ratio is at most 1 so this never exceeds `longest`
    ((longest * ratio).round() as u32).max(1)
}
