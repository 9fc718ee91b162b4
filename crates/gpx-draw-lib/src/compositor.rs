//! Layer compositing of regions and traces onto a pixel buffer
//!
//! Layers are painted back to front: region fills, region strokes, trace lines and
//! finally the optional bounding box frame. Every draw call rasterises its shape into a
//! coverage set first and then blends each covered pixel exactly once with the "over"
//! operator, so overlapping draw calls accumulate alpha while a single call never
//! darkens the pixels it crosses twice.
//!
//! Polygon interiors use the even-odd rule.

use crate::raster::Coverage;
use crate::{
    BoundingBox, Color, Geometry, PixelBuffer, Projector, Region, RenderError, Result, Trace,
};

/// Draws geometry into a buffer through one projector
#[derive(Debug)]
pub struct Compositor<'a> {
    buffer: &'a mut PixelBuffer,
    projector: &'a Projector,
    coverage: Coverage,
    line_width: u32,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a> Compositor<'a> {
    /// Create a compositor drawing 1 pixel wide lines
    ///
    /// Fails with [`RenderError::InvalidResolution`] when no scratch surface of the
    /// buffer's size can be allocated.
    pub fn new(buffer: &'a mut PixelBuffer, projector: &'a Projector) -> Result<Self> {
        let coverage = Coverage::new(buffer.width(), buffer.height()).ok_or_else(|| {
            RenderError::InvalidResolution(format!(
                "cannot rasterise a {}x{} buffer",
                buffer.width(),
                buffer.height()
            ))
        })?;
        Ok(Self {
            buffer,
            projector,
            coverage,
            line_width: 1,
        })
    }

    /// Set the brush width in pixels used for strokes and trace lines (minimum 1)
    pub fn with_line_width(mut self, line_width: u32) -> Self {
        self.line_width = line_width.max(1);
        self
    }

    /// Fill every polygon of a region; the union is blended once
    pub fn fill_region(&mut self, region: &Region, color: Color) -> usize {
        if !color.is_visible() {
            return 0;
        }
        for rings in region.polygons() {
            let projected: Vec<Vec<(f64, f64)>> = rings
                .iter()
                .map(|ring| {
                    ring.iter()
                        .map(|p| self.projector.project_f64(p.lon, p.lat))
                        .collect()
                })
                .collect();
            self.coverage.fill_polygon(&projected);
        }
        self.flush(color)
    }

    /// Outline every ring of a region, closing each ring
    pub fn stroke_region(&mut self, region: &Region, color: Color) -> usize {
        if !color.is_visible() {
            return 0;
        }
        for ring in region.rings() {
            let pixels: Vec<Option<(i64, i64)>> =
                ring.iter().map(|p| self.projector.project(p)).collect();
            self.polyline(&pixels, true);
        }
        self.flush(color)
    }

    /// Draw a trace as connected segments (not closed)
    ///
    /// Segments are clipped to the buffer; a trace fully outside draws nothing. A point
    /// with a non-finite coordinate breaks the line in two.
    pub fn draw_trace(&mut self, trace: &Trace, color: Color) -> usize {
        if !color.is_visible() {
            return 0;
        }
        let pixels = self.project_geometry(Geometry::Trace(trace));
        self.polyline(&pixels, false);
        self.flush(color)
    }

    /// Outline a geographic rectangle, used for the bounding box frame
    pub fn draw_frame(&mut self, bbox: &BoundingBox, color: Color) -> usize {
        if !color.is_visible() {
            return 0;
        }
        let corners = [
            self.projector.project_lon_lat(bbox.min_lon, bbox.max_lat),
            self.projector.project_lon_lat(bbox.max_lon, bbox.max_lat),
            self.projector.project_lon_lat(bbox.max_lon, bbox.min_lat),
            self.projector.project_lon_lat(bbox.min_lon, bbox.min_lat),
        ];
        self.polyline(&corners, true);
        self.flush(color)
    }

    fn project_geometry(&self, geometry: Geometry<'_>) -> Vec<Option<(i64, i64)>> {
        geometry.points().map(|p| self.projector.project(p)).collect()
    }

    /// Rasterise connected pixel positions, `None` entries split the line
    ///
    /// A ring is only closed when none of its points is missing. A run that never
    /// leaves its first pixel is drawn as a single brush stamp.
    fn polyline(&mut self, pixels: &[Option<(i64, i64)>], closed: bool) {
        let mut segments = Vec::new();
        for run in pixels.split(Option::is_none) {
            let run: Vec<(i64, i64)> = run.iter().flatten().copied().collect();
            let before = segments.len();
            segments.extend(
                run.windows(2)
                    .map(|pair| (pair[0], pair[1]))
                    .filter(|(from, to)| from != to),
            );
            if segments.len() == before {
                if let Some(&(x, y)) = run.first() {
                    self.coverage.point(x, y, self.line_width);
                }
            }
        }

        let unbroken = pixels.iter().all(Option::is_some);
        if closed && unbroken && pixels.len() > 2 {
            if let (Some(Some(last)), Some(Some(first))) = (pixels.last(), pixels.first()) {
                if last != first {
                    segments.push((*last, *first));
                }
            }
        }

        self.coverage.segments(&segments, self.line_width);
    }

    /// Blend every covered pixel once and return how many were touched
    fn flush(&mut self, color: Color) -> usize {
        let color = color.clamped();
        let buffer = &mut *self.buffer;
        self.coverage
            .drain(|index| buffer.blend_index(index, color))
    }
}
