//! Render pipeline: resolve bbox, project, filter and composite
//!
//! A render is a pure function of its inputs. The returned [`PixelBuffer`] is owned by
//! the caller and nothing is shared between renders, so independent configurations can
//! be rendered in parallel with [`render_batch`].

use crate::compositor::Compositor;
use crate::{
    AutoscaleSource, BoundingBox, Color, PixelBuffer, Projector, Region, Result, Trace, bbox,
    speed,
};
use rayon::prelude::*;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Everything a render needs besides the geometry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RenderConfig {
    /// Pixel length of the longer image edge; the other edge follows the bbox aspect ratio
    pub longest_edge_pixels: u32,
    /// Explicit extent, or `None` to autoscale
    pub bbox: Option<BoundingBox>,
    /// Which geometry frames the image when autoscaling
    pub autoscale_source: AutoscaleSource,
    /// Scale the longitude extent by cos(mean latitude) when sizing the image
    pub latitude_correction: bool,
    /// Region interior color
    pub fill_color: Color,
    /// Region outline color
    pub stroke_color: Color,
    /// Trace line color
    pub trace_color: Color,
    /// Initial color of every pixel
    pub background: Color,
    /// Bounding box frame color, drawn on top of everything when set
    pub frame_color: Option<Color>,
    /// Brush width in pixels for strokes and traces
    pub line_width: u32,
    /// Traces with a higher average speed (km/h) are not drawn
    pub max_avg_speed: Option<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            longest_edge_pixels: 512,
            bbox: None,
            autoscale_source: AutoscaleSource::Traces,
            latitude_correction: false,
            fill_color: Color::rgba(0.5, 0.5, 0.5, 0.25),
            stroke_color: Color::rgba(0.4, 0.4, 0.4, 1.0),
            trace_color: Color::BLACK,
            background: Color::WHITE,
            frame_color: None,
            line_width: 1,
            max_avg_speed: None,
        }
    }
}

/// Summary of one render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    /// Extent actually rendered (after degenerate-axis expansion)
    pub bbox: BoundingBox,
    pub width: u32,
    pub height: u32,
    pub regions_drawn: usize,
    pub traces_drawn: usize,
    /// Traces dropped by the speed filter
    pub traces_excluded: usize,
}

/// Render traces and regions into a new pixel buffer
///
/// Fails only while resolving the bounding box or sizing the image; per-trace problems
/// exclude that trace and never abort the render.
pub fn render(traces: &[Trace], regions: &[Region], config: &RenderConfig) -> Result<PixelBuffer> {
    render_with_stats(traces, regions, config).map(|(buffer, _)| buffer)
}

/// Like [`render`] but also reports what was drawn
pub fn render_with_stats(
    traces: &[Trace],
    regions: &[Region],
    config: &RenderConfig,
) -> Result<(PixelBuffer, RenderStats)> {
    #[cfg(feature = "profiling")]
    profiling::scope!("pipeline::render");

    let bbox = bbox::resolve_with(config.bbox, traces, regions, config.autoscale_source)?;
    let projector = if config.latitude_correction {
        Projector::with_latitude_correction(bbox, config.longest_edge_pixels)?
    } else {
        Projector::new(bbox, config.longest_edge_pixels)?
    };

    let mut buffer = PixelBuffer::new(projector.width(), projector.height(), config.background);
    let mut stats = RenderStats {
        bbox: projector.bbox(),
        width: projector.width(),
        height: projector.height(),
        regions_drawn: 0,
        traces_drawn: 0,
        traces_excluded: 0,
    };

    {
        let mut compositor =
            Compositor::new(&mut buffer, &projector)?.with_line_width(config.line_width);

        // Every outline sits above every fill
        for region in regions {
            compositor.fill_region(region, config.fill_color);
        }
        for region in regions {
            compositor.stroke_region(region, config.stroke_color);
            stats.regions_drawn += 1;
        }

        for trace in traces {
            if speed::passes(trace, config.max_avg_speed) {
                compositor.draw_trace(trace, config.trace_color);
                stats.traces_drawn += 1;
            } else {
                stats.traces_excluded += 1;
            }
        }

        if let Some(frame_color) = config.frame_color {
            compositor.draw_frame(&projector.bbox(), frame_color);
        }
    }

    tracing::info!(
        "Rendered {}x{} px: {} traces drawn, {} excluded, {} regions",
        stats.width,
        stats.height,
        stats.traces_drawn,
        stats.traces_excluded,
        stats.regions_drawn
    );
    Ok((buffer, stats))
}

/// Render the same geometry under several configurations in parallel
///
/// Geometry is shared read-only; every render gets its own projector and buffer.
/// Results keep the order of `configs`.
pub fn render_batch(
    traces: &[Trace],
    regions: &[Region],
    configs: &[RenderConfig],
) -> Vec<Result<PixelBuffer>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("pipeline::render_batch");

    configs
        .par_iter()
        .map(|config| render(traces, regions, config))
        .collect()
}
