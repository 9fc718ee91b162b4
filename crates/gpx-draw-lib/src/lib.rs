//! GPX Draw Library - Projection and Layered Rendering of GPS Traces
//!
//! This library renders recorded GPS traces and optional boundary regions into a single
//! in-memory pixel buffer. Geometry is projected with a simple equirectangular (linear)
//! mapping from a bounding box that is either given explicitly or inferred from the traces.
//!
//! # Architecture
//!
//! - **[`Trace`] / [`Region`]**: Immutable geometry in (longitude, latitude)
//! - **[`BoundingBox`]**: Geographic extent, resolved by [`bbox::resolve`]
//! - **[`Projector`]**: Linear geographic to pixel mapping that preserves aspect ratio
//! - **[`speed`]**: Average-speed computation used to exclude motorised traces
//! - **[`compositor`]**: Region fills, region strokes and trace lines, alpha blended
//! - **[`render`]**: The pipeline tying everything together
//!
//! The [`input`] module converts parsed GPX and GeoJSON documents into the geometry model.
//!
//! # Example
//!
//! ```rust
//! use gpx_draw_lib::{GeoPoint, RenderConfig, Trace, render};
//!
//! # fn main() -> gpx_draw_lib::Result<()> {
//! let trace = Trace::new(vec![
//!     GeoPoint::new(12.0, 52.0),
//!     GeoPoint::new(14.0, 53.0),
//! ])?;
//!
//! let config = RenderConfig {
//!     longest_edge_pixels: 1000,
//!     ..RenderConfig::default()
//! };
//! let buffer = render(&[trace], &[], &config)?;
//! assert_eq!((buffer.width(), buffer.height()), (1000, 500));
//! # Ok(())
//! # }
//! ```

pub mod bbox;
mod canvas;
mod color;
pub mod compositor;
mod geometry;
pub mod input;
mod pipeline;
mod projector;
mod raster;
pub mod speed;

// Public API exports
pub use bbox::{AutoscaleSource, BoundingBox};
pub use canvas::PixelBuffer;
pub use color::Color;
pub use geometry::{GeoPoint, Geometry, Region, Trace};
pub use pipeline::{RenderConfig, RenderStats, render, render_batch, render_with_stats};
pub use projector::Projector;

/// Error types for the rendering library
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("Nothing to frame: autoscale requested without any traces")]
    EmptyInput,

    #[error("Insufficient data to compute average speed: {0}")]
    InsufficientData(String),

    #[error("Invalid output resolution: {0}")]
    InvalidResolution(String),

    #[error("Invalid color {0:?}, expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    #[error("Empty geometry: {0}")]
    EmptyGeometry(String),

    #[error("GPX parsing error: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("GeoJSON parsing error: {0}")]
    GeoJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
