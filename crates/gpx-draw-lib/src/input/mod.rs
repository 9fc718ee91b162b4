//! Input adapters turning parsed documents into the geometry model
//!
//! - [`gpx`]: one `.gpx` file becomes one [`crate::Trace`]
//! - [`geojson`]: polygon features become [`crate::Region`]s

pub mod geojson;
pub mod gpx;
