//! GPX Draw - command line entry point
//!
//! Loads every `.gpx` file of a folder, optional GeoJSON boundaries, renders them and
//! writes the image.

mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Settings;
use gpx_draw_lib::input;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Setup logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::parse();
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<()> {
    #[cfg(feature = "profiling")]
    profiling::scope!("gpx_draw::run");

    let config = settings.render_config()?;

    let traces = input::gpx::load_traces(&settings.folder)
        .with_context(|| format!("failed to read tracks from {}", settings.folder.display()))?;
    if traces.is_empty() {
        tracing::warn!("No GPX tracks found in {}", settings.folder.display());
    }

    let regions = match &settings.regions {
        Some(path) => input::geojson::load_regions(path)
            .with_context(|| format!("failed to read regions from {}", path.display()))?,
        None => Vec::new(),
    };
    tracing::info!("Loaded {} tracks and {} regions", traces.len(), regions.len());

    let (buffer, stats) = gpx_draw_lib::render_with_stats(&traces, &regions, &config)
        .context("failed to render")?;
    tracing::debug!("Rendered extent: {:?}", stats.bbox);

    output::save_image(buffer, &settings.output)
}
