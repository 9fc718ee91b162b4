//! GPX trace loading
//!
//! Every track point of a file, across all tracks and segments, is concatenated in
//! document order into a single trace.

use crate::{GeoPoint, RenderError, Result, Trace};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Convert parsed GPX data into a trace
///
/// Fails with [`RenderError::EmptyGeometry`] when the document has no track points.
pub fn trace_from_gpx(gpx_data: &::gpx::Gpx) -> Result<Trace> {
    let points: Vec<GeoPoint> = gpx_data
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points)
        .map(|waypoint| {
            let point = waypoint.point();
            GeoPoint {
                lon: point.x(),
                lat: point.y(),
                time: waypoint.time.clone().map(OffsetDateTime::from),
            }
        })
        .collect();
    Trace::new(points)
}

/// Read and convert one GPX file, naming the trace after the file stem
pub fn read_trace(path: &Path) -> Result<Trace> {
    #[cfg(feature = "profiling")]
    profiling::scope!("input::gpx::read_trace");

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let gpx_data = ::gpx::read(reader)?;
    let trace = trace_from_gpx(&gpx_data)?;

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(trace.with_name(name))
}

/// List the `.gpx` files directly inside `dir`, sorted by file name
///
/// The listing is not recursive. Sorting keeps the drawing order stable across runs.
pub fn discover_gpx_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_gpx = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"));
        if is_gpx && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every GPX file of a folder in parallel
///
/// Files that fail to parse or hold no points are skipped with a warning; the result keeps
/// the sorted file order. Only a failure to list the folder is an error.
pub fn load_traces(dir: &Path) -> Result<Vec<Trace>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("input::gpx::load_traces");

    let paths = discover_gpx_files(dir)?;
    tracing::debug!("Found {} GPX files in {}", paths.len(), dir.display());

    let traces: Vec<Trace> = paths
        .par_iter()
        .filter_map(|path| match read_trace(path) {
            Ok(trace) => Some(trace),
            Err(err) => {
                tracing::warn!("Skipping {}: {err}", path.display());
                None
            }
        })
        .collect();

    if traces.len() < paths.len() {
        tracing::info!(
            "Loaded {} of {} GPX files from {}",
            traces.len(),
            paths.len(),
            dir.display()
        );
    }
    Ok(traces)
}

impl TryFrom<&::gpx::Gpx> for Trace {
    type Error = RenderError;

    fn try_from(gpx_data: &::gpx::Gpx) -> Result<Self> {
        trace_from_gpx(gpx_data)
    }
}
