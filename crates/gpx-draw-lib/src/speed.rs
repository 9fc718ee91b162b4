//! Average-speed filtering of traces
//!
//! Used to drop traces recorded while travelling by car, train or plane when only
//! human-powered activities should be drawn.

use crate::{GeoPoint, RenderError, Result, Trace};

/// Earth's mean radius in meters
const EARTH_RADIUS_M: f64 = 6371000.0;

/// Haversine distance between two points in meters
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lon = (p2.lon - p1.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Total path length of a trace in meters, following the point order
pub fn total_distance(trace: &Trace) -> f64 {
    trace
        .points()
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Average speed of a trace in km/h
///
/// The path length over all consecutive points is divided by the time between the
/// earliest and the latest timestamp, so unsorted timestamps still give a positive span.
/// Fails with [`RenderError::InsufficientData`] when fewer than two points are timestamped
/// or when that span is zero.
pub fn average_speed(trace: &Trace) -> Result<f64> {
    #[cfg(feature = "profiling")]
    profiling::scope!("speed::average_speed");

    let mut times = trace.points().iter().filter_map(|p| p.time);
    let Some(first) = times.next() else {
        return Err(RenderError::InsufficientData(
            "no timestamped points".to_string(),
        ));
    };

    let mut count = 1usize;
    let (earliest, latest) = times.fold((first, first), |(lo, hi), t| {
        count += 1;
        (lo.min(t), hi.max(t))
    });
    if count < 2 {
        return Err(RenderError::InsufficientData(
            "only one timestamped point".to_string(),
        ));
    }

    let elapsed_secs = (latest - earliest).as_seconds_f64();
    if elapsed_secs <= 0.0 {
        return Err(RenderError::InsufficientData(
            "zero elapsed time".to_string(),
        ));
    }

    let meters_per_second = total_distance(trace) / elapsed_secs;
    Ok(meters_per_second * 3.6)
}

/// Whether a trace should be drawn under an optional maximum average speed (km/h)
///
/// Traces whose speed cannot be computed are excluded once a threshold is set.
pub fn passes(trace: &Trace, max_avg_speed: Option<f64>) -> bool {
    let Some(threshold) = max_avg_speed else {
        return true;
    };

    match average_speed(trace) {
        Ok(speed) if speed.is_finite() => {
            let pass = speed <= threshold;
            if !pass {
                tracing::debug!(
                    "Excluding trace {:?}: average speed {speed:.1} km/h > {threshold} km/h",
                    trace.name().unwrap_or("<unnamed>")
                );
            }
            pass
        }
        Ok(speed) => {
            tracing::debug!(
                "Excluding trace {:?}: non-finite average speed {speed}",
                trace.name().unwrap_or("<unnamed>")
            );
            false
        }
        Err(err) => {
            tracing::debug!(
                "Excluding trace {:?}: {err}",
                trace.name().unwrap_or("<unnamed>")
            );
            false
        }
    }
}
