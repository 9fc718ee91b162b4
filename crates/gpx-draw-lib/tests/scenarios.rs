//! End-to-end render scenarios through the public API

use gpx_draw_lib::{
    BoundingBox, Color, GeoPoint, Projector, Region, RenderConfig, RenderError, Trace, bbox,
    render, render_with_stats, speed,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const START: OffsetDateTime = datetime!(2024-06-01 07:30 UTC);

fn trace(points: &[(f64, f64)]) -> Trace {
    Trace::new(
        points
            .iter()
            .map(|&(lon, lat)| GeoPoint::new(lon, lat))
            .collect(),
    )
    .unwrap()
}

/// A straight eastward trace along `lat` covering `km` kilometers in `minutes`
fn timed_trace(lon: f64, lat: f64, km: f64, minutes: i64) -> Trace {
    let steps = 10;
    let km_per_deg = 6371.0 * std::f64::consts::PI / 180.0 * lat.to_radians().cos();
    let points = (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            GeoPoint::timed(
                lon + t * km / km_per_deg,
                lat,
                START + Duration::seconds((t * minutes as f64 * 60.0) as i64),
            )
        })
        .collect();
    Trace::new(points).unwrap()
}

fn colored_pixels(buffer: &gpx_draw_lib::PixelBuffer, background: Color) -> Vec<(u32, u32)> {
    let mut pixels = Vec::new();
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            if buffer.pixel(x, y) != Some(background) {
                pixels.push((x, y));
            }
        }
    }
    pixels
}

#[test]
fn single_point_bbox_and_trace_render_one_pixel() {
    let config = RenderConfig {
        longest_edge_pixels: 101,
        bbox: Some(BoundingBox::new(10.0, 10.0, 50.0, 50.0)),
        ..RenderConfig::default()
    };
    let traces = [trace(&[(10.0, 50.0)])];

    let (buffer, stats) = render_with_stats(&traces, &[], &config).unwrap();
    assert_eq!((buffer.width(), buffer.height()), (101, 101));
    assert!(stats.bbox.lon_extent() > 0.0 && stats.bbox.lat_extent() > 0.0);
    assert_eq!(colored_pixels(&buffer, Color::WHITE), vec![(50, 50)]);
    assert_eq!(buffer.pixel(50, 50), Some(Color::BLACK));
}

#[test]
fn fast_trace_is_excluded_by_speed_threshold() {
    let walk = timed_trace(13.0, 52.5, 3.0, 30); // 6 km/h
    let drive = timed_trace(13.0, 52.52, 45.0, 60); // 45 km/h

    let speed = speed::average_speed(&drive).unwrap();
    assert!((speed - 45.0).abs() < 0.5, "{speed}");

    let config = RenderConfig {
        longest_edge_pixels: 300,
        bbox: Some(BoundingBox::new(12.9, 14.0, 52.4, 52.6)),
        max_avg_speed: Some(20.0),
        ..RenderConfig::default()
    };

    let with_drive = render(&[walk.clone(), drive.clone()], &[], &config).unwrap();
    let without_drive = render(&[walk.clone()], &[], &config).unwrap();
    assert_eq!(with_drive, without_drive);

    // Without a threshold the drive shows up
    let unfiltered = RenderConfig {
        max_avg_speed: None,
        ..config
    };
    let everything = render(&[walk, drive], &[], &unfiltered).unwrap();
    assert_ne!(everything, without_drive);
}

#[test]
fn autoscale_frames_traces_and_keeps_aspect() {
    let traces = [
        trace(&[(12.0, 52.0), (13.0, 52.4)]),
        trace(&[(13.5, 52.7), (14.0, 53.0)]),
    ];
    let resolved = bbox::resolve(None, &traces, &[]).unwrap();
    assert_eq!(resolved, BoundingBox::new(12.0, 14.0, 52.0, 53.0));

    let config = RenderConfig {
        longest_edge_pixels: 1000,
        ..RenderConfig::default()
    };
    let buffer = render(&traces, &[], &config).unwrap();
    assert_eq!((buffer.width(), buffer.height()), (1000, 500));
}

#[test]
fn corners_project_to_buffer_corners_for_explicit_and_autoscaled_bbox() {
    let traces = [trace(&[(-3.75, 40.35), (-3.6, 40.5), (-3.7, 40.4)])];
    let autoscaled = bbox::resolve(None, &traces, &[]).unwrap();
    let explicit = bbox::resolve(Some(autoscaled), &[], &[]).unwrap();

    for bbox in [autoscaled, explicit] {
        let projector = Projector::new(bbox, 640).unwrap();
        let (w, h) = (
            i64::from(projector.width()) - 1,
            i64::from(projector.height()) - 1,
        );
        let corners = [
            ((bbox.min_lon, bbox.max_lat), (0, 0)),
            ((bbox.max_lon, bbox.max_lat), (w, 0)),
            ((bbox.min_lon, bbox.min_lat), (0, h)),
            ((bbox.max_lon, bbox.min_lat), (w, h)),
        ];
        for ((lon, lat), (ex, ey)) in corners {
            let (x, y) = projector.project_lon_lat(lon, lat).unwrap();
            assert!((x - ex).abs() <= 1 && (y - ey).abs() <= 1, "{lon},{lat}");
        }
    }
}

#[test]
fn overlapping_half_alpha_fills_reach_three_quarters() {
    let blue = Color::rgba(0.0, 0.0, 1.0, 0.5);
    let regions = [
        Region::from_rings(vec![vec![(0.0, 0.0), (6.0, 0.0), (6.0, 6.0), (0.0, 6.0)]]).unwrap(),
        Region::from_rings(vec![vec![(4.0, 4.0), (10.0, 4.0), (10.0, 10.0), (4.0, 10.0)]])
            .unwrap(),
    ];
    let config = RenderConfig {
        longest_edge_pixels: 101,
        bbox: Some(BoundingBox::new(0.0, 10.0, 0.0, 10.0)),
        fill_color: blue,
        stroke_color: Color::TRANSPARENT,
        background: Color::TRANSPARENT,
        ..RenderConfig::default()
    };

    let buffer = render(&[], &regions, &config).unwrap();
    // (5, 5) in degrees is inside both squares
    let overlap = buffer.pixel(50, 50).unwrap();
    assert!((overlap.a - 0.75).abs() < 1e-6, "{overlap:?}");
    assert!((overlap.b - 1.0).abs() < 1e-6);

    let single = buffer.pixel(20, 80).unwrap();
    assert!((single.a - 0.5).abs() < 1e-6, "{single:?}");

    // Over an opaque white background the overlap is 75% blue
    let on_white = render(
        &[],
        &regions,
        &RenderConfig {
            background: Color::WHITE,
            ..config
        },
    )
    .unwrap();
    let overlap = on_white.pixel(50, 50).unwrap();
    assert!((overlap.r - 0.25).abs() < 1e-6 && (overlap.b - 1.0).abs() < 1e-6);
}

#[test]
fn trace_outside_bbox_leaves_image_blank() {
    let config = RenderConfig {
        longest_edge_pixels: 64,
        bbox: Some(BoundingBox::new(0.0, 1.0, 0.0, 1.0)),
        ..RenderConfig::default()
    };
    let outside = [trace(&[(2.0, 2.0), (3.0, 5.0), (-4.0, 7.0)])];
    let buffer = render(&outside, &[], &config).unwrap();
    assert!(colored_pixels(&buffer, Color::WHITE).is_empty());
}

#[test]
fn autoscale_without_traces_is_fatal() {
    let region = Region::from_rings(vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]]).unwrap();
    let result = render(&[], &[region], &RenderConfig::default());
    assert!(matches!(result, Err(RenderError::EmptyInput)));
}

#[test]
fn average_speed_is_deterministic_and_non_negative() {
    let traces = [
        timed_trace(0.0, 0.0, 10.0, 60),
        timed_trace(-70.0, -33.0, 0.5, 5),
        timed_trace(150.0, 60.0, 100.0, 120),
    ];
    for trace in &traces {
        let a = speed::average_speed(trace).unwrap();
        let b = speed::average_speed(trace).unwrap();
        assert_eq!(a, b);
        assert!(a >= 0.0);
    }
}

#[test]
fn non_finite_trace_point_does_not_reach_the_corner() {
    let config = RenderConfig {
        longest_edge_pixels: 11,
        bbox: Some(BoundingBox::new(0.0, 1.0, 0.0, 1.0)),
        ..RenderConfig::default()
    };
    let traces = [trace(&[(0.5, 0.5), (f64::NAN, f64::NAN)])];
    let buffer = render(&traces, &[], &config).unwrap();
    assert_eq!(buffer.pixel(0, 0), Some(Color::WHITE));
    assert_eq!(colored_pixels(&buffer, Color::WHITE), vec![(5, 5)]);
}
