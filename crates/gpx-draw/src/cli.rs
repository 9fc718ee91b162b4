use anyhow::{Result, bail};
use clap::Parser;
use gpx_draw_lib::{AutoscaleSource, BoundingBox, Color, RenderConfig};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// GPX Draw - Render a folder of GPS tracks and optional boundary polygons into one image
pub struct Settings {
    /// Folder containing the .gpx files to draw
    #[clap(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Output image file (format from extension, PNG by default)
    #[clap(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Pixel length of the longer image edge; the other edge follows the bbox aspect ratio
    #[clap(short = 's', long, default_value = "512")]
    pub longest_edge: u32,

    /// Bounding box to render; autoscaled from the tracks when omitted
    #[clap(
        long,
        num_args = 4,
        value_names = ["MIN_LON", "MAX_LON", "MIN_LAT", "MAX_LAT"],
        allow_negative_numbers = true
    )]
    pub bbox: Option<Vec<f64>>,

    /// GeoJSON file with boundary polygons drawn behind the tracks
    #[clap(short, long, value_name = "FILE")]
    pub regions: Option<PathBuf>,

    /// Region fill color (#RRGGBB or #RRGGBBAA)
    #[clap(long, default_value = "#80808040", value_parser = parse_color)]
    pub fill_color: Color,

    /// Region outline color
    #[clap(long, default_value = "#666666", value_parser = parse_color)]
    pub stroke_color: Color,

    /// Track line color
    #[clap(long, default_value = "#000000", value_parser = parse_color)]
    pub trace_color: Color,

    /// Background color
    #[clap(long, default_value = "#ffffff", value_parser = parse_color)]
    pub background: Color,

    /// Color of the frame drawn around an explicit bbox
    #[clap(long, default_value = "#000000", value_parser = parse_color)]
    pub frame_color: Color,

    /// Do not draw a frame around an explicit bbox
    #[clap(long, default_value = "false")]
    pub no_frame: bool,

    /// Track and outline width in pixels
    #[clap(long, default_value = "1")]
    pub line_width: u32,

    /// Skip tracks whose average speed exceeds this value (km/h)
    #[clap(long, value_name = "KMH", allow_negative_numbers = true)]
    pub max_avg_speed: Option<f64>,

    /// Narrow the image width by cos(mean latitude) to counter horizontal stretching
    #[clap(long, default_value = "false")]
    pub latitude_correction: bool,

    /// Let the boundary polygons take part in autoscaling
    #[clap(long, default_value = "false")]
    pub autoscale_regions: bool,
}

fn parse_color(s: &str) -> std::result::Result<Color, String> {
    s.parse::<Color>().map_err(|err| err.to_string())
}

impl Settings {
    /// Build the render configuration from the parsed arguments
    pub fn render_config(&self) -> Result<RenderConfig> {
        let bbox = match self.bbox.as_deref() {
            None => None,
            Some(&[min_lon, max_lon, min_lat, max_lat]) => {
                Some(BoundingBox::new(min_lon, max_lon, min_lat, max_lat))
            }
            Some(values) => bail!("--bbox expects 4 values, got {}", values.len()),
        };

        if let Some(speed) = self.max_avg_speed {
            if !(speed.is_finite() && speed >= 0.0) {
                bail!("--max-avg-speed must be a non-negative number, got {speed}");
            }
        }
        if self.longest_edge == 0 {
            bail!("--longest-edge must be at least 1");
        }

        Ok(RenderConfig {
            longest_edge_pixels: self.longest_edge,
            frame_color: bbox.filter(|_| !self.no_frame).map(|_| self.frame_color),
            bbox,
            autoscale_source: if self.autoscale_regions {
                AutoscaleSource::TracesAndRegions
            } else {
                AutoscaleSource::Traces
            },
            latitude_correction: self.latitude_correction,
            fill_color: self.fill_color,
            stroke_color: self.stroke_color,
            trace_color: self.trace_color,
            background: self.background,
            line_width: self.line_width.max(1),
            max_avg_speed: self.max_avg_speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Settings::try_parse_from(std::iter::once("gpx-draw").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&["tracks"]);
        let config = settings.render_config().unwrap();
        assert_eq!(settings.output, PathBuf::from("output.png"));
        assert_eq!(config.longest_edge_pixels, 512);
        assert_eq!(config.bbox, None);
        assert_eq!(config.frame_color, None);
        assert_eq!(config.trace_color, Color::BLACK);
        assert_eq!(config.background, Color::WHITE);
        assert_eq!(config.autoscale_source, AutoscaleSource::Traces);
    }

    #[test]
    fn test_bbox_with_negative_values_enables_frame() {
        let settings = parse(&["tracks", "--bbox", "-3.8", "-3.6", "40.3", "40.5"]);
        let config = settings.render_config().unwrap();
        assert_eq!(config.bbox, Some(BoundingBox::new(-3.8, -3.6, 40.3, 40.5)));
        assert_eq!(config.frame_color, Some(Color::BLACK));

        let settings = parse(&["tracks", "--bbox", "0", "1", "0", "1", "--no-frame"]);
        assert_eq!(settings.render_config().unwrap().frame_color, None);
    }

    #[test]
    fn test_colors_and_filters() {
        let settings = parse(&[
            "tracks",
            "--fill-color",
            "#ff000080",
            "--max-avg-speed",
            "20",
            "--autoscale-regions",
            "--line-width",
            "0",
        ]);
        let config = settings.render_config().unwrap();
        assert_eq!(config.fill_color.r, 1.0);
        assert_eq!(config.max_avg_speed, Some(20.0));
        assert_eq!(config.autoscale_source, AutoscaleSource::TracesAndRegions);
        assert_eq!(config.line_width, 1);
    }

    #[test]
    fn test_invalid_arguments() {
        let bad_color = Settings::try_parse_from(["gpx-draw", "tracks", "--trace-color", "red"]);
        assert!(bad_color.is_err());

        let short_bbox = Settings::try_parse_from(["gpx-draw", "tracks", "--bbox", "1", "2"]);
        assert!(short_bbox.is_err());

        let settings = parse(&["tracks", "--max-avg-speed", "-5"]);
        assert!(settings.render_config().is_err());

        let settings = parse(&["tracks", "--longest-edge", "0"]);
        assert!(settings.render_config().is_err());
    }
}
