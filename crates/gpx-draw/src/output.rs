use anyhow::{Context, Result};
use gpx_draw_lib::PixelBuffer;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;

/// Encode the rendered buffer and write it to `path`
///
/// The format follows the file extension (PNG, JPEG, BMP or WebP) and falls back to PNG
/// for anything else. JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn save_image(buffer: PixelBuffer, path: &Path) -> Result<()> {
    let (width, height) = (buffer.width(), buffer.height());
    let image = RgbaImage::from_raw(width, height, buffer.to_rgba8())
        .context("pixel buffer size does not match its dimensions")?;

    let format = match ImageFormat::from_path(path) {
        Ok(
            format @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::WebP),
        ) => format,
        _ => {
            tracing::warn!("Unsupported output extension for {}, writing PNG", path.display());
            ImageFormat::Png
        }
    };

    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
        _ => DynamicImage::ImageRgba8(image),
    };
    image
        .save_with_format(path, format)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!("Image saved as {} ({width}x{height})", path.display());
    Ok(())
}
