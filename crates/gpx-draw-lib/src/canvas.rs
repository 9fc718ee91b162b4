//! The pixel buffer every layer is composited onto
//!
//! Pixels are stored as premultiplied `f32` RGBA so repeated "over" blends stay exact
//! until the final 8-bit export.

use crate::Color;

/// Row-major grid of premultiplied RGBA pixels
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    /// Premultiplied `[r, g, b, a]` per pixel
    pixels: Vec<[f32; 4]>,
}

impl PixelBuffer {
    /// Allocate a buffer with every pixel set to `background`
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let c = background.clamped();
        let premultiplied = [c.r * c.a, c.g * c.a, c.b * c.a, c.a];
        Self {
            width,
            height,
            pixels: vec![premultiplied; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Linear index of an in-bounds pixel
    #[inline]
    pub(crate) fn index_of(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Straight-alpha color of a pixel, `None` when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let index = self.index_of(i64::from(x), i64::from(y))?;
        let [r, g, b, a] = self.pixels[index];
        if a <= 0.0 {
            return Some(Color::TRANSPARENT);
        }
        Some(Color::rgba(r / a, g / a, b / a, a))
    }

    /// Composite `color` over the pixel at `index` with the "over" operator
    #[inline]
    pub(crate) fn blend_index(&mut self, index: usize, color: Color) {
        let sa = color.a;
        if sa <= 0.0 {
            return;
        }
        let inv = 1.0 - sa;
        let dst = &mut self.pixels[index];
        dst[0] = sa * color.r + inv * dst[0];
        dst[1] = sa * color.g + inv * dst[1];
        dst[2] = sa * color.b + inv * dst[2];
        dst[3] = sa + inv * dst[3];
    }

    /// Composite `color` over one pixel, out-of-bounds coordinates are ignored
    pub fn blend(&mut self, x: i64, y: i64, color: Color) {
        if let Some(index) = self.index_of(x, y) {
            self.blend_index(index, color.clamped());
        }
    }

    /// Export as straight-alpha 8-bit RGBA, row-major, 4 bytes per pixel
    pub fn to_rgba8(&self) -> Vec<u8> {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &[r, g, b, a] in &self.pixels {
            if a <= 0.0 {
                out.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            out.extend_from_slice(&[to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)]);
        }
        out
    }
}
