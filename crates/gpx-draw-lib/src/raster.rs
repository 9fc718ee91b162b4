//! Rasterisation of strokes and fills into a per-operation coverage set
//!
//! Shapes are rendered with `tiny-skia` into an opaque, non anti-aliased scratch pixmap
//! that acts as a mask. The compositor then reads every covered pixel back once, so a
//! shape that covers a pixel several times (self-crossing trace, thick brush overlap)
//! still blends it only once.
//!
//! Pixel centers lie on integer positions in projected space. A fill covers a pixel when
//! its center is strictly right of / below a left or top edge and on or left of / above a
//! right or bottom edge, the same half-open rule on both axes.

use tiny_skia::{
    FillRule, LineCap, Paint, Path, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Stroke,
    Transform,
};

/// Pixel rectangle touched since the last drain, `right`/`bottom` exclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Area {
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

impl Area {
    fn union(self, other: Area) -> Area {
        Area {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Set of covered pixels for one draw operation
pub(crate) struct Coverage {
    pixmap: Pixmap,
    dirty: Option<Area>,
}

impl std::fmt::Debug for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coverage")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Coverage {
    /// `None` when the size is zero or too large for a pixmap
    pub(crate) fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
            dirty: None,
        })
    }

    /// Hand every covered pixel index to `visit` once, then reset the set
    ///
    /// Returns the number of covered pixels.
    pub(crate) fn drain(&mut self, mut visit: impl FnMut(usize)) -> usize {
        let Some(area) = self.dirty.take() else {
            return 0;
        };
        let width = self.pixmap.width() as usize;
        let pixels = self.pixmap.pixels_mut();

        let mut count = 0;
        for y in area.top..area.bottom {
            for x in area.left..area.right {
                let index = y * width + x;
                if pixels[index].alpha() > 0 {
                    pixels[index] = PremultipliedColorU8::TRANSPARENT;
                    visit(index);
                    count += 1;
                }
            }
        }
        count
    }

    /// Stamp a square brush of `line_width` pixels centered on (x, y)
    pub(crate) fn point(&mut self, x: i64, y: i64, line_width: u32) {
        let (lo, _) = brush_offsets(line_width);
        let size = line_width.max(1) as f32;
        let Some(rect) = Rect::from_xywh((x + lo) as f32, (y + lo) as f32, size, size) else {
            return;
        };
        // Integer aligned in pixmap space, no center shift
        self.pixmap
            .fill_rect(rect, &mask_paint(), Transform::identity(), None);
        self.touch(rect, 1.0);
    }

    /// Mark independent straight segments between pixel positions
    ///
    /// Each segment is its own sub-path with square caps so both endpoints are covered
    /// no matter how the segments join. A width of 1 draws hairlines.
    pub(crate) fn segments(&mut self, segments: &[((i64, i64), (i64, i64))], line_width: u32) {
        let mut builder = PathBuilder::new();
        for &(from, to) in segments {
            let Some((from, to)) = within_coord_limit(from, to) else {
                continue;
            };
            builder.move_to(from.0, from.1);
            builder.line_to(to.0, to.1);
        }
        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width: if line_width <= 1 {
                0.0
            } else {
                line_width as f32
            },
            line_cap: LineCap::Square,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &mask_paint(), &stroke, pixel_centers(), None);
        self.touch_path(&path, line_width as f32 + 2.0);
    }

    /// Fill one polygon (exterior ring plus holes) with the even-odd rule
    ///
    /// Rings are given in unrounded pixel space and closed implicitly. Non-finite
    /// vertices are skipped.
    pub(crate) fn fill_polygon(&mut self, rings: &[Vec<(f64, f64)>]) {
        let mut builder = PathBuilder::new();
        for ring in rings {
            let mut vertices = ring
                .iter()
                .filter(|(x, y)| x.is_finite() && y.is_finite());
            let Some(&(x, y)) = vertices.next() else {
                continue;
            };
            builder.move_to(x as f32, y as f32);
            for &(x, y) in vertices {
                builder.line_to(x as f32, y as f32);
            }
            builder.close();
        }
        let Some(path) = builder.finish() else {
            return;
        };

        self.pixmap.fill_path(
            &path,
            &mask_paint(),
            FillRule::EvenOdd,
            pixel_centers(),
            None,
        );
        self.touch_path(&path, 2.0);
    }

    fn touch_path(&mut self, path: &Path, pad: f32) {
        self.touch(path.bounds(), pad);
    }

    /// Grow the dirty area by a rectangle in pixmap space plus `pad` pixels
    fn touch(&mut self, rect: Rect, pad: f32) {
        let clamp = |v: f32, max: u32| (v.max(0.0) as usize).min(max as usize);
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let area = Area {
            left: clamp((rect.left() - pad).floor(), width),
            top: clamp((rect.top() - pad).floor(), height),
            right: clamp((rect.right() + pad).ceil() + 1.0, width),
            bottom: clamp((rect.bottom() + pad).ceil() + 1.0, height),
        };
        if area.left >= area.right || area.top >= area.bottom {
            return;
        }
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(area),
            None => area,
        });
    }
}

/// Pixel coordinates handed to `tiny-skia` stay within this magnitude
///
/// Paths whose bounds exceed its fixed point range are dropped whole, so a far away
/// endpoint would otherwise erase the visible part of its segment.
const COORD_LIMIT: f64 = 1.0e7;

/// Shorten a segment to the part inside `[-COORD_LIMIT, COORD_LIMIT]` on both axes
fn within_coord_limit(from: (i64, i64), to: (i64, i64)) -> Option<((f32, f32), (f32, f32))> {
    let (x0, y0) = (from.0 as f64, from.1 as f64);
    let (dx, dy) = (to.0 as f64 - x0, to.1 as f64 - y0);

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (start, delta) in [(x0, dx), (y0, dy)] {
        if delta == 0.0 {
            if start.abs() > COORD_LIMIT {
                return None;
            }
            continue;
        }
        let a = (-COORD_LIMIT - start) / delta;
        let b = (COORD_LIMIT - start) / delta;
        t0 = t0.max(a.min(b));
        t1 = t1.min(a.max(b));
    }
    if t0 > t1 {
        return None;
    }
    let at = |t: f64| ((x0 + t * dx) as f32, (y0 + t * dy) as f32);
    Some((at(t0), at(t1)))
}

/// Opaque, aliased paint: every touched pixel is fully covered or not at all
fn mask_paint() -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = false;
    paint
}

/// Projected coordinates address pixel centers, pixmap pixels span `[x, x + 1)`
fn pixel_centers() -> Transform {
    Transform::from_translate(0.5, 0.5)
}

/// Inclusive brush offsets around the center pixel for a given width
fn brush_offsets(line_width: u32) -> (i64, i64) {
    let w = i64::from(line_width.max(1));
    (-(w - 1) / 2, w / 2)
}
