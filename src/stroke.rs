// Freehand stroke rasterizer for the annotation layer.
// Visual expectation: dragging the pointer leaves a round-capped, round-joined
// line behind it (or, in erase mode, a line-shaped hole in the annotation).

use crate::brush::{BrushMode, BrushState};
use crate::color;
use crate::surface::Surface;
use crate::types::{Mask, Point};

/// A little over half a pixel diagonal: even a 1px tip always covers the
/// pixel the pointer is in.
const MIN_TIP_RADIUS: f32 = 0.75;

/// One open pointer-down-to-pointer-up gesture.
///
/// The brush is captured when the stroke begins, so changing brush settings
/// mid-gesture only affects the next stroke. Coverage is remembered per
/// stroke: a pixel is composited at most once, so the overlapping ends of
/// consecutive segments don't stack up semi-transparent colors.
pub struct Stroke {
    brush: BrushState,
    last: Point,
    coverage: Mask,
}

impl Stroke {
    /// Open a stroke at `at`. Nothing is painted until it is extended.
    pub fn begin(target: &Surface, at: Point, brush: BrushState) -> Self {
        let (w, h) = target.dimensions();
        Self { brush, last: at, coverage: Mask::new(w as usize, h as usize) }
    }

    /// Extend the stroke to `to`, compositing the new segment into `target`.
    /// Returns how many pixels changed coverage (useful for logging).
    pub fn extend_to(&mut self, target: &mut Surface, to: Point) -> usize {
        debug_assert_eq!(
            (self.coverage.width, self.coverage.height),
            (target.width() as usize, target.height() as usize),
            "stroke opened on a surface of a different size"
        );
        let from = self.last;
        self.last = to;
        let radius = self.brush.radius().max(MIN_TIP_RADIUS);
        let brush = self.brush;
        stamp_segment(&mut self.coverage, from, to, radius, |x, y| {
            let px = target.pixel_mut(x, y);
            *px = match brush.mode {
                BrushMode::Draw => color::source_over(*px, brush.color.to_pixel()),
                // The eraser always removes everything under it, whatever
                // color (or alpha) the brush currently holds.
                BrushMode::Erase => color::destination_out(*px, u8::MAX),
            };
        })
    }
}

/// Mark every pixel whose centre lies within `radius` of the segment a→b.
/// `paint(x, y)` runs once for each pixel that this stroke had not covered yet.
/// A zero-length segment stamps a round dot.
fn stamp_segment<F>(
    mask: &mut Mask,
    a: Point,
    b: Point,
    radius: f32,
    mut paint: F,
) -> usize
where
    F: FnMut(u32, u32),
{
    if mask.width == 0 || mask.height == 0 {
        return 0;
    }
    let w = mask.width as i64;
    let h = mask.height as i64;

    // Scan just the bounding box of the capsule, clamped to the surface.
    let x0 = ((a.x.min(b.x) - radius).floor() as i64).max(0);
    let x1 = ((a.x.max(b.x) + radius).ceil() as i64).min(w - 1);
    let y0 = ((a.y.min(b.y) - radius).floor() as i64).max(0);
    let y1 = ((a.y.max(b.y) + radius).ceil() as i64).min(h - 1);
    if x0 > x1 || y0 > y1 {
        return 0;
    }

    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let r2 = radius * radius;
    let mut painted = 0;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let idx = y as usize * mask.width + x as usize;
            if mask.covered[idx] {
                continue; // already composited by this stroke
            }

            // Distance from the pixel centre to the closest point on the segment.
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let t = if len2 > 0.0 {
                (((px - a.x) * dx + (py - a.y) * dy) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let (cx, cy) = (a.x + t * dx, a.y + t * dy);
            let d2 = (px - cx) * (px - cx) + (py - cy) * (py - cy);
            if d2 > r2 {
                continue;
            }

            mask.covered[idx] = true;
            paint(x as u32, y as u32);
            painted += 1;
        }
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn pen(size: u32) -> BrushState {
        BrushState::new(size, Color::RED, BrushMode::Draw)
    }

    #[test]
    fn begin_alone_paints_nothing() {
        let surface = Surface::transparent(20, 20);
        let _stroke = Stroke::begin(&surface, Point::new(10.0, 10.0), pen(5));
        assert!(surface.is_fully_transparent());
    }

    #[test]
    fn horizontal_segment_has_brush_width() {
        let mut surface = Surface::transparent(40, 20);
        let mut stroke = Stroke::begin(&surface, Point::new(5.0, 10.0), pen(6));
        stroke.extend_to(&mut surface, Point::new(35.0, 10.0));

        // Radius 3 around y = 10.0 covers pixel rows 7..=12 in the middle of the line.
        let column: Vec<bool> = (0..20).map(|y| surface.pixel(20, y)[3] > 0).collect();
        let covered: Vec<u32> = (0..20).filter(|&y| column[y as usize]).collect();
        assert_eq!(covered, vec![7, 8, 9, 10, 11, 12]);
        assert_eq!(surface.pixel(20, 10), RED);
    }

    #[test]
    fn round_cap_extends_past_the_endpoint() {
        let mut surface = Surface::transparent(40, 20);
        let mut stroke = Stroke::begin(&surface, Point::new(10.5, 10.5), pen(10));
        stroke.extend_to(&mut surface, Point::new(20.5, 10.5));
        assert_eq!(surface.pixel(7, 10), RED); // behind the start, inside the cap
        assert_eq!(surface.pixel(23, 10), RED); // past the end, inside the cap
        assert_eq!(surface.pixel(27, 10)[3], 0);
    }

    #[test]
    fn single_pixel_brush_hits_the_pixel_under_the_pointer() {
        let mut surface = Surface::transparent(10, 10);
        let mut stroke = Stroke::begin(&surface, Point::new(3.0, 3.0), pen(1));
        stroke.extend_to(&mut surface, Point::new(3.0, 3.0));
        assert_eq!(surface.pixel(3, 3), RED);
    }

    #[test]
    fn overlapping_segments_composite_once() {
        let translucent = BrushState::new(8, Color::rgba(0, 0, 255, 128), BrushMode::Draw);
        let mut surface = Surface::transparent(30, 30);
        let mut stroke = Stroke::begin(&surface, Point::new(5.0, 15.0), translucent);
        stroke.extend_to(&mut surface, Point::new(25.0, 15.0));
        let once = surface.pixel(15, 15);
        // Double back over the same pixels within the same stroke.
        stroke.extend_to(&mut surface, Point::new(5.0, 15.0));
        assert_eq!(surface.pixel(15, 15), once);
        assert_eq!(once[3], 128);
    }

    #[test]
    fn erase_stroke_removes_what_draw_stroke_added() {
        let mut surface = Surface::transparent(50, 50);
        let path = [Point::new(4.0, 4.0), Point::new(30.0, 12.0), Point::new(20.0, 44.0)];

        let mut draw = Stroke::begin(&surface, path[0], pen(9));
        for p in &path[1..] {
            draw.extend_to(&mut surface, *p);
        }
        assert!(!surface.is_fully_transparent());

        let eraser = BrushState::new(9, Color::RED, BrushMode::Erase);
        let mut erase = Stroke::begin(&surface, path[0], eraser);
        for p in &path[1..] {
            erase.extend_to(&mut surface, *p);
        }
        assert!(surface.is_fully_transparent());
    }

    #[test]
    fn eraser_ignores_brush_alpha() {
        let mut surface = Surface::transparent(40, 20);
        let ink = BrushState::new(8, Color::rgba(0, 255, 0, 128), BrushMode::Draw);
        let mut draw = Stroke::begin(&surface, Point::new(4.0, 10.0), ink);
        draw.extend_to(&mut surface, Point::new(36.0, 10.0));
        assert_eq!(surface.pixel(20, 10)[3], 128);

        // Same translucent color, erase mode: the line goes away completely.
        let mut eraser = ink;
        eraser.mode = BrushMode::Erase;
        let mut erase = Stroke::begin(&surface, Point::new(4.0, 10.0), eraser);
        erase.extend_to(&mut surface, Point::new(36.0, 10.0));
        assert!(surface.is_fully_transparent());
    }

    #[test]
    fn segments_outside_the_surface_are_clipped() {
        let mut surface = Surface::transparent(10, 10);
        let mut stroke = Stroke::begin(&surface, Point::new(-50.0, -50.0), pen(4));
        assert_eq!(stroke.extend_to(&mut surface, Point::new(-20.0, -30.0)), 0);
        assert!(surface.is_fully_transparent());
        // Crossing into the surface paints only the in-bounds part.
        assert!(stroke.extend_to(&mut surface, Point::new(5.0, 5.0)) > 0);
    }
}
