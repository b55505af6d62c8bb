// A layer of the editor: an RGBA8 pixel buffer with fixed width/height.
// Visual: the background surface is the picture; the annotation surface is
// a transparent sheet on top of it that strokes paint into.

use crate::color::{self, Color};
use crate::types::FrameBuffer;
use image::{Rgba, RgbaImage};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// A fully transparent surface (every pixel 0,0,0,0).
    pub fn transparent(width: u32, height: u32) -> Self {
        Self { pixels: RgbaImage::new(width, height) }
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    #[inline]
    pub(crate) fn pixel_mut(&mut self, x: u32, y: u32) -> &mut Rgba<u8> {
        self.pixels.get_pixel_mut(x, y)
    }

    /// True when no pixel has any alpha left.
    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.pixels().all(|p| p[3] == 0)
    }

    /// Reset every pixel to transparent. Visual: all annotation disappears.
    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    /// Merge `bottom` then `top` into a new surface of the same size.
    /// Neither input is modified.
    pub fn flatten(bottom: &Surface, top: &Surface) -> Surface {
        debug_assert_eq!(bottom.dimensions(), top.dimensions(), "layers must share dimensions");
        let mut out = bottom.pixels.clone();
        for (dst, src) in out.pixels_mut().zip(top.pixels.pixels()) {
            *dst = color::source_over(*dst, *src);
        }
        Surface { pixels: out }
    }

    /// Write this surface into the window buffer, over an opaque backdrop.
    /// The frame buffer is resized if needed.
    pub fn present_into(&self, fb: &mut FrameBuffer, backdrop: Color) {
        let (w, h) = (self.width() as usize, self.height() as usize);
        if fb.width != w || fb.height != h {
            *fb = FrameBuffer::new(w, h);
        }
        for (dst, src) in fb.pixels.iter_mut().zip(self.pixels.pixels()) {
            *dst = color::pack_over_backdrop(*src, backdrop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> Surface {
        Surface::from_image(RgbaImage::from_pixel(w, h, Rgba(px)))
    }

    #[test]
    fn flatten_with_empty_top_is_identity() {
        let mut img = RgbaImage::new(4, 3);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgba([x as u8 * 40, y as u8 * 70, 9, 255 - x as u8]);
        }
        let bottom = Surface::from_image(img);
        let top = Surface::transparent(4, 3);
        assert_eq!(Surface::flatten(&bottom, &top), bottom);
    }

    #[test]
    fn flatten_does_not_touch_inputs() {
        let bottom = solid(2, 2, [0, 0, 255, 255]);
        let top = solid(2, 2, [255, 0, 0, 255]);
        let (b0, t0) = (bottom.clone(), top.clone());
        let out = Surface::flatten(&bottom, &top);
        assert_eq!(out.pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(bottom, b0);
        assert_eq!(top, t0);
    }

    #[test]
    fn clear_makes_surface_transparent() {
        let mut s = solid(3, 3, [1, 2, 3, 4]);
        assert!(!s.is_fully_transparent());
        s.clear();
        assert!(s.is_fully_transparent());
        assert_eq!(s.dimensions(), (3, 3));
    }

    #[test]
    fn present_resizes_and_packs_rgb() {
        let s = solid(2, 1, [0x11, 0x22, 0x33, 0xFF]);
        let mut fb = FrameBuffer::new(0, 0);
        s.present_into(&mut fb, Color::BLACK);
        assert_eq!((fb.width, fb.height), (2, 1));
        assert_eq!(fb.pixels, vec![0x00_11_22_33; 2]);
    }
}
