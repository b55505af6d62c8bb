// Fitting the source image into the space the editor is allowed to use.

use crate::config::EditorConfig;

/// Maximum display size for the editor's surfaces, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub max_width: u32,
    pub max_height: u32,
}

impl Viewport {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self { max_width: max_width.max(1), max_height: max_height.max(1) }
    }

    /// The share of a window the editor may cover (by default 80% of the
    /// width and 70% of the height).
    pub fn from_window(window_width: u32, window_height: u32, config: &EditorConfig) -> Self {
        Self::new(
            scaled_axis(window_width, config.viewport_width_fraction),
            scaled_axis(window_height, config.viewport_height_fraction),
        )
    }

    /// Uniform factor that makes `natural` fit inside the viewport.
    /// With `allow_upscale` the factor may exceed 1.0 for small sources.
    pub fn fit_scale(&self, natural: (u32, u32), allow_upscale: bool) -> f64 {
        let (nw, nh) = (natural.0.max(1) as f64, natural.1.max(1) as f64);
        let scale = (self.max_width as f64 / nw).min(self.max_height as f64 / nh);
        if allow_upscale { scale } else { scale.min(1.0) }
    }

    /// Display size for a source of size `natural`, aspect ratio preserved.
    pub fn fit(&self, natural: (u32, u32), allow_upscale: bool) -> (u32, u32) {
        let scale = self.fit_scale(natural, allow_upscale);
        (scaled_axis(natural.0, scale), scaled_axis(natural.1, scale))
    }
}

// Truncate like a canvas width attribute does; the epsilon keeps products such
// as 1000 * (600 / 1000) from landing on 599.999.. and losing a pixel.
#[inline]
fn scaled_axis(natural: u32, scale: f64) -> u32 {
    ((natural as f64 * scale + 1e-6).floor() as u32).max(1)
}
