// Brush settings: size, color and whether strokes draw or erase.

use crate::color::Color;

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 50;
pub const DEFAULT_BRUSH_SIZE: u32 = 5;

/// How a stroke combines with what is already on the annotation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    /// Paint over existing annotation ("source-over").
    #[default]
    Draw,
    /// Remove annotation alpha, revealing the background ("destination-out").
    Erase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrushState {
    size: u32,
    pub color: Color,
    pub mode: BrushMode,
}

impl BrushState {
    /// Out-of-range sizes are clamped into 1..=50, never rejected.
    pub fn new(size: u32, color: Color, mode: BrushMode) -> Self {
        Self { size: clamp_size(size), color, mode }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = clamp_size(size);
    }

    /// Grow or shrink by `delta`, staying inside the valid range.
    pub fn nudge_size(&mut self, delta: i32) {
        let next = self.size as i64 + delta as i64;
        self.size = next.clamp(MIN_BRUSH_SIZE as i64, MAX_BRUSH_SIZE as i64) as u32;
    }

    /// Radius of the round tip in pixels.
    pub fn radius(&self) -> f32 {
        self.size as f32 / 2.0
    }
}

impl Default for BrushState {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_SIZE, Color::RED, BrushMode::Draw)
    }
}

#[inline]
fn clamp_size(size: u32) -> u32 {
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}
