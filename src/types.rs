// Core value types shared by the editor, the stroke rasterizer and the viewer.

/// Pixels ready for the window: each entry is 0x00RRGGBB for minifb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

/// Per-pixel coverage of the stroke currently being drawn.
/// true = this stroke already composited the pixel once.
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub covered: Vec<bool>, // length = width * height
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, covered: vec![false; width * height] }
    }
}

/// A pointer position in display space (the scaled surface's pixel grid).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
