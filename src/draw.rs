// Window + software drawing for the viewer.
// Visual effects provided here:
// 1) A window that shows the flattened editor image.
// 2) A ring that follows the mouse, as wide as the brush.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use sketchpad::{Error, FrameBuffer, Point, PointerEvent};

pub struct Drawer {
    window: Window,     // the on-screen window you see
    was_down: bool,     // left button state last frame
    stroke_open: bool,  // we sent Down and no Up/Leave yet
}

impl Drawer {
    /// Create a window sized to the editor's surfaces.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, was_down: false, stroke_open: false })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn set_status(&mut self, status: &str) {
        self.window.set_title(status);
    }

    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Mouse position in window pixels, or None while it is outside the window.
    pub fn mouse_pos(&self) -> Option<Point> {
        self.window.get_mouse_pos(MouseMode::Discard).map(|(x, y)| Point::new(x, y))
    }

    /// Turn this frame's left-button state into at most one pointer event.
    /// Visual: press starts a line, dragging extends it, release or leaving
    /// the window ends it. Re-entering with the button held does not resume.
    pub fn poll_pointer(&mut self) -> Option<PointerEvent> {
        let down = self.window.get_mouse_down(MouseButton::Left);
        let pos = self.mouse_pos();

        let event = match (self.stroke_open, down, pos) {
            (false, true, Some(p)) if !self.was_down => {
                self.stroke_open = true;
                Some(PointerEvent::Down(p))
            }
            (true, true, Some(p)) => Some(PointerEvent::Move(p)),
            (true, true, None) => {
                self.stroke_open = false;
                Some(PointerEvent::Leave)
            }
            (true, false, _) => {
                self.stroke_open = false;
                Some(PointerEvent::Up)
            }
            _ => None,
        };
        self.was_down = down;
        event
    }
}

/* ---------- Software drawing on the frame buffer ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = color;
}

/// Outline of the brush tip centred on the pointer (midpoint circle).
/// Visual: a thin ring shows exactly how wide the next stroke will be.
pub fn draw_brush_outline(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    if radius <= 1 {
        put_pixel(fb, cx, cy, color);
        return;
    }
    let (mut x, mut y) = (radius, 0);
    let mut err = 1 - radius;
    while x >= y {
        // One point per octant
        for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            put_pixel(fb, cx + dx, cy + dy, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}
