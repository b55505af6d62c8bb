//! The layered image editor: a fixed background picture with a transparent
//! annotation sheet on top that freehand strokes draw into or erase from.
//!
//! Lifecycle of one session:
//!
//! ```text
//! Uninitialized -> Loading -> Ready <-> Stroking -> Flattened | Discarded
//! ```
//!
//! `save` hands the flattened PNG to the session's completion hook; `close`
//! fires the cancel hook instead. Either way both layers are released and the
//! editor can be opened again with a new image.

use crate::brush::{BrushMode, BrushState};
use crate::codec::{self, ImageSource, SourceKind};
use crate::color::Color;
use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::loader::{self, LoadedLayers, PendingLoad};
use crate::stroke::Stroke;
use crate::surface::Surface;
use crate::types::{FrameBuffer, Point};
use crate::viewport::Viewport;
use log::{debug, info, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Uninitialized,
    Loading,
    Ready,
    Stroking,
    Flattened,
    Discarded,
}

/// Discrete input the editor reacts to, independent of any UI toolkit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

/// Caller-supplied completion and cancel callbacks for one session.
/// At most one of them runs.
pub struct SessionHooks {
    on_save: Box<dyn FnOnce(ImageSource)>,
    on_cancel: Box<dyn FnOnce()>,
}

impl SessionHooks {
    pub fn new(
        on_save: impl FnOnce(ImageSource) + 'static,
        on_cancel: impl FnOnce() + 'static,
    ) -> Self {
        Self { on_save: Box::new(on_save), on_cancel: Box::new(on_cancel) }
    }

    /// Hooks that do nothing, for callers that only want `flatten`.
    pub fn noop() -> Self {
        Self::new(|_| {}, || {})
    }
}

struct Session {
    kind: SourceKind,
    background: Surface,
    annotation: Surface,
    stroke: Option<Stroke>,
    scale: f64,
    hooks: SessionHooks,
}

impl Session {
    fn new(layers: LoadedLayers, hooks: SessionHooks) -> Self {
        let (w, h) = layers.background.dimensions();
        Self {
            kind: layers.kind,
            annotation: Surface::transparent(w, h),
            background: layers.background,
            stroke: None,
            scale: layers.scale,
            hooks,
        }
    }
}

pub struct LayeredImageEditor {
    config: EditorConfig,
    brush: BrushState,
    state: EditorState,
    session: Option<Session>,
    pending: Option<(PendingLoad, SessionHooks)>,
}

impl LayeredImageEditor {
    pub fn new(config: EditorConfig) -> Self {
        let brush = config.default_brush();
        Self { config, brush, state: EditorState::Uninitialized, session: None, pending: None }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// True while a session owns a pair of layers (Ready or Stroking).
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /* ---------- Opening ---------- */

    /// Decode `source` on this thread and open a session sized to `viewport`.
    /// On a decode error the editor stays closed.
    pub fn open(
        &mut self,
        source: ImageSource,
        viewport: Viewport,
        hooks: SessionHooks,
    ) -> Result<()> {
        self.discard_current();
        self.state = EditorState::Loading;
        match loader::load_layers(&source, viewport, self.config.allow_upscale) {
            Ok(layers) => {
                self.start_session(layers, hooks);
                Ok(())
            }
            Err(e) => {
                self.state = EditorState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Start decoding on a worker thread; call `poll_load` to finish opening.
    pub fn begin_load(&mut self, source: ImageSource, viewport: Viewport, hooks: SessionHooks) {
        self.discard_current();
        debug!("loading {source:?} in the background");
        let pending = PendingLoad::spawn(source, viewport, self.config.allow_upscale);
        self.pending = Some((pending, hooks));
        self.state = EditorState::Loading;
    }

    /// Finish a `begin_load` if the decode is done. `Ok(true)` once the
    /// session is Ready, `Ok(false)` while still decoding.
    pub fn poll_load(&mut self) -> Result<bool> {
        let Some((pending, _)) = &self.pending else {
            return Ok(self.is_active());
        };
        let Some(result) = pending.try_take() else {
            return Ok(false);
        };
        let Some((_, hooks)) = self.pending.take() else {
            return Ok(false);
        };
        match result {
            Ok(layers) => {
                self.start_session(layers, hooks);
                Ok(true)
            }
            Err(e) => {
                self.state = EditorState::Uninitialized;
                Err(e)
            }
        }
    }

    fn start_session(&mut self, layers: LoadedLayers, hooks: SessionHooks) {
        let (w, h) = layers.background.dimensions();
        let (nw, nh) = layers.natural_size;
        info!("editor open: {w}x{h} (source {nw}x{nh})");
        self.session = Some(Session::new(layers, hooks));
        self.state = EditorState::Ready;
    }

    // Opening over a live session drops it without firing either hook.
    fn discard_current(&mut self) {
        if let Some((pending, _)) = self.pending.take() {
            pending.cancel();
            debug!("abandoning pending load");
        }
        if self.session.take().is_some() {
            warn!("editor reopened over an unsaved session; discarding it");
        }
    }

    /* ---------- Brush ---------- */

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    /// Applies to strokes begun after this call. Sizes are clamped to 1..=50.
    /// A brush set before `open` carries into the session; it falls back to
    /// the configured default once the session is saved or closed.
    pub fn configure_brush(&mut self, size: u32, color: Color, mode: BrushMode) {
        self.brush = BrushState::new(size, color, mode);
        debug!("brush: size {} color {} mode {:?}", self.brush.size(), color, mode);
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush.set_size(size);
    }

    /// `[` / `]` style size steps; stays inside 1..=50.
    pub fn nudge_brush_size(&mut self, delta: i32) {
        self.brush.nudge_size(delta);
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush.color = color;
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.brush.mode = mode;
    }

    /* ---------- Strokes ---------- */

    /// Pointer down: open a stroke at `at` using the current brush.
    ///
    /// # Panics
    /// If no session is open; that is a caller bug, not a runtime condition.
    pub fn begin_stroke(&mut self, at: Point) {
        let brush = self.brush;
        let session = self.session_mut("begin_stroke");
        session.stroke = Some(Stroke::begin(&session.annotation, at, brush));
        self.state = EditorState::Stroking;
    }

    /// Pointer move: extend the open stroke. Ignored when none is open.
    pub fn continue_stroke(&mut self, to: Point) {
        let Some(session) = self.session.as_mut() else { return };
        let Some(stroke) = session.stroke.as_mut() else { return };
        let painted = stroke.extend_to(&mut session.annotation, to);
        trace!("segment to ({:.1}, {:.1}) covered {painted} px", to.x, to.y);
    }

    /// Pointer up or leave: close the open stroke. Ignored when none is open.
    pub fn end_stroke(&mut self) {
        let Some(session) = self.session.as_mut() else { return };
        if session.stroke.take().is_some() {
            self.state = EditorState::Ready;
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(p) => self.begin_stroke(p),
            PointerEvent::Move(p) => self.continue_stroke(p),
            PointerEvent::Up | PointerEvent::Leave => self.end_stroke(),
        }
    }

    /// Wipe the annotation layer. The background is untouched; there is no undo.
    ///
    /// # Panics
    /// If no session is open.
    pub fn clear_annotation(&mut self) {
        let session = self.session_mut("clear_annotation");
        session.stroke = None;
        session.annotation.clear();
        self.state = EditorState::Ready;
        debug!("annotation cleared");
    }

    /* ---------- Reading the layers ---------- */

    /// Display size of both layers.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.session.as_ref().map(|s| s.background.dimensions())
    }

    /// Display size divided by natural size.
    pub fn scale(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.scale)
    }

    pub fn background(&self) -> Option<&Surface> {
        self.session.as_ref().map(|s| &s.background)
    }

    pub fn annotation(&self) -> Option<&Surface> {
        self.session.as_ref().map(|s| &s.annotation)
    }

    /// Background with the annotation on top, as a new surface. Neither layer
    /// is modified, so this can be called any number of times.
    pub fn flatten(&self) -> Option<Surface> {
        self.session.as_ref().map(|s| Surface::flatten(&s.background, &s.annotation))
    }

    /// Draw the current composite into the window buffer.
    pub fn render_into(&self, fb: &mut FrameBuffer) {
        if let Some(flat) = self.flatten() {
            flat.present_into(fb, self.config.backdrop);
        }
    }

    /* ---------- Ending the session ---------- */

    /// Flatten, encode as PNG in the source's representation, hand the result
    /// to the completion hook and end the session. If encoding fails the
    /// session stays open so the caller can retry or close.
    ///
    /// # Panics
    /// If no session is open.
    pub fn save(&mut self) -> Result<()> {
        let session = self.session_mut("save");
        session.stroke = None;
        let flat = Surface::flatten(&session.background, &session.annotation);
        let encoded = match codec::encode_png(flat.image(), session.kind) {
            Ok(encoded) => encoded,
            Err(e) => {
                self.state = EditorState::Ready;
                return Err(e);
            }
        };

        let Some(session) = self.session.take() else {
            return Err(Error::encode("session vanished while saving"));
        };
        self.state = EditorState::Flattened;
        self.brush = self.config.default_brush();
        info!("editor saved {encoded:?}");
        (session.hooks.on_save)(encoded);
        Ok(())
    }

    /// Discard everything, mid-stroke or mid-load included, and fire the
    /// cancel hook. Closing an editor with nothing open does nothing.
    pub fn close(&mut self) {
        let hooks = match (self.session.take(), self.pending.take()) {
            (Some(session), _) => Some(session.hooks),
            (None, Some((pending, hooks))) => {
                pending.cancel();
                Some(hooks)
            }
            (None, None) => None,
        };
        if let Some(hooks) = hooks {
            self.state = EditorState::Discarded;
            self.brush = self.config.default_brush();
            info!("editor closed without saving");
            (hooks.on_cancel)();
        }
    }

    fn session_mut(&mut self, op: &str) -> &mut Session {
        let state = self.state;
        match self.session.as_mut() {
            Some(session) => session,
            None => panic!("{op} called with no open editor session (state {state:?})"),
        }
    }
}

impl Default for LayeredImageEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
