//! Two-layer image annotation: a background picture, a transparent sheet on
//! top for freehand drawing and erasing, and a flatten step that merges both
//! into one PNG.

pub mod brush;
pub mod codec;
pub mod color;
pub mod config;
pub mod editor;
pub mod error;
pub mod generation;
pub mod loader;
pub mod stroke;
pub mod surface;
pub mod types;
pub mod viewport;

pub use brush::{BrushMode, BrushState};
pub use codec::{ImageSource, SourceKind};
pub use color::Color;
pub use config::EditorConfig;
pub use editor::{EditorState, LayeredImageEditor, PointerEvent, SessionHooks};
pub use error::{Error, Result};
pub use surface::Surface;
pub use types::{FrameBuffer, Point};
pub use viewport::Viewport;
