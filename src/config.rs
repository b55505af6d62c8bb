//! Editor settings, loaded from an optional TOML file.
//!
//! ```toml
//! viewport_width_fraction = 0.8
//! viewport_height_fraction = 0.7
//! allow_upscale = true
//! brush_size = 5
//! brush_color = "#ff0000"
//! backdrop = "#1e1e1e"
//! ```

use crate::brush::{BrushMode, BrushState};
use crate::color::Color;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Share of the window width the editor may use.
    pub viewport_width_fraction: f64,
    /// Share of the window height the editor may use.
    pub viewport_height_fraction: f64,
    /// Let sources smaller than the viewport grow to fill it.
    pub allow_upscale: bool,
    pub brush_size: u32,
    pub brush_color: Color,
    /// Shown behind transparent parts of the image in the viewer.
    pub backdrop: Color,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            viewport_width_fraction: 0.8,
            viewport_height_fraction: 0.7,
            allow_upscale: true,
            brush_size: 5,
            brush_color: Color::RED,
            backdrop: Color::rgb(0x1E, 0x1E, 0x1E),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("viewport_width_fraction", self.viewport_width_fraction),
            ("viewport_height_fraction", self.viewport_height_fraction),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(Error::Config(format!("{name} must be in (0, 1], got {v}")));
            }
        }
        Ok(())
    }

    /// The brush every new session starts with. Size is clamped.
    pub fn default_brush(&self) -> BrushState {
        BrushState::new(self.brush_size, self.brush_color, BrushMode::Draw)
    }
}
