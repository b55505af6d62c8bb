// Brush colors and the two per-pixel compositing rules the editor needs.
// All pixels are straight (non-premultiplied) RGBA8, like image::RgbaImage.

use crate::error::Error;
use image::Rgba;
use std::fmt::{self, Display};
use std::str::FromStr;

/// An RGBA color, written in config files and on the command line as CSS hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn to_pixel(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa` (the `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || Error::Config(format!("invalid color {s:?}, expected #rrggbb"));
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(bad());
        }

        // Short forms repeat each nibble: "f0a" -> "ff00aa"
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return Err(bad()),
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| bad());
        let a = if expanded.len() == 8 { channel(6)? } else { 0xFF };
        Ok(Color { r: channel(0)?, g: channel(2)?, b: channel(4)?, a })
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xFF {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/* ---------- Compositing rules ---------- */

#[inline]
fn unit(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// "source-over": `src` is painted on top of `dst`.
pub fn source_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    // Fast path: fully transparent top pixel — nothing to blend
    if src[3] == 0 {
        return dst;
    }
    // Fast path: opaque top pixel simply replaces what is underneath
    if src[3] == 255 {
        return src;
    }

    let sa = unit(src[3]);
    let da = unit(dst[3]);
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (unit(src[c]) * sa + unit(dst[c]) * da * (1.0 - sa)) / out_a;
        out[c] = byte(v);
    }
    out[3] = byte(out_a);
    Rgba(out)
}

/// "destination-out": the source's alpha is removed from `dst`; its color is ignored.
pub fn destination_out(dst: Rgba<u8>, src_alpha: u8) -> Rgba<u8> {
    if src_alpha == 0 {
        return dst;
    }
    let out_a = byte(unit(dst[3]) * (1.0 - unit(src_alpha)));
    if out_a == 0 {
        // Fully erased pixels are stored as canonical transparent black.
        return Rgba([0, 0, 0, 0]);
    }
    Rgba([dst[0], dst[1], dst[2], out_a])
}

/// Pack a pixel for the window after laying it over an opaque backdrop.
/// Visual: transparent regions of the image show the backdrop color.
#[inline]
pub fn pack_over_backdrop(px: Rgba<u8>, backdrop: Color) -> u32 {
    let backdrop = Rgba([backdrop.r, backdrop.g, backdrop.b, 0xFF]);
    let p = source_over(backdrop, px);
    ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!("#ff0000".parse::<Color>().unwrap(), Color::RED);
        assert_eq!("0f0".parse::<Color>().unwrap(), Color::rgb(0, 0xFF, 0));
        assert_eq!("#00000080".parse::<Color>().unwrap(), Color::rgba(0, 0, 0, 0x80));
        assert_eq!("#abcd".parse::<Color>().unwrap(), Color::rgba(0xAA, 0xBB, 0xCC, 0xDD));
    }

    #[test]
    fn rejects_garbage_colors() {
        for bad in ["", "#", "#12345", "red", "#gg0000", "#ffé0"] {
            assert!(bad.parse::<Color>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn display_round_trips_through_config_form() {
        assert_eq!(Color::RED.to_string(), "#ff0000");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn source_over_with_transparent_top_keeps_bottom() {
        let dst = Rgba([10, 20, 30, 200]);
        assert_eq!(source_over(dst, Rgba([255, 255, 255, 0])), dst);
    }

    #[test]
    fn source_over_half_alpha_on_opaque_mixes_evenly() {
        let out = source_over(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 128]));
        assert_eq!(out[3], 255);
        assert!((out[0] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn source_over_onto_transparent_keeps_source_color() {
        let out = source_over(Rgba([0, 0, 0, 0]), Rgba([200, 100, 50, 64]));
        assert_eq!(out, Rgba([200, 100, 50, 64]));
    }

    #[test]
    fn destination_out_removes_alpha_only() {
        let dst = Rgba([200, 100, 50, 255]);
        assert_eq!(destination_out(dst, 255), Rgba([0, 0, 0, 0]));
        let half = destination_out(dst, 128);
        assert_eq!(&half.0[..3], &[200, 100, 50]);
        assert_eq!(half[3], 127);
    }

    #[test]
    fn backdrop_shows_through_transparent_pixels() {
        let packed = pack_over_backdrop(Rgba([0, 0, 0, 0]), Color::rgb(0x20, 0x30, 0x40));
        assert_eq!(packed, 0x00_20_30_40);
    }
}
