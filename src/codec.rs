// What goes into and out of the editor: one encoded image, either as raw
// file bytes or as a `data:` URI (the form a browser hands around).

use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ImageFormat, RgbaImage};
use log::warn;
use std::fmt;
use std::io::Cursor;

pub const PNG_MIME: &str = "image/png";

/// An encoded image handed to or returned from the editor.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded file contents (PNG, JPEG, WebP, ...).
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
}

/// Which representation a source used; saving answers in the same one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Bytes,
    DataUri,
}

impl ImageSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ImageSource::Bytes(_) => SourceKind::Bytes,
            ImageSource::DataUri(_) => SourceKind::DataUri,
        }
    }

    /// The encoded payload, unwrapping the data URI if there is one.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
            ImageSource::DataUri(uri) => parse_data_uri(uri).map(|(_, bytes)| bytes),
        }
    }

    /// Decode to straight-alpha RGBA8 at the image's natural size.
    pub fn decode(&self) -> Result<RgbaImage> {
        let bytes = match self {
            ImageSource::Bytes(bytes) => std::borrow::Cow::Borrowed(bytes.as_slice()),
            ImageSource::DataUri(uri) => std::borrow::Cow::Owned(parse_data_uri(uri)?.1),
        };
        let img = image::load_from_memory(&bytes)
            .map_err(|e| {
                warn!("source image failed to decode: {e}");
                Error::decode(e.to_string())
            })?
            .to_rgba8();
        if img.width() == 0 || img.height() == 0 {
            return Err(Error::decode("image has no pixels"));
        }
        Ok(img)
    }
}

impl fmt::Debug for ImageSource {
    // Payloads are megabytes of noise in logs; show their size instead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Bytes(b) => write!(f, "ImageSource::Bytes({} bytes)", b.len()),
            ImageSource::DataUri(s) => {
                let header = s.split(',').next().unwrap_or_default();
                write!(f, "ImageSource::DataUri({header}, {} chars)", s.len())
            }
        }
    }
}

/// Split a base64 data URI into its mime type and decoded payload.
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| Error::decode("not a data URI (missing `data:` prefix)"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::decode("data URI has no `,` before its payload"))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(Error::decode("only base64 data URIs are supported"));
    }

    // Browsers sometimes wrap long payloads; whitespace is not part of base64.
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| Error::decode(format!("bad base64 payload: {e}")))?;
    Ok((mime, bytes))
}

/// Encode `pixels` as PNG, in the representation given by `kind`.
pub fn encode_png(pixels: &RgbaImage, kind: SourceKind) -> Result<ImageSource> {
    let mut buf = Cursor::new(Vec::new());
    pixels
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::encode(e.to_string()))?;
    let bytes = buf.into_inner();

    Ok(match kind {
        SourceKind::Bytes => ImageSource::Bytes(bytes),
        SourceKind::DataUri => {
            ImageSource::DataUri(format!("data:{PNG_MIME};base64,{}", BASE64.encode(bytes)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 { Rgba([255, 255, 255, 255]) } else { Rgba([0, 0, 0, 128]) }
        })
    }

    #[test]
    fn png_bytes_decode_losslessly() {
        let img = checker(7, 5);
        let encoded = encode_png(&img, SourceKind::Bytes).unwrap();
        assert_eq!(encoded.kind(), SourceKind::Bytes);
        assert_eq!(encoded.decode().unwrap(), img);
    }

    #[test]
    fn data_uri_output_uses_png_mime() {
        let encoded = encode_png(&checker(3, 3), SourceKind::DataUri).unwrap();
        let ImageSource::DataUri(uri) = &encoded else { panic!("expected a data URI") };
        assert!(uri.starts_with("data:image/png;base64,"));
        let (mime, bytes) = parse_data_uri(uri).unwrap();
        assert_eq!(mime, PNG_MIME);
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn data_uri_payload_may_contain_line_breaks() {
        let encoded = encode_png(&checker(4, 4), SourceKind::DataUri).unwrap();
        let ImageSource::DataUri(uri) = encoded else {
            unreachable!()
        };
        let (head, body) = uri.split_once(',').unwrap();
        let wrapped: String = body
            .as_bytes()
            .chunks(16)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let source = ImageSource::DataUri(format!("{head},{wrapped}"));
        assert_eq!(source.decode().unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn malformed_inputs_are_decode_errors() {
        let cases = [
            ImageSource::DataUri("image/png;base64,AAAA".into()),
            ImageSource::DataUri("data:image/png;base64".into()),
            ImageSource::DataUri("data:text/plain,hello".into()),
            ImageSource::DataUri("data:image/png;base64,@@@@".into()),
            ImageSource::Bytes(b"definitely not an image".to_vec()),
            ImageSource::Bytes(Vec::new()),
        ];
        for source in cases {
            assert!(matches!(source.decode(), Err(Error::Decode(_))), "{source:?}");
        }
    }

    #[test]
    fn debug_output_hides_payload() {
        let source = ImageSource::Bytes(vec![0; 1024]);
        assert_eq!(format!("{source:?}"), "ImageSource::Bytes(1024 bytes)");
    }
}
