//! The contract with the image-generation provider.
//!
//! Nothing here talks to the network; the surrounding application supplies an
//! [`ImageGenerationService`]. What lives here is the request shape the
//! editor's inputs and outputs travel in, the checks made before a request is
//! sent, and the credential type.

use crate::codec::ImageSource;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MAX_CANDIDATES: u32 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Please enter your API key")]
    MissingApiKey,
    #[error("Please enter a prompt")]
    EmptyPrompt,
    #[error("Image count must be between 1 and 4, got {0}")]
    InvalidCount(u32),
    #[error("Unknown option {0:?}")]
    UnknownOption(String),
    /// The provider rejected the request; its message is passed through.
    #[error("Failed to generate image: {0}")]
    Provider(String),
    #[error("Model returned text instead of image: {0}")]
    TextInsteadOfImage(String),
    #[error("No image generated in the response")]
    NoImage,
}

/// Provider credential. Supplied by the caller for one session; never
/// compiled in, serialized, or printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the service building the request.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AspectRatio {
    /// Let the model pick.
    #[default]
    Auto,
    Square,
    Standard,
    Portrait,
    Classic,
    ClassicPortrait,
    Widescreen,
    Story,
    Cinematic,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 9] = [
        AspectRatio::Auto,
        AspectRatio::Square,
        AspectRatio::Standard,
        AspectRatio::Portrait,
        AspectRatio::Classic,
        AspectRatio::ClassicPortrait,
        AspectRatio::Widescreen,
        AspectRatio::Story,
        AspectRatio::Cinematic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Auto => "auto",
            AspectRatio::Square => "1:1",
            AspectRatio::Standard => "4:3",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Classic => "3:2",
            AspectRatio::ClassicPortrait => "2:3",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Story => "9:16",
            AspectRatio::Cinematic => "21:9",
        }
    }

    /// Value for the provider; `None` means "omit the field".
    pub fn api_value(self) -> Option<&'static str> {
        match self {
            AspectRatio::Auto => None,
            other => Some(other.as_str()),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GenerationError::UnknownOption(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Resolution {
    #[default]
    OneK,
    TwoK,
    FourK,
}

impl Resolution {
    /// Upper-case form the provider expects ("1K", "2K", "4K").
    pub fn api_value(self) -> &'static str {
        match self {
            Resolution::OneK => "1K",
            Resolution::TwoK => "2K",
            Resolution::FourK => "4K",
        }
    }
}

impl FromStr for Resolution {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1k" => Ok(Resolution::OneK),
            "2k" => Ok(Resolution::TwoK),
            "4k" => Ok(Resolution::FourK),
            other => Err(GenerationError::UnknownOption(other.to_string())),
        }
    }
}

/// One generation request: a prompt plus optional reference images.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Uploaded or previously generated images, possibly annotated.
    pub reference_images: Vec<ImageSource>,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    /// Number of candidate images to ask for (1..=4).
    pub count: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_images: Vec::new(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            count: 1,
        }
    }

    /// Checks made before anything is sent.
    pub fn validate(&self, key: &ApiKey) -> Result<(), GenerationError> {
        if key.is_blank() {
            return Err(GenerationError::MissingApiKey);
        }
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        if !(1..=MAX_CANDIDATES).contains(&self.count) {
            return Err(GenerationError::InvalidCount(self.count));
        }
        Ok(())
    }
}

/// A provider that turns a request into images. The key is passed per call
/// so no service instance ever holds a credential of its own.
pub trait ImageGenerationService {
    fn generate(
        &self,
        key: &ApiKey,
        request: &GenerationRequest,
    ) -> Result<Vec<ImageSource>, GenerationError>;
}
