// Error type for the editor and the viewer window.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The source image could not be interpreted (bad data URI, bad base64,
    /// unknown or corrupt bytes, zero-sized image). The editor does not open.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Writing the flattened surface as PNG failed.
    #[error("Encode error: {0}")]
    Encode(String),

    /// A pending load was cancelled before the decode finished.
    #[error("Load cancelled")]
    LoadCancelled,

    /// Reading or parsing the editor config file failed.
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::Encode(msg.into())
    }
}
