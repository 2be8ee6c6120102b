use serde::ser;
use std::fmt;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding a multipart/form-data body.
///
/// Any error aborts the whole encode: no part of the output is usable.
#[derive(Debug, Error)]
pub enum Error {
    /// A custom error message from serde
    #[error("{0}")]
    Message(String),

    /// The value handed to the encoder is not a struct
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Creating a part or writing its bytes failed
    #[error("failed to write multipart body: {0}")]
    Io(#[from] io::Error),

    /// Writing the closing boundary failed
    #[error("failed to close multipart writer: {0}")]
    Finalize(#[source] io::Error),

    /// A nested struct could not be rendered as JSON
    #[error("failed to encode nested field as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field (or sequence element) has a kind the encoder cannot represent
    #[error("field `{field}`: cannot encode {kind} as a form part")]
    Unsupported { field: String, kind: &'static str },

    /// A `File` value reached the encoder in an unexpected shape
    #[error("malformed file payload: {0}")]
    InvalidFile(&'static str),
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
