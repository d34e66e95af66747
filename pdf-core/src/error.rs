use std::io;

use thiserror::Error;

/// Errors raised while turning an action dictionary into PDF content.
#[derive(Error, Debug)]
pub enum PageError {
    /// A required key is absent from an action dictionary.
    #[error("missing key `{0}`")]
    MissingKey(String),

    /// A key is present but holds the wrong JSON type.
    #[error("key `{key}` should be {expected}")]
    InvalidType { key: String, expected: &'static str },

    /// A key has the right type but an unusable value.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    /// A colour string is not a hex colour.
    #[error("invalid hex color {0:?}")]
    InvalidColor(String),

    /// `pageIndex` does not name an existing page.
    #[error("page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// Media boxes can only be set on newly created pages.
    #[error("cannot set media box on modified page")]
    ModifiedMediaBox,

    /// Only JPEG and PNG images can be placed.
    #[error("unsupported image type {0:?} (expected jpg or png)")]
    UnsupportedImageType(String),

    /// Image bytes could not be parsed.
    #[error("image error: {0}")]
    Image(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PageError>;
