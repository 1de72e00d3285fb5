//! Error kinds that the batch loop distinguishes.
//!
//! Configuration and profile lookup errors abort the run. Everything else is
//! scoped to one image or one hit record and only gets logged.

use std::path::PathBuf;

use thiserror::Error;

use crate::profile::Rect;

#[derive(Debug, Error)]
pub enum RaidError {
    /// Dimensions file missing, unparsable or inconsistent.
    #[error("invalid dimensions file {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// No profile for the exact screenshot resolution.
    #[error("the resolution '{key}' is not found in the dimensions file")]
    ProfileNotFound { key: String },

    /// A configured rectangle does not fit into the image it crops.
    #[error("{what} rect {rect} is outside of {width}x{height} image")]
    Bounds {
        what: &'static str,
        rect: Rect,
        width: u32,
        height: u32,
    },

    /// Recognized damage text is not an integer after separator stripping.
    #[error("can't convert damage '{text}' to integer")]
    DamageParse { text: String },

    #[error("can't open image {path}: {source}")]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("OCR failed: {0}")]
    Ocr(String),
}
