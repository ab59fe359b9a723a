/*!
 * Error types for the vttcue library.
 *
 * This module contains the error type returned by the document parser,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while parsing a WebVTT document
#[derive(Error, Debug)]
pub enum ParseError {
    /// Error when fewer bytes are staged than the signature check requires
    #[error("document too short: needed {needed} bytes, only {available} staged")]
    TooShort {
        /// Number of bytes the check needed
        needed: usize,
        /// Number of bytes actually staged
        available: usize,
    },

    /// Error when the document does not start with the WEBVTT magic
    #[error("bad magic: not a WebVTT document")]
    BadSignature,

    /// Error when a cue timing line does not match the expected pattern
    #[error("couldn't parse cue timestamps at byte offset {offset}")]
    MalformedTimingLine {
        /// Byte offset into the staged document where the scan started
        offset: usize,
    },

    /// Error when reading from the byte source fails
    #[error("source read failed: {0}")]
    Io(String),
}

// Utility conversion so `?` works on std::io operations
impl From<std::io::Error> for ParseError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
