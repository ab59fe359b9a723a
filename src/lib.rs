/*!
 * # vttcue - WebVTT cue parser
 *
 * A Rust library for parsing WebVTT subtitle documents from a byte stream
 * into an ordered sequence of timed text cues.
 *
 * ## Features
 *
 * - Bounded staging buffer with incremental feed semantics
 * - Signature detection with optional UTF-8 byte order mark
 * - Cue timing lines converted to integer milliseconds
 * - Cue text delimited under LF, CR, and CRLF line-ending conventions
 * - Partial results retained when a malformed timing line stops the parse
 * - Diagnostic cue formatting for debugging and inspection
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `session`: Staging buffer and per-document session state
 * - `cue_parser`: Cue tokenizer, cue records, and formatting helpers
 * - `errors`: Custom error types for the parser
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod cue_parser;
pub mod errors;
pub mod session;

// Re-export main types for easier usage
pub use cue_parser::{format_cue, Cue, CueTrack, MIN_CUE_BYTES};
pub use errors::ParseError;
pub use session::{FeedOutcome, Session, SessionPhase, DEFAULT_CAPACITY};
