use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use regex::bytes::{Captures, Regex};

use crate::errors::ParseError;
use crate::session::{Session, SessionPhase};

// @module: WebVTT cue tokenizer and formatting

// @const: Cue timing line regex, anchored at the scan position
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+):([0-9]+)\.([0-9]+)\s*-->\s*([0-9]+):([0-9]+)\.([0-9]+)").unwrap()
});

/// Document signature required after an optional byte order mark
const SIGNATURE: &[u8] = b"WEBVTT";

/// UTF-8 byte order mark, skipped when present
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Smallest byte count a viable cue can occupy: a timing line, a line
/// terminator, and a trailing blank line. Anything shorter ends the cue loop.
pub const MIN_CUE_BYTES: usize = 24;

// @struct: Single timed cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Cue payload, verbatim bytes between the timing line and the
    //         blank-line terminator
    pub text: String,
}

impl Cue {
    /// Creates a new cue - used by tests and external consumers
    pub fn new(start_ms: u64, end_ms: u64, text: String) -> Self {
        Cue {
            start_ms,
            end_ms,
            text,
        }
    }

    /// Convert start time to a formatted timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_ms)
    }

    /// Convert end time to a formatted timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_ms)
    }

    /// Format a timestamp in milliseconds as HH:MM:SS.mmm (hours unbounded)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    /// Parse an HH:MM:SS.mmm timestamp back to milliseconds - used by tests
    /// and diagnostic tooling
    pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
        let parts: Vec<&str> = timestamp.split(&[':', '.'][..]).collect();

        if parts.len() != 4 {
            return None;
        }

        let hours: u64 = parts[0].parse().ok()?;
        let minutes: u64 = parts[1].parse().ok()?;
        let seconds: u64 = parts[2].parse().ok()?;
        let millis: u64 = parts[3].parse().ok()?;

        Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Render a cue to an output sink for debugging and inspection.
///
/// Writes the timing line as `HH:MM:SS.mmm --> HH:MM:SS.mmm`, the cue text,
/// and a trailing blank line. Purely a formatting helper; it performs no
/// parsing of its own.
pub fn format_cue<W: Write>(cue: &Cue, sink: &mut W) -> std::io::Result<()> {
    write!(sink, "{}", cue)
}

/// Ordered sequence of cues extracted from one document
///
/// When a timing line fails to match mid-document, the cues gathered up to
/// that point are kept and the failure is recorded in `halted`, so callers
/// always learn whether the parse ran to completion.
#[derive(Debug, Default)]
pub struct CueTrack {
    /// Cues in document order
    pub cues: Vec<Cue>,

    /// Error that stopped cue extraction early, if any
    pub halted: Option<ParseError>,
}

impl CueTrack {
    /// Parse whatever is currently staged in the session.
    ///
    /// Validates the WEBVTT signature once per session, then extracts cues
    /// until the staged bytes are exhausted. Signature failures are returned
    /// as errors; a malformed timing line in the cue loop stops extraction
    /// and is reported through the `halted` field of the returned track.
    pub fn parse(session: &mut Session) -> Result<CueTrack, ParseError> {
        if session.phase() == SessionPhase::Signature {
            check_signature(session)?;
        }

        let mut track = CueTrack::default();
        loop {
            match parse_cue(session) {
                Ok(Some(cue)) => track.cues.push(cue),
                Ok(None) => break,
                Err(err) => {
                    error!("Cue extraction halted: {}", err);
                    track.halted = Some(err);
                    break;
                }
            }
        }

        Ok(track)
    }

    /// Replace the staged bytes with one bounded read from a source, then
    /// parse the result as a fresh document.
    pub fn parse_from_source<R: Read>(
        session: &mut Session,
        source: &mut R,
    ) -> Result<CueTrack, ParseError> {
        session.fill_from_source(source)?;
        Self::parse(session)
    }

    /// Open a file, parse it with a fresh session, and close it regardless
    /// of the outcome.
    pub fn parse_path<P: AsRef<Path>>(path: P) -> Result<CueTrack, ParseError> {
        let mut session = Session::new();
        let mut file = File::open(path.as_ref())?;
        Self::parse_from_source(&mut session, &mut file)
    }

    /// Whether cue extraction ran to the end of the staged input
    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }

    /// Number of extracted cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether no cues were extracted
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

impl fmt::Display for CueTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let status = if self.is_complete() { "complete" } else { "halted" };
        writeln!(f, "Cue track: {} cues ({})", self.cues.len(), status)
    }
}

/// Whitespace set used by the reference scanner (C `isspace`)
fn is_vtt_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// Line terminator styles a cue block may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineTerminator {
    Lf,
    CrLf,
    Cr,
}

impl LineTerminator {
    /// Classify the terminator starting at the head of `bytes`, if any
    fn classify(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'\r', b'\n', ..] => Some(Self::CrLf),
            [b'\r', ..] => Some(Self::Cr),
            [b'\n', ..] => Some(Self::Lf),
            _ => None,
        }
    }

    /// Width of the terminator in bytes
    fn len(self) -> usize {
        match self {
            Self::CrLf => 2,
            Self::Lf | Self::Cr => 1,
        }
    }
}

/// Classify a blank-line terminator at the head of `bytes`, returning its
/// byte width. The four-byte form is checked first so a CRLF pair is never
/// misread as a bare CR pair.
fn classify_blank_line(bytes: &[u8]) -> Option<usize> {
    if bytes.starts_with(b"\r\n\r\n") {
        return Some(4);
    }
    if bytes.starts_with(b"\n\n") {
        return Some(2);
    }
    if bytes.starts_with(b"\r\r") {
        return Some(2);
    }
    None
}

/// Extract a decimal timing field from the regex captures
fn timing_field(caps: &Captures, index: usize) -> Option<u64> {
    caps.get(index)
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
        .and_then(|s| s.parse::<u64>().ok())
}

/// Validate the document signature and leave the session at the first cue.
///
/// Skips an optional UTF-8 byte order mark, requires the literal `WEBVTT`
/// magic, then consumes trailing whitespace and moves the session into the
/// cue loop phase.
fn check_signature(session: &mut Session) -> Result<(), ParseError> {
    let staged = session.remaining_bytes();

    if staged.len() < SIGNATURE.len() {
        return Err(ParseError::TooShort {
            needed: SIGNATURE.len(),
            available: staged.len(),
        });
    }

    let mut pos = 0;
    if staged.starts_with(UTF8_BOM) {
        debug!("Skipping UTF-8 byte order mark");
        pos = UTF8_BOM.len();
        if staged.len() < pos + SIGNATURE.len() {
            return Err(ParseError::TooShort {
                needed: pos + SIGNATURE.len(),
                available: staged.len(),
            });
        }
    }

    if &staged[pos..pos + SIGNATURE.len()] != SIGNATURE {
        return Err(ParseError::BadSignature);
    }
    pos += SIGNATURE.len();
    debug!("Found WEBVTT signature");

    while pos < staged.len() && is_vtt_space(staged[pos]) {
        pos += 1;
    }

    session.advance(pos);
    session.set_phase(SessionPhase::CueLoop);
    Ok(())
}

/// Extract one cue starting at the session cursor.
///
/// Returns `Ok(None)` when fewer than `MIN_CUE_BYTES` remain, which is the
/// normal end-of-input condition rather than a failure. On a malformed
/// timing line the cursor is left at the scan start, since extraction
/// cannot usefully continue past it.
fn parse_cue(session: &mut Session) -> Result<Option<Cue>, ParseError> {
    let staged = session.remaining_bytes();

    if staged.len() < MIN_CUE_BYTES {
        return Ok(None);
    }

    // Skip leading whitespace between cue blocks
    let mut pos = 0;
    while pos < staged.len() && is_vtt_space(staged[pos]) {
        pos += 1;
    }

    let offset = session.cursor() + pos;
    let caps = match TIMING_REGEX.captures(&staged[pos..]) {
        Some(caps) => caps,
        None => {
            warn!("Couldn't parse cue timestamps at byte offset {}", offset);
            return Err(ParseError::MalformedTimingLine { offset });
        }
    };

    let fields = (
        timing_field(&caps, 1),
        timing_field(&caps, 2),
        timing_field(&caps, 3),
        timing_field(&caps, 4),
        timing_field(&caps, 5),
        timing_field(&caps, 6),
    );
    let (Some(smin), Some(ssec), Some(smsec), Some(emin), Some(esec), Some(emsec)) = fields else {
        warn!("Cue timestamp field out of range at byte offset {}", offset);
        return Err(ParseError::MalformedTimingLine { offset });
    };

    let start_ms = smin
        .saturating_mul(60_000)
        .saturating_add(ssec.saturating_mul(1_000))
        .saturating_add(smsec);
    let end_ms = emin
        .saturating_mul(60_000)
        .saturating_add(esec.saturating_mul(1_000))
        .saturating_add(emsec);

    // Move past the remainder of the timing line and its terminator
    let mut line_end = pos;
    while line_end < staged.len() && !matches!(staged[line_end], b'\r' | b'\n') {
        line_end += 1;
    }
    let text_start = match LineTerminator::classify(&staged[line_end..]) {
        Some(term) => line_end + term.len(),
        None => line_end,
    };

    // Find the blank line that ends the cue block, scanning every staged
    // byte rather than stopping a lookahead window short of the end
    let mut text_end = text_start;
    let mut past_terminator = None;
    while text_end < staged.len() {
        if let Some(width) = classify_blank_line(&staged[text_end..]) {
            past_terminator = Some(text_end + width);
            break;
        }
        text_end += 1;
    }

    let next_cursor = match past_terminator {
        Some(past) => past,
        None => {
            // The staged input ends without a blank line; the block keeps
            // every remaining line, minus a single trailing line terminator
            text_end = staged.len();
            if text_end >= text_start + 2 && staged.ends_with(b"\r\n") {
                text_end -= 2;
            } else if text_end > text_start && matches!(staged.last(), Some(b'\n' | b'\r')) {
                text_end -= 1;
            }
            staged.len()
        }
    };

    let text = String::from_utf8_lossy(&staged[text_start..text_end]).into_owned();
    session.advance(next_cursor);

    Ok(Some(Cue {
        start_ms,
        end_ms,
        text,
    }))
}
