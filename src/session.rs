use std::io::Read;
use log::warn;

// @module: Staging buffer and per-document session state

/// Default staging capacity in bytes, matching the reference parser
pub const DEFAULT_CAPACITY: usize = 4096;

/// Parsing phase of a session
///
/// The signature is checked exactly once per document; after it has been
/// accepted the session stays in the cue loop until it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The WEBVTT signature has not been checked yet
    Signature,
    /// The signature was accepted and cue extraction may proceed
    CueLoop,
}

/// Outcome of staging a chunk of input bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Every byte of the chunk was staged
    Complete,
    /// The buffer ran out of capacity and trailing bytes were dropped
    Truncated {
        /// Number of bytes that did not fit
        dropped: usize,
    },
}

// @struct: Bounded staging buffer with a monotonic read cursor
#[derive(Debug)]
pub struct Session {
    // @field: Staged document bytes, never longer than `capacity`
    bytes: Vec<u8>,

    // @field: Read position; only ever advances
    cursor: usize,

    // @field: Fixed capacity chosen at creation
    capacity: usize,

    // @field: Current parsing phase
    phase: SessionPhase,
}

impl Session {
    /// Create an empty session with the default staging capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty session with an explicit staging capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Session {
            bytes: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
            phase: SessionPhase::Signature,
        }
    }

    /// Append a chunk of input to the staging buffer.
    ///
    /// At most the remaining capacity is staged; anything beyond that is
    /// dropped rather than grown into, and the truncation is reported in
    /// the returned outcome. Consumed bytes are never reclaimed, so the
    /// total fed over a session's lifetime is bounded by its capacity.
    pub fn feed(&mut self, chunk: &[u8]) -> FeedOutcome {
        let room = self.capacity - self.bytes.len();
        let staged = chunk.len().min(room);
        self.bytes.extend_from_slice(&chunk[..staged]);

        if staged < chunk.len() {
            let dropped = chunk.len() - staged;
            warn!(
                "Staging buffer full ({} bytes), dropping {} trailing bytes",
                self.capacity, dropped
            );
            FeedOutcome::Truncated { dropped }
        } else {
            FeedOutcome::Complete
        }
    }

    /// Replace the staged content with one bounded read from a byte source.
    ///
    /// Reads to completion or until the capacity is reached, whichever comes
    /// first, then resets the cursor and phase so the session is ready for a
    /// fresh document parse. Returns the number of bytes staged.
    pub fn fill_from_source<R: Read>(&mut self, source: &mut R) -> std::io::Result<usize> {
        self.bytes.clear();
        self.cursor = 0;
        self.phase = SessionPhase::Signature;

        let staged = source
            .take(self.capacity as u64)
            .read_to_end(&mut self.bytes)?;

        if staged >= self.capacity {
            warn!(
                "Input may exceed staging capacity, truncating at {} bytes",
                self.capacity
            );
        }

        Ok(staged)
    }

    /// Staging capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of valid bytes currently staged
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been staged yet
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Current read position into the staged bytes
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of staged bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Current parsing phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Staged bytes from the cursor to the end of valid content
    pub(crate) fn remaining_bytes(&self) -> &[u8] {
        &self.bytes[self.cursor..]
    }

    /// Advance the cursor past `count` consumed bytes.
    ///
    /// The cursor is monotonic; consumed bytes are never re-scanned.
    pub(crate) fn advance(&mut self, count: usize) {
        debug_assert!(self.cursor + count <= self.bytes.len());
        self.cursor = (self.cursor + count).min(self.bytes.len());
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
