/*!
 * Tests for the staging buffer and session state
 */

use std::io::Cursor;
use anyhow::Result;
use vttcue::session::{FeedOutcome, Session, SessionPhase, DEFAULT_CAPACITY};
use vttcue::cue_parser::CueTrack;

/// Test session creation with the default capacity
#[test]
fn test_new_session_withDefaultCapacity_shouldStartEmpty() {
    let session = Session::new();

    assert_eq!(session.capacity(), DEFAULT_CAPACITY);
    assert_eq!(session.len(), 0);
    assert!(session.is_empty());
    assert_eq!(session.cursor(), 0);
    assert_eq!(session.remaining(), 0);
    assert_eq!(session.phase(), SessionPhase::Signature);
}

/// Test feeding a chunk that fits into the buffer
#[test]
fn test_feed_withSmallChunk_shouldStageAllBytes() {
    let mut session = Session::with_capacity(64);

    let outcome = session.feed(b"WEBVTT\n\n");

    assert_eq!(outcome, FeedOutcome::Complete);
    assert_eq!(session.len(), 8);
    assert_eq!(session.remaining(), 8);
}

/// Test feeding a chunk larger than the remaining capacity
#[test]
fn test_feed_withOversizedChunk_shouldTruncateWithoutCrash() {
    let mut session = Session::with_capacity(16);

    let outcome = session.feed(&[b'x'; 40]);

    assert_eq!(outcome, FeedOutcome::Truncated { dropped: 24 });
    assert_eq!(session.len(), 16);

    // A full buffer accepts nothing further
    let outcome = session.feed(b"more");
    assert_eq!(outcome, FeedOutcome::Truncated { dropped: 4 });
    assert_eq!(session.len(), 16);
}

/// Test that successive feeds append up to capacity
#[test]
fn test_feed_withMultipleChunks_shouldAppendUpToCapacity() {
    let mut session = Session::with_capacity(10);

    assert_eq!(session.feed(b"abcd"), FeedOutcome::Complete);
    assert_eq!(session.feed(b"efgh"), FeedOutcome::Complete);
    assert_eq!(session.feed(b"ijkl"), FeedOutcome::Truncated { dropped: 2 });
    assert_eq!(session.len(), 10);
}

/// Test replacing staged content with a bounded read from a source
#[test]
fn test_fill_from_source_withSmallSource_shouldReplaceContent() -> Result<()> {
    let mut session = Session::new();
    session.feed(b"stale bytes from an earlier document");

    let document = b"WEBVTT\n\n00:01.000 --> 00:02.500\nHello\n\n";
    let staged = session.fill_from_source(&mut Cursor::new(&document[..]))?;

    assert_eq!(staged, document.len());
    assert_eq!(session.len(), document.len());
    assert_eq!(session.cursor(), 0);
    assert_eq!(session.phase(), SessionPhase::Signature);

    // The replaced content parses as a fresh document
    let track = CueTrack::parse(&mut session)?;
    assert_eq!(track.len(), 1);
    assert_eq!(track.cues[0].text, "Hello");

    Ok(())
}

/// Test that a bounded read stops at the session capacity
#[test]
fn test_fill_from_source_withOversizedSource_shouldStopAtCapacity() -> Result<()> {
    let mut session = Session::with_capacity(8);

    let staged = session.fill_from_source(&mut Cursor::new(&[b'y'; 100][..]))?;

    assert_eq!(staged, 8);
    assert_eq!(session.len(), 8);

    Ok(())
}

/// Test the phase transition after a successful signature check
#[test]
fn test_phase_afterSignatureParse_shouldBeCueLoop() -> Result<()> {
    let mut session = Session::new();
    session.feed(b"WEBVTT\n\n00:01.000 --> 00:02.500\nHello\n\n");
    assert_eq!(session.phase(), SessionPhase::Signature);

    CueTrack::parse(&mut session)?;

    assert_eq!(session.phase(), SessionPhase::CueLoop);
    Ok(())
}

/// Test that the cursor only moves forward as cues are consumed
#[test]
fn test_cursor_afterParse_shouldAdvanceMonotonically() -> Result<()> {
    let mut session = Session::new();
    session.feed(b"WEBVTT\n\n00:01.000 --> 00:02.500\nHello\n\n");

    let before = session.cursor();
    CueTrack::parse(&mut session)?;
    let after = session.cursor();

    assert_eq!(before, 0);
    assert_eq!(after, session.len());
    assert_eq!(session.remaining(), 0);

    Ok(())
}
