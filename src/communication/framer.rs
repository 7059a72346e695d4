//! Response framing for the status protocol.
//!
//! The controller never length-prefixes its replies. A reply is located in the
//! byte stream by two markers:
//!
//! - the sentinel `ok`, which ends the acknowledgement of the mode-switch
//!   command (everything up to and including the chunk carrying it is noise)
//! - a trailing `\n` on everything received since, which ends the reply
//!
//! The completed reply still carries its envelope: one header line echoing the
//! command and two footer lines (`ok` and the empty remainder after the final
//! newline). Those are dropped to produce the [`RawPayload`].
//!
//! [`FramerState::next`] is a pure transition function so the framer can be
//! driven from a socket read loop or directly from tests.

use std::fmt;

use thiserror::Error;

/// Marks the end of protocol noise.
pub const SENTINEL: &[u8] = b"ok";
/// Lines dropped from the start of a completed reply.
pub const HEADER_LINES: usize = 1;
/// Lines dropped from the end of a completed reply.
pub const FOOTER_LINES: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("connection closed before the `ok` sentinel was received")]
    SentinelNotSeen,
    #[error("connection closed mid-reply after {buffered} bytes")]
    Truncated { buffered: usize },
    #[error("reply has {lines} lines, at least {} required", HEADER_LINES + FOOTER_LINES)]
    TooFewLines { lines: usize },
}

/// Payload lines left once the envelope has been discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPayload {
    lines: Vec<String>,
}

impl RawPayload {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The payload lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Something that happened on the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerEvent<'a> {
    Data(&'a [u8]),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramerState {
    /// Discarding noise. `tail` holds the last inspected bytes so a sentinel
    /// split across deliveries is still found.
    WaitingForSentinel { tail: Vec<u8> },
    Accumulating { buffer: Vec<u8> },
    Complete { payload: RawPayload },
}

impl Default for FramerState {
    fn default() -> Self {
        Self::WaitingForSentinel { tail: Vec::new() }
    }
}

impl FramerState {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    pub fn next(self, event: FramerEvent<'_>) -> Result<FramerState, FramingError> {
        match (self, event) {
            (Self::WaitingForSentinel { mut tail }, FramerEvent::Data(chunk)) => {
                tail.extend_from_slice(chunk);
                if contains(&tail, SENTINEL) {
                    tracing::debug!("sentinel received, accumulating reply");
                    return Ok(Self::Accumulating { buffer: Vec::new() });
                }
                let keep = SENTINEL.len() - 1;
                let excess = tail.len().saturating_sub(keep);
                tail.drain(..excess);
                Ok(Self::WaitingForSentinel { tail })
            }
            (Self::Accumulating { mut buffer }, FramerEvent::Data(chunk)) => {
                buffer.extend_from_slice(chunk);
                if buffer.ends_with(b"\n") {
                    let payload = strip_envelope(&buffer)?;
                    tracing::debug!(lines = payload.lines().len(), "reply complete");
                    Ok(Self::Complete { payload })
                } else {
                    Ok(Self::Accumulating { buffer })
                }
            }
            (Self::WaitingForSentinel { .. }, FramerEvent::Closed) => {
                Err(FramingError::SentinelNotSeen)
            }
            (Self::Accumulating { buffer }, FramerEvent::Closed) => Err(FramingError::Truncated {
                buffered: buffer.len(),
            }),
            (complete @ Self::Complete { .. }, _) => Ok(complete),
        }
    }
}

/// Mutable driver around [`FramerState`] for use in a read loop.
///
/// A transition error is terminal: every later event returns the same error.
#[derive(Debug, Default)]
pub struct ResponseFramer {
    state: FramerState,
    failed: Option<FramingError>,
}

impl ResponseFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FramerState {
        &self.state
    }

    /// Feeds one inbound chunk; returns the payload once the reply is complete.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<RawPayload>, FramingError> {
        self.advance(FramerEvent::Data(chunk))?;
        match &self.state {
            FramerState::Complete { payload } => Ok(Some(payload.clone())),
            _ => Ok(None),
        }
    }

    /// Signals end of stream. Only succeeds if the reply was already complete.
    pub fn close(&mut self) -> Result<RawPayload, FramingError> {
        self.advance(FramerEvent::Closed)?;
        match &self.state {
            FramerState::Complete { payload } => Ok(payload.clone()),
            _ => Err(FramingError::SentinelNotSeen),
        }
    }

    pub fn error(&self) -> Option<&FramingError> {
        self.failed.as_ref()
    }

    fn advance(&mut self, event: FramerEvent<'_>) -> Result<(), FramingError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        let state = std::mem::take(&mut self.state);
        match state.next(event) {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(err) => {
                self.failed = Some(err.clone());
                Err(err)
            }
        }
    }
}

/// Drops the header line and the two footer lines from a completed reply.
pub fn strip_envelope(buffer: &[u8]) -> Result<RawPayload, FramingError> {
    let text = String::from_utf8_lossy(buffer);
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < HEADER_LINES + FOOTER_LINES {
        return Err(FramingError::TooFewLines { lines: lines.len() });
    }
    let body = &lines[HEADER_LINES..lines.len() - FOOTER_LINES];
    Ok(RawPayload::from_lines(body.iter().copied()))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
