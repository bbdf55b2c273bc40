//! Sentinel-delimited line framing.
//!
//! A message is one or more non-blank lines followed by a line containing
//! exactly `end`. A line containing exactly `sync` resets the accumulation
//! in progress (the host uses it on the spout control channel).
//!
//! # Important
//!
//! - **stdout**: protocol messages only
//! - **stderr**: logs, debug output (not parsed by the host)
//! - Every outbound message is flushed before the next read, so the host
//!   always observes a complete message unit. The writer must never be
//!   shared across threads.

use std::io::{BufRead, Write};

use crate::control::TraceSink;
use crate::error::{MultilangError, Result};

/// Line terminating a framed message.
pub const END_SENTINEL: &str = "end";

/// Line resetting the accumulation of the message in progress.
pub const SYNC_SENTINEL: &str = "sync";

/// Reads sentinel-delimited messages from a line-oriented stream.
///
/// An optional [`TraceSink`] mirrors every line read, for offline debugging
/// of the host conversation.
pub struct MessageReader<R> {
    inner: R,
    trace: Option<Box<dyn TraceSink>>,
}

impl<R: BufRead> MessageReader<R> {
    /// Create a reader without a trace sink.
    pub fn new(inner: R) -> Self {
        Self { inner, trace: None }
    }

    /// Attach a trace sink mirroring every line read.
    pub fn with_trace(mut self, trace: Option<Box<dyn TraceSink>>) -> Self {
        self.trace = trace;
        self
    }

    /// Read one line, trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`MultilangError::ConnectionClosed`] at end of stream. This
    /// is fatal to the worker; there is no retry.
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self.inner.read_line(&mut line)?;
        if n == 0 {
            return Err(MultilangError::ConnectionClosed);
        }
        let line = line.trim().to_string();
        if let Some(trace) = self.trace.as_mut() {
            trace.record(&line);
        }
        Ok(line)
    }

    /// Block until one complete message has been framed.
    ///
    /// Blank lines are skipped. Non-blank lines accumulate, each followed
    /// by a line break, until [`END_SENTINEL`] completes the message; the
    /// accumulated text is returned trimmed. [`SYNC_SENTINEL`] discards
    /// everything accumulated so far and continues. No maximum message size
    /// is enforced.
    pub fn wait_for_message(&mut self) -> Result<String> {
        let mut message = String::new();
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                continue;
            }
            if line == END_SENTINEL {
                break;
            }
            if line == SYNC_SENTINEL {
                message.clear();
                continue;
            }
            message.push_str(&line);
            message.push('\n');
        }
        Ok(message.trim().to_string())
    }
}

/// Writes sentinel-delimited messages to a line-oriented stream.
pub struct MessageWriter<W> {
    inner: W,
}

impl<W: Write> MessageWriter<W> {
    /// Create a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write `text`, then the `end` line, then flush.
    ///
    /// The flush makes the two lines one atomic unit from the host's point
    /// of view; the protocol has at most one in-flight message per
    /// direction, so no further interleaving protection is needed.
    pub fn send_message(&mut self, text: &str) -> Result<()> {
        self.inner.write_all(text.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.write_all(END_SENTINEL.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        Ok(())
    }
}
