//! Shared helpers for unit tests: in-memory streams and wire parsing.

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;

use crate::control::ReadinessReporter;
use crate::protocol::END_SENTINEL;

/// Clonable in-memory writer, so tests keep a handle to a component's
/// output after handing the writer over.
#[derive(Clone, Default)]
pub(crate) struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    /// Drain everything written so far.
    pub(crate) fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Readiness reporter that records calls instead of touching the
/// filesystem.
#[derive(Clone, Default)]
pub(crate) struct RecordingReadiness {
    pub(crate) reports: Rc<RefCell<Vec<(PathBuf, u32)>>>,
}

impl ReadinessReporter for RecordingReadiness {
    fn report(&mut self, pid_dir: &Path, pid: u32) -> io::Result<()> {
        self.reports.borrow_mut().push((pid_dir.to_path_buf(), pid));
        Ok(())
    }
}

/// Frame each value as one inbound message (`<json>\nend\n`).
pub(crate) fn input_stream(messages: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for message in messages {
        out.extend_from_slice(message.to_string().as_bytes());
        out.extend_from_slice(b"\nend\n");
    }
    out
}

/// Input consisting of just the handshake message.
pub(crate) fn handshake_input(handshake: Value) -> Vec<u8> {
    input_stream(&[handshake])
}

/// Parse captured output back into the JSON commands it framed.
pub(crate) fn parse_commands(bytes: &[u8]) -> Vec<Value> {
    let text = std::str::from_utf8(bytes).expect("output is UTF-8");
    let mut commands = Vec::new();
    let mut message = String::new();
    for line in text.lines() {
        if line == END_SENTINEL {
            commands.push(serde_json::from_str(&message).expect("output is JSON"));
            message.clear();
        } else {
            message.push_str(line);
        }
    }
    assert!(message.is_empty(), "unterminated message: {message}");
    commands
}
