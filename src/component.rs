//! Component base - handshake lifecycle and shared command senders.
//!
//! Every worker, bolt or spout, starts its life the same way:
//! 1. Announce the pid (before blocking on any input)
//! 2. Attach the optional read trace
//! 3. Block for the handshake message
//! 4. Best-effort: create the readiness marker file
//!
//! Control then passes to exactly one dispatch loop ([`crate::bolt::run`],
//! [`crate::bolt::run_basic`] or [`crate::spout::run`]), which owns the
//! component for the rest of the process lifetime.
//!
//! # Example
//!
//! ```ignore
//! use multilang_client::{bolt, ComponentBuilder};
//!
//! fn main() -> multilang_client::Result<()> {
//!     let mut component = ComponentBuilder::new().stdio()?;
//!     bolt::run_basic(&mut component, &mut WordSplitter::default())
//! }
//! ```

use std::io::{self, BufRead, StdinLock, StdoutLock, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::codec::{decode, Payload};
use crate::control::{FsReadiness, Handshake, ReadinessReporter, TraceSink};
use crate::error::{MultilangError, Result};
use crate::protocol::{Command, MessageReader, MessageWriter, Tuple};

/// Builder for configuring and connecting a worker component.
///
/// Both side-effecting capabilities are injected here: the readiness
/// reporter (defaults to [`FsReadiness`]) and the optional trace sink.
pub struct ComponentBuilder {
    readiness: Box<dyn ReadinessReporter>,
    trace: Option<Box<dyn TraceSink>>,
}

impl ComponentBuilder {
    /// Create a builder with the default filesystem readiness reporter and
    /// no trace sink.
    pub fn new() -> Self {
        Self {
            readiness: Box::new(FsReadiness),
            trace: None,
        }
    }

    /// Replace the readiness reporter.
    pub fn readiness(mut self, reporter: impl ReadinessReporter + 'static) -> Self {
        self.readiness = Box::new(reporter);
        self
    }

    /// Attach a trace sink mirroring every line read from the host.
    pub fn trace(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Some(Box::new(sink));
        self
    }

    /// Connect over locked stdin/stdout, the normal deployment.
    pub fn stdio(self) -> Result<Component<StdinLock<'static>, StdoutLock<'static>>> {
        self.connect(io::stdin().lock(), io::stdout().lock())
    }

    /// Run the startup lifecycle over the given streams.
    ///
    /// Sends the pid announcement, blocks for the handshake and reports
    /// readiness. Marker-file failure is logged at debug level and
    /// otherwise ignored; a handshake that is not a JSON mapping is a
    /// protocol error.
    pub fn connect<R: BufRead, W: Write>(self, reader: R, writer: W) -> Result<Component<R, W>> {
        let pid = std::process::id();

        let mut writer = MessageWriter::new(writer);
        writer.send_message(&Command::Pid { pid }.to_json().to_string())?;

        let mut reader = MessageReader::new(reader).with_trace(self.trace);
        let handshake = match decode(&reader.wait_for_message()?) {
            Payload::Structured(map) => Handshake::from_map(map),
            Payload::Opaque(text) => {
                return Err(MultilangError::Protocol(format!(
                    "handshake is not a mapping: {text}"
                )))
            }
        };

        let mut readiness = self.readiness;
        if let Err(err) = readiness.report(Path::new(&handshake.pid_dir), pid) {
            tracing::debug!(pid_dir = %handshake.pid_dir, error = %err, "readiness marker not created");
        }
        tracing::debug!(pid, "handshake complete");

        Ok(Component {
            reader,
            writer,
            pid,
            handshake,
        })
    }
}

impl Default for ComponentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A connected worker component.
///
/// Owns the framed reader/writer pair, the pid and the immutable handshake
/// result, and exposes the shared command senders the dispatch loops and
/// collectors are built on.
pub struct Component<R, W: Write> {
    reader: MessageReader<R>,
    writer: MessageWriter<W>,
    pid: u32,
    handshake: Handshake,
}

impl<R: BufRead, W: Write> Component<R, W> {
    /// Process identifier announced to the host.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Topology configuration from the handshake.
    pub fn conf(&self) -> &Map<String, Value> {
        &self.handshake.conf
    }

    /// Topology context from the handshake.
    pub fn context(&self) -> &Map<String, Value> {
        &self.handshake.context
    }

    /// Block for the next framed message.
    pub(crate) fn wait_for_message(&mut self) -> Result<String> {
        self.reader.wait_for_message()
    }

    /// Send one command, framed and flushed.
    pub(crate) fn send_command(&mut self, command: &Command) -> Result<()> {
        self.writer.send_message(&command.to_json().to_string())
    }

    /// Send a log line to the host's worker log.
    pub fn send_log(&mut self, msg: &str) -> Result<()> {
        self.send_command(&Command::Log {
            msg: msg.to_string(),
        })
    }

    /// Acknowledge a tuple.
    pub fn send_ack(&mut self, tuple: &Tuple) -> Result<()> {
        self.send_command(&Command::Ack {
            id: tuple.id.clone(),
        })
    }

    /// Fail a tuple.
    pub fn send_fail(&mut self, tuple: &Tuple) -> Result<()> {
        self.send_command(&Command::Fail {
            id: tuple.id.clone(),
        })
    }

    /// Signal readiness for the next instruction (spout channel).
    pub(crate) fn send_sync(&mut self) -> Result<()> {
        self.send_command(&Command::Sync)
    }
}
