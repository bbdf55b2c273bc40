//! Bolt dispatch loops - manual and automatic acknowledgment.
//!
//! A bolt consumes tuple deliveries and may emit derived tuples. Two
//! variants exist:
//!
//! - [`Bolt`] + [`run`]: the callback owns ack/fail/emit entirely; nothing
//!   happens implicitly.
//! - [`BasicBolt`] + [`run_basic`]: the loop acks the tuple after a normal
//!   return, fails it on a declared [`ProcessError::Failed`] and anchors
//!   every emit made during the callback to the tuple being processed.
//!
//! In both variants an unexpected failure is sent to the host via the `log`
//! command and terminates the loop; a transport failure terminates it
//! immediately. The host must watch the process exit to tell the two apart
//! from normal operation.

use std::io::{BufRead, Write};

use serde_json::Value;

use crate::codec::{decode, Payload};
use crate::component::Component;
use crate::error::{MultilangError, ProcessError, Result};
use crate::protocol::{Command, Emit, Tuple};

/// Command senders available to a bolt callback.
pub trait BoltCollector {
    /// Emit a tuple on the default grouping.
    fn emit(&mut self, emit: Emit) -> Result<()>;
    /// Emit a tuple directly to one task.
    fn emit_direct(&mut self, task: i64, emit: Emit) -> Result<()>;
    /// Acknowledge a tuple (manual variant).
    fn ack(&mut self, tuple: &Tuple) -> Result<()>;
    /// Fail a tuple (manual variant).
    fn fail(&mut self, tuple: &Tuple) -> Result<()>;
    /// Send a log line to the host.
    fn log(&mut self, msg: &str) -> Result<()>;
}

/// A manually acknowledged processing unit.
pub trait Bolt {
    /// One-time hook after the handshake, before the first tuple.
    fn prepare(
        &mut self,
        _conf: &serde_json::Map<String, Value>,
        _context: &serde_json::Map<String, Value>,
    ) -> Result<()> {
        Ok(())
    }

    /// Process one tuple. The callback is responsible for ack/fail; any
    /// error returned here is fatal to the worker.
    fn process(&mut self, tuple: Tuple, collector: &mut dyn BoltCollector) -> Result<()>;
}

/// An automatically acknowledged processing unit.
///
/// Emits made during [`BasicBolt::process`] are anchored to the tuple being
/// processed, whatever anchors the callback set itself.
pub trait BasicBolt {
    /// One-time hook after the handshake, before the first tuple.
    fn prepare(
        &mut self,
        _conf: &serde_json::Map<String, Value>,
        _context: &serde_json::Map<String, Value>,
    ) -> Result<()> {
        Ok(())
    }

    /// Process one tuple. `Err(ProcessError::Failed)` fails the tuple and
    /// the loop continues; any other error is fatal.
    fn process(
        &mut self,
        tuple: &Tuple,
        collector: &mut dyn BoltCollector,
    ) -> std::result::Result<(), ProcessError>;
}

/// Concrete collector bound to a component.
///
/// `anchor` is the transient current-processing context of the automatic
/// variant, scoped to one dispatch iteration. `Some` replaces the caller's
/// anchor list entirely, even when the current tuple contributed no id;
/// `None` (manual variant) leaves the caller's list alone.
struct Outlet<'a, R, W: Write> {
    component: &'a mut Component<R, W>,
    anchor: Option<Vec<String>>,
}

impl<R: BufRead, W: Write> Outlet<'_, R, W> {
    fn send(&mut self, task: Option<i64>, emit: Emit) -> Result<()> {
        let anchors = match &self.anchor {
            Some(ids) => ids.clone(),
            None => emit.anchors,
        };
        self.component.send_command(&Command::Emit {
            stream: emit.stream,
            anchors: Some(anchors),
            task,
            id: None,
            tuple: emit.values,
        })
    }
}

impl<R: BufRead, W: Write> BoltCollector for Outlet<'_, R, W> {
    fn emit(&mut self, emit: Emit) -> Result<()> {
        self.send(None, emit)
    }

    fn emit_direct(&mut self, task: i64, emit: Emit) -> Result<()> {
        self.send(Some(task), emit)
    }

    fn ack(&mut self, tuple: &Tuple) -> Result<()> {
        self.component.send_ack(tuple)
    }

    fn fail(&mut self, tuple: &Tuple) -> Result<()> {
        self.component.send_fail(tuple)
    }

    fn log(&mut self, msg: &str) -> Result<()> {
        self.component.send_log(msg)
    }
}

/// Read one delivery from the channel.
///
/// Returns `None` for messages that are not tuple deliveries (non-mapping
/// payloads, mappings without a `tuple` key, or a null `tuple` value); the
/// loop ignores those and re-reads.
fn next_delivery<R: BufRead, W: Write>(
    component: &mut Component<R, W>,
) -> Result<Option<Tuple>> {
    let raw = component.wait_for_message()?;
    let Payload::Structured(map) = decode(&raw) else {
        return Ok(None);
    };
    match map.get("tuple") {
        None | Some(Value::Null) => return Ok(None),
        Some(_) => {}
    }
    let tuple = serde_json::from_value(Value::Object(map))?;
    Ok(Some(tuple))
}

/// Send the failure to the host's log before surfacing it.
fn report_fatal<R: BufRead, W: Write>(component: &mut Component<R, W>, err: &MultilangError) {
    tracing::error!(error = %err, "bolt terminating");
    let _ = component.send_log(&err.to_string());
}

/// Drive a manually acknowledged bolt until a fatal error.
pub fn run<R: BufRead, W: Write, B: Bolt>(
    component: &mut Component<R, W>,
    bolt: &mut B,
) -> Result<()> {
    match run_loop(component, bolt) {
        Ok(()) => Ok(()),
        Err(err) => {
            report_fatal(component, &err);
            Err(err)
        }
    }
}

fn run_loop<R: BufRead, W: Write, B: Bolt>(
    component: &mut Component<R, W>,
    bolt: &mut B,
) -> Result<()> {
    bolt.prepare(component.conf(), component.context())?;
    loop {
        let Some(tuple) = next_delivery(component)? else {
            continue;
        };
        let mut collector = Outlet {
            component: &mut *component,
            anchor: None,
        };
        bolt.process(tuple, &mut collector)?;
    }
}

/// Drive an automatically acknowledged bolt until a fatal error.
pub fn run_basic<R: BufRead, W: Write, B: BasicBolt>(
    component: &mut Component<R, W>,
    bolt: &mut B,
) -> Result<()> {
    match run_basic_loop(component, bolt) {
        Ok(()) => Ok(()),
        Err(err) => {
            report_fatal(component, &err);
            Err(err)
        }
    }
}

fn run_basic_loop<R: BufRead, W: Write, B: BasicBolt>(
    component: &mut Component<R, W>,
    bolt: &mut B,
) -> Result<()> {
    bolt.prepare(component.conf(), component.context())?;
    loop {
        let Some(tuple) = next_delivery(component)? else {
            continue;
        };
        let mut collector = Outlet {
            component: &mut *component,
            anchor: Some(tuple.id.iter().cloned().collect()),
        };
        match bolt.process(&tuple, &mut collector) {
            Ok(()) => component.send_ack(&tuple)?,
            Err(ProcessError::Failed) => component.send_fail(&tuple)?,
            Err(ProcessError::Fatal(detail)) => return Err(MultilangError::Processing(detail)),
        }
    }
}
