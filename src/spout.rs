//! Spout dispatch loop.
//!
//! A spout originates tuples on the host's request. The host drives it
//! with `next`, `ack` and `fail` control messages; after every read the
//! worker answers with a `sync` command signaling it is ready for the next
//! instruction. `sync` is sent even for messages that did not decode to a
//! mapping, so a garbled control message cannot stall the exchange.
//!
//! Emits carry a message id only when the spout asks for reliability
//! tracking; an untracked tuple simply omits the field.

use std::io::{BufRead, Write};

use serde_json::Value;

use crate::codec::{decode, Payload};
use crate::component::Component;
use crate::error::Result;
use crate::protocol::{Command, Emit};

/// Command senders available to a spout callback.
pub trait SpoutCollector {
    /// Emit a tuple on the default grouping.
    fn emit(&mut self, emit: Emit) -> Result<()>;
    /// Emit a tuple directly to one task.
    fn emit_direct(&mut self, task: i64, emit: Emit) -> Result<()>;
    /// Send a log line to the host.
    fn log(&mut self, msg: &str) -> Result<()>;
}

/// A tuple-originating processing unit.
///
/// Any error returned from a callback is fatal: it is sent to the host via
/// the `log` command and the loop terminates.
pub trait Spout {
    /// One-time hook after the handshake, before the first request.
    fn prepare(
        &mut self,
        _conf: &serde_json::Map<String, Value>,
        _context: &serde_json::Map<String, Value>,
    ) -> Result<()> {
        Ok(())
    }

    /// Emit zero or more new tuples.
    fn next_tuple(&mut self, collector: &mut dyn SpoutCollector) -> Result<()>;

    /// A previously emitted tuple completed processing.
    fn ack(&mut self, id: &str) -> Result<()>;

    /// A previously emitted tuple failed processing.
    fn fail(&mut self, id: &str) -> Result<()>;
}

struct Outlet<'a, R, W: Write> {
    component: &'a mut Component<R, W>,
}

impl<R: BufRead, W: Write> Outlet<'_, R, W> {
    fn send(&mut self, task: Option<i64>, emit: Emit) -> Result<()> {
        self.component.send_command(&Command::Emit {
            stream: emit.stream,
            anchors: None,
            task,
            id: emit.message_id,
            tuple: emit.values,
        })
    }
}

impl<R: BufRead, W: Write> SpoutCollector for Outlet<'_, R, W> {
    fn emit(&mut self, emit: Emit) -> Result<()> {
        self.send(None, emit)
    }

    fn emit_direct(&mut self, task: i64, emit: Emit) -> Result<()> {
        self.send(Some(task), emit)
    }

    fn log(&mut self, msg: &str) -> Result<()> {
        self.component.send_log(msg)
    }
}

/// Drive a spout until a fatal error.
pub fn run<R: BufRead, W: Write, S: Spout>(
    component: &mut Component<R, W>,
    spout: &mut S,
) -> Result<()> {
    match run_loop(component, spout) {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!(error = %err, "spout terminating");
            let _ = component.send_log(&err.to_string());
            Err(err)
        }
    }
}

fn run_loop<R: BufRead, W: Write, S: Spout>(
    component: &mut Component<R, W>,
    spout: &mut S,
) -> Result<()> {
    spout.prepare(component.conf(), component.context())?;
    loop {
        let raw = component.wait_for_message()?;
        if let Payload::Structured(map) = decode(&raw) {
            match map.get("command").and_then(Value::as_str) {
                Some("ack") => {
                    if let Some(id) = map.get("id").and_then(Value::as_str) {
                        spout.ack(id)?;
                    }
                }
                Some("fail") => {
                    if let Some(id) = map.get("id").and_then(Value::as_str) {
                        spout.fail(id)?;
                    }
                }
                Some("next") => {
                    let mut collector = Outlet {
                        component: &mut *component,
                    };
                    spout.next_tuple(&mut collector)?;
                }
                // Unrecognized commands dispatch nothing but still sync.
                _ => {}
            }
        }
        component.send_sync()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentBuilder;
    use crate::error::MultilangError;
    use crate::testing::{input_stream, parse_commands, SharedBuf};
    use serde_json::json;
    use std::io::Cursor;

    fn connect(messages: &[Value]) -> (Component<Cursor<Vec<u8>>, SharedBuf>, SharedBuf) {
        let out = SharedBuf::default();
        let mut input = vec![json!({ "conf": {}, "context": {}, "pidDir": "/nope" })];
        input.extend_from_slice(messages);
        let component = ComponentBuilder::new()
            .connect(Cursor::new(input_stream(&input)), out.clone())
            .unwrap();
        out.take(); // discard the pid announcement
        (component, out)
    }

    #[derive(Default)]
    struct Recording {
        next_calls: usize,
        acked: Vec<String>,
        failed: Vec<String>,
        emit: Option<Emit>,
    }

    impl Spout for Recording {
        fn next_tuple(&mut self, collector: &mut dyn SpoutCollector) -> Result<()> {
            self.next_calls += 1;
            if let Some(emit) = self.emit.clone() {
                collector.emit(emit)?;
            }
            Ok(())
        }

        fn ack(&mut self, id: &str) -> Result<()> {
            self.acked.push(id.to_string());
            Ok(())
        }

        fn fail(&mut self, id: &str) -> Result<()> {
            self.failed.push(id.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_next_invokes_callback_then_syncs_once() {
        let (mut component, out) = connect(&[json!({ "command": "next" })]);
        let mut spout = Recording::default();

        let err = run(&mut component, &mut spout).unwrap_err();
        assert!(matches!(err, MultilangError::ConnectionClosed));
        assert_eq!(spout.next_calls, 1);

        let commands = parse_commands(&out.take());
        let syncs: Vec<_> = commands.iter().filter(|c| c["command"] == "sync").collect();
        assert_eq!(syncs.len(), 1);
    }

    #[test]
    fn test_ack_and_fail_dispatch_ids() {
        let (mut component, out) = connect(&[
            json!({ "command": "ack", "id": "m1" }),
            json!({ "command": "fail", "id": "m2" }),
        ]);
        let mut spout = Recording::default();

        let _ = run(&mut component, &mut spout);
        assert_eq!(spout.acked, vec!["m1".to_string()]);
        assert_eq!(spout.failed, vec!["m2".to_string()]);

        let commands = parse_commands(&out.take());
        let syncs = commands.iter().filter(|c| c["command"] == "sync").count();
        assert_eq!(syncs, 2);
    }

    #[test]
    fn test_unrecognized_command_still_syncs() {
        let (mut component, out) = connect(&[json!({ "command": "activate" })]);
        let mut spout = Recording::default();

        let _ = run(&mut component, &mut spout);
        assert_eq!(spout.next_calls, 0);
        assert!(spout.acked.is_empty());

        let commands = parse_commands(&out.take());
        assert_eq!(commands.iter().filter(|c| c["command"] == "sync").count(), 1);
    }

    #[test]
    fn test_undecodable_message_still_syncs() {
        let out = SharedBuf::default();
        let mut input = input_stream(&[json!({ "conf": {}, "context": {}, "pidDir": "/nope" })]);
        input.extend_from_slice(b"garbage line\nend\n");
        let mut component = ComponentBuilder::new()
            .connect(Cursor::new(input), out.clone())
            .unwrap();
        out.take();

        let mut spout = Recording::default();
        let _ = run(&mut component, &mut spout);

        let commands = parse_commands(&out.take());
        assert_eq!(commands.iter().filter(|c| c["command"] == "sync").count(), 1);
    }

    #[test]
    fn test_emit_without_message_id_omits_id_field() {
        let (mut component, out) = connect(&[json!({ "command": "next" })]);
        let mut spout = Recording {
            emit: Some(Emit::new(vec![json!("word")])),
            ..Recording::default()
        };

        let _ = run(&mut component, &mut spout);

        let commands = parse_commands(&out.take());
        let emit = commands.iter().find(|c| c["command"] == "emit").unwrap();
        let obj = emit.as_object().unwrap();
        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("anchors"));
        assert_eq!(emit["tuple"], json!(["word"]));
    }

    #[test]
    fn test_emit_with_message_id_carries_id_field() {
        let (mut component, out) = connect(&[json!({ "command": "next" })]);
        let mut spout = Recording {
            emit: Some(Emit::new(vec![json!("word")]).message_id("42")),
            ..Recording::default()
        };

        let _ = run(&mut component, &mut spout);

        let commands = parse_commands(&out.take());
        let emit = commands.iter().find(|c| c["command"] == "emit").unwrap();
        assert_eq!(emit["id"], "42");
    }

    #[test]
    fn test_emit_precedes_sync() {
        let (mut component, out) = connect(&[json!({ "command": "next" })]);
        let mut spout = Recording {
            emit: Some(Emit::new(vec![json!(1)])),
            ..Recording::default()
        };

        let _ = run(&mut component, &mut spout);

        let commands = parse_commands(&out.take());
        let emit_pos = commands.iter().position(|c| c["command"] == "emit").unwrap();
        let sync_pos = commands.iter().position(|c| c["command"] == "sync").unwrap();
        assert!(emit_pos < sync_pos);
    }

    struct Exploding;

    impl Spout for Exploding {
        fn next_tuple(&mut self, _collector: &mut dyn SpoutCollector) -> Result<()> {
            Err(MultilangError::Processing("spout broke".to_string()))
        }
        fn ack(&mut self, _id: &str) -> Result<()> {
            Ok(())
        }
        fn fail(&mut self, _id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_callback_error_is_logged_and_fatal() {
        let (mut component, out) = connect(&[
            json!({ "command": "next" }),
            json!({ "command": "next" }),
        ]);

        let err = run(&mut component, &mut Exploding).unwrap_err();
        assert!(matches!(err, MultilangError::Processing(_)));

        let commands = parse_commands(&out.take());
        // No sync after the failed dispatch; the log is the only output.
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0]["command"], "log");
        assert!(commands[0]["msg"].as_str().unwrap().contains("spout broke"));
    }

    #[test]
    fn test_emit_direct_carries_task() {
        struct Direct;
        impl Spout for Direct {
            fn next_tuple(&mut self, collector: &mut dyn SpoutCollector) -> Result<()> {
                collector.emit_direct(5, Emit::new(vec![json!(1)]).stream("side"))
            }
            fn ack(&mut self, _id: &str) -> Result<()> {
                Ok(())
            }
            fn fail(&mut self, _id: &str) -> Result<()> {
                Ok(())
            }
        }

        let (mut component, out) = connect(&[json!({ "command": "next" })]);
        let _ = run(&mut component, &mut Direct);

        let commands = parse_commands(&out.take());
        let emit = commands.iter().find(|c| c["command"] == "emit").unwrap();
        assert_eq!(emit["task"], 5);
        assert_eq!(emit["stream"], "side");
    }
}
