//! Outbound protocol directives.
//!
//! Every message the worker sends is one [`Command`], rendered to a single
//! JSON object. The pid announcement is the one command without a
//! `command` tag; `emit` carries only the fields the caller actually set.
//!
//! # Example
//!
//! ```
//! use multilang_client::protocol::Command;
//!
//! let json = Command::Sync.to_json();
//! assert_eq!(json["command"], "sync");
//! ```

use serde_json::{json, Map, Value};

use crate::protocol::Tuple;

/// An outbound protocol directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Liveness announcement, sent once before any read.
    Pid { pid: u32 },
    /// Free-form log line for the host's worker log.
    Log { msg: String },
    /// Readiness signal (spout): ready for the next instruction.
    Sync,
    /// Acknowledge a tuple by its opaque id.
    Ack { id: Option<String> },
    /// Fail a tuple by its opaque id.
    Fail { id: Option<String> },
    /// Emit a new tuple.
    Emit {
        /// Logical output channel; omitted means the default stream.
        stream: Option<String>,
        /// Lineage ids; `Some` (possibly empty) on the bolt channel,
        /// `None` on the spout channel.
        anchors: Option<Vec<String>>,
        /// Target task for direct emission.
        task: Option<i64>,
        /// Spout message id; presence requests reliability tracking.
        id: Option<String>,
        /// Payload value sequence.
        tuple: Vec<Value>,
    },
}

impl Command {
    /// Render the wire JSON object for this command.
    pub fn to_json(&self) -> Value {
        match self {
            Command::Pid { pid } => json!({ "pid": pid }),
            Command::Log { msg } => json!({ "command": "log", "msg": msg }),
            Command::Sync => json!({ "command": "sync" }),
            Command::Ack { id } => json!({ "command": "ack", "id": id }),
            Command::Fail { id } => json!({ "command": "fail", "id": id }),
            Command::Emit {
                stream,
                anchors,
                task,
                id,
                tuple,
            } => {
                let mut map = Map::new();
                map.insert("command".to_string(), json!("emit"));
                if let Some(id) = id {
                    map.insert("id".to_string(), json!(id));
                }
                if let Some(stream) = stream {
                    map.insert("stream".to_string(), json!(stream));
                }
                if let Some(anchors) = anchors {
                    map.insert("anchors".to_string(), json!(anchors));
                }
                if let Some(task) = task {
                    map.insert("task".to_string(), json!(task));
                }
                map.insert("tuple".to_string(), json!(tuple));
                Value::Object(map)
            }
        }
    }
}

/// Builder for an emitted tuple, consumed by the collectors.
///
/// The same builder serves both channels: bolts honor `stream` and the
/// anchor list, spouts honor `stream` and `message_id`. Fields that do not
/// apply to a channel are ignored by its collector.
///
/// # Example
///
/// ```
/// use multilang_client::protocol::Emit;
/// use serde_json::json;
///
/// let emit = Emit::new(vec![json!("word"), json!(1)])
///     .stream("counts")
///     .message_id("42");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emit {
    pub(crate) values: Vec<Value>,
    pub(crate) stream: Option<String>,
    pub(crate) anchors: Vec<String>,
    pub(crate) message_id: Option<String>,
}

impl Emit {
    /// Start an emit with the given payload values.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Emit on a named stream instead of the default one.
    pub fn stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// Anchor the emitted tuple to a source tuple's lineage.
    ///
    /// Tuples without an id (non-acked flows) contribute no anchor.
    pub fn anchor(mut self, tuple: &Tuple) -> Self {
        if let Some(id) = &tuple.id {
            self.anchors.push(id.clone());
        }
        self
    }

    /// Anchor by raw tuple id.
    pub fn anchor_id(mut self, id: impl Into<String>) -> Self {
        self.anchors.push(id.into());
        self
    }

    /// Request reliability tracking for this tuple (spout only).
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }
}
