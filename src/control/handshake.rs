//! Startup handshake.
//!
//! The first message the host sends is
//! `{"conf": <mapping>, "context": <mapping>, "pidDir": <string>}`. It is
//! parsed once, held for the process's entire lifetime and never mutated.

use serde_json::{Map, Value};

/// Result of the one-time startup handshake.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Handshake {
    /// Topology configuration.
    pub conf: Map<String, Value>,
    /// Topology context (component ids, task mapping, ...).
    pub context: Map<String, Value>,
    /// Directory in which to create the readiness marker file.
    pub pid_dir: String,
}

impl Handshake {
    /// Parse the handshake from its decoded message mapping.
    ///
    /// Lenient by design: a missing or ill-typed `conf`/`context` becomes
    /// an empty mapping and a missing `pidDir` an empty string, so a
    /// degenerate handshake still yields a running worker (marker creation
    /// then fails silently).
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let conf = match map.remove("conf") {
            Some(Value::Object(m)) => m,
            _ => Map::new(),
        };
        let context = match map.remove("context") {
            Some(Value::Object(m)) => m,
            _ => Map::new(),
        };
        let pid_dir = match map.remove("pidDir") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        Self {
            conf,
            context,
            pid_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_full_handshake() {
        let handshake = Handshake::from_map(map(json!({
            "conf": { "topology.name": "wordcount" },
            "context": { "taskid": 3 },
            "pidDir": "/var/run/storm"
        })));
        assert_eq!(handshake.conf["topology.name"], "wordcount");
        assert_eq!(handshake.context["taskid"], 3);
        assert_eq!(handshake.pid_dir, "/var/run/storm");
    }

    #[test]
    fn test_missing_fields_default() {
        let handshake = Handshake::from_map(map(json!({ "pid": null })));
        assert_eq!(handshake, Handshake::default());
    }

    #[test]
    fn test_ill_typed_fields_default() {
        let handshake = Handshake::from_map(map(json!({
            "conf": "not a mapping",
            "context": 3,
            "pidDir": ["/tmp"]
        })));
        assert!(handshake.conf.is_empty());
        assert!(handshake.context.is_empty());
        assert_eq!(handshake.pid_dir, "");
    }
}
