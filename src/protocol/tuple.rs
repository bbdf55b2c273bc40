//! Inbound unit of work.

use serde::Deserialize;
use serde_json::Value;

/// One received unit of work on the bolt channel.
///
/// Built fresh from each tuple-delivery message and discarded after the
/// dispatch iteration that received it. Any field the host omits is absent;
/// `id` in particular is absent for non-acked flows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tuple {
    /// Opaque acknowledgment token.
    #[serde(default)]
    pub id: Option<String>,
    /// Name of the originating component.
    #[serde(default, rename = "comp")]
    pub component: Option<String>,
    /// Logical channel the tuple arrived on.
    #[serde(default)]
    pub stream: Option<String>,
    /// Originating task identifier.
    #[serde(default)]
    pub task: Option<i64>,
    /// Ordered payload values.
    #[serde(default, rename = "tuple")]
    pub values: Vec<Value>,
}
