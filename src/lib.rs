//! # multilang-client
//!
//! Rust worker SDK for the Storm-compatible multilang subprocess protocol.
//!
//! The host topology engine launches the worker as a subprocess and talks
//! to it over stdin/stdout with line-framed JSON messages, each terminated
//! by an `end` line. This crate owns that conversation: the startup
//! handshake, the framing, and the dispatch loop that turns host messages
//! into callbacks on user code and callback outcomes into protocol
//! commands (`ack`, `fail`, `emit`, `log`, `sync`).
//!
//! ## Architecture
//!
//! - **protocol**: sentinel-delimited line framing plus the wire types
//! - **codec**: structured decoding with the opaque-string fallback
//! - **control**: handshake result and injected side-effect capabilities
//! - **component**: shared startup lifecycle and command senders
//! - **bolt** / **spout**: the dispatch state machines
//!
//! The protocol is strictly synchronous: one in-flight message per
//! direction, blocking I/O, callbacks never invoked concurrently.
//!
//! ## Example
//!
//! ```ignore
//! use multilang_client::{bolt, BasicBolt, BoltCollector, ComponentBuilder, Emit, Tuple};
//! use multilang_client::error::ProcessError;
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct Doubler;
//!
//! impl BasicBolt for Doubler {
//!     fn process(
//!         &mut self,
//!         tuple: &Tuple,
//!         collector: &mut dyn BoltCollector,
//!     ) -> Result<(), ProcessError> {
//!         let n = tuple.values[0].as_i64().ok_or(ProcessError::Failed)?;
//!         collector.emit(Emit::new(vec![json!(n * 2)]))?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> multilang_client::Result<()> {
//!     let mut component = ComponentBuilder::new().stdio()?;
//!     bolt::run_basic(&mut component, &mut Doubler)
//! }
//! ```

pub mod bolt;
pub mod codec;
pub mod component;
pub mod control;
pub mod error;
pub mod protocol;
pub mod spout;

#[cfg(test)]
pub(crate) mod testing;

pub use bolt::{BasicBolt, Bolt, BoltCollector};
pub use component::{Component, ComponentBuilder};
pub use error::{MultilangError, ProcessError, Result};
pub use protocol::{Command, Emit, Tuple};
pub use spout::{Spout, SpoutCollector};
