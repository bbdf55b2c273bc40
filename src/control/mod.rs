//! Control module - startup handshake and injected capabilities.
//!
//! Provides:
//! - [`Handshake`] - configuration, topology context and pid directory
//! - [`ReadinessReporter`] / [`FsReadiness`] - marker-file creation
//! - [`TraceSink`] / [`FileTrace`] - optional read mirror for debugging

mod handshake;
mod readiness;
mod trace;

pub use handshake::Handshake;
pub use readiness::{FsReadiness, ReadinessReporter};
pub use trace::{FileTrace, TraceSink};
