//! Protocol module - line framing and message types.
//!
//! Provides:
//! - [`MessageReader`] / [`MessageWriter`] - sentinel-delimited line framing
//! - [`Command`] - outbound protocol directives
//! - [`Emit`] - builder for emitted tuples
//! - [`Tuple`] - inbound unit of work

mod command;
mod framing;
mod tuple;

pub use command::{Command, Emit};
pub use framing::{MessageReader, MessageWriter, END_SENTINEL, SYNC_SENTINEL};
pub use tuple::Tuple;
