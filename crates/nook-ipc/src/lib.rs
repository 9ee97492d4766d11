//! # nook-ipc
//!
//! i3/sway IPC protocol client.
//!
//! The compositor speaks a simple framed protocol over a Unix socket:
//! a 14-byte header (`i3-ipc` magic + little-endian payload length and
//! message type) followed by a JSON payload. Replies echo the request type;
//! asynchronous events arrive with the high bit of the type set.
//!
//! The daemon holds **two** connections (the i3ipc convention): one
//! subscribed to the event stream, one for command round-trips — so the
//! sequencer's strictly synchronous submissions never interleave with event
//! reads.
//!
//! - [`Connection`] — connect, subscribe, read events, run commands
//! - [`proto`] — wire framing
//! - [`wire`] — typed event/reply payloads
//! - [`IpcError`] — transport and protocol errors

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod proto;
pub mod wire;

pub use connection::{Connection, IpcEvent};
pub use errors::IpcError;
pub use wire::{CommandOutcome, WindowEvent, WireNode, WorkspaceInfo};
