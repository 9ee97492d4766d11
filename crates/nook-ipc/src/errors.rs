//! IPC transport and protocol errors.

use thiserror::Error;

/// Errors from the compositor connection.
#[derive(Debug, Error)]
pub enum IpcError {
    /// Neither `$SWAYSOCK` nor `$I3SOCK` is set and no socket path was given.
    #[error("compositor socket not found: set $SWAYSOCK or $I3SOCK, or pass --socket")]
    SocketNotFound,

    /// Socket I/O failed (includes a dropped connection).
    #[error("ipc i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent a frame that is not valid i3-ipc.
    #[error("ipc protocol error: {0}")]
    Protocol(String),

    /// A payload failed to decode as the expected JSON shape.
    #[error("ipc payload decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
