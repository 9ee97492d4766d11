//! Runtime error types.
//!
//! Only the command path produces errors here. An expired correlation is not
//! an error — the store treats it as absence and the orchestrator logs it at
//! debug level. A failed sequence surfaces as [`RuntimeError`] inside the
//! sequencer and is downgraded to a fallback decision at the orchestrator
//! boundary; nothing in this crate is fatal to the process.

use nook_ipc::IpcError;
use thiserror::Error;

/// Errors from executing compositor commands.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The compositor accepted the connection but rejected a command.
    #[error("command '{command}' rejected: {reason}")]
    CommandRejected {
        /// The submitted command string.
        command: String,
        /// Compositor-reported reason.
        reason: String,
    },

    /// Transport failure — includes the connection dropping mid-sequence,
    /// which is treated identically to a failing command.
    #[error(transparent)]
    Ipc(#[from] IpcError),
}
