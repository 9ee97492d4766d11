//! Compositor connection.

use std::path::{Path, PathBuf};

use tokio::net::UnixStream;
use tracing::{debug, trace};

use crate::errors::IpcError;
use crate::proto::{self, EVENT_BIT, MessageType};
use crate::wire::{CommandOutcome, WindowEvent, WorkspaceInfo};

/// An event delivered on a subscribed connection.
#[derive(Clone, Debug)]
pub enum IpcEvent {
    /// A window event (new/close/focus/title/...).
    Window(WindowEvent),
    /// The compositor is shutting down.
    Shutdown,
    /// An event the daemon is not interested in.
    Other {
        /// Event id with the event bit cleared.
        event_type: u32,
    },
}

/// One compositor IPC connection.
///
/// A connection is either used for request/reply round-trips or put into
/// subscription mode with [`Connection::subscribe`] and drained with
/// [`Connection::next_event`] — never both. Replies and events share the
/// socket, so mixing the two styles on one connection would let a command
/// reply interleave with the event stream.
#[derive(Debug)]
pub struct Connection {
    stream: UnixStream,
}

impl Connection {
    /// Connect to the compositor socket at `path`.
    pub async fn connect(path: &Path) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(path).await?;
        debug!(path = %path.display(), "connected to compositor socket");
        Ok(Self { stream })
    }

    /// Connect using `$SWAYSOCK` or `$I3SOCK`.
    pub async fn connect_from_env() -> Result<Self, IpcError> {
        let path = socket_path_from_env().ok_or(IpcError::SocketNotFound)?;
        Self::connect(&path).await
    }

    /// Submit a command string and return the per-command outcomes.
    ///
    /// The compositor splits the string on `;`/`,` itself, returning one
    /// outcome per command.
    pub async fn run_command(&mut self, command: &str) -> Result<Vec<CommandOutcome>, IpcError> {
        trace!(command, "run_command");
        let payload = self
            .roundtrip(MessageType::RunCommand, command.as_bytes())
            .await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// List workspaces.
    pub async fn get_workspaces(&mut self) -> Result<Vec<WorkspaceInfo>, IpcError> {
        let payload = self.roundtrip(MessageType::GetWorkspaces, b"").await?;
        Ok(serde_json::from_slice(&payload)?)
    }

    /// The name of the currently focused workspace, if any.
    pub async fn focused_workspace(&mut self) -> Result<Option<String>, IpcError> {
        let workspaces = self.get_workspaces().await?;
        Ok(workspaces.into_iter().find(|w| w.focused).map(|w| w.name))
    }

    /// Subscribe this connection to the named event classes
    /// (e.g. `["window", "shutdown"]`).
    pub async fn subscribe(&mut self, events: &[&str]) -> Result<(), IpcError> {
        let payload = serde_json::to_vec(events)?;
        let reply = self.roundtrip(MessageType::Subscribe, &payload).await?;
        let outcome: serde_json::Value = serde_json::from_slice(&reply)?;
        if outcome.get("success").and_then(serde_json::Value::as_bool) == Some(true) {
            debug!(?events, "subscribed");
            Ok(())
        } else {
            Err(IpcError::Protocol(format!(
                "subscribe rejected: {outcome}"
            )))
        }
    }

    /// Read the next event on a subscribed connection.
    ///
    /// Non-event frames (stray replies) are skipped with a trace log.
    pub async fn next_event(&mut self) -> Result<IpcEvent, IpcError> {
        loop {
            let (frame_type, payload) = proto::read_message(&mut self.stream).await?;
            if frame_type & EVENT_BIT == 0 {
                trace!(frame_type, "skipping non-event frame on event connection");
                continue;
            }
            let event_type = frame_type & !EVENT_BIT;
            return Ok(match event_type {
                proto::event::WINDOW => IpcEvent::Window(serde_json::from_slice(&payload)?),
                proto::event::SHUTDOWN => IpcEvent::Shutdown,
                other => IpcEvent::Other { event_type: other },
            });
        }
    }

    /// Send a request and read its reply, skipping any interleaved events.
    async fn roundtrip(
        &mut self,
        msg_type: MessageType,
        payload: &[u8],
    ) -> Result<Vec<u8>, IpcError> {
        proto::write_message(&mut self.stream, msg_type as u32, payload).await?;
        loop {
            let (frame_type, reply) = proto::read_message(&mut self.stream).await?;
            if frame_type & EVENT_BIT != 0 {
                trace!(frame_type, "skipping event frame while awaiting reply");
                continue;
            }
            if frame_type != msg_type as u32 {
                return Err(IpcError::Protocol(format!(
                    "reply type {frame_type} does not match request type {}",
                    msg_type as u32
                )));
            }
            return Ok(reply);
        }
    }
}

/// Compositor socket path from the environment.
pub fn socket_path_from_env() -> Option<PathBuf> {
    std::env::var_os("SWAYSOCK")
        .or_else(|| std::env::var_os("I3SOCK"))
        .map(PathBuf::from)
}
