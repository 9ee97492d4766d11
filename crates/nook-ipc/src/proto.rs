//! i3-ipc wire framing.
//!
//! Every message is `"i3-ipc" | u32 payload length | u32 message type |
//! payload`, integers little-endian. Event frames set [`EVENT_BIT`] in the
//! type; the low bits carry the event id.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::IpcError;

/// Protocol magic prefix.
pub const MAGIC: &[u8; 6] = b"i3-ipc";

/// Header size: magic + length + type.
pub const HEADER_LEN: usize = 14;

/// High bit marking an event frame.
pub const EVENT_BIT: u32 = 1 << 31;

/// Upper bound on accepted payloads. A full tree dump on a busy session is
/// a few hundred KiB; anything near this limit is a corrupt length field.
const MAX_PAYLOAD: u32 = 32 * 1024 * 1024;

/// Request message types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    /// Run one or more commands.
    RunCommand = 0,
    /// List workspaces.
    GetWorkspaces = 1,
    /// Subscribe to events.
    Subscribe = 2,
    /// List outputs.
    GetOutputs = 3,
    /// Dump the layout tree.
    GetTree = 4,
}

/// Event ids (frame type with [`EVENT_BIT`] cleared).
pub mod event {
    /// Workspace event.
    pub const WORKSPACE: u32 = 0;
    /// Window event.
    pub const WINDOW: u32 = 3;
    /// Compositor shutdown.
    pub const SHUTDOWN: u32 = 6;
    /// IPC tick event.
    pub const TICK: u32 = 7;
}

/// Write one framed message.
pub async fn write_message<W>(writer: &mut W, msg_type: u32, payload: &[u8]) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(MAGIC);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&msg_type.to_le_bytes());
    frame.extend_from_slice(payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed message, returning `(type, payload)`.
pub async fn read_message<R>(reader: &mut R) -> Result<(u32, Vec<u8>), IpcError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;
    if &header[..6] != MAGIC {
        return Err(IpcError::Protocol(format!(
            "bad magic {:02x?}",
            &header[..6]
        )));
    }
    let len = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
    let msg_type = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);
    if len > MAX_PAYLOAD {
        return Err(IpcError::Protocol(format!(
            "payload length {len} exceeds limit"
        )));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok((msg_type, payload))
}
