//! Compositor event vocabulary.
//!
//! The runtime reduces over a closed set of typed events rather than raw IPC
//! payloads: the IPC layer translates wire events into [`Event`] values, and
//! everything downstream (orchestrator, state store, tests) speaks only this
//! vocabulary. `Tick` is generated internally by the sweep timer, not by the
//! compositor.

use serde::{Deserialize, Serialize};

use crate::ids::{ContainerId, WorkspaceId};

/// Pixel rectangle of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// X offset.
    pub x: i32,
    /// Y offset.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

/// Snapshot of a window container as reported by the compositor.
///
/// All identity fields are optional: Wayland-native windows carry an
/// `app_id`, X11 windows a `window_class`, and either may be absent while a
/// client is still mapping. Downstream code never fails on missing fields —
/// classification degrades instead (see [`crate::context::Context`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowNode {
    /// Compositor container id.
    pub id: ContainerId,
    /// Wayland application id, if any.
    pub app_id: Option<String>,
    /// X11 window class, if any.
    pub window_class: Option<String>,
    /// Window title.
    pub title: Option<String>,
    /// Client process id, if the compositor knows it.
    pub pid: Option<i32>,
    /// Fraction of the parent container this window occupies.
    pub percent: Option<f64>,
    /// Window geometry.
    pub rect: Rect,
    /// Whether the container is floating.
    pub floating: bool,
    /// Whether the container is fullscreen.
    pub fullscreen: bool,
    /// Output the container is on, when known.
    pub output: Option<String>,
}

/// A compositor (or internally generated) event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Input focus moved to a window.
    FocusChanged {
        /// Workspace the focused window is on.
        workspace: WorkspaceId,
        /// The focused window.
        window: WindowNode,
    },
    /// A new window was mapped.
    WindowCreated {
        /// Workspace the window appeared on.
        workspace: WorkspaceId,
        /// The new window.
        window: WindowNode,
    },
    /// A window was closed.
    WindowClosed {
        /// The closed window.
        window: WindowNode,
    },
    /// Periodic sweep tick from the runtime timer.
    Tick,
}

impl Event {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::FocusChanged { .. } => "focus_changed",
            Event::WindowCreated { .. } => "window_created",
            Event::WindowClosed { .. } => "window_closed",
            Event::Tick => "tick",
        }
    }
}
