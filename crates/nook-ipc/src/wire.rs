//! Typed wire payloads.
//!
//! Deserialization is tolerant: every field the daemon does not consume is
//! ignored, and fields a client may omit default to `None`. Compositors ship
//! slightly different node shapes (sway vs i3 vs scroll forks), so the only
//! hard requirement is the container id.

use nook_core::{ContainerId, Rect, WindowNode};
use serde::Deserialize;

/// Per-command result record from `RUN_COMMAND`.
#[derive(Clone, Debug, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command was accepted.
    pub success: bool,
    /// Compositor-reported error text, when not successful.
    #[serde(default)]
    pub error: Option<String>,
}

/// A `window` event payload.
#[derive(Clone, Debug, Deserialize)]
pub struct WindowEvent {
    /// What happened: `new`, `close`, `focus`, `title`, `move`, ...
    pub change: String,
    /// The affected container.
    pub container: WireNode,
}

/// Container node as found in window events and tree dumps.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WireNode {
    /// Container id.
    pub id: i64,
    /// Node type: `con`, `floating_con`, `workspace`, ...
    #[serde(default, rename = "type")]
    pub node_type: String,
    /// Window title.
    #[serde(default)]
    pub name: Option<String>,
    /// Wayland application id.
    #[serde(default)]
    pub app_id: Option<String>,
    /// Client pid (sway extension).
    #[serde(default)]
    pub pid: Option<i32>,
    /// X11 window properties.
    #[serde(default)]
    pub window_properties: Option<WindowProperties>,
    /// Fraction of the parent this container occupies.
    #[serde(default)]
    pub percent: Option<f64>,
    /// Container geometry.
    #[serde(default)]
    pub rect: WireRect,
    /// Fullscreen state: 0 none, 1 output, 2 global.
    #[serde(default)]
    pub fullscreen_mode: u8,
    /// Output name, when the compositor includes it.
    #[serde(default)]
    pub output: Option<String>,
}

/// X11 window properties sub-object.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WindowProperties {
    /// X11 class.
    #[serde(default)]
    pub class: Option<String>,
    /// X11 instance.
    #[serde(default)]
    pub instance: Option<String>,
}

/// Pixel rectangle.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct WireRect {
    /// X offset.
    #[serde(default)]
    pub x: i32,
    /// Y offset.
    #[serde(default)]
    pub y: i32,
    /// Width.
    #[serde(default)]
    pub width: i32,
    /// Height.
    #[serde(default)]
    pub height: i32,
}

/// A workspace record from `GET_WORKSPACES`.
#[derive(Clone, Debug, Deserialize)]
pub struct WorkspaceInfo {
    /// Workspace name.
    pub name: String,
    /// Whether this workspace currently has focus.
    #[serde(default)]
    pub focused: bool,
    /// Output the workspace is on.
    #[serde(default)]
    pub output: Option<String>,
}

impl WireNode {
    /// Convert to the core snapshot type the runtime consumes.
    pub fn to_window_node(&self) -> WindowNode {
        WindowNode {
            id: ContainerId(self.id),
            app_id: self.app_id.clone(),
            window_class: self
                .window_properties
                .as_ref()
                .and_then(|p| p.class.clone()),
            title: self.name.clone(),
            pid: self.pid,
            percent: self.percent,
            rect: Rect {
                x: self.rect.x,
                y: self.rect.y,
                width: self.rect.width,
                height: self.rect.height,
            },
            floating: self.node_type == "floating_con",
            fullscreen: self.fullscreen_mode != 0,
            output: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_event_decodes_sway_shape() {
        let payload = r#"{
            "change": "new",
            "container": {
                "id": 17,
                "type": "con",
                "name": "nvim main.rs",
                "app_id": "kitty",
                "pid": 4242,
                "percent": 0.5,
                "rect": { "x": 0, "y": 0, "width": 1280, "height": 1440 },
                "fullscreen_mode": 0,
                "unknown_field": { "ignored": true }
            }
        }"#;
        let event: WindowEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.change, "new");
        let node = event.container.to_window_node();
        assert_eq!(node.id, ContainerId(17));
        assert_eq!(node.app_id.as_deref(), Some("kitty"));
        assert_eq!(node.rect.height, 1440);
        assert!(!node.floating);
        assert!(!node.fullscreen);
    }

    #[test]
    fn x11_class_maps_to_window_class() {
        let payload = r#"{
            "change": "focus",
            "container": {
                "id": 3,
                "window_properties": { "class": "Alacritty", "instance": "Alacritty" }
            }
        }"#;
        let event: WindowEvent = serde_json::from_str(payload).unwrap();
        let node = event.container.to_window_node();
        assert_eq!(node.window_class.as_deref(), Some("Alacritty"));
        assert!(node.app_id.is_none());
    }

    #[test]
    fn command_outcomes_decode() {
        let payload = r#"[{ "success": true }, { "success": false, "error": "unknown command" }]"#;
        let outcomes: Vec<CommandOutcome> = serde_json::from_str(payload).unwrap();
        assert!(outcomes[0].success);
        assert_eq!(outcomes[1].error.as_deref(), Some("unknown command"));
    }

    #[test]
    fn floating_and_fullscreen_flags() {
        let node = WireNode {
            id: 9,
            node_type: "floating_con".into(),
            fullscreen_mode: 1,
            ..WireNode::default()
        };
        let node = node.to_window_node();
        assert!(node.floating);
        assert!(node.fullscreen);
    }
}
