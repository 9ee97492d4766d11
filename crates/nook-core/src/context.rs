//! Context classification.
//!
//! A [`Context`] is the normalized identity snapshot of a window used for
//! rule matching: application identity, optional X11 class, title, and pid.
//! Classification is a pure function over a [`WindowNode`] — missing fields
//! degrade to empty values rather than failing, which means a degraded
//! context can only match rules with no populated criteria (i.e. none).

use serde::{Deserialize, Serialize};

use crate::events::WindowNode;

/// Normalized identity snapshot of a window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Application identity: the Wayland `app_id`, falling back to the X11
    /// window class for X11 clients. Empty when neither is known.
    pub app_identity: String,
    /// X11 window class, when present.
    pub window_class: Option<String>,
    /// Window title. Empty when unknown.
    pub title: String,
    /// Client pid, when the compositor reports one.
    pub pid: Option<i32>,
}

impl Context {
    /// Classify a window node into a matching context.
    pub fn classify(node: &WindowNode) -> Self {
        let app_identity = node
            .app_id
            .clone()
            .or_else(|| node.window_class.clone())
            .unwrap_or_default();
        Self {
            app_identity,
            window_class: node.window_class.clone(),
            title: node.title.clone().unwrap_or_default(),
            pid: node.pid,
        }
    }

    /// Whether classification found no usable identity at all.
    pub fn is_degraded(&self) -> bool {
        self.app_identity.is_empty() && self.window_class.is_none() && self.title.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WindowNode;

    fn node(app_id: Option<&str>, class: Option<&str>, title: Option<&str>) -> WindowNode {
        WindowNode {
            app_id: app_id.map(str::to_string),
            window_class: class.map(str::to_string),
            title: title.map(str::to_string),
            pid: Some(4242),
            ..WindowNode::default()
        }
    }

    #[test]
    fn wayland_app_id_wins() {
        let ctx = Context::classify(&node(Some("kitty"), Some("Kitty"), Some("nvim main.rs")));
        assert_eq!(ctx.app_identity, "kitty");
        assert_eq!(ctx.window_class.as_deref(), Some("Kitty"));
        assert_eq!(ctx.title, "nvim main.rs");
        assert_eq!(ctx.pid, Some(4242));
    }

    #[test]
    fn x11_class_fallback() {
        let ctx = Context::classify(&node(None, Some("firefox"), Some("Mozilla Firefox")));
        assert_eq!(ctx.app_identity, "firefox");
    }

    #[test]
    fn missing_fields_degrade_to_empty() {
        let ctx = Context::classify(&node(None, None, None));
        assert_eq!(ctx.app_identity, "");
        assert_eq!(ctx.title, "");
        assert!(ctx.window_class.is_none());
        assert!(ctx.is_degraded());
    }

    #[test]
    fn title_only_is_not_fully_degraded() {
        let ctx = Context::classify(&node(None, None, Some("scratch")));
        assert!(!ctx.is_degraded());
    }
}
