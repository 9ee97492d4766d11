//! Geometry-based fallback tiling.
//!
//! When no rule applies (or one fails), windows still get sensible
//! placement: split vertically when the focused container is taller than it
//! is wide (scaled by `split_ratio`), horizontally otherwise. Floating and
//! fullscreen containers are left alone, and tiling can be restricted to
//! specific outputs or workspaces.

use nook_core::{WindowNode, WorkspaceId};
use tracing::debug;

use crate::errors::RuntimeError;
use crate::sequencer::{self, CommandTransport};

/// Default geometry-based tiler.
#[derive(Clone, Debug)]
pub struct FallbackTiler {
    /// Restrict tiling to these outputs; empty means all.
    pub outputs: Vec<String>,
    /// Restrict tiling to these workspaces; empty means all.
    pub workspaces: Vec<String>,
    /// Width factor applied after a horizontal split (1.0 = untouched).
    pub split_width: f64,
    /// Height factor applied after a vertical split (1.0 = untouched).
    pub split_height: f64,
    /// Aspect bias: the window must be `split_ratio` times wider than tall
    /// before a horizontal split is chosen.
    pub split_ratio: f64,
}

impl Default for FallbackTiler {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            workspaces: Vec::new(),
            split_width: 1.0,
            split_height: 1.0,
            split_ratio: 1.0,
        }
    }
}

impl FallbackTiler {
    /// Apply default tiling for `window`. Containers excluded by state or
    /// restriction are skipped silently.
    pub async fn apply<T>(
        &self,
        transport: &mut T,
        workspace: &WorkspaceId,
        window: &WindowNode,
    ) -> Result<(), RuntimeError>
    where
        T: CommandTransport + ?Sized,
    {
        if !self.outputs.is_empty() {
            let on_selected = window
                .output
                .as_deref()
                .is_some_and(|o| self.outputs.iter().any(|s| s == o));
            if !on_selected {
                debug!(container = %window.id, "autotiling off on this output");
                return Ok(());
            }
        }
        if !self.workspaces.is_empty() && !self.workspaces.iter().any(|w| w == workspace.as_str()) {
            debug!(container = %window.id, %workspace, "autotiling off on this workspace");
            return Ok(());
        }
        if window.floating || window.fullscreen {
            debug!(container = %window.id, "container excluded from autotiling");
            return Ok(());
        }

        let vertical = f64::from(window.rect.height) > f64::from(window.rect.width) / self.split_ratio;
        let layout = if vertical { "splitv" } else { "splith" };
        sequencer::submit(transport, layout).await?;
        debug!(container = %window.id, layout, "switched split orientation");

        if let Some(percent) = window.percent {
            if vertical && (self.split_height - 1.0).abs() > f64::EPSILON {
                let height = (percent * self.split_height * 100.0) as i32;
                sequencer::submit(transport, &format!("resize set height {height} ppt")).await?;
            } else if !vertical && (self.split_width - 1.0).abs() > f64::EPSILON {
                let width = (percent * self.split_width * 100.0) as i32;
                sequencer::submit(transport, &format!("resize set width {width} ppt")).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nook_core::{ContainerId, Rect};
    use nook_ipc::{CommandOutcome, IpcError};

    #[derive(Default)]
    struct FakeTransport {
        sent: Vec<String>,
    }

    #[async_trait]
    impl CommandTransport for FakeTransport {
        async fn run_command(&mut self, command: &str) -> Result<Vec<CommandOutcome>, IpcError> {
            self.sent.push(command.to_string());
            Ok(vec![CommandOutcome {
                success: true,
                error: None,
            }])
        }
    }

    fn window(width: i32, height: i32) -> WindowNode {
        WindowNode {
            id: ContainerId(1),
            rect: Rect {
                x: 0,
                y: 0,
                width,
                height,
            },
            percent: Some(0.5),
            ..WindowNode::default()
        }
    }

    #[tokio::test]
    async fn tall_window_splits_vertically() {
        let mut transport = FakeTransport::default();
        let tiler = FallbackTiler::default();
        tiler
            .apply(&mut transport, &"1".into(), &window(800, 1200))
            .await
            .unwrap();
        assert_eq!(transport.sent, vec!["splitv"]);
    }

    #[tokio::test]
    async fn wide_window_splits_horizontally() {
        let mut transport = FakeTransport::default();
        let tiler = FallbackTiler::default();
        tiler
            .apply(&mut transport, &"1".into(), &window(1920, 900))
            .await
            .unwrap();
        assert_eq!(transport.sent, vec!["splith"]);
    }

    #[tokio::test]
    async fn split_ratio_biases_the_decision() {
        // 1200x1000 is wider than tall, but with a golden-ratio bias the
        // width advantage is not enough for a horizontal split.
        let mut transport = FakeTransport::default();
        let tiler = FallbackTiler {
            split_ratio: 1.61,
            ..FallbackTiler::default()
        };
        tiler
            .apply(&mut transport, &"1".into(), &window(1200, 1000))
            .await
            .unwrap();
        assert_eq!(transport.sent, vec!["splitv"]);
    }

    #[tokio::test]
    async fn floating_containers_are_skipped() {
        let mut transport = FakeTransport::default();
        let tiler = FallbackTiler::default();
        let mut node = window(800, 1200);
        node.floating = true;
        tiler
            .apply(&mut transport, &"1".into(), &node)
            .await
            .unwrap();
        assert!(transport.sent.is_empty());
    }

    #[tokio::test]
    async fn workspace_restriction_applies() {
        let mut transport = FakeTransport::default();
        let tiler = FallbackTiler {
            workspaces: vec!["8".into(), "9".into()],
            ..FallbackTiler::default()
        };
        tiler
            .apply(&mut transport, &"1".into(), &window(800, 1200))
            .await
            .unwrap();
        assert!(transport.sent.is_empty());

        tiler
            .apply(&mut transport, &"9".into(), &window(800, 1200))
            .await
            .unwrap();
        assert_eq!(transport.sent, vec!["splitv"]);
    }

    #[tokio::test]
    async fn split_height_factor_resizes_after_vertical_split() {
        let mut transport = FakeTransport::default();
        let tiler = FallbackTiler {
            split_height: 0.8,
            ..FallbackTiler::default()
        };
        tiler
            .apply(&mut transport, &"1".into(), &window(800, 1200))
            .await
            .unwrap();
        assert_eq!(transport.sent, vec!["splitv", "resize set height 40 ppt"]);
    }
}
