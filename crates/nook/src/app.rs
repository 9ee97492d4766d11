//! Daemon event loop.
//!
//! Two compositor connections: one subscribed to window events (drained by a
//! reader task into a channel), one for command round-trips. Events are
//! processed strictly one at a time on this loop, so the engine needs no
//! synchronization beyond the state store's own lock — which it shares with
//! the sweep tick generated here.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use nook_config::Config;
use nook_core::{Event, WorkspaceId};
use nook_ipc::{Connection, IpcEvent, WindowEvent};
use nook_runtime::{FallbackTiler, Orchestrator, ProcInspector, StateStore, SystemClock};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::Cli;

/// Connect, subscribe, and run the event loop until the compositor goes
/// away or the process is interrupted.
pub async fn run(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let mut events = connect(cli).await.context("event connection")?;
    let mut commands = connect(cli).await.context("command connection")?;
    events.subscribe(&["window", "shutdown"]).await?;

    let store = Arc::new(StateStore::new(Arc::new(SystemClock)));
    let fallback = FallbackTiler {
        outputs: cli.outputs.clone(),
        workspaces: cli.workspaces.clone(),
        split_width: cli.splitwidth,
        split_height: cli.splitheight,
        split_ratio: cli.splitratio,
    };
    let orchestrator = Orchestrator::new(
        config.rules,
        store,
        fallback,
        ProcInspector,
        config.settings.rule_timeout,
    );

    // Reader task: the subscription connection blocks on the socket, so it
    // lives on its own task and feeds a channel the select loop can poll
    // cancel-safely.
    let (tx, mut rx) = mpsc::channel::<IpcEvent>(64);
    let reader = tokio::spawn(async move {
        loop {
            match events.next_event().await {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    error!(error = %err, "event stream lost");
                    break;
                }
            }
        }
    });

    let mut sweep = tokio::time::interval(Duration::from_secs(cli.sweep_interval.max(1)));
    info!("nook running");

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(IpcEvent::Window(window_event)) => {
                    handle_window_event(&orchestrator, &mut commands, window_event).await;
                }
                Some(IpcEvent::Shutdown) => {
                    info!("compositor shutting down");
                    break;
                }
                Some(IpcEvent::Other { event_type }) => {
                    debug!(event_type, "ignoring event");
                }
                None => break,
            },
            _ = sweep.tick() => {
                let _ = orchestrator.handle_event(Event::Tick, &mut commands).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    reader.abort();
    Ok(())
}

async fn connect(cli: &Cli) -> anyhow::Result<Connection> {
    Ok(match &cli.socket {
        Some(path) => Connection::connect(path).await?,
        None => Connection::connect_from_env().await?,
    })
}

/// Translate a wire event into the engine vocabulary and reduce it.
async fn handle_window_event(
    orchestrator: &Orchestrator<ProcInspector>,
    commands: &mut Connection,
    window_event: WindowEvent,
) {
    let window = window_event.container.to_window_node();
    let event = match window_event.change.as_str() {
        "new" => Event::WindowCreated {
            workspace: focused_workspace(commands).await,
            window,
        },
        "focus" => Event::FocusChanged {
            workspace: focused_workspace(commands).await,
            window,
        },
        "close" => Event::WindowClosed { window },
        other => {
            debug!(change = other, "ignoring window event");
            return;
        }
    };
    let outcome = orchestrator.handle_event(event, commands).await;
    debug!(?outcome, "event handled");
}

/// The window event payload does not carry a workspace, so resolve the
/// focused one on the command connection — both `new` and `focus` events
/// concern the focused workspace.
async fn focused_workspace(commands: &mut Connection) -> WorkspaceId {
    match commands.focused_workspace().await {
        Ok(Some(name)) => WorkspaceId::from(name),
        Ok(None) => {
            debug!("no focused workspace reported");
            WorkspaceId::from("")
        }
        Err(err) => {
            error!(error = %err, "cannot resolve focused workspace");
            WorkspaceId::from("")
        }
    }
}
