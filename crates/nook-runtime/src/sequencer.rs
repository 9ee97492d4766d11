//! Command sequencer.
//!
//! Actions are split by a protocol ordering constraint: the placement mode
//! must be set *before* the compositor creates the child window, while
//! sizing and movement only make sense once the child exists. The pre-phase
//! (`set_mode` only) therefore runs at arm time, and the post-phase runs at
//! consumption time, in the action list's declared order.
//!
//! Every submission is synchronous — issue, await the result, then issue the
//! next — because later commands depend on earlier ones having taken effect.
//! The first failing command aborts the rest of the post-phase; ambient mode
//! restoration is still attempted, so a failed sequence leaves no persistent
//! mode change behind. A window the compositor already created cannot be
//! un-created: after a failure it simply keeps whatever position the
//! compositor's default policy assigned.

use std::path::PathBuf;

use async_trait::async_trait;
use nook_core::{Action, ContainerId, Direction, Mode, Orientation, Rule, WindowNode};
use nook_ipc::{CommandOutcome, Connection, IpcError};
use tracing::{debug, warn};

use crate::errors::RuntimeError;
use crate::process::ProcessInspector;
use crate::state::PendingCorrelation;

/// Clamp bounds for `set_size` ratios.
const MIN_RATIO: f64 = 0.1;
const MAX_RATIO: f64 = 0.9;

/// Something that can submit command strings to the compositor.
///
/// The live implementation is [`nook_ipc::Connection`]; tests substitute a
/// scripted fake.
#[async_trait]
pub trait CommandTransport: Send {
    /// Submit one command string, returning per-command outcomes.
    async fn run_command(&mut self, command: &str) -> Result<Vec<CommandOutcome>, IpcError>;
}

#[async_trait]
impl CommandTransport for Connection {
    async fn run_command(&mut self, command: &str) -> Result<Vec<CommandOutcome>, IpcError> {
        Connection::run_command(self, command).await
    }
}

/// What happened while executing a post-phase.
#[derive(Clone, Debug, Default)]
pub struct SequenceReport {
    /// All post-phase actions ran successfully.
    pub completed: bool,
    /// The command that aborted the sequence, when not completed.
    pub failed_command: Option<String>,
    /// Whether ambient mode restoration succeeded.
    pub restored: bool,
    /// Working directory resolved for `inherit_cwd`, when any.
    pub inherited_cwd: Option<PathBuf>,
}

/// Render a `set_mode` command for a placement mode.
pub fn mode_command(mode: Mode) -> String {
    match mode.position {
        Some(position) => format!(
            "set_mode {} {}",
            mode.orientation.as_str(),
            position.as_str()
        ),
        None => format!("set_mode {}", mode.orientation.as_str()),
    }
}

/// Submit one command and require every outcome to be successful.
pub async fn submit<T>(transport: &mut T, command: &str) -> Result<(), RuntimeError>
where
    T: CommandTransport + ?Sized,
{
    let outcomes = transport.run_command(command).await?;
    if outcomes.is_empty() {
        return Err(RuntimeError::CommandRejected {
            command: command.to_string(),
            reason: "no result".to_string(),
        });
    }
    if let Some(failed) = outcomes.iter().find(|o| !o.success) {
        return Err(RuntimeError::CommandRejected {
            command: command.to_string(),
            reason: failed
                .error
                .clone()
                .unwrap_or_else(|| "unspecified".to_string()),
        });
    }
    Ok(())
}

/// Run the pre-phase of a rule: every `set_mode` action, in declared order.
pub async fn run_pre_phase<T>(transport: &mut T, rule: &Rule) -> Result<(), RuntimeError>
where
    T: CommandTransport + ?Sized,
{
    for action in &rule.actions {
        if let Action::SetMode { mode } = action {
            submit(transport, &mode_command(*mode)).await?;
        }
    }
    Ok(())
}

/// Attach a mark to the parent container. Best effort: a compositor that
/// rejects marks does not block placement.
pub async fn mark_parent<T>(transport: &mut T, parent_id: ContainerId, mark: &str)
where
    T: CommandTransport + ?Sized,
{
    let command = format!("[con_id={parent_id}] mark --add {mark}");
    if let Err(err) = submit(transport, &command).await {
        warn!(%parent_id, mark, error = %err, "failed to mark parent container, continuing");
    }
}

/// Remove a parent mark. Best effort.
pub async fn unmark_parent<T>(transport: &mut T, mark: &str)
where
    T: CommandTransport + ?Sized,
{
    if let Err(err) = submit(transport, &format!("unmark {mark}")).await {
        debug!(mark, error = %err, "failed to remove parent mark");
    }
}

/// Restore the ambient mode captured at arm time. Best effort; returns
/// whether the compositor accepted the restoration.
pub async fn restore_mode<T>(transport: &mut T, ambient: Mode) -> bool
where
    T: CommandTransport + ?Sized,
{
    let command = mode_command(ambient);
    match submit(transport, &command).await {
        Ok(()) => true,
        Err(err) => {
            warn!(command = %command, error = %err, "failed to restore ambient mode");
            false
        }
    }
}

/// Execute the post-phase of a consumed correlation against the confirmed
/// child window.
///
/// Ambient mode restoration and mark removal run whether or not the
/// action list completed.
pub async fn run_post_phase<T, I>(
    transport: &mut T,
    pending: &PendingCorrelation,
    child: &WindowNode,
    inspector: &I,
) -> SequenceReport
where
    T: CommandTransport + ?Sized,
    I: ProcessInspector + ?Sized,
{
    debug!(
        rule = %pending.rule.name,
        child = %child.id,
        parent = %pending.parent_id,
        "executing post-phase"
    );
    let dimension = effective_orientation(pending);
    let mut report = SequenceReport {
        completed: true,
        ..SequenceReport::default()
    };

    for action in &pending.rule.actions {
        let command = match action {
            // Pre-phase; already applied at arm time.
            Action::SetMode { .. } => continue,
            Action::SetSize { ratio } => {
                format!("set_size {} {}", dimension.as_str(), clamp_ratio(*ratio))
            }
            Action::Place { direction } => format!("move {}", direction.move_keyword()),
            Action::InheritCwd => {
                match pending
                    .parent_context
                    .pid
                    .and_then(|pid| inspector.resolve_cwd(pid))
                {
                    Some(cwd) => {
                        debug!(cwd = %cwd.display(), "inherit_cwd: resolved parent working directory");
                        report.inherited_cwd = Some(cwd);
                    }
                    None => {
                        debug!("inherit_cwd: parent working directory unresolved, skipping");
                    }
                }
                continue;
            }
            Action::PreserveColumn => match pending.parent_percent {
                Some(percent) => {
                    format!("[con_id={}] set_size h {percent:.3}", pending.parent_id)
                }
                None => {
                    warn!("preserve_column: no captured parent fraction, skipping");
                    continue;
                }
            },
        };

        if let Err(err) = submit(transport, &command).await {
            warn!(command = %command, error = %err, "command failed, aborting sequence");
            report.completed = false;
            report.failed_command = Some(command);
            break;
        }
    }

    report.restored = restore_mode(transport, pending.ambient_mode).await;
    unmark_parent(transport, &pending.mark).await;
    report
}

/// The `set_size` dimension for this correlation: the armed mode's
/// orientation, else the first `place` direction's axis, else the ambient
/// orientation.
fn effective_orientation(pending: &PendingCorrelation) -> Orientation {
    if let Some(mode) = pending.rule.arm_mode() {
        return mode.orientation;
    }
    for action in &pending.rule.actions {
        if let Action::Place { direction } = action {
            return match direction {
                Direction::Below | Direction::Above => Orientation::Vertical,
                Direction::Left | Direction::Right => Orientation::Horizontal,
            };
        }
    }
    pending.ambient_mode.orientation
}

fn clamp_ratio(ratio: f64) -> f64 {
    if (MIN_RATIO..=MAX_RATIO).contains(&ratio) {
        ratio
    } else {
        let clamped = ratio.clamp(MIN_RATIO, MAX_RATIO);
        warn!(ratio, clamped, "size ratio out of range, clamping");
        clamped
    }
}
