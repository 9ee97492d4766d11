//! Placement orchestrator.
//!
//! The orchestrator is the state machine at the center of the daemon. Per
//! workspace it is either IDLE or PENDING: a focus event whose context
//! matches a rule's parent matcher arms a [`PendingCorrelation`] (PENDING),
//! and the next window-created event on that workspace consumes it —
//! applying the rule if the new window matches the child matcher, falling
//! back otherwise. Consumption, expiry, and supersession all return the
//! workspace to IDLE.
//!
//! Two deliberate policies:
//!
//! - A focus event that matches **no** rule leaves an armed correlation
//!   untouched. Focus often brushes past unrelated windows (notifications,
//!   panels) between focusing the parent and spawning the child; cancelling
//!   on every non-matching focus would make arming flaky. Supersession and
//!   expiry bound staleness instead.
//! - A consumed correlation is never retried: if the child mismatches or the
//!   sequence fails, the correlation is gone and the window falls back to
//!   geometry tiling. Re-arming requires a fresh matching focus event.
//!
//! Every failure on the event path is downgraded to a fallback decision and
//! logged; nothing propagates out of [`Orchestrator::handle_event`].

use std::sync::Arc;
use std::time::Duration;

use nook_core::{
    Context, ContainerId, Event, Mode, Orientation, Position, RuleSet, WindowNode, WorkspaceId,
    match_child, match_parent,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::fallback::FallbackTiler;
use crate::process::ProcessInspector;
use crate::sequencer::{self, CommandTransport};
use crate::state::{PendingCorrelation, Relationship, StateStore};

/// Why the fallback tiler was invoked for a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// No pending correlation for the workspace (absent or expired).
    NothingPending,
    /// A correlation was pending but the new window failed the child match.
    ChildMismatch,
    /// The command sequence failed mid-flight.
    SequenceFailed,
}

/// Result of reducing one event. Primarily consumed by logs and tests.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// A rule was armed for a workspace.
    Armed {
        /// Rule name.
        rule: String,
    },
    /// A parent matched but the pre-phase failed; nothing was armed.
    ArmFailed {
        /// Rule name.
        rule: String,
    },
    /// A rule was applied and a relationship recorded.
    Applied {
        /// Rule name.
        rule: String,
        /// The placed child container.
        child: ContainerId,
    },
    /// The window was handed to the fallback tiler.
    FallbackInvoked {
        /// Why the fallback ran.
        reason: FallbackReason,
    },
    /// A tracked relationship was closed with its child window.
    RelationshipClosed {
        /// The closed child container.
        child: ContainerId,
    },
    /// A sweep tick ran.
    Swept {
        /// How many expired correlations were removed.
        expired: usize,
    },
    /// Nothing to do.
    Ignored,
}

/// The central event reducer.
pub struct Orchestrator<I> {
    rules: RuleSet,
    store: Arc<StateStore>,
    fallback: FallbackTiler,
    inspector: I,
    rule_timeout: Duration,
    ambient_mode: Mode,
}

impl<I: ProcessInspector> Orchestrator<I> {
    /// Build an orchestrator over a rule set and shared state store.
    pub fn new(
        rules: RuleSet,
        store: Arc<StateStore>,
        fallback: FallbackTiler,
        inspector: I,
        rule_timeout: Duration,
    ) -> Self {
        Self {
            rules,
            store,
            fallback,
            inspector,
            rule_timeout,
            // The compositor exposes no mode query; this is the documented
            // default the sequencer restores to after every sequence.
            ambient_mode: Mode {
                orientation: Orientation::Horizontal,
                position: Some(Position::After),
            },
        }
    }

    /// Override the ambient mode captured at arm time.
    pub fn with_ambient_mode(mut self, mode: Mode) -> Self {
        self.ambient_mode = mode;
        self
    }

    /// Reduce one event against the store, issuing commands as needed.
    pub async fn handle_event<T>(&self, event: Event, transport: &mut T) -> Outcome
    where
        T: CommandTransport + ?Sized,
    {
        match event {
            Event::FocusChanged { workspace, window } => {
                self.on_focus(workspace, window, transport).await
            }
            Event::WindowCreated { workspace, window } => {
                self.on_created(workspace, window, transport).await
            }
            Event::WindowClosed { window } => self.on_closed(&window),
            Event::Tick => {
                let expired = self.store.sweep();
                if expired > 0 {
                    debug!(expired, "swept expired correlations");
                }
                Outcome::Swept { expired }
            }
        }
    }

    /// Focus moved: arm a correlation when a rule's parent matcher hits.
    async fn on_focus<T>(
        &self,
        workspace: WorkspaceId,
        window: WindowNode,
        transport: &mut T,
    ) -> Outcome
    where
        T: CommandTransport + ?Sized,
    {
        let ctx = Context::classify(&window);
        if ctx.is_degraded() {
            debug!(container = %window.id, "degraded window context, no rule can match");
            return Outcome::Ignored;
        }
        let Some(rule) = match_parent(&ctx, &self.rules) else {
            // Leave any armed correlation untouched; see module docs.
            return Outcome::Ignored;
        };

        info!(
            rule = %rule.name,
            parent = %window.id,
            %workspace,
            app = %ctx.app_identity,
            "rule matched, arming"
        );

        // Pre-phase runs now: the placement mode must be in effect before
        // the child window is created.
        if let Err(err) = sequencer::run_pre_phase(transport, rule).await {
            warn!(rule = %rule.name, error = %err, "pre-phase failed, rule not armed");
            return Outcome::ArmFailed {
                rule: rule.name.clone(),
            };
        }

        let mark = format!("nook_parent_{}", Uuid::new_v4().simple());
        sequencer::mark_parent(transport, window.id, &mark).await;

        let now = self.store.now();
        self.store.put_pending(PendingCorrelation {
            workspace,
            rule: Arc::clone(rule),
            parent_id: window.id,
            parent_context: ctx,
            parent_percent: window.percent,
            ambient_mode: self.ambient_mode,
            mark,
            created_at: now,
            expires_at: now + self.rule_timeout,
        });
        Outcome::Armed {
            rule: rule.name.clone(),
        }
    }

    /// A window appeared: consume any pending correlation for the workspace.
    async fn on_created<T>(
        &self,
        workspace: WorkspaceId,
        window: WindowNode,
        transport: &mut T,
    ) -> Outcome
    where
        T: CommandTransport + ?Sized,
    {
        let Some(pending) = self.store.consume_pending(&workspace) else {
            debug!(container = %window.id, %workspace, "nothing pending, using default tiling");
            self.invoke_fallback(transport, &workspace, &window).await;
            return Outcome::FallbackInvoked {
                reason: FallbackReason::NothingPending,
            };
        };

        let ctx = Context::classify(&window);
        if !match_child(&ctx, &pending.rule) {
            debug!(
                rule = %pending.rule.name,
                container = %window.id,
                app = %ctx.app_identity,
                "new window failed child match, discarding correlation"
            );
            // The pre-phase changed the mode at arm time; undo it before
            // handing the window to default tiling.
            let _ = sequencer::restore_mode(transport, pending.ambient_mode).await;
            sequencer::unmark_parent(transport, &pending.mark).await;
            self.invoke_fallback(transport, &workspace, &window).await;
            return Outcome::FallbackInvoked {
                reason: FallbackReason::ChildMismatch,
            };
        }

        let report =
            sequencer::run_post_phase(transport, &pending, &window, &self.inspector).await;
        if report.completed {
            self.store.put_relationship(Relationship {
                child_id: window.id,
                parent_id: pending.parent_id,
                rule_name: pending.rule.name.clone(),
                parent_context: pending.parent_context.clone(),
                created_at: self.store.now(),
            });
            info!(
                rule = %pending.rule.name,
                parent = %pending.parent_id,
                child = %window.id,
                cwd = ?report.inherited_cwd,
                "rule applied"
            );
            Outcome::Applied {
                rule: pending.rule.name.clone(),
                child: window.id,
            }
        } else {
            // The correlation is already consumed; rules are never retried
            // against a later window.
            warn!(
                rule = %pending.rule.name,
                child = %window.id,
                failed_command = ?report.failed_command,
                "rule sequence failed, using default tiling"
            );
            self.invoke_fallback(transport, &workspace, &window).await;
            Outcome::FallbackInvoked {
                reason: FallbackReason::SequenceFailed,
            }
        }
    }

    /// A window closed: drop its relationship if one exists. Pending
    /// correlations are workspace-scoped and expire on their own.
    fn on_closed(&self, window: &WindowNode) -> Outcome {
        match self.store.remove_relationship(window.id) {
            Some(relationship) => {
                debug!(
                    child = %window.id,
                    parent = %relationship.parent_id,
                    rule = %relationship.rule_name,
                    "relationship closed"
                );
                Outcome::RelationshipClosed { child: window.id }
            }
            None => Outcome::Ignored,
        }
    }

    async fn invoke_fallback<T>(
        &self,
        transport: &mut T,
        workspace: &WorkspaceId,
        window: &WindowNode,
    ) where
        T: CommandTransport + ?Sized,
    {
        debug!(container = %window.id, "fallback tiling invoked");
        if let Err(err) = self.fallback.apply(transport, workspace, window).await {
            warn!(container = %window.id, error = %err, "fallback tiling failed");
        }
    }
}
