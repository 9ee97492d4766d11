//! State store.
//!
//! Two maps behind one lock: workspace-keyed [`PendingCorrelation`] records
//! (time-bounded, at most one per workspace) and child-keyed
//! [`Relationship`] records (live until the child closes). The event path
//! and the periodic sweep timer are the only writers, and they share this
//! one mutual-exclusion discipline.
//!
//! Expiry is purge-on-read plus a timer-driven [`StateStore::sweep`] that
//! bounds memory held by abandoned correlations. The store owns an injected
//! [`Clock`], so expiry is deterministic under test.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use nook_core::{Context, ContainerId, Mode, Rule, WorkspaceId};
use parking_lot::Mutex;
use tracing::debug;

use crate::clock::Clock;

/// A workspace-scoped record that a parent context armed a rule and a
/// qualifying child window is awaited.
#[derive(Clone, Debug)]
pub struct PendingCorrelation {
    /// Workspace the correlation is scoped to.
    pub workspace: WorkspaceId,
    /// The armed rule.
    pub rule: Arc<Rule>,
    /// Container id of the matching parent window.
    pub parent_id: ContainerId,
    /// Parent context snapshot taken at arm time.
    pub parent_context: Context,
    /// Parent's size fraction at arm time, for `preserve_column`.
    pub parent_percent: Option<f64>,
    /// Ambient placement mode captured at arm time, restored after the
    /// sequence completes.
    pub ambient_mode: Mode,
    /// Mark attached to the parent container.
    pub mark: String,
    /// When the correlation was armed.
    pub created_at: Instant,
    /// When the correlation lapses.
    pub expires_at: Instant,
}

/// A durable link between a rule-placed child window and its parent.
#[derive(Clone, Debug)]
pub struct Relationship {
    /// The placed child container.
    pub child_id: ContainerId,
    /// The parent container.
    pub parent_id: ContainerId,
    /// Name of the applied rule.
    pub rule_name: String,
    /// Parent context at arm time.
    pub parent_context: Context,
    /// When the rule was applied.
    pub created_at: Instant,
}

#[derive(Default)]
struct Inner {
    pending: HashMap<WorkspaceId, PendingCorrelation>,
    relationships: HashMap<ContainerId, Relationship>,
}

/// Concurrent-safe store of pending correlations and relationships.
pub struct StateStore {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl StateStore {
    /// Create an empty store around an injected clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Current instant on the store's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Store a pending correlation, unconditionally replacing any existing
    /// entry for the workspace. Last matching parent wins.
    pub fn put_pending(&self, pending: PendingCorrelation) {
        let mut inner = self.inner.lock();
        let _ = inner.pending.insert(pending.workspace.clone(), pending);
    }

    /// Look up the pending correlation for a workspace without consuming it.
    ///
    /// An expired entry is purged as a side effect and reported as absent.
    pub fn get_pending(&self, workspace: &WorkspaceId) -> Option<PendingCorrelation> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        match inner.pending.get(workspace) {
            Some(pending) if now < pending.expires_at => Some(pending.clone()),
            Some(_) => {
                debug!(%workspace, "pending correlation expired");
                let _ = inner.pending.remove(workspace);
                None
            }
            None => None,
        }
    }

    /// Atomically take the pending correlation for a workspace.
    ///
    /// Whatever the outcome, the workspace has no pending entry afterwards —
    /// this is what guarantees a correlation is applied at most once no
    /// matter how many window-created events follow.
    pub fn consume_pending(&self, workspace: &WorkspaceId) -> Option<PendingCorrelation> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let pending = inner.pending.remove(workspace)?;
        if now < pending.expires_at {
            Some(pending)
        } else {
            debug!(%workspace, "pending correlation expired");
            None
        }
    }

    /// Record a relationship for a rule-placed child.
    pub fn put_relationship(&self, relationship: Relationship) {
        let mut inner = self.inner.lock();
        let _ = inner
            .relationships
            .insert(relationship.child_id, relationship);
    }

    /// Look up the relationship for a child container.
    pub fn get_relationship(&self, child_id: ContainerId) -> Option<Relationship> {
        self.inner.lock().relationships.get(&child_id).cloned()
    }

    /// Remove and return the relationship for a child container.
    pub fn remove_relationship(&self, child_id: ContainerId) -> Option<Relationship> {
        self.inner.lock().relationships.remove(&child_id)
    }

    /// Drop every expired pending correlation. Returns how many were
    /// removed. Driven by the runtime's periodic tick, independent of
    /// lookups, to bound memory from abandoned correlations.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let before = inner.pending.len();
        inner.pending.retain(|_, pending| now < pending.expires_at);
        before - inner.pending.len()
    }

    /// Number of live pending correlations.
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Number of live relationships.
    pub fn relationship_count(&self) -> usize {
        self.inner.lock().relationships.len()
    }
}
