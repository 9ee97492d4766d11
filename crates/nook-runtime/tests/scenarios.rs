//! End-to-end placement scenarios, driven through the orchestrator with a
//! scripted transport and a manually advanced clock.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use nook_core::{
    Action, ContainerId, Event, Matcher, Mode, Orientation, Position, Rect, Rule, RuleSet,
    WindowNode,
};
use nook_ipc::{CommandOutcome, IpcError};
use nook_runtime::{
    CommandTransport, FallbackReason, FallbackTiler, ManualClock, Orchestrator, Outcome,
    ProcessInspector, StateStore,
};

/// Records every command; fails those containing a configured substring.
#[derive(Default)]
struct FakeTransport {
    sent: Vec<String>,
    fail_containing: Option<String>,
}

#[async_trait]
impl CommandTransport for FakeTransport {
    async fn run_command(&mut self, command: &str) -> Result<Vec<CommandOutcome>, IpcError> {
        self.sent.push(command.to_string());
        let fail = self
            .fail_containing
            .as_deref()
            .is_some_and(|needle| command.contains(needle));
        Ok(vec![CommandOutcome {
            success: !fail,
            error: fail.then(|| "scripted failure".to_string()),
        }])
    }
}

struct FixedCwd(Option<PathBuf>);

impl ProcessInspector for FixedCwd {
    fn resolve_cwd(&self, _pid: i32) -> Option<PathBuf> {
        self.0.clone()
    }
}

fn matcher(app_ids: &[&str], patterns: &[&str]) -> Matcher {
    Matcher::new(
        app_ids.iter().map(|s| (*s).to_string()).collect(),
        vec![],
        patterns.iter().map(|s| (*s).to_string()).collect(),
    )
    .unwrap()
}

/// Rule R from the happy-path scenario: kitty running nvim spawns a kitty
/// terminal below at a third of the height.
fn editor_rule() -> Rule {
    Rule {
        name: "editor-terminal".into(),
        parent: matcher(&["kitty"], &["*nvim*"]),
        child: matcher(&["kitty"], &[]),
        actions: vec![
            Action::SetMode {
                mode: Mode {
                    orientation: Orientation::Vertical,
                    position: Some(Position::After),
                },
            },
            Action::SetSize { ratio: 0.333 },
        ],
        priority: 0,
    }
}

/// A second rule on a different parent, for supersession.
fn scratchpad_rule() -> Rule {
    Rule {
        name: "scratchpad".into(),
        parent: matcher(&["foot"], &[]),
        child: matcher(&["foot"], &[]),
        actions: vec![Action::SetMode {
            mode: Mode {
                orientation: Orientation::Horizontal,
                position: Some(Position::End),
            },
        }],
        priority: 0,
    }
}

fn harness(
    timeout: Duration,
    inspector: FixedCwd,
) -> (Arc<ManualClock>, Arc<StateStore>, Orchestrator<FixedCwd>) {
    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(StateStore::new(clock.clone()));
    let rules = RuleSet::new(vec![editor_rule(), scratchpad_rule()]);
    let orchestrator = Orchestrator::new(
        rules,
        store.clone(),
        FallbackTiler::default(),
        inspector,
        timeout,
    );
    (clock, store, orchestrator)
}

fn node(id: i64, app: &str, title: &str) -> WindowNode {
    WindowNode {
        id: ContainerId(id),
        app_id: Some(app.to_string()),
        title: Some(title.to_string()),
        pid: Some(100),
        percent: Some(0.5),
        rect: Rect {
            x: 0,
            y: 0,
            width: 1000,
            height: 600,
        },
        ..WindowNode::default()
    }
}

fn focus(id: i64, app: &str, title: &str, workspace: &str) -> Event {
    Event::FocusChanged {
        workspace: workspace.into(),
        window: node(id, app, title),
    }
}

fn created(id: i64, app: &str, workspace: &str) -> Event {
    Event::WindowCreated {
        workspace: workspace.into(),
        window: node(id, app, ""),
    }
}

#[tokio::test]
async fn scenario_a_happy_path() {
    let (clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let out = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    assert_eq!(
        out,
        Outcome::Armed {
            rule: "editor-terminal".into()
        }
    );
    // Pre-phase runs at arm time, then the parent is marked.
    assert_eq!(transport.sent[0], "set_mode v after");
    assert!(transport.sent[1].starts_with("[con_id=1] mark --add nook_parent_"));

    clock.advance(Duration::from_secs(2));
    let out = orchestrator
        .handle_event(created(2, "kitty", "1"), &mut transport)
        .await;
    assert_eq!(
        out,
        Outcome::Applied {
            rule: "editor-terminal".into(),
            child: ContainerId(2)
        }
    );

    // Post-phase order: size, then mode restoration, then unmark.
    let tail = &transport.sent[2..];
    assert_eq!(tail[0], "set_size v 0.333");
    assert_eq!(tail[1], "set_mode h after");
    assert!(tail[2].starts_with("unmark nook_parent_"));

    let relationship = store.get_relationship(ContainerId(2)).unwrap();
    assert_eq!(relationship.parent_id, ContainerId(1));
    assert_eq!(relationship.rule_name, "editor-terminal");
    assert_eq!(store.pending_count(), 0);
}

#[tokio::test]
async fn scenario_b_timeout_falls_back() {
    let (clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    clock.advance(Duration::from_secs(20));

    let out = orchestrator
        .handle_event(created(2, "kitty", "1"), &mut transport)
        .await;
    assert_eq!(
        out,
        Outcome::FallbackInvoked {
            reason: FallbackReason::NothingPending
        }
    );
    assert!(store.get_relationship(ContainerId(2)).is_none());
    // The fallback split ran; no rule sizing was issued.
    assert!(transport.sent.iter().any(|c| c == "splith"));
    assert!(transport.sent.iter().all(|c| !c.starts_with("set_size")));
}

#[tokio::test]
async fn scenario_c_no_parent_match_means_nothing_armed() {
    let (_clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let out = orchestrator
        .handle_event(focus(1, "firefox", "Mozilla Firefox", "1"), &mut transport)
        .await;
    assert_eq!(out, Outcome::Ignored);
    assert_eq!(store.pending_count(), 0);
    assert!(transport.sent.is_empty());

    let out = orchestrator
        .handle_event(created(2, "kitty", "1"), &mut transport)
        .await;
    assert_eq!(
        out,
        Outcome::FallbackInvoked {
            reason: FallbackReason::NothingPending
        }
    );
}

#[tokio::test]
async fn scenario_d_sequence_failure_restores_and_falls_back() {
    let (_clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport {
        fail_containing: Some("set_size v".into()),
        ..FakeTransport::default()
    };

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    let out = orchestrator
        .handle_event(created(2, "kitty", "1"), &mut transport)
        .await;
    assert_eq!(
        out,
        Outcome::FallbackInvoked {
            reason: FallbackReason::SequenceFailed
        }
    );
    assert!(store.get_relationship(ContainerId(2)).is_none());
    // Ambient mode restoration still ran after the failing command.
    assert!(transport.sent.iter().any(|c| c == "set_mode h after"));
}

#[tokio::test]
async fn scenario_e_supersession_replaces_the_pending_rule() {
    let (_clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    let _ = orchestrator
        .handle_event(focus(3, "foot", "fish", "1"), &mut transport)
        .await;

    // The second arm fully replaced the first.
    assert_eq!(store.pending_count(), 1);
    let pending = store.get_pending(&"1".into()).unwrap();
    assert_eq!(pending.rule.name, "scratchpad");
    assert_eq!(pending.parent_id, ContainerId(3));

    let out = orchestrator
        .handle_event(created(4, "foot", "1"), &mut transport)
        .await;
    assert_eq!(
        out,
        Outcome::Applied {
            rule: "scratchpad".into(),
            child: ContainerId(4)
        }
    );
}

#[tokio::test]
async fn consumption_is_exactly_once_across_two_creations() {
    let (_clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;

    let first = orchestrator
        .handle_event(created(2, "kitty", "1"), &mut transport)
        .await;
    let second = orchestrator
        .handle_event(created(5, "kitty", "1"), &mut transport)
        .await;

    assert_matches!(first, Outcome::Applied { .. });
    assert_eq!(
        second,
        Outcome::FallbackInvoked {
            reason: FallbackReason::NothingPending
        }
    );
    assert_eq!(store.relationship_count(), 1);
}

#[tokio::test]
async fn non_matching_focus_does_not_cancel_an_armed_rule() {
    let (_clock, _store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    let out = orchestrator
        .handle_event(focus(9, "firefox", "docs", "1"), &mut transport)
        .await;
    assert_eq!(out, Outcome::Ignored);

    let out = orchestrator
        .handle_event(created(2, "kitty", "1"), &mut transport)
        .await;
    assert_matches!(out, Outcome::Applied { .. });
}

#[tokio::test]
async fn child_mismatch_discards_and_restores() {
    let (_clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    let out = orchestrator
        .handle_event(created(2, "firefox", "1"), &mut transport)
        .await;
    assert_eq!(
        out,
        Outcome::FallbackInvoked {
            reason: FallbackReason::ChildMismatch
        }
    );
    // The armed mode was undone before default tiling.
    assert!(transport.sent.iter().any(|c| c == "set_mode h after"));
    assert_eq!(store.pending_count(), 0);

    // No re-arming happened: another kitty window still falls back.
    let out = orchestrator
        .handle_event(created(6, "kitty", "1"), &mut transport)
        .await;
    assert_eq!(
        out,
        Outcome::FallbackInvoked {
            reason: FallbackReason::NothingPending
        }
    );
}

#[tokio::test]
async fn window_close_removes_the_relationship() {
    let (_clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    let _ = orchestrator
        .handle_event(created(2, "kitty", "1"), &mut transport)
        .await;
    assert_eq!(store.relationship_count(), 1);

    let out = orchestrator
        .handle_event(
            Event::WindowClosed {
                window: node(2, "kitty", ""),
            },
            &mut transport,
        )
        .await;
    assert_eq!(
        out,
        Outcome::RelationshipClosed {
            child: ContainerId(2)
        }
    );
    assert_eq!(store.relationship_count(), 0);
}

#[tokio::test]
async fn tick_sweeps_expired_correlations() {
    let (clock, store, orchestrator) = harness(Duration::from_secs(15), FixedCwd(None));
    let mut transport = FakeTransport::default();

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    assert_eq!(store.pending_count(), 1);

    clock.advance(Duration::from_secs(30));
    let out = orchestrator.handle_event(Event::Tick, &mut transport).await;
    assert_eq!(out, Outcome::Swept { expired: 1 });
    assert_eq!(store.pending_count(), 0);
}

#[tokio::test]
async fn inherit_cwd_resolves_without_issuing_commands() {
    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(StateStore::new(clock.clone()));
    let mut rule = editor_rule();
    rule.actions.push(Action::InheritCwd);
    let orchestrator = Orchestrator::new(
        RuleSet::new(vec![rule]),
        store,
        FallbackTiler::default(),
        FixedCwd(Some(PathBuf::from("/home/user/project"))),
        Duration::from_secs(15),
    );
    let mut transport = FakeTransport::default();

    let _ = orchestrator
        .handle_event(focus(1, "kitty", "nvim file.py", "1"), &mut transport)
        .await;
    let out = orchestrator
        .handle_event(created(2, "kitty", "1"), &mut transport)
        .await;
    assert_matches!(out, Outcome::Applied { .. });
    // inherit_cwd produces no compositor command.
    let command_count = transport
        .sent
        .iter()
        .filter(|c| !c.contains("mark"))
        .count();
    // set_mode (arm) + set_size + restore
    assert_eq!(command_count, 3);
}
