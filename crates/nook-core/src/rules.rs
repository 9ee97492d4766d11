//! Rule model and matching.
//!
//! A [`Rule`] pairs a parent [`Matcher`] with a child [`Matcher`] and an
//! ordered [`Action`] list. Matching is deliberately boring: a matcher hits
//! when ANY of its populated criteria hits, and a matcher with no populated
//! criteria never hits — so a rule can never become an accidental catch-all,
//! and a degraded context (empty identity, empty title) can never match.
//!
//! Rules are immutable for a configuration generation. [`RuleSet`] orders
//! them once at construction (descending priority, declaration order on
//! ties); [`match_parent`] simply takes the first hit.

use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::errors::CoreError;

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// Split orientation for placement modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Horizontal: the next window opens beside the current one.
    Horizontal,
    /// Vertical: the next window opens above/below the current one.
    Vertical,
}

impl Orientation {
    /// Single-letter form used in compositor commands.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "h",
            Orientation::Vertical => "v",
        }
    }
}

/// Insertion position within a placement mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Directly after the active window.
    After,
    /// Directly before the active window.
    Before,
    /// At the end of the row/column.
    End,
    /// At the beginning of the row/column.
    Beginning,
}

impl Position {
    /// Keyword form used in compositor commands.
    pub fn as_str(self) -> &'static str {
        match self {
            Position::After => "after",
            Position::Before => "before",
            Position::End => "end",
            Position::Beginning => "beg",
        }
    }
}

/// A placement mode: orientation plus optional insertion position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    /// Split orientation.
    pub orientation: Orientation,
    /// Insertion position, when specified.
    pub position: Option<Position>,
}

/// Relative placement direction for the `place` action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Below the parent.
    Below,
    /// To the right of the parent.
    Right,
    /// Above the parent.
    Above,
    /// To the left of the parent.
    Left,
}

impl Direction {
    /// The native `move` command keyword for this direction.
    pub fn move_keyword(self) -> &'static str {
        match self {
            Direction::Below => "down",
            Direction::Right => "right",
            Direction::Above => "up",
            Direction::Left => "left",
        }
    }
}

/// One step of a rule's action list.
///
/// The set is closed on purpose: the sequencer dispatches exhaustively, so a
/// new action kind is a compile-time-checked addition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Action {
    /// Set the placement mode. Must take effect before the child window is
    /// created, so this is the only pre-phase action.
    SetMode {
        /// Mode to set.
        mode: Mode,
    },
    /// Resize the child to a fraction of its container after creation.
    SetSize {
        /// Target fraction, expected in (0, 1). Out-of-range values are
        /// clamped at execution time, with a warning.
        ratio: f64,
    },
    /// Place the child relative to the parent.
    Place {
        /// Placement direction.
        direction: Direction,
    },
    /// Start the child in the parent's working directory, when resolvable.
    InheritCwd,
    /// Re-apply the parent's column width after insertion.
    PreserveColumn,
}

// ─────────────────────────────────────────────────────────────────────────────
// Matchers
// ─────────────────────────────────────────────────────────────────────────────

/// Optional criteria evaluated against a [`Context`].
///
/// Title patterns are globs (`*nvim*`), compiled once at construction.
#[derive(Clone, Debug)]
pub struct Matcher {
    app_ids: Vec<String>,
    window_classes: Vec<String>,
    title_patterns: Vec<String>,
    title_globs: GlobSet,
}

impl Matcher {
    /// Build a matcher, compiling title glob patterns.
    pub fn new(
        app_ids: Vec<String>,
        window_classes: Vec<String>,
        title_patterns: Vec<String>,
    ) -> Result<Self, CoreError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &title_patterns {
            let glob = Glob::new(pattern).map_err(|source| CoreError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            let _ = builder.add(glob);
        }
        let title_globs = builder
            .build()
            .map_err(|source| CoreError::InvalidPattern {
                pattern: title_patterns.join(", "),
                source,
            })?;
        Ok(Self {
            app_ids,
            window_classes,
            title_patterns,
            title_globs,
        })
    }

    /// A matcher with no criteria. Never matches.
    pub fn empty() -> Self {
        Self {
            app_ids: Vec::new(),
            window_classes: Vec::new(),
            title_patterns: Vec::new(),
            title_globs: GlobSet::empty(),
        }
    }

    /// Whether no criteria are populated.
    pub fn is_empty(&self) -> bool {
        self.app_ids.is_empty() && self.window_classes.is_empty() && self.title_patterns.is_empty()
    }

    /// Evaluate the matcher: ANY populated criterion hitting is a match;
    /// an empty matcher never matches.
    pub fn matches(&self, ctx: &Context) -> bool {
        if self.app_ids.iter().any(|a| *a == ctx.app_identity) {
            return true;
        }
        if let Some(class) = &ctx.window_class
            && self.window_classes.iter().any(|c| c == class)
        {
            return true;
        }
        !self.title_patterns.is_empty() && self.title_globs.is_match(&ctx.title)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────────

/// A named placement rule.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Unique rule name (uniqueness enforced at configuration load).
    pub name: String,
    /// Matcher for the parent (focused) window.
    pub parent: Matcher,
    /// Matcher for the child (created) window.
    pub child: Matcher,
    /// Ordered action list.
    pub actions: Vec<Action>,
    /// Priority; higher wins, declaration order breaks ties.
    pub priority: i32,
}

impl Rule {
    /// The pre-phase placement mode: the last `SetMode` action, if any.
    ///
    /// Later `SetMode` entries override earlier ones since each command
    /// replaces the whole mode.
    pub fn arm_mode(&self) -> Option<Mode> {
        self.actions.iter().rev().find_map(|a| match a {
            Action::SetMode { mode } => Some(*mode),
            _ => None,
        })
    }
}

/// Priority-ordered, immutable rule collection.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Arc<Rule>>,
}

impl RuleSet {
    /// Build a rule set, ordering by descending priority with declaration
    /// order breaking ties.
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut rules: Vec<Arc<Rule>> = rules.into_iter().map(Arc::new).collect();
        rules.sort_by_key(|r| std::cmp::Reverse(r.priority));
        Self { rules }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in match order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Rule>> {
        self.rules.iter()
    }
}

/// Find the highest-priority rule whose parent matcher matches `ctx`.
///
/// Absence of a match is a normal result, not an error.
pub fn match_parent<'r>(ctx: &Context, rules: &'r RuleSet) -> Option<&'r Arc<Rule>> {
    rules.iter().find(|rule| rule.parent.matches(ctx))
}

/// Evaluate `ctx` against a rule's child matcher.
pub fn match_child(ctx: &Context, rule: &Rule) -> bool {
    rule.child.matches(ctx)
}
