//! Branded ID newtypes.
//!
//! Container ids are the compositor's `con_id` values (stable for the
//! lifetime of a container). Workspaces are addressed by name, which is how
//! the compositor reports them and how users refer to them in rules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compositor container id (`con_id`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContainerId(pub i64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ContainerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Workspace identifier (the workspace name, e.g. `"1"` or `"web"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub String);

impl WorkspaceId {
    /// The workspace name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for WorkspaceId {
    fn from(name: String) -> Self {
        Self(name)
    }
}
