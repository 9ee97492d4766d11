//! Working-directory resolution.
//!
//! `inherit_cwd` needs the parent window's working directory. On Linux that
//! is one readlink away; when it fails (process gone, permission, non-Linux)
//! the action degrades to a no-op.

use std::path::PathBuf;

/// Resolves a process id to its current working directory.
pub trait ProcessInspector: Send + Sync {
    /// Resolve `pid` to a working directory, or `None` if unresolvable.
    fn resolve_cwd(&self, pid: i32) -> Option<PathBuf>;
}

/// `/proc`-based inspector.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcInspector;

impl ProcessInspector for ProcInspector {
    fn resolve_cwd(&self, pid: i32) -> Option<PathBuf> {
        std::fs::read_link(format!("/proc/{pid}/cwd")).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_pid_is_unresolved() {
        // pid 0 never has a /proc entry
        assert!(ProcInspector.resolve_cwd(0).is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn own_pid_resolves() {
        let pid = std::process::id() as i32;
        assert!(ProcInspector.resolve_cwd(pid).is_some());
    }
}
