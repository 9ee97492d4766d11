//! # nook-core
//!
//! Foundation types for the nook placement daemon.
//!
//! This crate provides the shared vocabulary the other nook crates depend on:
//!
//! - **Branded IDs**: [`ids::ContainerId`], [`ids::WorkspaceId`] as newtypes
//! - **Events**: [`events::Event`] — the closed set of compositor events the
//!   runtime reduces over, plus the [`events::WindowNode`] snapshot they carry
//! - **Context**: [`context::Context`] — normalized window identity used for
//!   rule matching
//! - **Rules**: [`rules::Rule`], [`rules::Matcher`], [`rules::Action`] and the
//!   priority-ordered [`rules::RuleSet`]
//! - **Errors**: [`errors::CoreError`] via `thiserror`
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other nook crates.

#![deny(unsafe_code)]

pub mod context;
pub mod errors;
pub mod events;
pub mod ids;
pub mod rules;

pub use context::Context;
pub use errors::CoreError;
pub use events::{Event, Rect, WindowNode};
pub use ids::{ContainerId, WorkspaceId};
pub use rules::{
    Action, Direction, Matcher, Mode, Orientation, Position, Rule, RuleSet, match_child,
    match_parent,
};
