//! # nook-runtime
//!
//! The placement engine: correlates a focus event on a rule-matching
//! "parent" window with a later window-creation event, and realizes the
//! matched rule as an ordered command sequence.
//!
//! - **State store**: time-bounded pending correlations (at most one per
//!   workspace) and durable parent/child relationships, behind one lock
//!   shared by the event path and the sweep timer
//! - **Orchestrator**: reducer over the closed compositor event set;
//!   every internal error is downgraded to a fallback decision
//! - **Sequencer**: pre-phase (arm time) / post-phase (consumption time)
//!   command execution with abort-on-failure and best-effort ambient mode
//!   restoration
//! - **Fallback tiler**: geometry-based splitting used whenever no rule
//!   applies or one fails
//!
//! ## Crate Position
//!
//! Aggregation layer. Depends on: nook-core, nook-ipc.
//! Depended on by: the nook binary.

#![deny(unsafe_code)]

pub mod clock;
pub mod errors;
pub mod fallback;
pub mod orchestrator;
pub mod process;
pub mod sequencer;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::RuntimeError;
pub use fallback::FallbackTiler;
pub use orchestrator::{FallbackReason, Orchestrator, Outcome};
pub use process::{ProcInspector, ProcessInspector};
pub use sequencer::{CommandTransport, SequenceReport};
pub use state::{PendingCorrelation, Relationship, StateStore};
