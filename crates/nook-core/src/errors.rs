//! Error types for rule construction.

use thiserror::Error;

/// Errors from building core rule types.
///
/// Runtime-phase failures (expired correlations, failed command sequences)
/// are modeled in `nook-runtime`; configuration-file problems in
/// `nook-config`. This crate only fails while compiling matchers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A title pattern is not a valid glob.
    #[error("invalid title pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob compile error.
        source: globset::Error,
    },
}
