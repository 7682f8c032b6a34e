//! Error type for the tool commands.

use thiserror::Error;

use isle_core::error::GameError;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors surfaced by `isle-tools` commands.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Error from the game core (config loading, setup).
    #[error(transparent)]
    Game(#[from] GameError),

    /// Report serialization failed.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// A `X,Y` argument could not be parsed.
    #[error("Invalid point '{0}', expected X,Y")]
    InvalidPoint(String),

    /// One or more swept maps broke a generator guarantee.
    #[error("{failures} of {maps} maps failed invariant checks")]
    SweepFailed {
        /// Maps with at least one violation.
        failures: usize,
        /// Maps checked.
        maps: usize,
    },
}
