//! Error types for the game simulation.
//!
//! Generation, projection, movement and picking are total functions and
//! never fail. Errors only come from the configuration surface and from
//! commands that address a unit by id.

use thiserror::Error;

use crate::units::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigIo {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file parsing error.
    #[error("Failed to parse config '{path}': {message}")]
    ConfigParse {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Configuration values failed validation.
    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// Unit identifier does not exist.
    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),

    /// Unit exists but is not part of the current selection.
    #[error("Unit {0} is not selected")]
    UnitNotSelected(UnitId),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_joins_messages() {
        let err = GameError::InvalidConfig(vec!["cols must be positive".into(), "bad ratio".into()]);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: cols must be positive; bad ratio"
        );
    }

    #[test]
    fn test_unknown_unit_display() {
        let err = GameError::UnknownUnit(UnitId(7));
        assert_eq!(err.to_string(), "Unknown unit: unit-7");
    }
}
