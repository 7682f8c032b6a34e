//! Config file validation.

use std::path::Path;

use isle_core::config::GameConfig;

use crate::error::Result;

/// Load a RON config and check every value.
///
/// # Errors
///
/// Returns an error if the file is unreadable, malformed, or holds values
/// the game would reject.
pub fn validate_config_file(path: &Path) -> Result<GameConfig> {
    let config = GameConfig::load(path)?;
    tracing::debug!(
        cols = config.map.cols,
        rows = config.map.rows,
        seed = config.map.seed,
        units = config.units.count,
        "Config parsed"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use isle_core::error::GameError;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_partial_config() {
        let file = write_config("(map: (cols: 96, rows: 80, seed: 7), units: (count: 8))");
        let config = validate_config_file(file.path()).unwrap();
        assert_eq!((config.map.cols, config.map.rows), (96, 80));
        assert_eq!(config.units.count, 8);
        assert_eq!(config.max_frame_dt, GameConfig::default().max_frame_dt);
    }

    #[test]
    fn test_round_trips_default() {
        let text = GameConfig::default().to_ron_string().unwrap();
        let file = write_config(&text);
        assert_eq!(validate_config_file(file.path()).unwrap(), GameConfig::default());
    }

    #[test]
    fn test_shipped_config_is_default() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs/default.ron");
        assert_eq!(validate_config_file(&path).unwrap(), GameConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let file = write_config("(map: (cols: 0), max_frame_dt: -1.0)");
        let err = validate_config_file(file.path()).unwrap_err();
        match err {
            ToolError::Game(GameError::InvalidConfig(problems)) => assert!(problems.len() >= 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_malformed_ron() {
        let file = write_config("(map: (cols: ");
        assert!(matches!(
            validate_config_file(file.path()),
            Err(ToolError::Game(GameError::ConfigParse { .. }))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_config_file(&dir.path().join("absent.ron")),
            Err(ToolError::Game(GameError::ConfigIo { .. }))
        ));
    }
}
