//! Game configuration loaded from RON.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```ron
//! (
//!     map: (cols: 96, rows: 96, seed: 7),
//!     units: (count: 8),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CameraSettings;
use crate::error::{GameError, Result};
use crate::map_generation::MapConfig;
use crate::selection::DEFAULT_DRAG_THRESHOLD_PX;
use crate::units::UnitSettings;

/// Upper bound on a single simulation step, in seconds.
pub const DEFAULT_MAX_FRAME_DT: f64 = 0.05;

/// Top-level game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Map generation parameters.
    pub map: MapConfig,
    /// Camera panning.
    pub camera: CameraSettings,
    /// Unit spawning and stats.
    pub units: UnitSettings,
    /// Real-time delta is clamped to this before each tick.
    pub max_frame_dt: f64,
    /// Pointer travel in pixels that turns a click into a drag.
    pub drag_threshold_px: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            camera: CameraSettings::default(),
            units: UnitSettings::default(),
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
        }
    }
}

impl GameConfig {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid RON, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&contents, &path.display().to_string())?;
        tracing::info!(path = %path.display(), "Loaded game config");
        Ok(config)
    }

    /// Parse and validate a config from a RON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid RON or fails validation.
    pub fn from_ron_str(ron_str: &str) -> Result<Self> {
        Self::parse(ron_str, "<string>")
    }

    fn parse(ron_str: &str, origin: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron_str).map_err(|e| GameError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(e.to_string()))
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidConfig`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = self.map.validate();
        errors.extend(self.units.validate());
        if !(self.camera.pan_speed.is_finite() && self.camera.pan_speed > 0.0) {
            errors.push(format!(
                "camera pan_speed must be positive, got {}",
                self.camera.pan_speed
            ));
        }
        if !(self.camera.edge_scroll_margin.is_finite() && self.camera.edge_scroll_margin >= 0.0) {
            errors.push(format!(
                "camera edge_scroll_margin must be non-negative, got {}",
                self.camera.edge_scroll_margin
            ));
        }
        if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
            errors.push(format!(
                "max_frame_dt must be positive, got {}",
                self.max_frame_dt
            ));
        }
        if !(self.drag_threshold_px.is_finite() && self.drag_threshold_px >= 0.0) {
            errors.push(format!(
                "drag_threshold_px must be non-negative, got {}",
                self.drag_threshold_px
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GameError::InvalidConfig(errors))
        }
    }
}
