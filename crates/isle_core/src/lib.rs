//! # Isle Core
//!
//! Simulation and spatial-addressing core for an isometric island
//! strategy prototype.
//!
//! This crate contains **only** model logic:
//! - No rendering
//! - No IO beyond config loading
//! - No system randomness (everything draws from a seeded [`rng::Mulberry32`])
//!
//! A presentation layer drives it through [`simulation::Simulation`] and
//! draws from its read accessors.
//!
//! ## Crate Structure
//!
//! - [`math`] - `Vec2` and screen rectangles
//! - [`iso`] - World ↔ screen diamond projection
//! - [`rng`] / [`noise`] - Seeded random source and value noise
//! - [`map_generation`] - Island generation with ratio and connectivity guarantees
//! - [`camera`] - Focus point, panning and camera offset
//! - [`minimap`] - Minimap raster and minimap ↔ world mapping
//! - [`units`] - Spawning and movement
//! - [`selection`] - Picking, selection set and move orders
//! - [`simulation`] - Owned game state and the per-frame tick
//! - [`config`] - RON configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod camera;
pub mod config;
pub mod error;
pub mod iso;
pub mod map_generation;
pub mod math;
pub mod minimap;
pub mod noise;
pub mod rng;
pub mod selection;
pub mod simulation;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::camera::{Camera, CameraController, CameraSettings, PanInput, Viewport};
    pub use crate::config::GameConfig;
    pub use crate::error::{GameError, Result};
    pub use crate::iso::{screen_to_tile, tile_to_screen, IsoProjection};
    pub use crate::map_generation::{generate_map, MapConfig, Terrain, Tile, TileGrid};
    pub use crate::math::{Rect, Vec2};
    pub use crate::minimap::{MinimapFrame, MinimapProjection, MinimapTexture};
    pub use crate::rng::{Mulberry32, RandomSource};
    pub use crate::selection::{pick_unit_at_point, pick_units_in_rect, Selection};
    pub use crate::simulation::{HudSnapshot, PanKey, Simulation};
    pub use crate::units::{spawn_units, update_units, Unit, UnitId, UnitSettings};
}
