//! Headless move-order runs.
//!
//! Builds a [`Simulation`] from a config, selects every unit, orders them
//! to one tile and steps a fixed number of ticks. Useful for checking that
//! a seed's shoreline stops units where expected.

use serde::Serialize;
use tracing::{debug, info};

use isle_core::config::GameConfig;
use isle_core::math::Vec2;
use isle_core::simulation::Simulation;
use isle_core::units::UnitId;

use crate::error::{Result, ToolError};

/// Fixed step used when no `--dt` is given.
pub const DEFAULT_TICK_DT: f64 = 1.0 / 60.0;

/// Parse an `X,Y` world point.
///
/// # Errors
///
/// [`ToolError::InvalidPoint`] when either half is missing or not a finite number.
pub fn parse_point(text: &str) -> Result<Vec2> {
    let invalid = || ToolError::InvalidPoint(text.to_string());
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    let point = Vec2::new(x, y);
    if point.is_finite() {
        Ok(point)
    } else {
        Err(invalid())
    }
}

/// Final state of one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    /// Unit id.
    pub id: UnitId,
    /// Position after the last tick.
    pub position: Vec2,
    /// Whether a move order is still active.
    pub moving: bool,
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Map seed.
    pub seed: u32,
    /// Ticks stepped.
    pub ticks: u32,
    /// Tile centre the units were sent to, `None` if the order was rejected.
    pub target: Option<Vec2>,
    /// Units that reached the target, in arrival order.
    pub arrived: Vec<UnitId>,
    /// Units stopped by water.
    pub blocked: Vec<UnitId>,
    /// Per-unit end state.
    pub units: Vec<UnitReport>,
    /// Hash of the final simulation state.
    pub state_hash: u64,
}

/// Run `ticks` steps of `dt` after ordering every unit to `target`.
///
/// # Errors
///
/// Returns an error if `config` fails validation.
pub fn run_move_order(
    config: GameConfig,
    target: Vec2,
    ticks: u32,
    dt: f64,
) -> Result<SimulationReport> {
    let mut sim = Simulation::new(config)?;
    sim.select_all();
    let ordered = sim.order_move_to(target);
    info!(
        seed = sim.grid().seed(),
        units = sim.unit_count(),
        target = ?ordered,
        "Move order issued"
    );

    let mut arrived = Vec::new();
    let mut blocked = Vec::new();
    for _ in 0..ticks {
        let events = sim.tick(dt);
        arrived.extend(events.arrived);
        blocked.extend(events.blocked);
        for unit in sim.units() {
            debug!(
                tick = sim.tick_count(),
                unit = %unit.id,
                x = unit.position.x,
                y = unit.position.y,
                "Unit position"
            );
        }
    }

    let units = sim
        .units()
        .iter()
        .map(|u| UnitReport {
            id: u.id,
            position: u.position,
            moving: u.is_moving(),
        })
        .collect();

    Ok(SimulationReport {
        seed: sim.grid().seed(),
        ticks,
        target: ordered,
        arrived,
        blocked,
        units,
        state_hash: sim.state_hash(),
    })
}
