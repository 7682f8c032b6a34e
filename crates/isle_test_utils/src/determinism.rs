//! Replay harness for map generation and the simulation.
//!
//! A seed only reproduces a map when paired with the same generator
//! algorithm, so every run here seeds its own [`Mulberry32`]. The
//! simulation is driven by an [`InputEvent`] script instead of wall time,
//! which makes a run a pure function of `(config, script)`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use isle_core::map_generation::{generate_map_with, MapConfig, Terrain, TileGrid};
use isle_core::math::Vec2;
use isle_core::rng::Mulberry32;
use isle_core::simulation::{PanKey, Simulation};

/// One recorded callback or frame, in the order the host delivered it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Arrow key pressed (`true`) or released.
    Key(PanKey, bool),
    /// Pointer moved to a screen point.
    PointerMoved(Vec2),
    /// Pointer left the window.
    PointerLeft,
    /// Primary button pressed at a screen point.
    PointerDown(Vec2),
    /// Primary button released.
    PointerUp,
    /// Secondary click at a screen point.
    CommandMove(Vec2),
    /// Select every unit.
    SelectAll,
    /// Advance one frame by `dt` seconds.
    Tick(f64),
}

impl InputEvent {
    /// Deliver the event to `sim`.
    pub fn apply(self, sim: &mut Simulation) {
        match self {
            Self::Key(key, pressed) => sim.set_key(key, pressed),
            Self::PointerMoved(p) => sim.pointer_moved(p),
            Self::PointerLeft => sim.pointer_left(),
            Self::PointerDown(p) => sim.pointer_down(p),
            Self::PointerUp => sim.pointer_up(),
            Self::CommandMove(p) => {
                sim.command_move(p);
            }
            Self::SelectAll => sim.select_all(),
            Self::Tick(dt) => {
                sim.tick(dt);
            }
        }
    }
}

/// Feed a whole script to `sim`.
pub fn replay(sim: &mut Simulation, script: &[InputEvent]) {
    for event in script {
        event.apply(sim);
    }
}

/// Final [`Simulation::state_hash`] of each replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayCheck {
    /// One hash per run.
    pub hashes: Vec<u64>,
    /// Script length in events.
    pub events: usize,
}

impl ReplayCheck {
    /// All runs ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// # Panics
    ///
    /// Panics listing every hash when two runs ended differently.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "replays of a {}-event script diverged: {:?}",
            self.events,
            self.hashes
        );
    }
}

/// Replay `script` on `runs` fresh simulations built by `setup`.
///
/// # Example
///
/// ```
/// use isle_core::config::GameConfig;
/// use isle_core::simulation::Simulation;
/// use isle_test_utils::determinism::{verify_replay, InputEvent};
///
/// let script = [InputEvent::SelectAll, InputEvent::Tick(0.05)];
/// let check = verify_replay(
///     || Simulation::new(GameConfig::default()).unwrap(),
///     &script,
///     2,
/// );
/// check.assert_deterministic();
/// ```
pub fn verify_replay<F>(setup: F, script: &[InputEvent], runs: usize) -> ReplayCheck
where
    F: Fn() -> Simulation,
{
    let hashes = (0..runs)
        .map(|_| {
            let mut sim = setup();
            replay(&mut sim, script);
            sim.state_hash()
        })
        .collect();
    ReplayCheck {
        hashes,
        events: script.len(),
    }
}

/// Index of the first event after which two replays disagree.
pub fn first_divergent_event<F>(setup: F, script: &[InputEvent]) -> Option<usize>
where
    F: Fn() -> Simulation,
{
    let mut a = setup();
    let mut b = setup();
    script.iter().position(|event| {
        event.apply(&mut a);
        event.apply(&mut b);
        a.state_hash() != b.state_hash()
    })
}

/// Hash of a grid's dimensions, terrain and exact elevation bits.
#[must_use]
pub fn grid_hash(grid: &TileGrid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.cols().hash(&mut hasher);
    grid.rows().hash(&mut hasher);
    for tile in grid.tiles() {
        (tile.terrain == Terrain::Land).hash(&mut hasher);
        tile.elevation.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Outcome of regenerating one map several times.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCheck {
    /// The first grid generated.
    pub grid: TileGrid,
    /// Runs whose grid differed from the first (1-based run numbers).
    pub mismatches: Vec<usize>,
}

impl MapCheck {
    /// Every run produced an identical grid.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// # Panics
    ///
    /// Panics naming the runs that produced a different grid.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "seed {} regenerated differently on runs {:?}",
            self.grid.seed(),
            self.mismatches
        );
    }
}

/// Generate `config` `runs` times (at least once), each with a freshly
/// seeded [`Mulberry32`], and compare every grid to the first.
#[must_use]
pub fn verify_map_determinism(config: &MapConfig, runs: usize) -> MapCheck {
    let generate = || {
        let mut rng = Mulberry32::new(config.seed);
        generate_map_with(config, &mut rng)
    };
    let grid = generate();
    let mismatches = (1..runs).filter(|_| generate() != grid).collect();
    MapCheck { grid, mismatches }
}
