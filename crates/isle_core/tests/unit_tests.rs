//! Unit spawning, movement legality and selection over generated maps.

use isle_core::map_generation::generate_map;
use isle_core::math::Vec2;
use isle_core::rng::Mulberry32;
use isle_core::selection::unit_screen_anchor;
use isle_core::units::{spawn_units, update_units, SPAWN_SEPARATION};
use isle_test_utils::strategies::{arb_dt_sequence, arb_seed};
use isle_test_utils::fixtures::{
    generated_map, grid_from_ascii, reference_simulation, simulation_on, unit_at, REFERENCE_SEED,
};
use proptest::prelude::*;

#[test]
fn test_reference_spawn() {
    let mut rng = Mulberry32::new(REFERENCE_SEED);
    let grid = generate_map(72, 72, REFERENCE_SEED, &mut rng);
    let units = spawn_units(&grid, Vec2::new(36.0, 36.0), 6, &mut rng);

    assert_eq!(units.len(), 6);
    for (i, a) in units.iter().enumerate() {
        assert!(grid.is_land_at(a.position), "{} spawned in water", a.id);
        for b in &units[i + 1..] {
            assert!(a.position.distance(b.position) >= SPAWN_SEPARATION);
        }
    }
}

#[test]
fn test_reference_move_arrives() {
    let mut rng = Mulberry32::new(REFERENCE_SEED);
    let grid = generate_map(72, 72, REFERENCE_SEED, &mut rng);
    let mut units = vec![unit_at(1, 36.2, 36.3)];
    let target = Vec2::new(40.5, 36.5);
    units[0].target = Some(target);

    let dt = 0.05;
    let ticks = (units[0].position.distance(target) / 2.7 / dt).ceil() as usize;
    assert_eq!(ticks, 32);
    for _ in 0..ticks {
        update_units(&mut units, &grid, dt);
    }

    assert!(units[0].position.distance(target) < 1e-9);
    assert!(units[0].target.is_none());
}

#[test]
fn test_move_across_strait_stops_at_shore() {
    let grid = grid_from_ascii(
        "
        ~~~~~~~~~~~~~~~~~~~~
        ~######~~~~~######~~
        ~######~~~~~######~~
        ~######~~~~~######~~
        ~######~~~~~######~~
        ~~~~~~~~~~~~~~~~~~~~
        ",
    );
    let mut units = vec![unit_at(1, 2.5, 2.5)];
    units[0].target = Some(Vec2::new(14.5, 2.5));
    for _ in 0..200 {
        update_units(&mut units, &grid, 0.05);
    }
    let unit = &units[0];
    assert!(unit.target.is_none());
    assert!(unit.position.x < 7.0 && unit.position.x > 6.5);
    assert!(grid.is_land_at(unit.position));
}

#[test]
fn test_drag_box_then_order() {
    let mut sim = reference_simulation();
    let vp = *sim.viewport();
    sim.pointer_down(vp.origin);
    sim.pointer_moved(Vec2::new(vp.origin.x + vp.width * 0.8, vp.origin.y + vp.height * 0.8));
    sim.pointer_up();

    let selected = sim.selection().len();
    assert!(selected > 0);
    for unit in sim.selected_units() {
        let anchor = unit_screen_anchor(unit, sim.camera());
        assert!(anchor.x <= vp.width * 0.8 && anchor.y <= vp.height * 0.8);
    }

    let centre = isle_core::iso::tile_to_screen(Vec2::new(36.5, 36.5), sim.camera());
    assert_eq!(sim.command_move(centre), Some(Vec2::new(36.5, 36.5)));
    let ordered = sim.units().iter().filter(|u| u.target.is_some()).count();
    assert_eq!(ordered, selected);
}

#[test]
fn test_spawn_on_small_island_soft_fails() {
    let grid = grid_from_ascii(
        "
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~#~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ~~~~~~~~~~~~~~~~~~~~~
        ",
    );
    // Only the centre tile is land, and it is inside the minimum spawn radius
    let sim = simulation_on(grid, 5);
    assert_eq!(sim.unit_count(), 0);
    assert!(sim.focused_unit().is_none());
    assert_eq!(sim.hud().selected_count, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_spawned_units_on_land(seed in arb_seed()) {
        let mut rng = Mulberry32::new(seed);
        let grid = generate_map(72, 72, seed, &mut rng);
        let units = spawn_units(&grid, Vec2::new(36.0, 36.0), 6, &mut rng);
        prop_assert!(!units.is_empty());
        for unit in &units {
            prop_assert!(grid.is_land_at(unit.position));
        }
    }

    #[test]
    fn prop_units_never_end_tick_in_water(
        seed in arb_seed(),
        tx in 0.0f64..72.0,
        ty in 0.0f64..72.0,
        dts in arb_dt_sequence(120),
    ) {
        let grid = generated_map(72, 72, seed);
        let mut sim = simulation_on(grid, seed);
        sim.select_all();
        sim.order_move_to(Vec2::new(tx, ty));
        for dt in dts {
            sim.tick(dt);
            for unit in sim.units() {
                prop_assert!(sim.grid().is_land_at(unit.position), "{} in water", unit.id);
            }
        }
    }

    #[test]
    fn prop_dt_is_clamped(dt in 0.0f64..10.0) {
        let mut sim = reference_simulation();
        let events = sim.tick(dt);
        prop_assert!(events.dt <= 0.05 && events.dt >= 0.0);
    }
}
