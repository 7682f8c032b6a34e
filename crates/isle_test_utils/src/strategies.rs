//! Proptest strategies for the core's inputs.

use isle_core::camera::{Camera, PanInput};
use isle_core::math::Vec2;
use isle_core::simulation::PanKey;
use proptest::prelude::*;

use crate::determinism::InputEvent;

/// A finite coordinate in a wide range around typical map sizes.
pub fn arb_coordinate() -> impl Strategy<Value = f64> {
    -10_000.0f64..10_000.0
}

/// A finite world point.
pub fn arb_world_point() -> impl Strategy<Value = Vec2> {
    (arb_coordinate(), arb_coordinate()).prop_map(|(x, y)| Vec2::new(x, y))
}

/// A camera offset in pixels.
pub fn arb_camera() -> impl Strategy<Value = Camera> {
    (-50_000.0f64..50_000.0, -50_000.0f64..50_000.0).prop_map(|(x, y)| Camera::new(x, y))
}

/// Any map seed.
pub fn arb_seed() -> impl Strategy<Value = u32> {
    any::<u32>()
}

/// `(cols, rows)` of a map large enough for the protected disc and the
/// exact water balance.
pub fn arb_map_size() -> impl Strategy<Value = (u32, u32)> {
    (30u32..90, 30u32..90)
}

/// A frame delta up to the simulation clamp.
pub fn arb_dt() -> impl Strategy<Value = f64> {
    0.0f64..=0.05
}

/// A sequence of per-tick deltas.
pub fn arb_dt_sequence(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(arb_dt(), 1..max_len)
}

/// Held keys with no pointer.
pub fn arb_pan_input() -> impl Strategy<Value = PanInput> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(up, down, left, right)| PanInput {
            up,
            down,
            left,
            right,
            pointer: None,
        },
    )
}

fn arb_screen_point() -> impl Strategy<Value = Vec2> {
    (0.0f64..1280.0, 0.0f64..720.0).prop_map(|(x, y)| Vec2::new(x, y))
}

fn arb_pan_key() -> impl Strategy<Value = PanKey> {
    prop_oneof![
        Just(PanKey::Up),
        Just(PanKey::Down),
        Just(PanKey::Left),
        Just(PanKey::Right),
    ]
}

/// Any single host callback or frame on a 1280×720 window.
pub fn arb_input_event() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        1 => (arb_pan_key(), any::<bool>()).prop_map(|(k, pressed)| InputEvent::Key(k, pressed)),
        1 => arb_screen_point().prop_map(InputEvent::PointerMoved),
        1 => Just(InputEvent::PointerLeft),
        1 => arb_screen_point().prop_map(InputEvent::PointerDown),
        1 => Just(InputEvent::PointerUp),
        1 => arb_screen_point().prop_map(InputEvent::CommandMove),
        1 => Just(InputEvent::SelectAll),
        3 => arb_dt().prop_map(InputEvent::Tick),
    ]
}

/// An input script of up to `max_len` events.
pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<InputEvent>> {
    proptest::collection::vec(arb_input_event(), 1..max_len)
}
