//! Pointer hit-testing and fish capture.
//!
//! A press captures the live fish whose capture circle contains the point.
//! When circles overlap the nearest centre wins, and an exact tie goes to the
//! fish listed first. Presses off the canvas never hit anything.

use crate::simulation::SimulationState;
use glam::Vec2;

/// A fish under the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Position in [`SimulationState::fish`].
    pub index: usize,
    pub fish_id: u32,
    /// Distance from the press to the fish centre, pixels.
    pub distance: f32,
}

/// A completed capture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capture {
    pub fish_id: u32,
    /// Where the fish was when it was caught.
    pub position: Vec2,
    pub distance: f32,
    /// Fish captured in this scene so far, this one included.
    pub total_captured: u32,
}

/// Find the live fish a press at `point` would capture.
pub fn hit_test(state: &SimulationState, point: Vec2, capture_scale: f32) -> Option<Hit> {
    if !point.is_finite() || !state.contains(point) {
        return None;
    }

    let mut best: Option<Hit> = None;
    for (index, fish) in state.fish().iter().enumerate() {
        if !fish.is_alive() {
            continue;
        }
        let distance = fish.position.distance(point);
        if distance > fish.capture_radius(capture_scale) {
            continue;
        }
        // Strict comparison keeps the earlier fish on a tie.
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Hit {
                index,
                fish_id: fish.id,
                distance,
            });
        }
    }
    best
}

/// Hit-test `point` and capture whatever it lands on.
pub fn capture_at(state: &mut SimulationState, point: Vec2, capture_scale: f32) -> Option<Capture> {
    let hit = hit_test(state, point, capture_scale)?;
    let position = state.fish()[hit.index].position;
    if !state.capture(hit.fish_id) {
        return None;
    }

    log::info!(
        "captured fish {} at ({:.1}, {:.1}), {} caught",
        hit.fish_id,
        position.x,
        position.y,
        state.captured_count()
    );

    Some(Capture {
        fish_id: hit.fish_id,
        position,
        distance: hit.distance,
        total_captured: state.captured_count(),
    })
}
