//! Water scene state and its per-frame update.
//!
//! [`SimulationState::update`] advances every live fish and the water clock
//! by one step:
//!
//! 1. Wander: each fish's heading drifts by a random turn from the state's
//!    own seeded RNG, scaled by `wander`.
//! 2. Separation: fish closer than twice their size push apart.
//! 3. Cruise: velocity steers toward `speed × SPEED_UNIT` along the heading.
//! 4. Current: the water drift at the fish position is added, scaled by
//!    `turbulence`.
//! 5. Integrate position, advance the tail animation.
//! 6. Wrap at the canvas edges with a margin of one fish size, so fish swim
//!    fully off-screen before re-entering on the opposite side.
//!
//! The only randomness comes from the owned RNG. Cloning a state and
//! stepping both copies with the same `dt` and snapshot gives identical
//! results.

use crate::error::{ParameterError, SceneError};
use crate::field::WaterField;
use crate::fish::Fish;
use crate::params::ParamSnapshot;
use crate::preset::water::keys;
use crate::spawn::SpawnContext;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Pixels per second for one unit of the `speed` parameter.
pub const SPEED_UNIT: f32 = 30.0;
/// Pixels per second of water drift at `turbulence = 1`.
pub const CURRENT_UNIT: f32 = 24.0;
/// Largest step integrated at once, in seconds.
pub const MAX_STEP: f32 = 0.1;
/// How quickly velocity converges on the cruise velocity, per second.
const STEER_RATE: f32 = 2.5;
/// Maximum heading change per second at `wander = 1`, radians.
const WANDER_RATE: f32 = 2.0;
/// Separation acceleration scale, pixels per second squared.
const SEPARATION_STRENGTH: f32 = 90.0;
/// Seconds a capture ripple stays on screen.
pub const RIPPLE_LIFETIME: f32 = 0.8;

/// Typed view of the water preset's parameters for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimParams {
    pub fish_count: u32,
    pub fish_size: f32,
    pub speed: f32,
    pub wander: f32,
    pub turbulence: f32,
    pub wave_speed: f32,
    pub wave_scale: f32,
    pub capture_scale: f32,
    pub trails: f32,
}

impl SimParams {
    pub fn from_snapshot(params: &ParamSnapshot) -> Result<Self, ParameterError> {
        Ok(Self {
            fish_count: params.get(keys::FISH_COUNT)?.round().max(0.0) as u32,
            fish_size: params.get(keys::FISH_SIZE)?,
            speed: params.get(keys::SPEED)?,
            wander: params.get(keys::WANDER)?,
            turbulence: params.get(keys::TURBULENCE)?,
            wave_speed: params.get(keys::WAVE_SPEED)?,
            wave_scale: params.get(keys::WAVE_SCALE)?,
            capture_scale: params.get(keys::CAPTURE_SCALE)?,
            trails: params.get(keys::TRAILS)?,
        })
    }
}

/// One-shot expanding ring left behind by a capture.
#[derive(Clone, Debug, PartialEq)]
pub struct Ripple {
    pub position: Vec2,
    pub age: f32,
    pub lifetime: f32,
    /// Hue of the captured fish.
    pub hue: f32,
}

impl Ripple {
    /// Progress from 0.0 (just spawned) to 1.0 (gone).
    pub fn progress(&self) -> f32 {
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Result of a single update step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// The `dt` actually integrated after clamping.
    pub dt: f32,
    /// Ids of fish reset after producing non-finite state (lenient mode only).
    pub recovered: Vec<u32>,
}

/// Everything that evolves in the water scene.
#[derive(Clone, Debug)]
pub struct SimulationState {
    fish: Vec<Fish>,
    water: WaterField,
    ripples: Vec<Ripple>,
    bounds: Vec2,
    rng: SmallRng,
    time: f32,
    captured: u32,
    strict: bool,
}

impl SimulationState {
    /// Spawn `fish_count` fish inside a canvas of `bounds` pixels.
    pub fn new(bounds: Vec2, params: &SimParams, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let count = params.fish_count;
        let cruise = params.speed * SPEED_UNIT;

        let fish = (0..count)
            .map(|i| {
                let mut ctx = SpawnContext::new(i, bounds, &mut rng);
                Fish::spawn(&mut ctx, params.fish_size, cruise)
            })
            .collect();

        log::debug!(
            "spawned {} fish in {}x{} canvas (seed {})",
            count,
            bounds.x,
            bounds.y,
            seed
        );

        Self::from_parts(bounds, fish, rng)
    }

    /// Build a state around a hand-placed school.
    pub fn with_fish(bounds: Vec2, fish: Vec<Fish>, seed: u64) -> Self {
        Self::from_parts(bounds, fish, SmallRng::seed_from_u64(seed))
    }

    fn from_parts(bounds: Vec2, fish: Vec<Fish>, rng: SmallRng) -> Self {
        Self {
            fish,
            water: WaterField::new(),
            ripples: Vec::new(),
            bounds,
            rng,
            time: 0.0,
            captured: 0,
            strict: cfg!(debug_assertions),
        }
    }

    /// Whether a non-finite fish aborts the step (`true`) or is reset.
    pub fn set_strict_invariants(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn strict_invariants(&self) -> bool {
        self.strict
    }

    /// Advance the scene by `dt` seconds using one frame's parameters.
    ///
    /// `dt` is clamped to `[0, MAX_STEP]`. Fails only when strict invariants
    /// are on and a fish ends the step with non-finite state.
    pub fn update(&mut self, dt: f32, params: &SimParams) -> Result<StepReport, SceneError> {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_STEP) } else { 0.0 };
        let mut report = StepReport {
            dt,
            recovered: Vec::new(),
        };
        if dt == 0.0 {
            return Ok(report);
        }

        self.time += dt;
        self.water.advance(dt * params.wave_speed);

        let separation = self.separation_forces();
        let cruise_speed = params.speed * SPEED_UNIT;
        let steer = 1.0 - (-STEER_RATE * dt).exp();

        for (fish, push) in self.fish.iter_mut().zip(separation) {
            if !fish.is_alive() {
                continue;
            }

            let turn: f32 = self.rng.gen_range(-1.0..=1.0);
            fish.heading = (fish.heading + turn * params.wander * WANDER_RATE * dt).rem_euclid(TAU);

            let cruise = Vec2::from_angle(fish.heading) * cruise_speed;
            fish.velocity += (cruise - fish.velocity) * steer;
            fish.velocity += push * dt;

            // Fish turn toward where they are actually being pushed.
            if push.length_squared() > 1e-6 && fish.velocity.length_squared() > 1e-6 {
                fish.heading = fish.velocity.to_angle().rem_euclid(TAU);
            }

            let drift = self.water.current(fish.position, params.wave_scale)
                * (CURRENT_UNIT * params.turbulence);
            fish.position += (fish.velocity + drift) * dt;

            let swim_rate = 4.0 + fish.velocity.length() / fish.size.max(1.0);
            fish.tail_phase = (fish.tail_phase + swim_rate * dt).rem_euclid(TAU);

            wrap(fish, self.bounds);
        }

        for ripple in &mut self.ripples {
            ripple.age += dt;
        }
        self.ripples.retain(|r| r.age < r.lifetime);

        self.check_invariants(&mut report)?;
        Ok(report)
    }

    fn separation_forces(&self) -> Vec<Vec2> {
        let school = &self.fish;
        let mut forces = vec![Vec2::ZERO; school.len()];
        for i in 0..school.len() {
            if !school[i].is_alive() {
                continue;
            }
            for j in (i + 1)..school.len() {
                if !school[j].is_alive() {
                    continue;
                }
                let reach = (school[i].size + school[j].size).max(1.0);
                let offset = school[i].position - school[j].position;
                let dist = offset.length();
                if dist >= reach || dist <= f32::EPSILON {
                    continue;
                }
                let push = offset / dist * (1.0 - dist / reach) * SEPARATION_STRENGTH;
                forces[i] += push;
                forces[j] -= push;
            }
        }
        forces
    }

    fn check_invariants(&mut self, report: &mut StepReport) -> Result<(), SceneError> {
        let centre = self.bounds * 0.5;
        for fish in self.fish.iter_mut().filter(|f| f.is_alive()) {
            let Some(field) = fish.non_finite_field() else {
                continue;
            };
            if self.strict {
                return Err(SceneError::InvariantViolation {
                    fish_id: fish.id,
                    detail: format!("{} is not finite", field),
                });
            }
            log::error!(
                "fish {} produced a non-finite {}; resetting it to the canvas centre",
                fish.id,
                field
            );
            fish.position = centre;
            fish.velocity = Vec2::ZERO;
            fish.heading = 0.0;
            fish.tail_phase = 0.0;
            report.recovered.push(fish.id);
        }
        Ok(())
    }

    /// Capture the fish with `id`. Returns `false` if there is no such fish
    /// or it was already captured.
    pub fn capture(&mut self, id: u32) -> bool {
        let Some(fish) = self.fish.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        if !fish.mark_captured() {
            return false;
        }
        self.captured += 1;
        self.ripples.push(Ripple {
            position: fish.position,
            age: 0.0,
            lifetime: RIPPLE_LIFETIME,
            hue: fish.hue,
        });
        true
    }

    /// All fish, captured ones included.
    pub fn fish(&self) -> &[Fish] {
        &self.fish
    }

    /// Mutable access for tests and tools that place fish by hand.
    pub fn fish_mut(&mut self) -> &mut [Fish] {
        &mut self.fish
    }

    pub fn live_fish(&self) -> impl Iterator<Item = &Fish> {
        self.fish.iter().filter(|f| f.is_alive())
    }

    pub fn live_count(&self) -> usize {
        self.live_fish().count()
    }

    pub fn captured_count(&self) -> u32 {
        self.captured
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn water(&self) -> &WaterField {
        &self.water
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    /// Seconds simulated so far.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Whether `point` lies on the canvas.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.bounds.x && point.y <= self.bounds.y
    }
}

/// Toroidal wrap with a one-size margin on every edge.
fn wrap(fish: &mut Fish, bounds: Vec2) {
    let margin = fish.size;
    let span = bounds + Vec2::splat(2.0 * margin);
    if fish.position.x < -margin || fish.position.x > bounds.x + margin {
        fish.position.x = (fish.position.x + margin).rem_euclid(span.x) - margin;
    }
    if fish.position.y < -margin || fish.position.y > bounds.y + margin {
        fish.position.y = (fish.position.y + margin).rem_euclid(span.y) - margin;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimParams {
        SimParams {
            fish_count: 12,
            fish_size: 14.0,
            speed: 2.0,
            wander: 1.0,
            turbulence: 1.0,
            wave_speed: 1.0,
            wave_scale: 0.012,
            capture_scale: 1.0,
            trails: 0.0,
        }
    }

    fn bounds() -> Vec2 {
        Vec2::new(640.0, 480.0)
    }

    #[test]
    fn test_spawns_requested_count() {
        let state = SimulationState::new(bounds(), &params(), 5);
        assert_eq!(state.fish().len(), 12);
        assert_eq!(state.live_count(), 12);
        assert_eq!(state.captured_count(), 0);
    }

    #[test]
    fn test_same_seed_same_school() {
        let a = SimulationState::new(bounds(), &params(), 42);
        let b = SimulationState::new(bounds(), &params(), 42);
        assert_eq!(a.fish(), b.fish());

        let c = SimulationState::new(bounds(), &params(), 43);
        assert_ne!(a.fish(), c.fish());
    }

    #[test]
    fn test_update_is_deterministic() {
        let mut a = SimulationState::new(bounds(), &params(), 9);
        let mut b = a.clone();
        for _ in 0..30 {
            a.update(1.0 / 60.0, &params()).unwrap();
            b.update(1.0 / 60.0, &params()).unwrap();
        }
        assert_eq!(a.fish(), b.fish());
        assert_eq!(a.water(), b.water());
    }

    #[test]
    fn test_fish_move() {
        let mut state = SimulationState::new(bounds(), &params(), 1);
        let before: Vec<Vec2> = state.fish().iter().map(|f| f.position).collect();
        state.update(1.0 / 30.0, &params()).unwrap();
        let moved = state
            .fish()
            .iter()
            .zip(&before)
            .filter(|(f, p)| f.position != **p)
            .count();
        assert_eq!(moved, 12);
    }

    #[test]
    fn test_zero_dt_changes_nothing() {
        let mut state = SimulationState::new(bounds(), &params(), 1);
        let before = state.fish().to_vec();
        let report = state.update(0.0, &params()).unwrap();
        assert_eq!(report.dt, 0.0);
        assert_eq!(state.fish(), &before[..]);
        assert_eq!(state.time(), 0.0);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = SimulationState::new(bounds(), &params(), 1);
        let report = state.update(5.0, &params()).unwrap();
        assert_eq!(report.dt, MAX_STEP);
        let report = state.update(-1.0, &params()).unwrap();
        assert_eq!(report.dt, 0.0);
    }

    #[test]
    fn test_wraps_past_right_edge() {
        let mut fish = Fish::new(0, Vec2::new(650.0, 100.0), 0.0, 10.0);
        fish.position.x = 640.0 + 10.0 + 1.0;
        wrap(&mut fish, bounds());
        assert!((fish.position.x - (-9.0)).abs() < 1e-4);
        assert_eq!(fish.position.y, 100.0);
    }

    #[test]
    fn test_wraps_past_top_edge() {
        let mut fish = Fish::new(0, Vec2::new(100.0, -12.0), 0.0, 10.0);
        wrap(&mut fish, bounds());
        assert!((fish.position.y - 488.0).abs() < 1e-3);
    }

    #[test]
    fn test_inside_margin_is_untouched() {
        let mut fish = Fish::new(0, Vec2::new(-5.0, 485.0), 0.0, 10.0);
        wrap(&mut fish, bounds());
        assert_eq!(fish.position, Vec2::new(-5.0, 485.0));
    }

    #[test]
    fn test_fish_stay_near_canvas_over_time() {
        let mut state = SimulationState::new(bounds(), &params(), 3);
        let fast = SimParams {
            speed: 10.0,
            turbulence: 5.0,
            ..params()
        };
        for _ in 0..600 {
            state.update(1.0 / 60.0, &fast).unwrap();
        }
        for fish in state.fish() {
            assert!(fish.position.x >= -fish.size && fish.position.x <= 640.0 + fish.size);
            assert!(fish.position.y >= -fish.size && fish.position.y <= 480.0 + fish.size);
        }
    }

    #[test]
    fn test_captured_fish_are_frozen() {
        let mut state = SimulationState::new(bounds(), &params(), 2);
        assert!(state.capture(3));
        let frozen = state.fish()[3].clone();
        state.update(1.0 / 60.0, &params()).unwrap();
        assert_eq!(state.fish()[3], frozen);
        assert_eq!(state.live_count(), 11);
    }

    #[test]
    fn test_capture_twice_is_noop() {
        let mut state = SimulationState::new(bounds(), &params(), 2);
        assert!(state.capture(0));
        assert!(!state.capture(0));
        assert!(!state.capture(999));
        assert_eq!(state.captured_count(), 1);
        assert_eq!(state.ripples().len(), 1);
    }

    #[test]
    fn test_ripples_expire() {
        let mut state = SimulationState::new(bounds(), &params(), 2);
        state.capture(1);
        let steps = (RIPPLE_LIFETIME / MAX_STEP).ceil() as usize + 1;
        for _ in 0..steps {
            state.update(MAX_STEP, &params()).unwrap();
        }
        assert!(state.ripples().is_empty());
    }

    #[test]
    fn test_separation_pushes_apart() {
        let school = vec![
            Fish::new(0, Vec2::new(100.0, 100.0), 0.0, 10.0),
            Fish::new(1, Vec2::new(105.0, 100.0), 0.0, 10.0),
        ];
        let state = SimulationState::with_fish(bounds(), school, 0);
        let forces = state.separation_forces();
        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
        assert!((forces[0] + forces[1]).length() < 1e-4);
    }

    #[test]
    fn test_strict_mode_reports_non_finite_state() {
        let school = vec![Fish::new(0, Vec2::new(100.0, 100.0), 0.0, 10.0)];
        let mut state = SimulationState::with_fish(bounds(), school, 0);
        state.set_strict_invariants(true);
        state.fish_mut()[0].velocity = Vec2::new(f32::NAN, 0.0);

        let err = state.update(1.0 / 60.0, &params()).unwrap_err();
        assert!(matches!(err, SceneError::InvariantViolation { fish_id: 0, .. }));
    }

    #[test]
    fn test_lenient_mode_recovers() {
        let school = vec![Fish::new(0, Vec2::new(100.0, 100.0), 0.0, 10.0)];
        let mut state = SimulationState::with_fish(bounds(), school, 0);
        state.set_strict_invariants(false);
        state.fish_mut()[0].velocity = Vec2::new(f32::NAN, 0.0);

        let report = state.update(1.0 / 60.0, &params()).unwrap();
        assert_eq!(report.recovered, vec![0]);
        assert_eq!(state.fish()[0].position, Vec2::new(320.0, 240.0));
        assert!(state.fish()[0].non_finite_field().is_none());
    }

    #[test]
    fn test_contains() {
        let state = SimulationState::with_fish(bounds(), Vec::new(), 0);
        assert!(state.contains(Vec2::new(0.0, 0.0)));
        assert!(state.contains(Vec2::new(640.0, 480.0)));
        assert!(!state.contains(Vec2::new(-1.0, 10.0)));
        assert!(!state.contains(Vec2::new(10.0, 481.0)));
    }
}
