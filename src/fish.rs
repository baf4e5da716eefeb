//! Fish entities.

use crate::spawn::SpawnContext;
use glam::Vec2;

/// A fish swimming in the water scene.
///
/// Positions are canvas pixels, velocities pixels per second. `size` is the
/// body half-length and doubles as the base capture radius.
#[derive(Clone, Debug, PartialEq)]
pub struct Fish {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Swim direction in radians; the body is drawn along it.
    pub heading: f32,
    pub size: f32,
    /// Body hue in `[0, 1)`.
    pub hue: f32,
    /// Tail oscillation phase in radians.
    pub tail_phase: f32,
    alive: bool,
}

impl Fish {
    /// A live fish at rest, facing `heading`.
    pub fn new(id: u32, position: Vec2, heading: f32, size: f32) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            heading,
            size,
            hue: 0.08,
            tail_phase: 0.0,
            alive: true,
        }
    }

    /// Place a fish at a random spot with a random heading and a size within
    /// 25% of `base_size`, already cruising at `cruise_speed`.
    pub fn spawn(ctx: &mut SpawnContext<'_>, base_size: f32, cruise_speed: f32) -> Self {
        let size = base_size * ctx.random_range(0.75, 1.25);
        let position = ctx.random_in_canvas(size);
        let heading = ctx.random_angle();

        let mut fish = Fish::new(ctx.index, position, heading, size);
        fish.velocity = Vec2::from_angle(heading) * cruise_speed;
        fish.hue = pick_hue(ctx.random());
        fish.tail_phase = ctx.random_angle();
        fish
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Remove the fish from the live set.
    ///
    /// Returns `false` if it was already captured.
    pub(crate) fn mark_captured(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    /// Radius within which a click captures this fish.
    #[inline]
    pub fn capture_radius(&self, capture_scale: f32) -> f32 {
        self.size * capture_scale
    }

    /// Describe the first non-finite field, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        if !self.position.is_finite() {
            Some("position")
        } else if !self.velocity.is_finite() {
            Some("velocity")
        } else if !self.heading.is_finite() {
            Some("heading")
        } else if !self.tail_phase.is_finite() {
            Some("tail phase")
        } else {
            None
        }
    }
}

/// Koi-ish palette: mostly oranges and golds with the odd pale or red fish.
fn pick_hue(t: f32) -> f32 {
    let hue = if t < 0.6 {
        0.04 + t * 0.1
    } else if t < 0.85 {
        0.12 + (t - 0.6) * 0.2
    } else {
        0.97 + (t - 0.85) * 0.2
    };
    hue.fract()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_capture_once() {
        let mut fish = Fish::new(0, Vec2::new(10.0, 10.0), 0.0, 12.0);
        assert!(fish.is_alive());
        assert!(fish.mark_captured());
        assert!(!fish.is_alive());
        assert!(!fish.mark_captured());
    }

    #[test]
    fn test_capture_radius_scales_with_size() {
        let fish = Fish::new(0, Vec2::ZERO, 0.0, 15.0);
        assert_eq!(fish.capture_radius(1.0), 15.0);
        assert_eq!(fish.capture_radius(2.0), 30.0);
    }

    #[test]
    fn test_spawn_within_canvas() {
        let mut rng = SmallRng::seed_from_u64(11);
        let bounds = Vec2::new(400.0, 300.0);
        for i in 0..30 {
            let mut ctx = SpawnContext::new(i, bounds, &mut rng);
            let fish = Fish::spawn(&mut ctx, 14.0, 60.0);
            assert_eq!(fish.id, i);
            assert!(fish.size >= 14.0 * 0.75 && fish.size <= 14.0 * 1.25);
            assert!(fish.position.x >= 0.0 && fish.position.x <= bounds.x);
            assert!(fish.position.y >= 0.0 && fish.position.y <= bounds.y);
            assert!((fish.velocity.length() - 60.0).abs() < 1e-3);
            assert!((0.0..1.0).contains(&fish.hue));
        }
    }

    #[test]
    fn test_non_finite_detection() {
        let mut fish = Fish::new(1, Vec2::ZERO, 0.0, 10.0);
        assert_eq!(fish.non_finite_field(), None);
        fish.velocity.y = f32::NAN;
        assert_eq!(fish.non_finite_field(), Some("velocity"));
        fish.position.x = f32::INFINITY;
        assert_eq!(fish.non_finite_field(), Some("position"));
    }
}
