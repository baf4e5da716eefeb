//! Ambient water motion.
//!
//! The water is not simulated as a fluid. It is a sum of a few travelling
//! sine waves evaluated on demand, so every sample is a pure function of
//! `(time, position, scale)`. The field keeps nothing but its clock.
//!
//! Two views of the same waves are exposed:
//!
//! - [`WaterField::height`]: scalar swell in `[-1, 1]`, used to shade the
//!   background bands.
//! - [`WaterField::current`]: a 2D drift vector (unit-ish magnitude) that
//!   pushes fish around. Multiply by a speed and the turbulence parameter
//!   before applying it.

use glam::Vec2;

/// One travelling wave component.
#[derive(Clone, Copy, Debug)]
struct Wave {
    /// Direction of travel, radians.
    angle: f32,
    /// Spatial frequency multiplier relative to the field scale.
    frequency: f32,
    /// Temporal frequency in radians per second.
    speed: f32,
    /// Relative contribution.
    weight: f32,
}

const WAVES: [Wave; 4] = [
    Wave {
        angle: 0.35,
        frequency: 1.0,
        speed: 0.9,
        weight: 1.0,
    },
    Wave {
        angle: 2.10,
        frequency: 1.7,
        speed: 1.3,
        weight: 0.6,
    },
    Wave {
        angle: 4.05,
        frequency: 0.6,
        speed: 0.5,
        weight: 0.8,
    },
    Wave {
        angle: 5.50,
        frequency: 2.9,
        speed: 2.2,
        weight: 0.3,
    },
];

/// Share of the along-wave push in the current, relative to the cross-wave
/// swirl.
const ALONG_SHARE: f32 = 0.35;

/// Time-driven water field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaterField {
    time: f32,
}

impl WaterField {
    pub fn new() -> Self {
        Self::default()
    }

    /// A field frozen at a given time. Useful for sampling and tests.
    pub fn at_time(time: f32) -> Self {
        Self { time }
    }

    /// Advance the wave clock. Negative or non-finite steps are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Normalized swell at `pos`, in `[-1, 1]`.
    ///
    /// `scale` is the base spatial frequency in radians per pixel.
    pub fn height(&self, pos: Vec2, scale: f32) -> f32 {
        let mut sum = 0.0;
        for wave in &WAVES {
            sum += wave.weight * self.phase(wave, pos, scale).sin();
        }
        sum / total_weight()
    }

    /// Drift vector at `pos`. Magnitude never exceeds `1 + ALONG_SHARE`.
    pub fn current(&self, pos: Vec2, scale: f32) -> Vec2 {
        let mut flow = Vec2::ZERO;
        for wave in &WAVES {
            let dir = Vec2::from_angle(wave.angle);
            let theta = self.phase(wave, pos, scale);
            flow += dir.perp() * (theta.cos() * wave.weight);
            flow += dir * (theta.sin() * wave.weight * ALONG_SHARE);
        }
        flow / total_weight()
    }

    fn phase(&self, wave: &Wave, pos: Vec2, scale: f32) -> f32 {
        let dir = Vec2::from_angle(wave.angle);
        dir.dot(pos) * scale * wave.frequency + self.time * wave.speed
    }
}

fn total_weight() -> f32 {
    WAVES.iter().map(|w| w.weight).sum()
}
