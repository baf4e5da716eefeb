//! Spawn context for fish initialization.
//!
//! Provides helper methods to reduce boilerplate when placing fish. The
//! context borrows the simulation's own RNG, so a scene built from the same
//! seed always starts from the same school.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;
use std::f32::consts::TAU;

/// Context handed to the fish spawner with helpers for common patterns.
pub struct SpawnContext<'a> {
    /// Index of the fish being spawned; becomes its id.
    pub index: u32,
    /// Canvas size in pixels.
    pub bounds: Vec2,
    rng: &'a mut SmallRng,
}

impl<'a> SpawnContext<'a> {
    pub(crate) fn new(index: u32, bounds: Vec2, rng: &'a mut SmallRng) -> Self {
        Self { index, bounds, rng }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            min
        } else {
            self.rng.gen_range(min..max)
        }
    }

    /// Random angle in radians.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// Random point inside the canvas, keeping `margin` pixels off each edge.
    ///
    /// Falls back to the canvas centre on an axis too small for the margin.
    pub fn random_in_canvas(&mut self, margin: f32) -> Vec2 {
        let x = self.random_axis(self.bounds.x, margin);
        let y = self.random_axis(self.bounds.y, margin);
        Vec2::new(x, y)
    }

    fn random_axis(&mut self, extent: f32, margin: f32) -> f32 {
        if extent - 2.0 * margin <= 0.0 {
            extent * 0.5
        } else {
            self.rng.gen_range(margin..extent - margin)
        }
    }
}
