//! Frame clock for the host loop.
//!
//! Elapsed time is the sum of the deltas actually handed to the scene, so it
//! stops while paused. Each delta is clamped to [`MAX_DELTA`]: a window drag
//! or a breakpoint must not teleport the fish.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! loop {
//!     let dt = clock.tick();
//!     stage.tick(dt)?;
//! }
//! ```

use std::time::{Duration, Instant};

/// Ceiling on a single frame's delta, seconds.
pub const MAX_DELTA: f32 = 0.1;

const FPS_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    elapsed: f32,
    frame: u64,
    fps: f32,
    fps_frames: u64,
    fps_since: Instant,
    paused: bool,
    fixed_delta: Option<f32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            last_frame: now,
            elapsed: 0.0,
            frame: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_since: now,
            paused: false,
            fixed_delta: None,
        }
    }

    /// Use a constant delta instead of wall-clock time. Non-positive or
    /// non-finite values fall back to wall-clock time.
    pub fn with_fixed_delta(mut self, delta: Option<f32>) -> Self {
        self.fixed_delta = delta.filter(|d| d.is_finite() && *d > 0.0);
        self
    }

    /// Advance one frame and return the delta the scene should integrate.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame += 1;

        let since = now.saturating_duration_since(self.fps_since);
        if since >= FPS_WINDOW {
            self.fps = (self.frame - self.fps_frames) as f32 / since.as_secs_f32();
            self.fps_frames = self.frame;
            self.fps_since = now;
        }

        let delta = if self.paused {
            0.0
        } else {
            self.fixed_delta.unwrap_or(raw).min(MAX_DELTA)
        };
        self.elapsed += delta;
        delta
    }

    /// Scene seconds elapsed, pauses excluded.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Frames ticked, paused ones included.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::debug!("clock {}", if self.paused { "paused" } else { "resumed" });
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_tick_measures_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let dt = clock.tick_at(start + ms(20));
        assert!((dt - 0.02).abs() < 1e-4);
        assert_eq!(clock.frame(), 1);
        assert!((clock.elapsed() - 0.02).abs() < 1e-4);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start + ms(3000)), MAX_DELTA);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + ms(16));
        let before = clock.elapsed();

        clock.toggle_pause();
        assert_eq!(clock.tick_at(start + ms(32)), 0.0);
        assert_eq!(clock.elapsed(), before);
        assert_eq!(clock.frame(), 2);

        clock.toggle_pause();
        assert!(clock.tick_at(start + ms(48)) > 0.0);
    }

    #[test]
    fn test_fixed_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start).with_fixed_delta(Some(0.01));
        assert_eq!(clock.tick_at(start + ms(500)), 0.01);
        assert_eq!(clock.tick_at(start + ms(501)), 0.01);
        assert!((clock.elapsed() - 0.02).abs() < 1e-6);

        let mut capped = FrameClock::starting_at(start).with_fixed_delta(Some(0.5));
        assert_eq!(capped.tick_at(start + ms(16)), MAX_DELTA);
    }

    #[test]
    fn test_invalid_fixed_delta_uses_wall_clock() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start).with_fixed_delta(Some(f32::NAN));
        assert!((clock.tick_at(start + ms(20)) - 0.02).abs() < 1e-4);
        let mut clock = FrameClock::starting_at(start).with_fixed_delta(Some(-1.0));
        assert!((clock.tick_at(start + ms(20)) - 0.02).abs() < 1e-4);
    }

    #[test]
    fn test_fps_updates_after_window() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        for i in 1..=30 {
            clock.tick_at(start + ms(i * 20));
        }
        assert!(clock.fps() > 45.0 && clock.fps() < 55.0);
    }
}
