//! Render pass for the water scene.
//!
//! Reads the simulation, never mutates it. Every call repaints the whole
//! frame: by default the background is cleared, but when the `trails`
//! parameter is above zero the previous frame is only faded, leaving motion
//! trails behind the fish.

use crate::canvas::{Canvas, Rgba};
use crate::fish::Fish;
use crate::simulation::{Ripple, SimParams, SimulationState};
use glam::Vec2;

pub const DEEP_WATER: Rgba = Rgba::rgb(0.03, 0.16, 0.27);
pub const SHALLOW_WATER: Rgba = Rgba::rgb(0.10, 0.38, 0.50);
const EYE: Rgba = Rgba::rgb(0.05, 0.05, 0.08);
const FOAM: Rgba = Rgba::rgb(0.85, 0.95, 1.0);

/// Size of one background shading cell, pixels.
const BAND_CELL: f32 = 16.0;
/// Opacity of the swell shading over the base water color.
const BAND_ALPHA: f32 = 0.55;
/// Maximum tail swing either side of the body axis, radians.
const TAIL_SWING: f32 = 0.5;

/// Draw one frame of `state` onto `canvas`.
pub fn render<C: Canvas>(state: &SimulationState, params: &SimParams, canvas: &mut C) {
    draw_water(state, params, canvas);

    for ripple in state.ripples() {
        draw_ripple(ripple, canvas);
    }

    for fish in state.live_fish() {
        draw_fish(fish, canvas);
    }
}

fn draw_water<C: Canvas>(state: &SimulationState, params: &SimParams, canvas: &mut C) {
    if params.trails > 0.0 {
        canvas.fade(DEEP_WATER, 1.0 - params.trails.min(1.0));
    } else {
        canvas.fill(DEEP_WATER);
    }

    let (width, height) = canvas.size();
    let water = state.water();
    let alpha = BAND_ALPHA * (1.0 - params.trails.clamp(0.0, 1.0));
    if alpha <= 0.0 {
        return;
    }

    let cols = (width as f32 / BAND_CELL).ceil() as u32;
    let rows = (height as f32 / BAND_CELL).ceil() as u32;
    for row in 0..rows {
        for col in 0..cols {
            let min = Vec2::new(col as f32, row as f32) * BAND_CELL;
            let centre = min + Vec2::splat(BAND_CELL * 0.5);
            let swell = (water.height(centre, params.wave_scale) + 1.0) * 0.5;
            let color = DEEP_WATER.lerp(SHALLOW_WATER, swell).with_alpha(alpha);
            canvas.fill_rect(min, min + Vec2::splat(BAND_CELL), color);
        }
    }
}

/// Body, tail and eye, oriented along the fish heading.
pub fn draw_fish<C: Canvas>(fish: &Fish, canvas: &mut C) {
    let forward = Vec2::from_angle(fish.heading);
    let side = forward.perp();
    let size = fish.size;
    let body = Rgba::from_hsv(fish.hue, 0.75, 0.95);

    let swing = Vec2::from_angle(fish.tail_phase.sin() * TAIL_SWING);
    let tail_axis = swing.rotate(forward);
    let tail_base = fish.position - forward * (size * 0.8);
    let tail_tip = tail_base - tail_axis * (size * 0.7);
    canvas.fill_triangle(
        tail_base,
        tail_tip + tail_axis.perp() * (size * 0.45),
        tail_tip - tail_axis.perp() * (size * 0.45),
        body.lerp(Rgba::BLACK, 0.2),
    );

    canvas.fill_ellipse(fish.position, Vec2::new(size, size * 0.45), fish.heading, body);

    let eye = fish.position + forward * (size * 0.55) + side * (size * 0.15);
    canvas.fill_circle(eye, (size * 0.1).max(1.0), EYE);
}

fn draw_ripple<C: Canvas>(ripple: &Ripple, canvas: &mut C) {
    let t = ripple.progress();
    let radius = 6.0 + t * 40.0;
    let tint = FOAM.lerp(Rgba::from_hsv(ripple.hue, 0.5, 1.0), 0.3);
    canvas.stroke_circle(ripple.position, radius, 2.0, tint.with_alpha(1.0 - t));
}
