//! Input handling for the window host.
//!
//! [`Input`] turns raw winit window events into two things: per-frame key
//! and button state the host polls for its shortcuts, and a queue of
//! [`SceneInput`] events already mapped from window pixels into canvas
//! pixels.
//!
//! The canvas is drawn letterboxed: scaled uniformly to fit the window and
//! centred. [`Viewport`] owns that mapping so the presenter and the pointer
//! agree on where the canvas is.

use crate::scene::SceneInput;
use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

/// The keys the host binds, plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    Escape,
    D,
    R,
    S,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::KeyD => KeyCode::D,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::KeyS => KeyCode::S,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Where a canvas of fixed size lands inside a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub window: (u32, u32),
    pub canvas: (u32, u32),
}

impl Viewport {
    pub fn new(window: (u32, u32), canvas: (u32, u32)) -> Self {
        Self { window, canvas }
    }

    /// Uniform scale and top-left offset of the canvas, in window pixels.
    pub fn fit(&self) -> (f32, Vec2) {
        let window = Vec2::new(self.window.0 as f32, self.window.1 as f32);
        let canvas = Vec2::new(self.canvas.0 as f32, self.canvas.1 as f32);
        if canvas.x <= 0.0 || canvas.y <= 0.0 || window.x <= 0.0 || window.y <= 0.0 {
            return (1.0, Vec2::ZERO);
        }
        let scale = (window.x / canvas.x).min(window.y / canvas.y);
        let offset = (window - canvas * scale) * 0.5;
        (scale, offset)
    }

    /// Map a window position to canvas pixels.
    ///
    /// Returns `None` for points in the letterbox bars.
    pub fn to_canvas(&self, window_pos: Vec2) -> Option<Vec2> {
        let (scale, offset) = self.fit();
        let p = (window_pos - offset) / scale;
        let inside = p.x >= 0.0
            && p.y >= 0.0
            && p.x <= self.canvas.0 as f32
            && p.y <= self.canvas.1 as f32;
        inside.then_some(p)
    }
}

/// Input state tracking for keyboard and mouse.
#[derive(Debug)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    /// Cursor in window pixels.
    cursor: Vec2,
    viewport: Viewport,

    pending: Vec<SceneInput>,
}

impl Input {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: HashSet::new(),
            cursor: Vec2::ZERO,
            viewport,
            pending: Vec::new(),
        }
    }

    /// Check if a key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Cursor position in canvas pixels, if it is over the canvas.
    pub fn cursor_on_canvas(&self) -> Option<Vec2> {
        self.viewport.to_canvas(self.cursor)
    }

    /// Scene events gathered since the last call.
    pub fn take_scene_events(&mut self) -> Vec<SceneInput> {
        std::mem::take(&mut self.pending)
    }

    /// Clear per-frame state. Held keys persist.
    pub(crate) fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.viewport.window = (width, height);
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(KeyCode::from(code)),
                        ElementState::Released => self.release_key(KeyCode::from(code)),
                    }
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => self.press_button(MouseButton::from(*button)),
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            _ => {}
        }
    }

    fn press_key(&mut self, key: KeyCode) {
        // Key repeat does not count as a fresh press.
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    /// Presses over the letterbox bars are dropped.
    fn press_button(&mut self, button: MouseButton) {
        if let Some(position) = self.cursor_on_canvas() {
            self.pending.push(SceneInput::PointerPressed { position, button });
        }
    }

    fn move_cursor(&mut self, position: Vec2) {
        self.cursor = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_same_size() {
        let vp = Viewport::new((800, 600), (800, 600));
        assert_eq!(vp.fit(), (1.0, Vec2::ZERO));
        assert_eq!(vp.to_canvas(Vec2::new(10.0, 20.0)), Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_viewport_letterbox() {
        // Window twice as wide: bars left and right.
        let vp = Viewport::new((1600, 600), (800, 600));
        let (scale, offset) = vp.fit();
        assert_eq!(scale, 1.0);
        assert_eq!(offset, Vec2::new(400.0, 0.0));
        assert_eq!(vp.to_canvas(Vec2::new(400.0, 0.0)), Some(Vec2::ZERO));
        assert_eq!(vp.to_canvas(Vec2::new(100.0, 300.0)), None);
    }

    #[test]
    fn test_viewport_scaled() {
        let vp = Viewport::new((1600, 1200), (800, 600));
        assert_eq!(vp.to_canvas(Vec2::new(200.0, 400.0)), Some(Vec2::new(100.0, 200.0)));
    }

    #[test]
    fn test_key_pressed_once() {
        let mut input = Input::new(Viewport::new((800, 600), (800, 600)));
        input.press_key(KeyCode::Space);
        assert!(input.key_pressed(KeyCode::Space));

        input.begin_frame();
        input.press_key(KeyCode::Space); // repeat
        assert!(!input.key_pressed(KeyCode::Space));

        input.release_key(KeyCode::Space);
        input.press_key(KeyCode::Space);
        assert!(input.key_pressed(KeyCode::Space));
    }

    #[test]
    fn test_press_queues_scene_event() {
        let mut input = Input::new(Viewport::new((1600, 1200), (800, 600)));
        input.move_cursor(Vec2::new(210.0, 216.0));
        input.press_button(MouseButton::Left);

        let events = input.take_scene_events();
        assert_eq!(
            events,
            vec![SceneInput::PointerPressed {
                position: Vec2::new(105.0, 108.0),
                button: MouseButton::Left,
            }]
        );
        assert!(input.take_scene_events().is_empty());
    }

    #[test]
    fn test_press_in_letterbox_not_forwarded() {
        let mut input = Input::new(Viewport::new((1600, 600), (800, 600)));
        input.move_cursor(Vec2::new(50.0, 50.0));
        input.press_button(MouseButton::Left);
        assert!(input.take_scene_events().is_empty());
    }
}
