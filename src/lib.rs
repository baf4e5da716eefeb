//! # shoal
//!
//! A live-tunable water scene: fish drift over a rolling current and the
//! user clicks to catch them.
//!
//! The crate splits into a headless core and a native host:
//!
//! - **Core**: [`params`] (live-tunable numeric parameters), [`simulation`]
//!   (fish and water update), [`render`] (recording shapes onto any
//!   [`canvas::Canvas`]),
//!   [`interaction`] (click-to-capture) and [`scene`] (the lifecycle that
//!   composes them). None of it needs a window or a GPU.
//! - **Host**: [`window`], [`gpu`], [`input`] and [`time`] open a winit
//!   window, draw each frame's shapes with an instanced wgpu pipeline and
//!   feed pointer presses back into the scene.
//!
//! ## Quick Start
//!
//! ```ignore
//! use shoal::prelude::*;
//!
//! fn main() -> Result<(), RunError> {
//!     shoal::run(RunConfig::new().with_size(960, 640))
//! }
//! ```
//!
//! ## Headless
//!
//! ```ignore
//! use shoal::prelude::*;
//!
//! let store = water::init_parameter_store();
//! let mut scene = water::create_sketch(store.clone())
//!     .with_config(SceneConfig::new().with_seed(1))
//!     .build();
//!
//! let slot = CanvasSlot::new("offscreen", 640, 480);
//! scene.setup(&slot)?;
//! store.set("speed", 6.0)?;
//! scene.tick(1.0 / 60.0)?;
//! println!("{} shapes this frame", scene.canvas().map_or(0, |f| f.len()));
//! ```
//!
//! ## Parameters
//!
//! Every preset declares its numeric parameters up front (bounds, step,
//! default). The store clamps writes into bounds and the scene reads a
//! snapshot once per frame, so a change always lands on a frame boundary.
//!
//! ## Feature Flags
//!
//! - `egui`: a debug panel with one slider per parameter, toggled with `D`
//!   or opened at startup with `--debug`.

pub mod canvas;
pub mod error;
pub mod field;
pub mod fish;
pub mod gpu;
pub mod input;
pub mod interaction;
#[cfg(feature = "egui")]
pub mod panel;
pub mod params;
pub mod preset;
pub mod render;
pub mod scene;
pub mod simulation;
pub mod spawn;
pub mod stage;
pub mod time;
pub mod window;

pub use glam::Vec2;
pub use window::{run, RunConfig};

/// Common imports.
pub mod prelude {
    pub use crate::canvas::{Canvas, DrawList, Rgba};
    pub use crate::error::{ParameterError, RunError, SceneError};
    pub use crate::fish::Fish;
    pub use crate::input::MouseButton;
    pub use crate::interaction::{Capture, Hit};
    pub use crate::params::{ParamSnapshot, ParameterDef, ParameterDefs, ParameterStore};
    pub use crate::preset::{water, PresetId};
    pub use crate::scene::{
        create_sketch, CanvasSlot, Scene, SceneConfig, SceneFactory, SceneInput, SceneState,
    };
    pub use crate::simulation::{SimParams, SimulationState};
    pub use crate::stage::Stage;
    pub use crate::window::{run, RunConfig};
    pub use crate::Vec2;
}
