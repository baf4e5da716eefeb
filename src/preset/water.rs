//! The water sketch: fish drifting over a rolling current.
//!
//! Exposes the three things every preset provides: its numeric parameter
//! definitions, a store initializer and a sketch factory.

use crate::params::{ParameterDef, ParameterDefs, ParameterStore};
use crate::scene::{self, SceneFactory};

/// Parameter keys read by the water simulation and renderer.
pub mod keys {
    pub const FISH_COUNT: &str = "fish_count";
    pub const FISH_SIZE: &str = "fish_size";
    pub const SPEED: &str = "speed";
    pub const WANDER: &str = "wander";
    pub const TURBULENCE: &str = "turbulence";
    pub const WAVE_SPEED: &str = "wave_speed";
    pub const WAVE_SCALE: &str = "wave_scale";
    pub const CAPTURE_SCALE: &str = "capture_scale";
    pub const TRAILS: &str = "trails";
}

/// Declaration order is the order the debug panel lists sliders in.
const WATER_PARAMETERS: [ParameterDef; 9] = [
    ParameterDef::new(keys::FISH_COUNT, 1.0, 60.0, 1.0, 18.0),
    ParameterDef::new(keys::SPEED, 0.0, 10.0, 0.1, 2.0),
    ParameterDef::new(keys::TURBULENCE, 0.0, 5.0, 0.05, 1.0),
    ParameterDef::new(keys::WAVE_SPEED, 0.0, 4.0, 0.05, 1.0),
    ParameterDef::new(keys::WAVE_SCALE, 0.002, 0.05, 0.001, 0.012),
    ParameterDef::new(keys::FISH_SIZE, 4.0, 40.0, 1.0, 14.0),
    ParameterDef::new(keys::WANDER, 0.0, 4.0, 0.05, 1.0),
    ParameterDef::new(keys::CAPTURE_SCALE, 0.5, 3.0, 0.1, 1.0),
    ParameterDef::new(keys::TRAILS, 0.0, 0.95, 0.05, 0.0),
];

/// The water preset's parameter definitions.
///
/// `fish_count` and `fish_size` take effect at the next activation; the rest
/// are read every frame.
pub fn numeric_parameter_defs() -> ParameterDefs {
    ParameterDefs::new(WATER_PARAMETERS.to_vec()).expect("built-in water parameters are valid")
}

/// A fresh store with every water parameter at its default.
pub fn init_parameter_store() -> ParameterStore {
    numeric_parameter_defs().init_store()
}

/// Bind `store` to a water sketch. Nothing runs until the scene is set up.
pub fn create_sketch(store: ParameterStore) -> SceneFactory {
    scene::create_sketch(store)
}
