//! Composition root: the active preset, its parameter store and its scene.
//!
//! Switching presets is an explicit lifecycle transition. [`Stage::activate`]
//! tears the running scene down, builds a fresh store from the preset's
//! defaults and sets up a new scene on the same canvas slot.

use crate::error::SceneError;
use crate::interaction::Capture;
use crate::params::ParameterStore;
use crate::preset::{Preset, PresetId};
use crate::scene::{CanvasSlot, Scene, SceneConfig, SceneInput};

pub struct Stage {
    slot: CanvasSlot,
    config: SceneConfig,
    active: Option<Active>,
    activations: u32,
}

struct Active {
    preset: Preset,
    store: ParameterStore,
    scene: Scene,
}

impl Stage {
    /// A stage with nothing running yet.
    pub fn new(slot: CanvasSlot, config: SceneConfig) -> Self {
        Self {
            slot,
            config,
            active: None,
            activations: 0,
        }
    }

    /// Tear down whatever is running and start `id` from its defaults.
    ///
    /// On failure the stage is left with no active preset.
    pub fn activate(&mut self, id: PresetId) -> Result<(), SceneError> {
        self.shutdown();

        let preset = id.preset();
        let store = preset.init_store();
        let mut scene = preset
            .create_sketch(store.clone())
            .with_config(self.config)
            .build();
        scene.setup(&self.slot)?;

        self.activations += 1;
        log::info!(
            "activated preset '{}' ({}) on '{}'",
            preset.name,
            id,
            self.slot.label()
        );
        self.active = Some(Active {
            preset,
            store,
            scene,
        });
        Ok(())
    }

    /// Re-activate the current preset with fresh defaults.
    pub fn restart(&mut self) -> Result<(), SceneError> {
        match self.active_preset() {
            Some(id) => self.activate(id),
            None => Ok(()),
        }
    }

    pub fn tick(&mut self, elapsed: f32) -> Result<(), SceneError> {
        match self.active.as_mut() {
            Some(active) => active.scene.tick(elapsed),
            None => Ok(()),
        }
    }

    pub fn input(&mut self, event: SceneInput) -> Option<Capture> {
        self.active.as_mut()?.scene.input(event)
    }

    /// Tear down the running scene, if any. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.scene.teardown();
            log::debug!("deactivated preset '{}'", active.preset.id);
        }
    }

    pub fn active_preset(&self) -> Option<PresetId> {
        self.active.as_ref().map(|a| a.preset.id)
    }

    pub fn preset(&self) -> Option<&Preset> {
        self.active.as_ref().map(|a| &a.preset)
    }

    /// The store the control panel writes to.
    pub fn store(&self) -> Option<&ParameterStore> {
        self.active.as_ref().map(|a| &a.store)
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.active.as_ref().map(|a| &a.scene)
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.active.as_mut().map(|a| &mut a.scene)
    }

    pub fn slot(&self) -> &CanvasSlot {
        &self.slot
    }

    /// Successful activations since the stage was created.
    pub fn activations(&self) -> u32 {
        self.activations
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.shutdown();
    }
}
