//! Scene controller: composes simulation, rendering and interaction into a
//! frame-loop unit with an explicit lifecycle.
//!
//! ```text
//! Uninitialized --setup--> Running --teardown--> TornDown
//!       \____________________teardown____________^
//! ```
//!
//! A scene is created from a [`SceneFactory`], which only binds the parameter
//! store. Nothing is allocated until [`Scene::setup`] claims a [`CanvasSlot`].
//! Teardown releases the slot, drops the simulation and is safe to call any
//! number of times, in any state. A torn-down scene never runs again.
//!
//! # Example
//!
//! ```ignore
//! let store = water::init_parameter_store();
//! let mut scene = create_sketch(store.clone()).build();
//!
//! let slot = CanvasSlot::new("main", 800, 600);
//! scene.setup(&slot)?;
//! scene.tick(1.0 / 60.0)?;
//!
//! store.set("speed", 5.0)?; // seen on the next tick
//! scene.tick(1.0 / 60.0)?;
//!
//! scene.teardown();
//! ```

use crate::canvas::DrawList;
use crate::error::SceneError;
use crate::input::MouseButton;
use crate::interaction::{self, Capture};
use crate::params::{ParameterDefs, ParameterStore};
use crate::render::render;
use crate::simulation::{SimParams, SimulationState};
use glam::Vec2;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Largest canvas width or height a slot may have. Matches the 2D texture
/// limit every wgpu device guarantees.
pub const MAX_CANVAS_DIMENSION: u32 = 8192;

/// Process-unique scene identity, used to track canvas ownership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

impl SceneId {
    fn next() -> Self {
        SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct SlotInner {
    label: String,
    width: u32,
    height: u32,
    owner: Cell<Option<SceneId>>,
    releases: Cell<u32>,
}

/// The drawable target a scene binds to.
///
/// Clones share ownership state. At most one running scene owns a slot at a
/// time; a new scene can only bind after the previous one released it.
#[derive(Clone)]
pub struct CanvasSlot {
    inner: Rc<SlotInner>,
}

impl CanvasSlot {
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            inner: Rc::new(SlotInner {
                label: label.into(),
                width,
                height,
                owner: Cell::new(None),
                releases: Cell::new(0),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    pub fn owner(&self) -> Option<SceneId> {
        self.inner.owner.get()
    }

    pub fn is_bound(&self) -> bool {
        self.owner().is_some()
    }

    /// How many times a scene has released this slot.
    pub fn release_count(&self) -> u32 {
        self.inner.releases.get()
    }

    fn bind(&self, scene: SceneId) -> Result<(), SceneError> {
        let (width, height) = self.size();
        if width == 0 || height == 0 {
            return Err(SceneError::InvalidCanvasTarget(format!(
                "canvas '{}' has zero size {}x{}",
                self.label(),
                width,
                height
            )));
        }
        if width > MAX_CANVAS_DIMENSION || height > MAX_CANVAS_DIMENSION {
            return Err(SceneError::InvalidCanvasTarget(format!(
                "canvas '{}' is {}x{}, larger than {} pixels per side",
                self.label(),
                width,
                height,
                MAX_CANVAS_DIMENSION
            )));
        }
        match self.owner() {
            Some(owner) if owner != scene => Err(SceneError::InvalidCanvasTarget(format!(
                "canvas '{}' is already bound to scene {}",
                self.label(),
                owner
            ))),
            _ => {
                self.inner.owner.set(Some(scene));
                Ok(())
            }
        }
    }

    fn release(&self, scene: SceneId) -> bool {
        if self.owner() != Some(scene) {
            return false;
        }
        self.inner.owner.set(None);
        self.inner.releases.set(self.inner.releases.get() + 1);
        true
    }
}

impl fmt::Debug for CanvasSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasSlot")
            .field("label", &self.label())
            .field("size", &self.size())
            .field("owner", &self.owner())
            .finish()
    }
}

/// Per-scene settings that are not live-tunable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Fixed RNG seed. `None` picks a fresh one at every setup.
    pub seed: Option<u64>,
    /// Abort on non-finite fish state instead of resetting the fish.
    pub strict_invariants: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            strict_invariants: cfg!(debug_assertions),
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_strict_invariants(mut self, strict: bool) -> Self {
        self.strict_invariants = strict;
        self
    }
}

/// Pointer events a scene reacts to, already mapped to canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneInput {
    PointerPressed { position: Vec2, button: MouseButton },
}

/// Lifecycle position of a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneState {
    Uninitialized,
    Running,
    TornDown,
}

/// A sketch bound to a parameter store, not yet running.
#[derive(Clone, Debug)]
pub struct SceneFactory {
    store: ParameterStore,
    config: SceneConfig,
}

impl SceneFactory {
    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn build(self) -> Scene {
        let id = SceneId::next();
        log::debug!("scene {} created", id);
        Scene {
            id,
            store: self.store,
            config: self.config,
            state: SceneState::Uninitialized,
            slot: None,
            running: None,
        }
    }
}

/// Bind a parameter store to a new water sketch. Does not start anything.
pub fn create_sketch(store: ParameterStore) -> SceneFactory {
    SceneFactory {
        store,
        config: SceneConfig::default(),
    }
}

struct Running {
    simulation: SimulationState,
    canvas: DrawList,
    /// Parameters of the most recent frame; input uses these too.
    params: SimParams,
    frames: u64,
}

/// A water scene and its lifecycle.
pub struct Scene {
    id: SceneId,
    store: ParameterStore,
    config: SceneConfig,
    state: SceneState,
    slot: Option<CanvasSlot>,
    running: Option<Running>,
}

impl Scene {
    /// Bind `slot`, spawn the school and draw the first frame.
    ///
    /// Fails with [`SceneError::InvalidCanvasTarget`] if the slot has zero
    /// size, is larger than [`MAX_CANVAS_DIMENSION`] or belongs to another
    /// scene, or if this scene has already been set up. A failed setup leaves
    /// the scene uninitialized and the slot untouched.
    pub fn setup(&mut self, slot: &CanvasSlot) -> Result<(), SceneError> {
        match self.state {
            SceneState::Uninitialized => {}
            SceneState::Running => {
                return Err(SceneError::InvalidCanvasTarget(format!(
                    "scene {} is already running",
                    self.id
                )))
            }
            SceneState::TornDown => {
                return Err(SceneError::InvalidCanvasTarget(format!(
                    "scene {} was torn down",
                    self.id
                )))
            }
        }

        let params = SimParams::from_snapshot(&self.store.snapshot())?;
        slot.bind(self.id)?;

        let (width, height) = slot.size();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut simulation =
            SimulationState::new(Vec2::new(width as f32, height as f32), &params, seed);
        simulation.set_strict_invariants(self.config.strict_invariants);

        let mut canvas = DrawList::new(width, height);
        render(&simulation, &params, &mut canvas);

        log::debug!(
            "scene {} running on '{}' ({}x{}, {} fish, seed {})",
            self.id,
            slot.label(),
            width,
            height,
            params.fish_count,
            seed
        );

        self.slot = Some(slot.clone());
        self.running = Some(Running {
            simulation,
            canvas,
            params,
            frames: 0,
        });
        self.state = SceneState::Running;
        Ok(())
    }

    /// Advance one frame: snapshot parameters, update, render.
    ///
    /// Does nothing unless the scene is running.
    pub fn tick(&mut self, elapsed: f32) -> Result<(), SceneError> {
        let Some(running) = self.running.as_mut() else {
            return Ok(());
        };

        let params = SimParams::from_snapshot(&self.store.snapshot())?;
        let report = running.simulation.update(elapsed, &params)?;
        if !report.recovered.is_empty() {
            log::warn!(
                "scene {} frame {}: reset {} fish with non-finite state",
                self.id,
                running.frames,
                report.recovered.len()
            );
        }

        render(&running.simulation, &params, &mut running.canvas);
        running.params = params;
        running.frames += 1;

        log::trace!(
            "scene {} frame {} dt={:.4} live={}",
            self.id,
            running.frames,
            report.dt,
            running.simulation.live_count()
        );
        Ok(())
    }

    /// React to pointer input. Ignored unless the scene is running.
    ///
    /// A left press over a fish captures it and returns the capture.
    pub fn input(&mut self, event: SceneInput) -> Option<Capture> {
        let running = self.running.as_mut()?;
        match event {
            SceneInput::PointerPressed {
                position,
                button: MouseButton::Left,
            } => interaction::capture_at(
                &mut running.simulation,
                position,
                running.params.capture_scale,
            ),
            SceneInput::PointerPressed { .. } => None,
        }
    }

    /// Release the canvas and drop the simulation. Idempotent.
    pub fn teardown(&mut self) {
        if self.state == SceneState::TornDown {
            return;
        }
        if let Some(slot) = self.slot.take() {
            slot.release(self.id);
        }
        if let Some(running) = self.running.take() {
            log::debug!(
                "scene {} torn down after {} frames, {} fish captured",
                self.id,
                running.frames,
                running.simulation.captured_count()
            );
        }
        self.state = SceneState::TornDown;
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SceneState::Running
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn simulation(&self) -> Option<&SimulationState> {
        self.running.as_ref().map(|r| &r.simulation)
    }

    /// Mutable simulation access for tools that place fish by hand.
    pub fn simulation_mut(&mut self) -> Option<&mut SimulationState> {
        self.running.as_mut().map(|r| &mut r.simulation)
    }

    /// The most recently rendered frame.
    pub fn canvas(&self) -> Option<&DrawList> {
        self.running.as_ref().map(|r| &r.canvas)
    }

    /// Parameters the last frame ran with.
    pub fn frame_params(&self) -> Option<&SimParams> {
        self.running.as_ref().map(|r| &r.params)
    }

    /// Frames ticked since setup.
    pub fn frame_count(&self) -> u64 {
        self.running.as_ref().map_or(0, |r| r.frames)
    }

    /// The live store this scene reads every frame.
    pub fn parameters(&self) -> &ParameterStore {
        &self.store
    }

    pub fn definitions(&self) -> &ParameterDefs {
        self.store.definitions()
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("frames", &self.frame_count())
            .finish()
    }
}
