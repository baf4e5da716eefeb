//! Live-tunable numeric parameters.
//!
//! A preset declares a fixed set of [`ParameterDef`]s. From those a
//! [`ParameterStore`] is built, one value per key, starting at each
//! definition's default. The store is a cheap-clone handle: the control panel
//! writes through one clone while the running scene reads through another.
//!
//! The scene never reads the store mid-frame. It takes a [`ParamSnapshot`] at
//! the start of each tick, so a slider move lands on the next frame as a
//! whole.
//!
//! # Example
//!
//! ```ignore
//! let defs = ParameterDefs::new(vec![ParameterDef::new("speed", 0.0, 10.0, 0.1, 2.0)])?;
//! let store = defs.init_store();
//!
//! assert_eq!(store.set("speed", 15.0)?, 10.0); // clamped to max
//! let frame = store.snapshot();
//! assert_eq!(frame.get("speed")?, 10.0);
//! ```

use crate::error::ParameterError;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Bounds, step and default for one numeric parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterDef {
    /// Unique name, also the label shown by the control panel.
    pub key: &'static str,
    pub min: f32,
    pub max: f32,
    /// Slider increment. Stored values are not snapped to it.
    pub step: f32,
    pub default_value: f32,
}

impl ParameterDef {
    pub const fn new(key: &'static str, min: f32, max: f32, step: f32, default_value: f32) -> Self {
        Self {
            key,
            min,
            max,
            step,
            default_value,
        }
    }

    /// Clamp a value into `[min, max]`.
    ///
    /// Infinities clamp to the nearest bound. `NaN` yields `None`.
    pub fn clamp(&self, value: f32) -> Option<f32> {
        if value.is_nan() {
            None
        } else {
            Some(value.clamp(self.min, self.max))
        }
    }

    /// Snap a value to the step grid anchored at `min`, then clamp.
    ///
    /// Used by slider widgets; [`ParameterStore::set`] does not quantize.
    pub fn quantize(&self, value: f32) -> f32 {
        let clamped = self.clamp(value).unwrap_or(self.default_value);
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    fn validate(&self) -> Result<(), ParameterError> {
        let invalid = |reason: &str| ParameterError::InvalidDefinition {
            key: self.key.to_string(),
            reason: reason.to_string(),
        };

        if self.key.is_empty() {
            return Err(invalid("key is empty"));
        }
        if !(self.min.is_finite()
            && self.max.is_finite()
            && self.step.is_finite()
            && self.default_value.is_finite())
        {
            return Err(invalid("bounds, step and default must be finite"));
        }
        if self.min > self.max {
            return Err(invalid("min exceeds max"));
        }
        if self.step <= 0.0 {
            return Err(invalid("step must be positive"));
        }
        if self.default_value < self.min || self.default_value > self.max {
            return Err(invalid("default lies outside [min, max]"));
        }
        Ok(())
    }
}

/// The full, immutable set of parameter definitions for a preset.
///
/// Iteration follows declaration order so panels list controls stably.
#[derive(Clone, Debug)]
pub struct ParameterDefs {
    defs: Vec<ParameterDef>,
    indices: HashMap<&'static str, usize>,
}

impl ParameterDefs {
    /// Validate and index a list of definitions.
    pub fn new(defs: Vec<ParameterDef>) -> Result<Self, ParameterError> {
        let mut indices = HashMap::with_capacity(defs.len());
        for (idx, def) in defs.iter().enumerate() {
            def.validate()?;
            if indices.insert(def.key, idx).is_some() {
                return Err(ParameterError::InvalidDefinition {
                    key: def.key.to_string(),
                    reason: "duplicate key".to_string(),
                });
            }
        }
        Ok(Self { defs, indices })
    }

    /// Look up a definition by key.
    pub fn get(&self, key: &str) -> Option<&ParameterDef> {
        self.indices.get(key).map(|&idx| &self.defs[idx])
    }

    /// Position of `key` in declaration order.
    pub fn index_of(&self, key: &str) -> Result<usize, ParameterError> {
        self.indices
            .get(key)
            .copied()
            .ok_or_else(|| ParameterError::UnknownParameter(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterDef> {
        self.defs.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.iter().map(|d| d.key)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Build a fresh store with every key at its default value.
    pub fn init_store(&self) -> ParameterStore {
        ParameterStore::new(self.clone())
    }
}

struct Shared {
    defs: Rc<ParameterDefs>,
    values: Vec<Cell<f32>>,
}

/// Shared, mutable key → value mapping.
///
/// Cloning yields another handle onto the same values. There is no access
/// control: the last writer wins. The handle is `!Send`; the host, the panel
/// and the scene all live on the event-loop thread.
#[derive(Clone)]
pub struct ParameterStore {
    shared: Rc<Shared>,
}

impl ParameterStore {
    fn new(defs: ParameterDefs) -> Self {
        let values = defs.iter().map(|d| Cell::new(d.default_value)).collect();
        Self {
            shared: Rc::new(Shared {
                defs: Rc::new(defs),
                values,
            }),
        }
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Result<f32, ParameterError> {
        let idx = self.shared.defs.index_of(key)?;
        Ok(self.shared.values[idx].get())
    }

    /// Clamp `value` into the key's bounds and store it.
    ///
    /// Returns the value actually stored. A `NaN` write is ignored and the
    /// current value is returned unchanged.
    pub fn set(&self, key: &str, value: f32) -> Result<f32, ParameterError> {
        let idx = self.shared.defs.index_of(key)?;
        let def = &self.shared.defs.defs[idx];
        let cell = &self.shared.values[idx];

        match def.clamp(value) {
            Some(clamped) => {
                if clamped != value {
                    log::debug!("parameter '{}' clamped from {} to {}", key, value, clamped);
                }
                cell.set(clamped);
                Ok(clamped)
            }
            None => {
                log::warn!("ignoring NaN write to parameter '{}'", key);
                Ok(cell.get())
            }
        }
    }

    /// Restore every value to its default, in place.
    pub fn reset(&self) {
        for (def, cell) in self.shared.defs.iter().zip(&self.shared.values) {
            cell.set(def.default_value);
        }
    }

    /// Copy out all current values for one frame.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            defs: Rc::clone(&self.shared.defs),
            values: self.shared.values.iter().map(Cell::get).collect(),
        }
    }

    pub fn definitions(&self) -> &ParameterDefs {
        &self.shared.defs
    }

    /// `(definition, current value)` pairs in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&ParameterDef, f32)> {
        self.shared
            .defs
            .iter()
            .zip(&self.shared.values)
            .map(|(def, cell)| (def, cell.get()))
    }

    /// Whether two handles point at the same underlying values.
    pub fn shares_values_with(&self, other: &ParameterStore) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries().map(|(def, value)| (def.key, value)))
            .finish()
    }
}

/// Parameter values frozen at a frame boundary.
#[derive(Clone, Debug)]
pub struct ParamSnapshot {
    defs: Rc<ParameterDefs>,
    values: Vec<f32>,
}

impl ParamSnapshot {
    pub fn get(&self, key: &str) -> Result<f32, ParameterError> {
        let idx = self.defs.index_of(key)?;
        Ok(self.values[idx])
    }

    pub fn definitions(&self) -> &ParameterDefs {
        &self.defs
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

impl PartialEq for ParamSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.defs.keys().eq(other.defs.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed_defs() -> ParameterDefs {
        ParameterDefs::new(vec![ParameterDef::new("speed", 0.0, 10.0, 0.1, 2.0)]).unwrap()
    }

    #[test]
    fn test_init_store_uses_defaults() {
        let defs = ParameterDefs::new(vec![
            ParameterDef::new("speed", 0.0, 10.0, 0.1, 2.0),
            ParameterDef::new("size", 1.0, 50.0, 1.0, 12.0),
        ])
        .unwrap();
        let store = defs.init_store();

        for def in defs.iter() {
            assert_eq!(store.get(def.key).unwrap(), def.default_value);
        }
    }

    #[test]
    fn test_set_clamps_to_bounds() {
        let store = speed_defs().init_store();
        assert_eq!(store.get("speed").unwrap(), 2.0);

        assert_eq!(store.set("speed", 15.0).unwrap(), 10.0);
        assert_eq!(store.get("speed").unwrap(), 10.0);

        assert_eq!(store.set("speed", -3.0).unwrap(), 0.0);
        assert_eq!(store.get("speed").unwrap(), 0.0);

        assert_eq!(store.set("speed", 4.25).unwrap(), 4.25);
    }

    #[test]
    fn test_set_matches_clamp_for_many_values() {
        let store = speed_defs().init_store();
        for v in [-1e9, -0.5, 0.0, 0.05, 3.3, 9.99, 10.0, 10.01, 1e9] {
            store.set("speed", v).unwrap();
            assert_eq!(store.get("speed").unwrap(), v.clamp(0.0, 10.0));
        }
    }

    #[test]
    fn test_non_finite_writes() {
        let store = speed_defs().init_store();
        assert_eq!(store.set("speed", f32::INFINITY).unwrap(), 10.0);
        assert_eq!(store.set("speed", f32::NEG_INFINITY).unwrap(), 0.0);
        store.set("speed", 5.0).unwrap();
        assert_eq!(store.set("speed", f32::NAN).unwrap(), 5.0);
        assert_eq!(store.get("speed").unwrap(), 5.0);
    }

    #[test]
    fn test_unknown_key() {
        let store = speed_defs().init_store();
        assert_eq!(
            store.get("depth"),
            Err(ParameterError::UnknownParameter("depth".into()))
        );
        assert_eq!(
            store.set("depth", 1.0),
            Err(ParameterError::UnknownParameter("depth".into()))
        );
        assert!(store.snapshot().get("depth").is_err());
    }

    #[test]
    fn test_clones_share_values() {
        let store = speed_defs().init_store();
        let panel = store.clone();
        panel.set("speed", 7.0).unwrap();
        assert_eq!(store.get("speed").unwrap(), 7.0);
        assert!(store.shares_values_with(&panel));

        let fresh = speed_defs().init_store();
        assert!(!fresh.shares_values_with(&store));
        assert_eq!(fresh.get("speed").unwrap(), 2.0);
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let store = speed_defs().init_store();
        let frame = store.snapshot();
        store.set("speed", 9.0).unwrap();
        assert_eq!(frame.get("speed").unwrap(), 2.0);
        assert_eq!(store.snapshot().get("speed").unwrap(), 9.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let store = speed_defs().init_store();
        store.set("speed", 8.0).unwrap();
        store.reset();
        assert_eq!(store.get("speed").unwrap(), 2.0);
    }

    #[test]
    fn test_invalid_definitions_rejected() {
        let cases = [
            ParameterDef::new("a", 5.0, 1.0, 0.1, 2.0),
            ParameterDef::new("b", 0.0, 1.0, 0.0, 0.5),
            ParameterDef::new("c", 0.0, 1.0, 0.1, 2.0),
            ParameterDef::new("d", 0.0, f32::NAN, 0.1, 0.5),
            ParameterDef::new("", 0.0, 1.0, 0.1, 0.5),
        ];
        for def in cases {
            assert!(matches!(
                ParameterDefs::new(vec![def]),
                Err(ParameterError::InvalidDefinition { .. })
            ));
        }
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = ParameterDefs::new(vec![
            ParameterDef::new("speed", 0.0, 1.0, 0.1, 0.5),
            ParameterDef::new("speed", 0.0, 2.0, 0.1, 0.5),
        ]);
        assert!(matches!(result, Err(ParameterError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_quantize_snaps_to_step() {
        let def = ParameterDef::new("count", 1.0, 60.0, 1.0, 18.0);
        assert_eq!(def.quantize(17.6), 18.0);
        assert_eq!(def.quantize(100.0), 60.0);
        assert_eq!(def.quantize(f32::NAN), 18.0);
    }

    #[test]
    fn test_declaration_order() {
        let defs = ParameterDefs::new(vec![
            ParameterDef::new("z", 0.0, 1.0, 0.1, 0.0),
            ParameterDef::new("a", 0.0, 1.0, 0.1, 0.0),
        ])
        .unwrap();
        assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(defs.index_of("a").unwrap(), 1);
    }
}
