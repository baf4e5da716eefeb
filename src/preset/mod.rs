//! Preset registry.
//!
//! Each preset is a sketch plus its parameter definitions. Only the water
//! sketch exists today; the stage addresses it by [`PresetId`] rather than by
//! sniffing which exports a module happens to provide.

pub mod water;

use crate::params::{ParameterDefs, ParameterStore};
use crate::scene::SceneFactory;
use std::fmt;
use std::str::FromStr;

/// Identifies a preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PresetId {
    #[default]
    Water,
}

impl PresetId {
    pub const ALL: [PresetId; 1] = [PresetId::Water];

    /// Registry key, also accepted on the command line.
    pub fn key(self) -> &'static str {
        match self {
            PresetId::Water => "default",
        }
    }

    pub fn preset(self) -> Preset {
        match self {
            PresetId::Water => Preset {
                id: self,
                name: "Water Sketch",
                title: "this is a water sketch",
                parameter_defs: water::numeric_parameter_defs,
                init_store: water::init_parameter_store,
                create_sketch: water::create_sketch,
            },
        }
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PresetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetId::ALL
            .into_iter()
            .find(|id| id.key() == s)
            .ok_or_else(|| format!("unknown preset '{}'", s))
    }
}

/// A registered sketch and its exports.
#[derive(Clone, Copy)]
pub struct Preset {
    pub id: PresetId,
    pub name: &'static str,
    /// Window title while the preset is active.
    pub title: &'static str,
    parameter_defs: fn() -> ParameterDefs,
    init_store: fn() -> ParameterStore,
    create_sketch: fn(ParameterStore) -> SceneFactory,
}

impl Preset {
    pub fn parameter_defs(&self) -> ParameterDefs {
        (self.parameter_defs)()
    }

    pub fn init_store(&self) -> ParameterStore {
        (self.init_store)()
    }

    pub fn create_sketch(&self, store: ParameterStore) -> SceneFactory {
        (self.create_sketch)(store)
    }
}

impl fmt::Debug for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preset")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_is_default() {
        assert_eq!(PresetId::default(), PresetId::Water);
        assert_eq!(PresetId::Water.key(), "default");
        assert_eq!("default".parse::<PresetId>(), Ok(PresetId::Water));
        assert!("ocean".parse::<PresetId>().is_err());
    }

    #[test]
    fn test_preset_exports() {
        let preset = PresetId::Water.preset();
        assert_eq!(preset.name, "Water Sketch");
        assert_eq!(preset.title, "this is a water sketch");

        let defs = preset.parameter_defs();
        let store = preset.init_store();
        for def in defs.iter() {
            assert_eq!(store.get(def.key).unwrap(), def.default_value);
        }
    }
}
