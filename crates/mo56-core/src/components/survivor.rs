//! Survivor components: identity, body, movement and surroundings.
//!
//! The metabolic state itself is the [`MetabolicSimulator`] from
//! `mo56-logic`, attached to the entity as-is.
//!
//! [`MetabolicSimulator`]: mo56_logic::metabolism::MetabolicSimulator

use mo56_logic::metabolism::{ActivityInputs, EnvironmentInputs};
use serde::{Deserialize, Serialize};

/// Marks an entity as a survivor and carries its unloaded body mass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Survivor {
    /// `None` when no figure was supplied; the metabolism falls back to its
    /// default mass.
    pub body_mass_kg: Option<f32>,
}

/// Display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the survivor is doing right now.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Activity(pub ActivityInputs);

impl Activity {
    /// Resting in place.
    pub fn resting(body_mass_kg: Option<f32>) -> Self {
        Self(ActivityInputs {
            body_mass_kg,
            ..ActivityInputs::default()
        })
    }
}

/// Where the survivor is: ambient temperature and altitude.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Exposure(pub EnvironmentInputs);
