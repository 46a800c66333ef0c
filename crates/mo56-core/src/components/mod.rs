//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod crafting;
mod survivor;

pub use crafting::*;
pub use survivor::*;

pub use mo56_logic::metabolism::MetabolicSimulator;
