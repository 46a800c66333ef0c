//! MO56 Core - Survival Simulation Engine
//!
//! An ECS-based simulation of survivors whose bodies burn energy, heat up,
//! dehydrate and bleed, and who craft tools from what they carry.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Survivors
//! - **Components**: Pure data attached to entities (Activity, Exposure, Skills, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! The rules themselves live in `mo56-logic`; this crate schedules them.
//!
//! # Example
//!
//! ```rust,no_run
//! use mo56_core::prelude::*;
//! use mo56_logic::recipes::RecipeBook;
//! use mo56_logic::tuning::Tuning;
//!
//! let mut engine = SimulationEngine::new(Tuning::default(), RecipeBook::new()).with_seed(56);
//! let _survivor = engine.spawn_survivor("Ada", Some(68.0));
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     for event in engine.drain_events() {
//!         if let SimEvent::VitalsChanged(entity) = event {
//!             let _vitals = engine.vitals(entity);
//!         }
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{EngineError, SimulationEngine};
    pub use crate::systems::SimEvent;
}
