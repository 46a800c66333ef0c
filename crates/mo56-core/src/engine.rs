//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};
use mo56_logic::inspection::{InspectionError, InspectionParams, InspectionProgress};
use mo56_logic::metabolism::{ActivityInputs, EnvironmentInputs, MetabolicSimulator};
use mo56_logic::recipes::RecipeBook;
use mo56_logic::skills::SkillProvider;
use mo56_logic::station::{CraftError, CraftEvent};
use mo56_logic::status::VitalsSnapshot;
use mo56_logic::tuning::Tuning;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::systems::*;

/// Seconds between metabolism ticks.
pub const METABOLISM_INTERVAL: f64 = 0.25;

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all survivors
    pub world: World,
    /// Simulation time in seconds since start
    sim_time: f64,
    tuning: Tuning,
    recipes: RecipeBook,
    rng: StdRng,
    events: EventQueue,

    // Update timing
    last_metabolism_update: f64,

    // Configuration
    time_scale: f32,
}

impl SimulationEngine {
    /// Create an empty simulation with an entropy-seeded random source
    pub fn new(tuning: Tuning, recipes: RecipeBook) -> Self {
        Self {
            world: World::new(),
            sim_time: 0.0,
            tuning,
            recipes,
            rng: StdRng::from_entropy(),
            events: EventQueue::new(),
            last_metabolism_update: 0.0,
            time_scale: 1.0,
        }
    }

    /// Reseed the random source so craft rolls replay exactly
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Spawn a survivor with default stores, no skills and an empty pack
    pub fn spawn_survivor(&mut self, name: &str, body_mass_kg: Option<f32>) -> Entity {
        let body_mass_kg = body_mass_kg.filter(|m| m.is_finite() && *m > 0.0);
        let entity = self.world.spawn((
            Survivor { body_mass_kg },
            Name::new(name),
            MetabolicSimulator::new(self.tuning.metabolism.clone()),
            Activity::resting(body_mass_kg),
            Exposure::default(),
            Skills::default(),
            Inventory::default(),
            Crafter::default(),
            Inspections::default(),
        ));
        log::info!("Spawned survivor {} ({:?})", name, entity);
        entity
    }

    /// Remove a survivor from the world
    pub fn despawn(&mut self, entity: Entity) -> Result<(), EngineError> {
        self.world
            .despawn(entity)
            .map_err(|_| EngineError::NoSuchEntity(entity))
    }

    /// Update the simulation by delta_seconds
    pub fn update(&mut self, delta_seconds: f32) {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }
        let scaled_delta = delta_seconds * self.time_scale;
        self.sim_time += scaled_delta as f64;

        // Metabolism (4 Hz)
        if self.sim_time - self.last_metabolism_update >= METABOLISM_INTERVAL {
            let elapsed = (self.sim_time - self.last_metabolism_update) as f32;
            metabolism_system(&mut self.world, elapsed, &mut self.events);
            self.last_metabolism_update = self.sim_time;
        }

        // Crafting and inspections (every frame)
        crafting_system(
            &mut self.world,
            self.sim_time,
            &self.tuning.crafting,
            &mut self.rng,
            &mut self.events,
        );
        inspection_system(&mut self.world, self.sim_time, &mut self.events);
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    /// Get current time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Get current simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    /// Count survivors in simulation
    pub fn survivor_count(&self) -> usize {
        self.world.query::<&Survivor>().iter().count()
    }

    /// All survivors, in no particular order
    pub fn survivors(&self) -> Vec<Entity> {
        self.world
            .query::<&Survivor>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    // ── Body inputs ────────────────────────────────────────────────────

    /// Replace what the survivor is doing. A missing body mass is filled in
    /// from the survivor's own.
    pub fn set_activity(&mut self, entity: Entity, activity: ActivityInputs) -> Result<(), EngineError> {
        let (survivor, current) = self
            .world
            .query_one_mut::<(&Survivor, &mut Activity)>(entity)
            .map_err(|e| component_error(entity, e))?;
        let mut activity = activity.sanitized();
        if activity.body_mass_kg.is_none() {
            activity.body_mass_kg = survivor.body_mass_kg;
        }
        current.0 = activity;
        Ok(())
    }

    pub fn set_environment(&mut self, entity: Entity, environment: EnvironmentInputs) -> Result<(), EngineError> {
        let exposure = self
            .world
            .query_one_mut::<&mut Exposure>(entity)
            .map_err(|e| component_error(entity, e))?;
        exposure.0 = environment;
        Ok(())
    }

    /// Add food energy (kcal) to the survivor's gut
    pub fn consume_food(&mut self, entity: Entity, kcal_fast: f32, kcal_slow: f32) -> Result<(), EngineError> {
        self.mutate_metabolism(entity, |sim| {
            sim.consume_food(kcal_fast, kcal_slow);
        })
    }

    pub fn drink_water(&mut self, entity: Entity, liters: f32) -> Result<(), EngineError> {
        self.mutate_metabolism(entity, |sim| {
            sim.drink_water(liters);
        })
    }

    pub fn apply_injury(&mut self, entity: Entity, wound_level: f32, bleed_rate: f32) -> Result<(), EngineError> {
        self.mutate_metabolism(entity, |sim| {
            sim.apply_injury(wound_level, bleed_rate);
        })
    }

    fn mutate_metabolism(
        &mut self,
        entity: Entity,
        mutate: impl FnOnce(&mut MetabolicSimulator),
    ) -> Result<(), EngineError> {
        let sim = self
            .world
            .query_one_mut::<&mut MetabolicSimulator>(entity)
            .map_err(|e| component_error(entity, e))?;
        mutate(sim);
        if sim.take_vitals_changed() {
            self.events.push(SimEvent::VitalsChanged(entity));
        }
        Ok(())
    }

    /// Current displayed vitals
    pub fn vitals(&self, entity: Entity) -> Result<VitalsSnapshot, EngineError> {
        let sim = self
            .world
            .get::<&MetabolicSimulator>(entity)
            .map_err(|e| missing_component(entity, e))?;
        Ok(sim.snapshot())
    }

    // ── Skills & items ────────────────────────────────────────────────

    pub fn give_item(&mut self, entity: Entity, item_id: &str, quantity: u32) -> Result<(), EngineError> {
        use mo56_logic::inventory::ItemStore;
        let inventory = self
            .world
            .query_one_mut::<&mut Inventory>(entity)
            .map_err(|e| component_error(entity, e))?;
        inventory.0.add(item_id, quantity);
        Ok(())
    }

    pub fn item_count(&self, entity: Entity, item_id: &str) -> Result<u32, EngineError> {
        use mo56_logic::inventory::ItemStore;
        let inventory = self
            .world
            .get::<&Inventory>(entity)
            .map_err(|e| missing_component(entity, e))?;
        Ok(inventory.0.count(item_id))
    }

    /// Add knowledge to a survivor's track
    pub fn grant_knowledge(&mut self, entity: Entity, knowledge_id: &str, amount: f32) -> Result<bool, EngineError> {
        use mo56_logic::skills::SkillProgression;
        let skills = self
            .world
            .query_one_mut::<&mut Skills>(entity)
            .map_err(|e| component_error(entity, e))?;
        Ok(skills.0.grant_knowledge(knowledge_id, amount))
    }

    pub fn skill_value(&self, entity: Entity, domain: mo56_logic::skills::SkillDomain) -> Result<f32, EngineError> {
        let skills = self
            .world
            .get::<&Skills>(entity)
            .map_err(|e| missing_component(entity, e))?;
        Ok(skills.0.skill_value(domain))
    }

    // ── Crafting ──────────────────────────────────────────────────────

    /// Teach a survivor a recipe from the recipe book
    pub fn unlock_recipe(&mut self, entity: Entity, recipe_id: &str) -> Result<bool, EngineError> {
        if !self.recipes.contains(recipe_id) {
            return Err(EngineError::UnknownRecipe(recipe_id.to_string()));
        }
        let crafter = self
            .world
            .query_one_mut::<&mut Crafter>(entity)
            .map_err(|e| component_error(entity, e))?;
        Ok(crafter.0.unlock(recipe_id))
    }

    /// Recipe ids the survivor could start right now
    pub fn craftable(&self, entity: Entity) -> Result<Vec<String>, EngineError> {
        let mut query = self
            .world
            .query_one::<(&Crafter, &Skills, &Inventory)>(entity)
            .map_err(|_| EngineError::NoSuchEntity(entity))?;
        let (crafter, skills, inventory) = query.get().ok_or(EngineError::NotASurvivor(entity))?;
        Ok(crafter
            .0
            .craftable(&self.recipes, &skills.0, &inventory.0)
            .into_iter()
            .map(|recipe| recipe.id.clone())
            .collect())
    }

    /// Start crafting. Refusals are logged and returned.
    pub fn try_craft(&mut self, entity: Entity, recipe_id: &str) -> Result<(), EngineError> {
        let recipe = self
            .recipes
            .get(recipe_id)
            .ok_or_else(|| EngineError::UnknownRecipe(recipe_id.to_string()))?;
        let (crafter, skills, inventory) = self
            .world
            .query_one_mut::<(&mut Crafter, &Skills, &Inventory)>(entity)
            .map_err(|e| component_error(entity, e))?;
        let event = crafter
            .0
            .try_start(recipe, self.sim_time, &skills.0, &inventory.0, &self.tuning.crafting)
            .map_err(|err| {
                log::warn!("Craft refused for {:?}: {}", entity, err);
                err
            })?;
        self.events.push(SimEvent::Craft { entity, event });
        Ok(())
    }

    /// Abandon the survivor's active craft. Returns `false` when idle.
    pub fn cancel_craft(&mut self, entity: Entity, reason: &str) -> Result<bool, EngineError> {
        let crafter = self
            .world
            .query_one_mut::<&mut Crafter>(entity)
            .map_err(|e| component_error(entity, e))?;
        match crafter.0.cancel(reason) {
            Some(event) => {
                self.events.push(SimEvent::Craft { entity, event });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fraction of the active craft completed (0 when idle)
    pub fn craft_progress(&self, entity: Entity) -> Result<f32, EngineError> {
        let crafter = self
            .world
            .get::<&Crafter>(entity)
            .map_err(|e| missing_component(entity, e))?;
        Ok(crafter.0.progress(self.sim_time))
    }

    /// Survivors with a craft in progress
    pub fn active_crafters(&self) -> Vec<Entity> {
        active_crafters(&self.world)
    }

    // ── Inspection ────────────────────────────────────────────────────

    /// Start studying `source`. A running inspection of the same source is
    /// replaced. Refusals are logged and returned.
    pub fn start_inspection(
        &mut self,
        entity: Entity,
        source: &str,
        params: InspectionParams,
    ) -> Result<(), EngineError> {
        let inspections = self
            .world
            .query_one_mut::<&mut Inspections>(entity)
            .map_err(|e| component_error(entity, e))?;
        let events = inspections
            .0
            .start(source, params, self.sim_time)
            .map_err(|err| {
                log::warn!("Inspection refused for {:?}: {}", entity, err);
                err
            })?;
        for event in events {
            self.events.push(SimEvent::Inspection { entity, event });
        }
        Ok(())
    }

    /// Abandon the inspection of `source`. Returns `false` when there was none.
    pub fn cancel_inspection(&mut self, entity: Entity, source: &str) -> Result<bool, EngineError> {
        let inspections = self
            .world
            .query_one_mut::<&mut Inspections>(entity)
            .map_err(|e| component_error(entity, e))?;
        match inspections.0.cancel(source, "ExternalCancel") {
            Some(event) => {
                self.events.push(SimEvent::Inspection { entity, event });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Progress of every inspection the survivor is running
    pub fn inspection_progress(&self, entity: Entity) -> Result<Vec<InspectionProgress>, EngineError> {
        let inspections = self
            .world
            .get::<&Inspections>(entity)
            .map_err(|e| missing_component(entity, e))?;
        Ok(inspections.0.progress(self.sim_time))
    }

    // ── Events ────────────────────────────────────────────────────────

    /// Number of events waiting to be drained
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Take every event produced since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Finished crafts among `events`, as (entity, recipe id, success)
    pub fn finished_crafts(events: &[SimEvent]) -> Vec<(Entity, &str, bool)> {
        events
            .iter()
            .filter_map(|event| match event {
                SimEvent::Craft {
                    entity,
                    event: CraftEvent::Finished { recipe_id, success, .. },
                } => Some((*entity, recipe_id.as_str(), *success)),
                _ => None,
            })
            .collect()
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(Tuning::default(), RecipeBook::new())
    }
}

fn missing_component(entity: Entity, err: hecs::ComponentError) -> EngineError {
    match err {
        hecs::ComponentError::NoSuchEntity => EngineError::NoSuchEntity(entity),
        hecs::ComponentError::MissingComponent(_) => EngineError::NotASurvivor(entity),
    }
}

fn component_error(entity: Entity, err: hecs::QueryOneError) -> EngineError {
    match err {
        hecs::QueryOneError::NoSuchEntity => EngineError::NoSuchEntity(entity),
        hecs::QueryOneError::Unsatisfied => EngineError::NotASurvivor(entity),
    }
}

/// Errors returned by engine operations
#[derive(Debug)]
pub enum EngineError {
    NoSuchEntity(Entity),
    /// The entity exists but lacks survivor components
    NotASurvivor(Entity),
    UnknownRecipe(String),
    CraftRefused(CraftError),
    InspectionRefused(InspectionError),
}

impl From<CraftError> for EngineError {
    fn from(e: CraftError) -> Self {
        EngineError::CraftRefused(e)
    }
}

impl From<InspectionError> for EngineError {
    fn from(e: InspectionError) -> Self {
        EngineError::InspectionRefused(e)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NoSuchEntity(e) => write!(f, "No such entity: {:?}", e),
            EngineError::NotASurvivor(e) => write!(f, "Entity {:?} is not a survivor", e),
            EngineError::UnknownRecipe(id) => write!(f, "Unknown recipe: {}", id),
            EngineError::CraftRefused(e) => write!(f, "Craft refused: {}", e),
            EngineError::InspectionRefused(e) => write!(f, "Inspection refused: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::CraftRefused(e) => Some(e),
            EngineError::InspectionRefused(e) => Some(e),
            _ => None,
        }
    }
}
