//! Per-survivor crafting state machine.
//!
//! A [`CraftingStation`] remembers which recipes a survivor has unlocked and
//! runs at most one craft at a time:
//!
//! 1. [`try_start`](CraftingStation::try_start) checks knowledge and inputs,
//!    reserves the inputs, and fixes the duration from the crafter's skill.
//! 2. [`advance`](CraftingStation::advance) is called with the current time;
//!    once the duration has elapsed it rolls for success, consumes the
//!    reserved inputs, and hands out outputs (or fail byproducts), knowledge,
//!    and primary skill XP.
//! 3. [`cancel`](CraftingStation::cancel) drops the craft and its
//!    reservations at any point before that.
//!
//! Reserved items stay in the inventory until the craft finishes.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::crafting::CraftingOutcomeModel;
use crate::inventory::ItemStore;
use crate::recipes::{Recipe, RecipeBook};
use crate::skills::{SkillDomain, SkillProgression, SkillProvider};

/// A claim on recipe inputs held by the active craft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub item_id: String,
    pub quantity: u32,
}

/// The craft in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCraft {
    pub recipe: Recipe,
    /// Simulation time the craft started, in seconds.
    pub start_time: f64,
    /// Skill-scaled duration in seconds.
    pub duration: f32,
    pub reservations: Vec<Reservation>,
}

impl ActiveCraft {
    fn elapsed(&self, now: f64) -> f32 {
        (now - self.start_time).max(0.0) as f32
    }
}

/// Craft lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CraftEvent {
    Started {
        recipe_id: String,
        duration: f32,
    },
    Cancelled {
        recipe_id: String,
        reason: String,
    },
    Finished {
        recipe_id: String,
        success: bool,
        /// Items handed out: outputs on success, byproducts on failure.
        produced: Vec<(String, u32)>,
    },
}

/// Why a craft could not start.
#[derive(Debug, Clone, PartialEq)]
pub enum CraftError {
    AlreadyCrafting { active_recipe: String },
    RecipeLocked(String),
    MissingKnowledge { recipe_id: String, knowledge: String },
    MissingInput { recipe_id: String, item_id: String, needed: u32, available: u32 },
}

impl std::fmt::Display for CraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CraftError::AlreadyCrafting { active_recipe } => {
                write!(f, "Already crafting {}", active_recipe)
            }
            CraftError::RecipeLocked(id) => write!(f, "Recipe {} has not been unlocked", id),
            CraftError::MissingKnowledge { recipe_id, knowledge } => {
                write!(f, "Recipe {} requires knowledge {}", recipe_id, knowledge)
            }
            CraftError::MissingInput {
                recipe_id,
                item_id,
                needed,
                available,
            } => write!(
                f,
                "Recipe {} needs {} x{}, only {} available",
                recipe_id, item_id, needed, available
            ),
        }
    }
}

impl std::error::Error for CraftError {}

/// Known recipes plus the single active craft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CraftingStation {
    known: BTreeSet<String>,
    active: Option<ActiveCraft>,
}

impl CraftingStation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Station that already knows `recipe_ids`.
    pub fn with_known<'a>(recipe_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut station = Self::new();
        for id in recipe_ids {
            station.unlock(id);
        }
        station
    }

    /// Learn a recipe. Returns `false` if it was already known.
    pub fn unlock(&mut self, recipe_id: &str) -> bool {
        if recipe_id.is_empty() {
            return false;
        }
        self.known.insert(recipe_id.to_string())
    }

    pub fn knows(&self, recipe_id: &str) -> bool {
        self.known.contains(recipe_id)
    }

    pub fn known_recipes(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    pub fn active(&self) -> Option<&ActiveCraft> {
        self.active.as_ref()
    }

    pub fn is_crafting(&self) -> bool {
        self.active.is_some()
    }

    /// Knowledge and input checks for a known recipe, ignoring whether a
    /// craft is already running.
    pub fn check_requirements(
        &self,
        recipe: &Recipe,
        skills: &impl SkillProvider,
        items: &impl ItemStore,
    ) -> Result<(), CraftError> {
        if !self.knows(&recipe.id) {
            return Err(CraftError::RecipeLocked(recipe.id.clone()));
        }
        if let Some(knowledge) = recipe.required_knowledge.as_deref() {
            if !skills.knows(knowledge) {
                return Err(CraftError::MissingKnowledge {
                    recipe_id: recipe.id.clone(),
                    knowledge: knowledge.to_string(),
                });
            }
        }
        for (item_id, needed) in recipe.required_inputs() {
            let available = items.count(item_id);
            if available < needed {
                return Err(CraftError::MissingInput {
                    recipe_id: recipe.id.clone(),
                    item_id: item_id.to_string(),
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Known recipes from `book` whose knowledge and inputs are satisfied.
    pub fn craftable<'a>(
        &self,
        book: &'a RecipeBook,
        skills: &impl SkillProvider,
        items: &impl ItemStore,
    ) -> Vec<&'a Recipe> {
        self.known
            .iter()
            .filter_map(|id| book.get(id))
            .filter(|recipe| self.check_requirements(recipe, skills, items).is_ok())
            .collect()
    }

    /// Start crafting `recipe` at time `now`.
    pub fn try_start(
        &mut self,
        recipe: &Recipe,
        now: f64,
        skills: &impl SkillProvider,
        items: &impl ItemStore,
        model: &CraftingOutcomeModel,
    ) -> Result<CraftEvent, CraftError> {
        if let Some(active) = &self.active {
            return Err(CraftError::AlreadyCrafting {
                active_recipe: active.recipe.id.clone(),
            });
        }
        self.check_requirements(recipe, skills, items)?;

        let duration = model.recipe_duration(recipe, skills);
        let reservations = recipe
            .required_inputs()
            .map(|(item_id, quantity)| Reservation {
                item_id: item_id.to_string(),
                quantity,
            })
            .collect();
        log::debug!(
            "Craft started: {} ({:.2}s, {} reservations)",
            recipe.id,
            duration,
            recipe.required_inputs().count()
        );
        self.active = Some(ActiveCraft {
            recipe: recipe.clone(),
            start_time: now,
            duration,
            reservations,
        });
        Ok(CraftEvent::Started {
            recipe_id: recipe.id.clone(),
            duration,
        })
    }

    /// Abandon the active craft. Reserved items were never removed, so
    /// nothing is returned to the inventory. `None` when idle.
    pub fn cancel(&mut self, reason: &str) -> Option<CraftEvent> {
        let active = self.active.take()?;
        log::debug!("Craft cancelled: {} ({})", active.recipe.id, reason);
        Some(CraftEvent::Cancelled {
            recipe_id: active.recipe.id,
            reason: reason.to_string(),
        })
    }

    /// Fraction of the active craft completed at `now` (0 when idle).
    pub fn progress(&self, now: f64) -> f32 {
        match &self.active {
            None => 0.0,
            Some(active) if active.duration <= 0.0 => 1.0,
            Some(active) => (active.elapsed(now) / active.duration).clamp(0.0, 1.0),
        }
    }

    /// Seconds left on the active craft (0 when idle).
    pub fn remaining(&self, now: f64) -> f32 {
        self.active
            .as_ref()
            .map_or(0.0, |active| (active.duration - active.elapsed(now)).max(0.0))
    }

    /// Finish the active craft if its duration has elapsed by `now`.
    pub fn advance<S, I, R>(
        &mut self,
        now: f64,
        skills: &mut S,
        items: &mut I,
        model: &CraftingOutcomeModel,
        rng: &mut R,
    ) -> Option<CraftEvent>
    where
        S: SkillProvider + SkillProgression,
        I: ItemStore,
        R: Rng + ?Sized,
    {
        let ready = self
            .active
            .as_ref()
            .is_some_and(|active| active.elapsed(now) >= active.duration);
        if !ready {
            return None;
        }
        let active = self.active.take()?;
        let recipe = &active.recipe;

        let chance = model.recipe_success_chance(recipe, skills);
        let success = model.roll_success(chance, rng);

        for reservation in &active.reservations {
            let removed = items.remove(&reservation.item_id, reservation.quantity);
            if removed < reservation.quantity {
                log::warn!(
                    "Craft {} consumed {} of {} reserved {}",
                    recipe.id,
                    removed,
                    reservation.quantity,
                    reservation.item_id
                );
            }
        }

        let results = if success {
            &recipe.outputs
        } else {
            &recipe.fail_byproducts
        };
        let produced: Vec<(String, u32)> = results
            .iter()
            .filter(|(id, qty)| **qty > 0 && !id.is_empty())
            .map(|(id, qty)| (id.clone(), *qty))
            .collect();
        for (item_id, qty) in &produced {
            items.add(item_id, *qty);
        }

        if let Some(knowledge) = recipe.required_knowledge.as_deref() {
            skills.grant_knowledge(knowledge, recipe.knowledge_on_try);
            if success {
                skills.grant_knowledge(knowledge, recipe.knowledge_on_success);
            }
        }
        if let Some(domain) = recipe.primary_skill.as_deref().and_then(SkillDomain::from_tag) {
            let xp = if success {
                recipe.success_xp
            } else {
                recipe.fail_xp
            };
            skills.grant_skill_xp(domain, xp);
        }

        log::info!(
            "Craft finished: {} {} (chance {:.2})",
            recipe.id,
            if success { "succeeded" } else { "failed" },
            chance
        );
        Some(CraftEvent::Finished {
            recipe_id: active.recipe.id.clone(),
            success,
            produced,
        })
    }
}
