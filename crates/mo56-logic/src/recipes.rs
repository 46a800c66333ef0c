//! Recipe definitions and the recipe book.
//!
//! Recipes are plain data loaded from JSON. Every field except `id` has a
//! default, so a data file only spells out what differs:
//!
//! ```
//! use mo56_logic::recipes::RecipeBook;
//!
//! let book = RecipeBook::from_json(r#"[
//!     { "id": "cordage", "display_name": "Plant Cordage",
//!       "primary_skill": "Skill.Cordage",
//!       "inputs": { "PlantFiber": 3 }, "outputs": { "Cordage": 1 } }
//! ]"#).unwrap();
//! let recipe = book.get("cordage").unwrap();
//! assert_eq!(recipe.base_duration, 5.0);
//! assert_eq!(recipe.inputs["PlantFiber"], 3);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inputs, outputs, gating, and rewards for one craftable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipe {
    pub id: String,
    pub display_name: String,
    /// Knowledge track that must be learned before crafting; also the
    /// track that try/success knowledge is granted to.
    pub required_knowledge: Option<String>,
    /// Skill tag driving duration, success chance, and XP.
    pub primary_skill: Option<String>,
    /// Secondary skill tag → weight applied to that skill's level.
    pub secondary_skill_weights: BTreeMap<String, i32>,
    /// Consumed when the craft finishes, whatever the outcome.
    pub inputs: BTreeMap<String, u32>,
    pub outputs: BTreeMap<String, u32>,
    pub fail_byproducts: BTreeMap<String, u32>,
    /// Seconds.
    pub base_duration: f32,
    pub base_difficulty: f32,
    pub success_xp: f32,
    pub fail_xp: f32,
    pub knowledge_on_try: f32,
    pub knowledge_on_success: f32,
}

impl Default for Recipe {
    fn default() -> Self {
        Self {
            id: String::new(),
            display_name: String::new(),
            required_knowledge: None,
            primary_skill: None,
            secondary_skill_weights: BTreeMap::new(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            fail_byproducts: BTreeMap::new(),
            base_duration: 5.0,
            base_difficulty: 25.0,
            success_xp: 5.0,
            fail_xp: 2.0,
            knowledge_on_try: 0.0,
            knowledge_on_success: 0.0,
        }
    }
}

impl Recipe {
    pub fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            ..Self::default()
        }
    }

    /// Inputs with a non-zero count.
    pub fn required_inputs(&self) -> impl Iterator<Item = (&str, u32)> {
        self.inputs
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .map(|(id, qty)| (id.as_str(), *qty))
    }

    fn check(&self) -> Result<(), RecipeError> {
        if self.id.trim().is_empty() {
            return Err(RecipeError::MissingId);
        }
        let invalid = |reason: &str| RecipeError::Invalid {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if !self.base_duration.is_finite() || self.base_duration < 0.0 {
            return Err(invalid("base_duration must be a non-negative number"));
        }
        if !self.base_difficulty.is_finite() {
            return Err(invalid("base_difficulty must be finite"));
        }
        let rewards = [
            self.success_xp,
            self.fail_xp,
            self.knowledge_on_try,
            self.knowledge_on_success,
        ];
        if rewards.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(invalid("rewards must be non-negative numbers"));
        }
        Ok(())
    }
}

/// Recipes indexed by id.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: BTreeMap<String, Recipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of recipes.
    pub fn from_json(json: &str) -> Result<Self, RecipeError> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)?;
        let mut book = Self::new();
        for recipe in recipes {
            book.insert(recipe)?;
        }
        Ok(book)
    }

    /// Add a recipe; ids must be unique and non-empty.
    pub fn insert(&mut self, recipe: Recipe) -> Result<(), RecipeError> {
        recipe.check()?;
        if self.recipes.contains_key(&recipe.id) {
            return Err(RecipeError::DuplicateId(recipe.id));
        }
        self.recipes.insert(recipe.id.clone(), recipe);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.recipes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }
}

/// Errors from loading recipe data.
#[derive(Debug)]
pub enum RecipeError {
    Json(serde_json::Error),
    MissingId,
    DuplicateId(String),
    Invalid { id: String, reason: String },
}

impl From<serde_json::Error> for RecipeError {
    fn from(e: serde_json::Error) -> Self {
        RecipeError::Json(e)
    }
}

impl std::fmt::Display for RecipeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeError::Json(e) => write!(f, "Recipe JSON error: {}", e),
            RecipeError::MissingId => write!(f, "Recipe is missing an id"),
            RecipeError::DuplicateId(id) => write!(f, "Duplicate recipe id: {}", id),
            RecipeError::Invalid { id, reason } => write!(f, "Invalid recipe {}: {}", id, reason),
        }
    }
}

impl std::error::Error for RecipeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecipeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let book = RecipeBook::from_json(r#"[{ "id": "stick" }]"#).unwrap();
        let recipe = book.get("stick").unwrap();
        assert_eq!(recipe.base_duration, 5.0);
        assert_eq!(recipe.base_difficulty, 25.0);
        assert_eq!(recipe.success_xp, 5.0);
        assert_eq!(recipe.fail_xp, 2.0);
        assert_eq!(recipe.knowledge_on_try, 0.0);
        assert!(recipe.required_knowledge.is_none());
        assert!(recipe.inputs.is_empty());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = RecipeBook::from_json(r#"[{ "id": "a" }, { "id": "a" }]"#).unwrap_err();
        assert!(matches!(err, RecipeError::DuplicateId(ref id) if id == "a"));
    }

    #[test]
    fn missing_id_rejected() {
        let err = RecipeBook::from_json(r#"[{ "display_name": "Nameless" }]"#).unwrap_err();
        assert!(matches!(err, RecipeError::MissingId));
    }

    #[test]
    fn bad_numbers_rejected() {
        let err = RecipeBook::from_json(r#"[{ "id": "x", "base_duration": -1.0 }]"#).unwrap_err();
        assert!(matches!(err, RecipeError::Invalid { .. }));
        let err = RecipeBook::from_json(r#"[{ "id": "y", "fail_xp": -3.0 }]"#).unwrap_err();
        assert!(err.to_string().contains("y"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = RecipeBook::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RecipeError::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn zero_quantity_inputs_are_skipped() {
        let mut recipe = Recipe::new("mat", "Woven Mat");
        recipe.inputs.insert("Reed".into(), 4);
        recipe.inputs.insert("Dust".into(), 0);
        let inputs: Vec<(&str, u32)> = recipe.required_inputs().collect();
        assert_eq!(inputs, vec![("Reed", 4)]);
    }

    #[test]
    fn iteration_in_id_order() {
        let mut book = RecipeBook::new();
        book.insert(Recipe::new("b", "B")).unwrap();
        book.insert(Recipe::new("a", "A")).unwrap();
        let ids: Vec<&str> = book.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(book.len(), 2);
        assert!(book.contains("a"));
    }
}
