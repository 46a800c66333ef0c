//! Crafting outcome model: duration scaling and skill-gated success.
//!
//! Skill values run 0–100; a skill *level* is the value divided by ten
//! (0–10). Practised crafters work faster and fail less:
//!
//! ```
//! use mo56_logic::crafting::CraftingOutcomeModel;
//!
//! let model = CraftingOutcomeModel::default();
//! assert!((model.duration(5.0, 0.0) - 6.0).abs() < 1e-5);
//! assert!((model.duration(5.0, 100.0) - 3.0).abs() < 1e-5);
//! assert!((model.success_chance(50.0, &[], 25.0) - 0.98).abs() < 1e-5);
//! ```
//!
//! The random draw for [`CraftingOutcomeModel::roll_success`] comes from a
//! caller-supplied [`rand::Rng`], so seeded generators replay exactly.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::recipes::Recipe;
use crate::skills::{SkillDomain, SkillProvider};

/// Skill points that make up one level.
pub const SKILL_POINTS_PER_LEVEL: f32 = 10.0;
/// Highest skill level.
pub const MAX_SKILL_LEVEL: f32 = 10.0;

/// Convert a 0–100 skill value into a 0–10 level.
pub fn skill_level(skill_value: f32) -> f32 {
    if !skill_value.is_finite() {
        return 0.0;
    }
    (skill_value / SKILL_POINTS_PER_LEVEL).clamp(0.0, MAX_SKILL_LEVEL)
}

/// A weighted secondary skill feeding into the success score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillContribution {
    /// Skill level (0–10).
    pub level: f32,
    pub weight: f32,
}

impl SkillContribution {
    pub fn new(level: f32, weight: f32) -> Self {
        Self { level, weight }
    }

    fn score(&self) -> f32 {
        let score = self.level * self.weight;
        if score.is_finite() {
            score
        } else {
            0.0
        }
    }
}

/// Tunable duration and success curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftingOutcomeModel {
    /// Duration multiplier at level 0.
    pub unskilled_duration_scale: f32,
    /// Duration multiplier at the level cap.
    pub expert_duration_scale: f32,
    /// Chance when skill score equals difficulty.
    pub base_success_chance: f32,
    /// Chance gained per point of score above difficulty.
    pub difficulty_scale: f32,
    pub min_success_chance: f32,
    pub max_success_chance: f32,
}

impl Default for CraftingOutcomeModel {
    fn default() -> Self {
        Self {
            unskilled_duration_scale: 1.2,
            expert_duration_scale: 0.6,
            base_success_chance: 0.15,
            difficulty_scale: 0.01,
            min_success_chance: 0.05,
            max_success_chance: 0.98,
        }
    }
}

impl CraftingOutcomeModel {
    /// Scaled duration in seconds for a crafter with `primary_skill_value`
    /// (0–100) in the recipe's primary skill.
    pub fn duration(&self, base_duration: f32, primary_skill_value: f32) -> f32 {
        let alpha = skill_level(primary_skill_value) / MAX_SKILL_LEVEL;
        let scale = self.unskilled_duration_scale
            + (self.expert_duration_scale - self.unskilled_duration_scale) * alpha;
        base_duration.max(0.0) * scale
    }

    /// Weighted skill score: primary level × 10 plus secondary level × weight.
    pub fn skill_score(&self, primary_level: f32, secondary: &[SkillContribution]) -> f32 {
        let primary = if primary_level.is_finite() {
            primary_level.max(0.0) * SKILL_POINTS_PER_LEVEL
        } else {
            0.0
        };
        primary + secondary.iter().map(SkillContribution::score).sum::<f32>()
    }

    /// Probability of success, clamped to the configured bounds.
    pub fn success_chance(
        &self,
        primary_level: f32,
        secondary: &[SkillContribution],
        base_difficulty: f32,
    ) -> f32 {
        let (lo, hi) = self.chance_bounds();
        let score = self.skill_score(primary_level, secondary);
        let raw = self.base_success_chance + (score - base_difficulty) * self.difficulty_scale;
        if raw.is_nan() {
            return lo;
        }
        raw.clamp(lo, hi)
    }

    /// Draw uniformly in [0, 1) and succeed when the draw is at or below
    /// `probability`.
    pub fn roll_success<R: Rng + ?Sized>(&self, probability: f32, rng: &mut R) -> bool {
        let draw: f32 = rng.gen();
        draw <= probability
    }

    /// Duration of `recipe` for the crafter behind `skills`.
    pub fn recipe_duration(&self, recipe: &Recipe, skills: &impl SkillProvider) -> f32 {
        let primary = recipe_primary_value(recipe, skills);
        self.duration(recipe.base_duration, primary)
    }

    /// Success chance of `recipe` for the crafter behind `skills`.
    ///
    /// Secondary tags that do not name a known skill domain are skipped.
    pub fn recipe_success_chance(&self, recipe: &Recipe, skills: &impl SkillProvider) -> f32 {
        let primary_level = skill_level(recipe_primary_value(recipe, skills));
        let secondary: Vec<SkillContribution> = recipe
            .secondary_skill_weights
            .iter()
            .filter_map(|(tag, weight)| {
                SkillDomain::from_tag(tag).map(|domain| {
                    SkillContribution::new(skill_level(skills.skill_value(domain)), *weight as f32)
                })
            })
            .collect();
        self.success_chance(primary_level, &secondary, recipe.base_difficulty)
    }

    fn chance_bounds(&self) -> (f32, f32) {
        let lo = self.min_success_chance.clamp(0.0, 1.0);
        let hi = self.max_success_chance.clamp(lo, 1.0);
        (lo, hi)
    }
}

fn recipe_primary_value(recipe: &Recipe, skills: &impl SkillProvider) -> f32 {
    recipe
        .primary_skill
        .as_deref()
        .and_then(SkillDomain::from_tag)
        .map(|domain| skills.skill_value(domain))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::{SkillBook, SkillProgression};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn skill_level_conversion() {
        assert_eq!(skill_level(0.0), 0.0);
        assert!((skill_level(55.0) - 5.5).abs() < f32::EPSILON);
        assert_eq!(skill_level(250.0), 10.0);
        assert_eq!(skill_level(-10.0), 0.0);
        assert_eq!(skill_level(f32::NAN), 0.0);
    }

    #[test]
    fn duration_endpoints() {
        let model = CraftingOutcomeModel::default();
        assert!((model.duration(5.0, 0.0) - 6.0).abs() < 1e-5);
        assert!((model.duration(5.0, 100.0) - 3.0).abs() < 1e-5);
        assert!((model.duration(5.0, 180.0) - 3.0).abs() < 1e-5);
        assert!((model.duration(10.0, 50.0) - 9.0).abs() < 1e-5);
    }

    #[test]
    fn duration_shrinks_with_skill() {
        let model = CraftingOutcomeModel::default();
        let mut last = f32::MAX;
        for value in (0..=100).step_by(5) {
            let d = model.duration(8.0, value as f32);
            assert!(d <= last);
            last = d;
        }
    }

    #[test]
    fn success_chance_example() {
        let model = CraftingOutcomeModel::default();
        // Score 500 against difficulty 25: 0.15 + 4.75, clamped
        assert!((model.success_chance(50.0, &[], 25.0) - 0.98).abs() < 1e-6);
    }

    #[test]
    fn success_chance_mid_range() {
        let model = CraftingOutcomeModel::default();
        // Level 3 → score 30; 0.15 + (30 - 25) * 0.01 = 0.20
        assert!((model.success_chance(3.0, &[], 25.0) - 0.20).abs() < 1e-5);
        // Secondary level 2 × weight 5 adds 10 points
        let secondary = [SkillContribution::new(2.0, 5.0)];
        assert!((model.success_chance(3.0, &secondary, 25.0) - 0.30).abs() < 1e-5);
    }

    #[test]
    fn success_chance_floor() {
        let model = CraftingOutcomeModel::default();
        assert!((model.success_chance(0.0, &[], 200.0) - 0.05).abs() < 1e-6);
        assert!((model.success_chance(f32::NAN, &[], 25.0) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn success_chance_monotonic_in_primary_level() {
        let model = CraftingOutcomeModel::default();
        let secondary = [SkillContribution::new(1.5, 3.0)];
        for difficulty in [0.0, 25.0, 60.0, 95.0] {
            let mut last = 0.0;
            for step in 0..=100 {
                let level = step as f32 / 10.0;
                let chance = model.success_chance(level, &secondary, difficulty);
                assert!(chance >= last);
                assert!((0.05..=0.98).contains(&chance));
                last = chance;
            }
        }
    }

    #[test]
    fn roll_with_forced_draws() {
        let model = CraftingOutcomeModel::default();
        let mut low = StepRng::new(0, 0);
        assert!(model.roll_success(0.05, &mut low));
        let mut high = StepRng::new(u64::MAX, 0);
        assert!(!model.roll_success(0.98, &mut high));
        assert!(model.roll_success(1.0, &mut high));
    }

    #[test]
    fn roll_is_reproducible_with_seed() {
        let model = CraftingOutcomeModel::default();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let run_a: Vec<bool> = (0..64).map(|_| model.roll_success(0.5, &mut a)).collect();
        let run_b: Vec<bool> = (0..64).map(|_| model.roll_success(0.5, &mut b)).collect();
        assert_eq!(run_a, run_b);
        assert!(run_a.iter().any(|s| *s));
        assert!(run_a.iter().any(|s| !*s));
    }

    #[test]
    fn roll_frequency_tracks_probability() {
        let model = CraftingOutcomeModel::default();
        let mut rng = StdRng::seed_from_u64(1234);
        let trials = 20_000;
        let wins = (0..trials)
            .filter(|_| model.roll_success(0.3, &mut rng))
            .count();
        let rate = wins as f32 / trials as f32;
        assert!((rate - 0.3).abs() < 0.02, "rate {}", rate);
    }

    #[test]
    fn recipe_helpers_read_skill_book() {
        let model = CraftingOutcomeModel::default();
        let recipe = Recipe {
            primary_skill: Some("Skill.Cordage".into()),
            secondary_skill_weights: [("Skill.Weaving".to_string(), 2), ("Skill.Unknown".to_string(), 9)]
                .into_iter()
                .collect(),
            base_duration: 5.0,
            base_difficulty: 25.0,
            ..Recipe::new("cordage", "Plant Cordage")
        };
        let mut book = SkillBook::new();
        book.grant_skill_xp(SkillDomain::Cordage, 40.0);
        book.grant_skill_xp(SkillDomain::Weaving, 20.0);

        // Level 4 → scale 1.2 - 0.6 * 0.4 = 0.96
        assert!((model.recipe_duration(&recipe, &book) - 4.8).abs() < 1e-4);
        // Score 40 + 2 * 2 = 44 → 0.15 + 0.19
        assert!((model.recipe_success_chance(&recipe, &book) - 0.34).abs() < 1e-4);
    }

    #[test]
    fn recipe_without_primary_skill_uses_zero() {
        let model = CraftingOutcomeModel::default();
        let recipe = Recipe::new("stick", "Stick");
        let book = SkillBook::new();
        assert!((model.recipe_duration(&recipe, &book) - recipe.base_duration * 1.2).abs() < 1e-5);
    }
}
