//! Tunable parameters, loadable from JSON.
//!
//! Every field falls back to its default, so a tuning file only lists the
//! values it overrides:
//!
//! ```
//! use mo56_logic::tuning::Tuning;
//!
//! let tuning = Tuning::from_json(r#"{ "metabolism": { "max_aerobic_power": 950.0 } }"#).unwrap();
//! assert_eq!(tuning.metabolism.max_aerobic_power, 950.0);
//! assert_eq!(tuning.crafting.max_success_chance, 0.98);
//! ```

use serde::{Deserialize, Serialize};

use crate::crafting::CraftingOutcomeModel;
use crate::metabolism::MetabolicConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub metabolism: MetabolicConfig,
    pub crafting: CraftingOutcomeModel,
}

/// A single problem found by [`Tuning::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum TuningIssue {
    /// Field must be a finite number above zero.
    NotPositive { field: &'static str, value: f32 },
    /// Field must be a finite number inside `min..=max`.
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    /// `min_success_chance` is above `max_success_chance`.
    ChanceBoundsInverted { min: f32, max: f32 },
    /// Resting power leaves no aerobic headroom.
    NoAerobicHeadroom { max_aerobic_power: f32 },
}

impl std::fmt::Display for TuningIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningIssue::NotPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            TuningIssue::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{} must be in {}..={}, got {}", field, min, max, value),
            TuningIssue::ChanceBoundsInverted { min, max } => write!(
                f,
                "min_success_chance {} exceeds max_success_chance {}",
                min, max
            ),
            TuningIssue::NoAerobicHeadroom { max_aerobic_power } => write!(
                f,
                "max_aerobic_power {} must exceed resting power",
                max_aerobic_power
            ),
        }
    }
}

/// Errors from loading a tuning file.
#[derive(Debug)]
pub enum TuningError {
    Json(serde_json::Error),
    Invalid(Vec<TuningIssue>),
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Json(e)
    }
}

impl std::fmt::Display for TuningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningError::Json(e) => write!(f, "Tuning JSON error: {}", e),
            TuningError::Invalid(issues) => {
                write!(f, "Invalid tuning:")?;
                for issue in issues {
                    write!(f, " {};", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Json(e) => Some(e),
            TuningError::Invalid(_) => None,
        }
    }
}

fn positive(issues: &mut Vec<TuningIssue>, field: &'static str, value: f32) {
    if !(value.is_finite() && value > 0.0) {
        issues.push(TuningIssue::NotPositive { field, value });
    }
}

fn in_range(issues: &mut Vec<TuningIssue>, field: &'static str, value: f32, min: f32, max: f32) {
    if !(value.is_finite() && (min..=max).contains(&value)) {
        issues.push(TuningIssue::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}

impl Tuning {
    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        let issues = tuning.validate();
        if !issues.is_empty() {
            return Err(TuningError::Invalid(issues));
        }
        Ok(tuning)
    }

    pub fn to_json_pretty(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every issue found; empty when the tuning is usable.
    pub fn validate(&self) -> Vec<TuningIssue> {
        let mut issues = Vec::new();
        let m = &self.metabolism;
        positive(&mut issues, "glycogen_muscle_max", m.glycogen_muscle_max);
        positive(&mut issues, "glycogen_liver_max", m.glycogen_liver_max);
        positive(&mut issues, "tbw_normal", m.tbw_normal);
        positive(&mut issues, "max_aerobic_power", m.max_aerobic_power);
        positive(&mut issues, "fat_access_rate_max", m.fat_access_rate_max);
        positive(&mut issues, "absorb_fast_rate", m.absorb_fast_rate);
        positive(&mut issues, "absorb_slow_rate", m.absorb_slow_rate);
        in_range(&mut issues, "bar_smoothing_alpha", m.bar_smoothing_alpha, 0.0, 1.0);
        in_range(&mut issues, "bar_tolerance", m.bar_tolerance, 0.0, 100.0);
        in_range(&mut issues, "vital_tolerance", m.vital_tolerance, 0.0, 100.0);
        if m.max_aerobic_power.is_finite()
            && m.max_aerobic_power <= crate::metabolism::metabolic_constants::RESTING_POWER
        {
            issues.push(TuningIssue::NoAerobicHeadroom {
                max_aerobic_power: m.max_aerobic_power,
            });
        }

        let c = &self.crafting;
        positive(&mut issues, "unskilled_duration_scale", c.unskilled_duration_scale);
        positive(&mut issues, "expert_duration_scale", c.expert_duration_scale);
        in_range(&mut issues, "base_success_chance", c.base_success_chance, 0.0, 1.0);
        in_range(&mut issues, "difficulty_scale", c.difficulty_scale, 0.0, 1.0);
        in_range(&mut issues, "min_success_chance", c.min_success_chance, 0.0, 1.0);
        in_range(&mut issues, "max_success_chance", c.max_success_chance, 0.0, 1.0);
        if c.min_success_chance > c.max_success_chance {
            issues.push(TuningIssue::ChanceBoundsInverted {
                min: c.min_success_chance,
                max: c.max_success_chance,
            });
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_is_valid() {
        let issues = Tuning::default().validate();
        assert!(issues.is_empty(), "default tuning should be valid: {issues:?}");
    }

    #[test]
    fn empty_object_gives_defaults() {
        let tuning = Tuning::from_json("{}").unwrap();
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn partial_override() {
        let tuning = Tuning::from_json(
            r#"{ "crafting": { "difficulty_scale": 0.02 }, "metabolism": { "tbw_normal": 45.0 } }"#,
        )
        .unwrap();
        assert_eq!(tuning.crafting.difficulty_scale, 0.02);
        assert_eq!(tuning.crafting.base_success_chance, 0.15);
        assert_eq!(tuning.metabolism.tbw_normal, 45.0);
        assert_eq!(tuning.metabolism.glycogen_liver_max, 500.0);
    }

    #[test]
    fn invalid_values_collected() {
        let err = Tuning::from_json(
            r#"{ "metabolism": { "tbw_normal": 0.0, "bar_smoothing_alpha": 1.5 },
                 "crafting": { "min_success_chance": 0.9, "max_success_chance": 0.2 } }"#,
        )
        .unwrap_err();
        let TuningError::Invalid(issues) = err else {
            panic!("expected validation failure");
        };
        assert!(issues.contains(&TuningIssue::NotPositive {
            field: "tbw_normal",
            value: 0.0
        }));
        assert!(issues
            .iter()
            .any(|i| matches!(i, TuningIssue::OutOfRange { field: "bar_smoothing_alpha", .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, TuningIssue::ChanceBoundsInverted { .. })));
    }

    #[test]
    fn resting_power_needs_headroom() {
        let mut tuning = Tuning::default();
        tuning.metabolism.max_aerobic_power = 90.0;
        assert!(tuning
            .validate()
            .contains(&TuningIssue::NoAerobicHeadroom { max_aerobic_power: 90.0 }));
    }

    #[test]
    fn malformed_json() {
        let err = Tuning::from_json("[1, 2").unwrap_err();
        assert!(matches!(err, TuningError::Json(_)));
        assert!(err.to_string().starts_with("Tuning JSON error"));
    }

    #[test]
    fn pretty_json_reloads() {
        let text = Tuning::default().to_json_pretty().unwrap();
        assert_eq!(Tuning::from_json(&text).unwrap(), Tuning::default());
    }
}
