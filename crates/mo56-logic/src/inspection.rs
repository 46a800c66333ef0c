//! Timed inspections: how survivors learn knowledge by studying things.
//!
//! An [`Inspector`] runs any number of inspections at once, at most one per
//! source (a plant, an item, a workstation; whatever the caller names). When
//! an inspection's timer runs out, [`Inspector::advance`] grants its
//! knowledge and skill XP. Inspections flagged `once_per_source` leave a
//! claim behind, and the same source cannot teach that knowledge again.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::skills::{canonical_knowledge_id, SkillDomain, SkillProgression};

pub const DEFAULT_KNOWLEDGE_GAIN: f32 = 5.0;
/// Seconds.
pub const DEFAULT_INSPECTION_DURATION: f32 = 20.0;
/// XP for the primary skill of an inspected item.
pub const DEFAULT_INSPECTION_SKILL_XP: f32 = 3.0;

/// What an inspection teaches and how long it takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionParams {
    pub knowledge_id: String,
    pub knowledge_gain: f32,
    /// Seconds; zero falls back to [`DEFAULT_INSPECTION_DURATION`].
    pub duration: f32,
    pub skill_xp: BTreeMap<SkillDomain, f32>,
    pub once_per_source: bool,
    pub description: Option<String>,
}

impl Default for InspectionParams {
    fn default() -> Self {
        Self {
            knowledge_id: String::new(),
            knowledge_gain: DEFAULT_KNOWLEDGE_GAIN,
            duration: DEFAULT_INSPECTION_DURATION,
            skill_xp: BTreeMap::new(),
            once_per_source: false,
            description: None,
        }
    }
}

impl InspectionParams {
    pub fn new(knowledge_id: &str) -> Self {
        Self {
            knowledge_id: knowledge_id.to_string(),
            ..Self::default()
        }
    }

    /// Params for studying a carried item. Non-positive reward or duration
    /// fall back to the defaults; the primary skill earns
    /// [`DEFAULT_INSPECTION_SKILL_XP`] and `extra_xp` is added on top.
    pub fn for_item(
        knowledge_id: &str,
        knowledge_reward: f32,
        duration: f32,
        primary_skill: Option<&str>,
        extra_xp: &BTreeMap<String, f32>,
    ) -> Self {
        let mut params = Self::new(knowledge_id);
        if knowledge_reward > 0.0 {
            params.knowledge_gain = knowledge_reward;
        }
        if duration > 0.0 {
            params.duration = duration;
        }
        if let Some(domain) = primary_skill.and_then(SkillDomain::from_tag) {
            params.skill_xp.insert(domain, DEFAULT_INSPECTION_SKILL_XP);
        }
        for (tag, xp) in extra_xp {
            if let Some(domain) = SkillDomain::from_tag(tag).filter(|_| *xp > 0.0) {
                *params.skill_xp.entry(domain).or_insert(0.0) += xp;
            }
        }
        params
    }

    pub fn with_skill_xp(mut self, domain: SkillDomain, xp: f32) -> Self {
        self.skill_xp.insert(domain, xp);
        self
    }

    pub fn once_per_source(mut self) -> Self {
        self.once_per_source = true;
        self
    }

    fn effective_duration(&self) -> f32 {
        if self.duration > 0.0 {
            self.duration
        } else {
            DEFAULT_INSPECTION_DURATION
        }
    }
}

/// An inspection in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveInspection {
    pub params: InspectionParams,
    /// Simulation time the inspection started, in seconds.
    pub start_time: f64,
    pub duration: f32,
}

impl ActiveInspection {
    fn elapsed(&self, now: f64) -> f32 {
        ((now - self.start_time).max(0.0) as f32).min(self.duration)
    }

    fn is_due(&self, now: f64) -> bool {
        (now - self.start_time) as f32 >= self.duration
    }
}

/// Progress of one inspection, for progress bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionProgress {
    pub source: String,
    pub knowledge_id: String,
    pub duration: f32,
    pub elapsed: f32,
    pub remaining: f32,
}

/// Inspection lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InspectionEvent {
    Started {
        source: String,
        knowledge_id: String,
        duration: f32,
    },
    Cancelled {
        source: String,
        knowledge_id: String,
        reason: String,
    },
    Completed {
        source: String,
        knowledge_id: String,
        /// `false` when the knowledge track was already full.
        knowledge_gained: bool,
    },
}

/// Why an inspection could not start.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectionError {
    Invalid(String),
    AlreadyClaimed { source: String, knowledge_id: String },
}

impl std::fmt::Display for InspectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectionError::Invalid(reason) => write!(f, "Invalid inspection: {}", reason),
            InspectionError::AlreadyClaimed {
                source,
                knowledge_id,
            } => write!(f, "{} has already taught {}", source, knowledge_id),
        }
    }
}

impl std::error::Error for InspectionError {}

/// Active inspections keyed by source, plus once-per-source claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inspector {
    active: BTreeMap<String, ActiveInspection>,
    claimed: BTreeMap<String, BTreeSet<String>>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_inspecting(&self, source: &str) -> bool {
        self.active.contains_key(source)
    }

    /// True once `source` has taught `knowledge_id` under a
    /// once-per-source inspection.
    pub fn has_claimed(&self, source: &str, knowledge_id: &str) -> bool {
        self.claimed
            .get(source)
            .is_some_and(|ids| ids.contains(&canonical_knowledge_id(knowledge_id)))
    }

    /// Begin inspecting `source`. An inspection already running on the same
    /// source is cancelled first; its event precedes the start event.
    pub fn start(
        &mut self,
        source: &str,
        params: InspectionParams,
        now: f64,
    ) -> Result<Vec<InspectionEvent>, InspectionError> {
        if source.trim().is_empty() {
            return Err(InspectionError::Invalid("empty source".into()));
        }
        if params.knowledge_id.trim().is_empty() {
            return Err(InspectionError::Invalid("no knowledge id".into()));
        }
        if !(params.duration >= 0.0) || !params.duration.is_finite() {
            return Err(InspectionError::Invalid(format!(
                "duration {}",
                params.duration
            )));
        }
        if params.once_per_source && self.has_claimed(source, &params.knowledge_id) {
            return Err(InspectionError::AlreadyClaimed {
                source: source.to_string(),
                knowledge_id: canonical_knowledge_id(&params.knowledge_id),
            });
        }

        let mut events = Vec::new();
        events.extend(self.cancel(source, "Replaced"));

        let duration = params.effective_duration();
        let knowledge_id = canonical_knowledge_id(&params.knowledge_id);
        log::debug!(
            "Inspection started: {} teaches {} in {:.1}s",
            source,
            knowledge_id,
            duration
        );
        self.active.insert(
            source.to_string(),
            ActiveInspection {
                params,
                start_time: now,
                duration,
            },
        );
        events.push(InspectionEvent::Started {
            source: source.to_string(),
            knowledge_id,
            duration,
        });
        Ok(events)
    }

    /// Abandon the inspection on `source`. Nothing is granted.
    pub fn cancel(&mut self, source: &str, reason: &str) -> Option<InspectionEvent> {
        let active = self.active.remove(source)?;
        log::debug!("Inspection cancelled: {} ({})", source, reason);
        Some(InspectionEvent::Cancelled {
            source: source.to_string(),
            knowledge_id: canonical_knowledge_id(&active.params.knowledge_id),
            reason: reason.to_string(),
        })
    }

    /// Progress of every running inspection at `now`, ordered by source.
    pub fn progress(&self, now: f64) -> Vec<InspectionProgress> {
        self.active
            .iter()
            .map(|(source, active)| {
                let elapsed = active.elapsed(now);
                InspectionProgress {
                    source: source.clone(),
                    knowledge_id: canonical_knowledge_id(&active.params.knowledge_id),
                    duration: active.duration,
                    elapsed,
                    remaining: active.duration - elapsed,
                }
            })
            .collect()
    }

    /// Complete every inspection whose timer has run out by `now`.
    pub fn advance<S: SkillProgression>(&mut self, now: f64, skills: &mut S) -> Vec<InspectionEvent> {
        let due: Vec<String> = self
            .active
            .iter()
            .filter(|(_, active)| active.is_due(now))
            .map(|(source, _)| source.clone())
            .collect();

        let mut events = Vec::with_capacity(due.len());
        for source in due {
            let Some(active) = self.active.remove(&source) else {
                continue;
            };
            let params = active.params;
            let knowledge_id = canonical_knowledge_id(&params.knowledge_id);
            let knowledge_gained = skills.grant_knowledge(&knowledge_id, params.knowledge_gain);
            for (domain, xp) in &params.skill_xp {
                skills.grant_skill_xp(*domain, *xp);
            }
            if params.once_per_source {
                self.claimed
                    .entry(source.clone())
                    .or_default()
                    .insert(knowledge_id.clone());
            }
            log::info!("Inspection completed: {} taught {}", source, knowledge_id);
            events.push(InspectionEvent::Completed {
                source,
                knowledge_id,
                knowledge_gained,
            });
        }
        events
    }
}
