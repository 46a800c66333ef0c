//! Crafting-related components: skills, carried items, the crafting
//! station each survivor works at, and what they are studying.

use mo56_logic::inspection::Inspector;
use mo56_logic::inventory::ItemBag;
use mo56_logic::skills::SkillBook;
use mo56_logic::station::CraftingStation;
use serde::{Deserialize, Serialize};

/// Skill and knowledge progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skills(pub SkillBook);

/// Items carried.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory(pub ItemBag);

/// Known recipes and the craft in progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Crafter(pub CraftingStation);

/// Running inspections and once-per-source claims.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inspections(pub Inspector);
