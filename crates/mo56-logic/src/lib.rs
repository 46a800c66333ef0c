//! Pure survival logic for MO56.
//!
//! This crate contains the game rules that are independent of any engine or
//! runtime. Functions take plain data and return results, which keeps them
//! unit-testable and usable from the ECS engine, the headless test harness,
//! or any future frontend.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`metabolism`] | Power demand, energy stores, vitals, hydration, heat |
//! | [`status`] | Status bars, smoothing, tolerance-based change detection |
//! | [`crafting`] | Skill-scaled craft duration and success probability |
//! | [`skills`] | Skill domains, knowledge catalog, skill book, skill helpers |
//! | [`inspection`] | Timed inspections that teach knowledge and skill XP |
//! | [`inventory`] | Count-based item storage |
//! | [`recipes`] | Recipe data and the recipe book |
//! | [`station`] | Per-survivor crafting state machine |
//! | [`tuning`] | JSON-loadable tuning for metabolism and crafting |

pub mod crafting;
pub mod inspection;
pub mod inventory;
pub mod metabolism;
pub mod recipes;
pub mod skills;
pub mod station;
pub mod status;
pub mod tuning;
