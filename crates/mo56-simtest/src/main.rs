//! MO56 Headless Simulation Harness
//!
//! Sweeps the survival logic and the bundled recipe data in-process.
//! No client, no rendering, no input devices.
//!
//! Usage:
//!   cargo run -p mo56-simtest
//!   cargo run -p mo56-simtest -- --verbose
//!   cargo run -p mo56-simtest -- --tuning my_tuning.json
//!
//! Log output goes to stderr and follows `RUST_LOG` (default `warn`).

use mo56_core::engine::SimulationEngine;
use mo56_logic::crafting::SkillContribution;
use mo56_logic::inspection::InspectionParams;
use mo56_logic::inventory::{ItemBag, ItemStore};
use mo56_logic::metabolism::{
    compute_power_demand, metabolic_constants, ActivityInputs, EnvironmentInputs, MetabolicSimulator,
};
use mo56_logic::recipes::RecipeBook;
use mo56_logic::skills::{self, find_knowledge, rank_title, SkillBook, SkillDomain, SkillProvider};
use mo56_logic::station::{CraftEvent, CraftingStation};
use mo56_logic::status::BarKind;
use mo56_logic::tuning::Tuning;
use rand::rngs::StdRng;
use rand::SeedableRng;

const RECIPES_JSON: &str = include_str!("../../../data/recipes.json");

/// Simulated seconds per metabolic step in the sweeps.
const SWEEP_STEP: f32 = 0.25;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let tuning = match load_tuning(&args) {
        Ok(tuning) => tuning,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    println!("=== MO56 Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Bundled recipe data
    results.extend(validate_recipe_data(verbose));

    // 2. Metabolism sweep
    results.extend(validate_metabolism(&tuning, verbose));

    // 3. Crafting outcome curves
    results.extend(validate_crafting_curves(&tuning, verbose));

    // 4. Skills & knowledge helpers
    results.extend(validate_skills(verbose));

    // 5. Crafting station lifecycle
    results.extend(validate_station(&tuning, verbose));

    // 6. Engine cadence, replay and inspection
    results.extend(validate_engine(&tuning, verbose));

    // ── Summary ─────────────────────────────────────────────────────────
    println!();
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        println!("  {} {}: {}", icon, r.name, r.detail);
    }

    println!();
    println!(
        "=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Default tuning, or the file named after `--tuning`.
fn load_tuning(args: &[String]) -> Result<Tuning, String> {
    let Some(index) = args.iter().position(|a| a == "--tuning") else {
        return Ok(Tuning::default());
    };
    let path = args
        .get(index + 1)
        .ok_or_else(|| "--tuning needs a file path".to_string())?;
    let json = std::fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path, e))?;
    let tuning = Tuning::from_json(&json).map_err(|e| format!("loading {}: {}", path, e))?;
    tracing::info!(path = %path, "loaded tuning override");
    Ok(tuning)
}

fn bundled_recipes() -> Result<RecipeBook, String> {
    RecipeBook::from_json(RECIPES_JSON).map_err(|e| e.to_string())
}

// ── 1. Recipe Data ──────────────────────────────────────────────────────

fn validate_recipe_data(verbose: bool) -> Vec<TestResult> {
    println!("--- Recipe Data ---");
    let mut results = Vec::new();

    let book = match bundled_recipes() {
        Ok(book) => book,
        Err(e) => {
            results.push(TestResult {
                name: "recipes_parse".into(),
                passed: false,
                detail: e,
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "recipes_parse".into(),
        passed: !book.is_empty(),
        detail: format!("{} recipes parsed", book.len()),
    });

    let mut bad_skills = Vec::new();
    for recipe in book.iter() {
        let tags = recipe
            .primary_skill
            .iter()
            .chain(recipe.secondary_skill_weights.keys());
        for tag in tags {
            if SkillDomain::from_tag(tag).is_none() {
                bad_skills.push(format!("{}:{}", recipe.id, tag));
            }
        }
    }
    results.push(TestResult {
        name: "recipes_skill_tags".into(),
        passed: bad_skills.is_empty(),
        detail: if bad_skills.is_empty() {
            "every skill tag names a domain".into()
        } else {
            format!("unknown tags: {}", bad_skills.join(", "))
        },
    });

    let bad_knowledge: Vec<String> = book
        .iter()
        .filter_map(|r| r.required_knowledge.as_deref())
        .filter(|id| find_knowledge(id).is_none())
        .map(str::to_string)
        .collect();
    results.push(TestResult {
        name: "recipes_knowledge_ids".into(),
        passed: bad_knowledge.is_empty(),
        detail: if bad_knowledge.is_empty() {
            "every required knowledge is in the catalog".into()
        } else {
            format!("unknown knowledge: {}", bad_knowledge.join(", "))
        },
    });

    let no_outputs: Vec<&str> = book
        .iter()
        .filter(|r| r.outputs.values().all(|q| *q == 0))
        .map(|r| r.id.as_str())
        .collect();
    results.push(TestResult {
        name: "recipes_have_outputs".into(),
        passed: no_outputs.is_empty(),
        detail: format!("{} recipes without outputs", no_outputs.len()),
    });

    if verbose {
        for recipe in book.iter() {
            let inputs: Vec<String> = recipe
                .required_inputs()
                .map(|(item, qty)| format!("{}×{}", qty, item))
                .collect();
            println!(
                "  {:16} {:5.1}s diff {:5.1}  [{}]",
                recipe.id,
                recipe.base_duration,
                recipe.base_difficulty,
                inputs.join(", ")
            );
        }
    }

    results
}

// ── 2. Metabolism ───────────────────────────────────────────────────────

fn run_for(
    sim: &mut MetabolicSimulator,
    seconds: f32,
    activity: &ActivityInputs,
    environment: &EnvironmentInputs,
) {
    let steps = (seconds / SWEEP_STEP).round() as usize;
    for _ in 0..steps {
        sim.update(SWEEP_STEP, activity, environment);
    }
}

fn validate_metabolism(tuning: &Tuning, verbose: bool) -> Vec<TestResult> {
    println!("--- Metabolism ---");
    let mut results = Vec::new();
    let config = &tuning.metabolism;
    let temperate = EnvironmentInputs::default();

    let speeds = [0.0, 0.7, 1.4, 2.8, 4.0];
    let slopes = [-0.1, 0.0, 0.1, 0.2];
    let loads = [0.0, 15.0, 30.0];

    // Power split stays consistent across the activity grid
    let mut split_ok = true;
    let mut combos = 0;
    for &speed in &speeds {
        for &slope in &slopes {
            for &load in &loads {
                combos += 1;
                let power = compute_power_demand(config, &ActivityInputs::new(speed, slope, load));
                let sum = power.fat + power.carb;
                if !power.demand.is_finite()
                    || power.demand < metabolic_constants::RESTING_POWER
                    || (sum - power.demand).abs() > 1e-2
                    || power.fat < 0.0
                    || power.carb < 0.0
                {
                    split_ok = false;
                }
            }
        }
    }
    results.push(TestResult {
        name: "metabolism_power_split".into(),
        passed: split_ok,
        detail: format!("{} activity combos: demand ≥ resting, fat+carb = demand", combos),
    });

    // Faster walking never costs less
    let flat: Vec<f32> = speeds
        .iter()
        .map(|&s| compute_power_demand(config, &ActivityInputs::new(s, 0.0, 0.0)).demand)
        .collect();
    results.push(TestResult {
        name: "metabolism_speed_monotonic".into(),
        passed: flat.windows(2).all(|w| w[1] >= w[0]),
        detail: format!("flat demand {:.0}W → {:.0}W", flat[0], flat[flat.len() - 1]),
    });

    // Ten minutes at every combo keeps bars in range
    let mut bars_ok = true;
    let mut worst_reserve = f32::MAX;
    for &speed in &speeds {
        for &slope in &slopes {
            for &load in &loads {
                let mut sim = MetabolicSimulator::new(config.clone());
                let activity = ActivityInputs::new(speed, slope, load);
                run_for(&mut sim, 600.0, &activity, &temperate);
                let bars = sim.bars();
                for kind in BarKind::ALL {
                    let v = bars.get(kind);
                    if !(0.0..=100.0).contains(&v) || !v.is_finite() {
                        bars_ok = false;
                    }
                }
                worst_reserve = worst_reserve.min(bars.endurance_reserve);
            }
        }
    }
    results.push(TestResult {
        name: "metabolism_bars_in_range".into(),
        passed: bars_ok,
        detail: format!("10 min per combo, lowest endurance reserve {:.1}", worst_reserve),
    });

    // Resting survivor settles at full output capacity
    let mut resting = MetabolicSimulator::new(config.clone());
    run_for(&mut resting, 1800.0, &ActivityInputs::default(), &temperate);
    let capacity = resting.bars().output_capacity;
    results.push(TestResult {
        name: "metabolism_rest_converges".into(),
        passed: capacity > 99.0,
        detail: format!("output capacity after 30 min rest: {:.2}", capacity),
    });

    // Heat adds strain on the same walk
    let walk = ActivityInputs::new(1.0, 0.0, 0.0);
    let hot = EnvironmentInputs {
        ambient_temp: 40.0,
        altitude_m: 0.0,
    };
    let mut cool_sim = MetabolicSimulator::new(config.clone());
    let mut hot_sim = MetabolicSimulator::new(config.clone());
    run_for(&mut cool_sim, 600.0, &walk, &temperate);
    run_for(&mut hot_sim, 600.0, &walk, &hot);
    let (cool_strain, hot_strain) = (cool_sim.bars().heat_strain, hot_sim.bars().heat_strain);
    results.push(TestResult {
        name: "metabolism_heat_strain".into(),
        passed: hot_strain > cool_strain
            && hot_sim.state().total_body_water < cool_sim.state().total_body_water,
        detail: format!(
            "10 min walk: strain {:.1} at 21°C vs {:.1} at 40°C",
            cool_strain, hot_strain
        ),
    });

    // Altitude lowers oxygenation
    let mut high = MetabolicSimulator::new(config.clone());
    run_for(
        &mut high,
        60.0,
        &ActivityInputs::default(),
        &EnvironmentInputs {
            ambient_temp: 21.0,
            altitude_m: 4000.0,
        },
    );
    results.push(TestResult {
        name: "metabolism_altitude_spo2".into(),
        passed: high.state().spo2 < resting.state().spo2,
        detail: format!(
            "SpO2 {:.1}% at 4000 m vs {:.1}% at sea level",
            high.state().spo2,
            resting.state().spo2
        ),
    });

    if verbose {
        let march = ActivityInputs::new(1.6, 0.05, 20.0);
        let mut sim = MetabolicSimulator::new(config.clone());
        println!("  2 h loaded march (1.6 m/s, 5% grade, 20 kg):");
        for minute in (0..=120).step_by(20) {
            if minute > 0 {
                run_for(&mut sim, 1200.0, &march, &temperate);
            }
            let v = sim.snapshot();
            println!(
                "    t={:3}min HR {:5.1} core {:4.1}°C  cap {:5.1} reserve {:5.1} hyd {:5.1}",
                minute,
                v.heart_rate,
                v.core_temp,
                v.bars.output_capacity,
                v.bars.endurance_reserve,
                v.bars.hydration
            );
        }
    }

    results
}

// ── 3. Crafting Curves ──────────────────────────────────────────────────

fn validate_crafting_curves(tuning: &Tuning, verbose: bool) -> Vec<TestResult> {
    println!("--- Crafting Curves ---");
    let mut results = Vec::new();
    let model = &tuning.crafting;

    let novice = model.duration(5.0, 0.0);
    let master = model.duration(5.0, 100.0);
    results.push(TestResult {
        name: "crafting_duration_scale".into(),
        passed: master < novice && master > 0.0,
        detail: format!("5s recipe: {:.2}s unskilled, {:.2}s master", novice, master),
    });

    let durations: Vec<f32> = (0..=10).map(|l| model.duration(5.0, l as f32 * 10.0)).collect();
    results.push(TestResult {
        name: "crafting_duration_monotonic".into(),
        passed: durations.windows(2).all(|w| w[1] <= w[0]),
        detail: "duration never grows with skill".into(),
    });

    // Chance stays in bounds over the full level × difficulty grid
    let mut bounded = true;
    let mut monotonic = true;
    for difficulty in [0.0, 25.0, 50.0, 100.0, 200.0] {
        let mut prev = f32::MIN;
        for level in 0..=10 {
            let p = model.success_chance(
                level as f32,
                &[SkillContribution::new(level as f32, 2.0)],
                difficulty,
            );
            if p < model.min_success_chance || p > model.max_success_chance {
                bounded = false;
            }
            if p < prev {
                monotonic = false;
            }
            prev = p;
        }
    }
    results.push(TestResult {
        name: "crafting_chance_bounded".into(),
        passed: bounded,
        detail: format!(
            "chance within [{:.2}, {:.2}] for 55 combos",
            model.min_success_chance, model.max_success_chance
        ),
    });
    results.push(TestResult {
        name: "crafting_chance_monotonic".into(),
        passed: monotonic,
        detail: "chance never drops with skill level".into(),
    });

    // Observed success rate tracks the computed chance
    let chance = model.success_chance(3.0, &[], 25.0);
    let mut rng = StdRng::seed_from_u64(56);
    let trials = 10_000;
    let wins = (0..trials).filter(|_| model.roll_success(chance, &mut rng)).count();
    let observed = wins as f32 / trials as f32;
    results.push(TestResult {
        name: "crafting_roll_frequency".into(),
        passed: (observed - chance).abs() < 0.03,
        detail: format!("p={:.2}, observed {:.3} over {} rolls", chance, observed, trials),
    });

    if verbose {
        println!("  level  duration(5s)  chance(diff 25)");
        for level in 0..=10 {
            println!(
                "  {:5}  {:12.2}  {:15.2}",
                level,
                model.duration(5.0, level as f32 * 10.0),
                model.success_chance(level as f32, &[], 25.0)
            );
        }
    }

    results
}

// ── 4. Skills & Knowledge ───────────────────────────────────────────────

fn validate_skills(verbose: bool) -> Vec<TestResult> {
    println!("--- Skills & Knowledge ---");
    let mut results = Vec::new();

    let round_trip = SkillDomain::ALL
        .iter()
        .all(|d| SkillDomain::from_tag(d.tag()) == Some(*d));
    results.push(TestResult {
        name: "skills_tags_resolve".into(),
        passed: round_trip,
        detail: format!("{} domains resolve from their tags", SkillDomain::ALL.len()),
    });

    let titles: Vec<&str> = [0.0, 25.0, 45.0, 65.0, 95.0]
        .iter()
        .map(|v| rank_title(*v))
        .collect();
    results.push(TestResult {
        name: "skills_rank_titles".into(),
        passed: titles == ["Novice", "Apprentice", "Journeyman", "Adept", "Master"],
        detail: titles.join(" → "),
    });

    let mut book = SkillBook::new();
    let floor = skills::calculate_success_chance(&book, -100.0, SkillDomain::Naturalist, None, 0.0);
    book.set_skill(SkillDomain::Naturalist, 100.0);
    book.set_knowledge("Knowledge.PlantFibers", 100.0);
    let ceiling = skills::calculate_success_chance(
        &book,
        50.0,
        SkillDomain::Naturalist,
        Some("Knowledge.PlantFibers"),
        10.0,
    );
    results.push(TestResult {
        name: "skills_action_chance_bounds".into(),
        passed: floor == 5.0 && ceiling == 95.0,
        detail: format!("clamped to {:.0}..{:.0}", floor, ceiling),
    });

    let worn = skills::output_quality(&book, SkillDomain::Naturalist, 0.0);
    let fresh = skills::output_quality(&book, SkillDomain::Naturalist, 1.0);
    results.push(TestResult {
        name: "skills_output_quality".into(),
        passed: worn < fresh && fresh <= 10,
        detail: format!("master quality {} with a worn tool, {} fresh", worn, fresh),
    });

    let catalog_known =
        book.knows("Knowledge.PlantFibers") && find_knowledge("Knowledge.PlantFibers").is_some();
    results.push(TestResult {
        name: "skills_knowledge_catalog".into(),
        passed: catalog_known && skills::KNOWLEDGE_CATALOG.len() == 23,
        detail: format!("{} knowledge tracks", skills::KNOWLEDGE_CATALOG.len()),
    });

    if verbose {
        for entry in book.domain_entries().iter().filter(|e| e.total > 0.0) {
            println!(
                "  {} level {} ({:.0}, {})",
                entry.display_name,
                entry.level,
                entry.total,
                rank_title(entry.total)
            );
        }
    }

    results
}

// ── 5. Crafting Station ─────────────────────────────────────────────────

fn validate_station(tuning: &Tuning, verbose: bool) -> Vec<TestResult> {
    println!("--- Crafting Station ---");
    let mut results = Vec::new();
    let model = &tuning.crafting;

    let book = match bundled_recipes() {
        Ok(book) => book,
        Err(e) => {
            results.push(TestResult {
                name: "station_recipes".into(),
                passed: false,
                detail: e,
            });
            return results;
        }
    };
    let Some(recipe) = book.get("plant_cordage") else {
        results.push(TestResult {
            name: "station_recipes".into(),
            passed: false,
            detail: "plant_cordage missing from bundled data".into(),
        });
        return results;
    };

    let mut skills = SkillBook::new();
    let mut items = ItemBag::new().with("PlantFiber", 300);
    let mut station = CraftingStation::with_known([recipe.id.as_str()]);

    let locked = station.try_start(recipe, 0.0, &skills, &items, model).is_err();
    skills.set_knowledge("Knowledge.PlantCordage", 1.0);
    results.push(TestResult {
        name: "station_knowledge_gate".into(),
        passed: locked,
        detail: "craft refused until knowledge is learned".into(),
    });

    // Craft until fibre runs out
    let mut rng = StdRng::seed_from_u64(7);
    let mut now = 0.0_f64;
    let (mut successes, mut failures) = (0u32, 0u32);
    let first_duration = model.recipe_duration(recipe, &skills);
    while station
        .try_start(recipe, now, &skills, &items, model)
        .is_ok()
    {
        now += station.remaining(now) as f64 + 0.01;
        match station.advance(now, &mut skills, &mut items, model, &mut rng) {
            Some(CraftEvent::Finished { success: true, .. }) => successes += 1,
            Some(CraftEvent::Finished { success: false, .. }) => failures += 1,
            _ => break,
        }
    }
    let last_duration = model.recipe_duration(recipe, &skills);
    let cordage_skill = skills.skill_value(SkillDomain::Cordage);

    results.push(TestResult {
        name: "station_consumes_inputs".into(),
        passed: items.count("PlantFiber") < 3 && successes + failures == 100,
        detail: format!(
            "{} crafts ({} ok, {} failed), {} fibre left",
            successes + failures,
            successes,
            failures,
            items.count("PlantFiber")
        ),
    });
    results.push(TestResult {
        name: "station_outputs_match".into(),
        passed: items.count("Cordage") == successes
            && items.count("FrayedFiber") == failures,
        detail: format!(
            "{} cordage, {} frayed fibre",
            items.count("Cordage"),
            items.count("FrayedFiber")
        ),
    });
    results.push(TestResult {
        name: "station_skill_growth".into(),
        passed: cordage_skill > 0.0 && cordage_skill <= 100.0 && last_duration < first_duration,
        detail: format!(
            "cordage skill {:.0}, duration {:.2}s → {:.2}s",
            cordage_skill, first_duration, last_duration
        ),
    });

    if verbose {
        for entry in skills.knowledge_entries() {
            println!(
                "  {} {:.1} ({})",
                entry.display_name,
                entry.value,
                rank_title(entry.value)
            );
        }
    }

    results
}

// ── 6. Engine ───────────────────────────────────────────────────────────

/// Craft bark strips until the pack is empty; returns the success sequence.
fn replay_bark_strips(tuning: &Tuning, recipes: RecipeBook, seed: u64) -> Vec<bool> {
    let mut engine = SimulationEngine::new(tuning.clone(), recipes).with_seed(seed);
    let survivor = engine.spawn_survivor("Replay", None);
    let mut outcomes = Vec::new();
    if engine.unlock_recipe(survivor, "bark_strips").is_err()
        || engine.give_item(survivor, "Bark", 12).is_err()
    {
        return outcomes;
    }

    while engine.try_craft(survivor, "bark_strips").is_ok() {
        for _ in 0..100 {
            engine.update(0.1);
            let events = engine.drain_events();
            let finished = SimulationEngine::finished_crafts(&events);
            if let Some((_, _, success)) = finished.first() {
                outcomes.push(*success);
                break;
            }
        }
    }
    outcomes
}

fn validate_engine(tuning: &Tuning, verbose: bool) -> Vec<TestResult> {
    println!("--- Engine ---");
    let mut results = Vec::new();

    let recipes = match bundled_recipes() {
        Ok(book) => book,
        Err(e) => {
            results.push(TestResult {
                name: "engine_recipes".into(),
                passed: false,
                detail: e,
            });
            return results;
        }
    };

    // Time scale
    let mut engine = SimulationEngine::new(tuning.clone(), recipes.clone());
    engine.set_time_scale(2.0);
    for _ in 0..10 {
        engine.update(0.1);
    }
    results.push(TestResult {
        name: "engine_time_scale".into(),
        passed: (engine.sim_time() - 2.0).abs() < 1e-4,
        detail: format!("1s wall at 2× → {:.3}s sim", engine.sim_time()),
    });

    // A sprint shows up in the vitals
    let mut engine = SimulationEngine::new(tuning.clone(), recipes.clone());
    let runner = engine.spawn_survivor("Runner", Some(70.0));
    let sprint = engine.set_activity(runner, ActivityInputs::new(4.0, 0.1, 10.0));
    for _ in 0..600 {
        engine.update(0.1);
    }
    let vitals_changes = engine
        .drain_events()
        .iter()
        .filter(|e| matches!(e, mo56_core::systems::SimEvent::VitalsChanged(_)))
        .count();
    match (sprint, engine.vitals(runner)) {
        (Ok(()), Ok(vitals)) => results.push(TestResult {
            name: "engine_sprint_vitals".into(),
            passed: vitals.heart_rate > 100.0 && vitals.bars.output_capacity < 100.0,
            detail: format!(
                "60s sprint: HR {:.0}, output capacity {:.1}, {} change events",
                vitals.heart_rate, vitals.bars.output_capacity, vitals_changes
            ),
        }),
        (sprint, vitals) => results.push(TestResult {
            name: "engine_sprint_vitals".into(),
            passed: false,
            detail: format!("engine error: {:?} / {:?}", sprint.err(), vitals.err()),
        }),
    }

    // Same seed, same craft outcomes
    let first = replay_bark_strips(tuning, recipes.clone(), 56);
    let second = replay_bark_strips(tuning, recipes.clone(), 56);
    results.push(TestResult {
        name: "engine_seeded_replay".into(),
        passed: first.len() == 12 && first == second,
        detail: format!(
            "{} crafts, {} successes, identical on replay",
            first.len(),
            first.iter().filter(|s| **s).count()
        ),
    });

    if verbose {
        let line: String = first.iter().map(|s| if *s { '+' } else { '-' }).collect();
        println!("  seed 56 outcomes: {}", line);
    }

    results.push(inspection_unlocks_cordage(tuning, recipes));

    results
}

/// Study a nettle patch until cordage knowledge lands, then start a craft.
fn inspection_unlocks_cordage(tuning: &Tuning, recipes: RecipeBook) -> TestResult {
    let name = "engine_inspection_unlocks_craft".to_string();
    let mut engine = SimulationEngine::new(tuning.clone(), recipes).with_seed(56);
    let survivor = engine.spawn_survivor("Student", None);
    let setup = engine
        .unlock_recipe(survivor, "plant_cordage")
        .and_then(|_| engine.give_item(survivor, "PlantFiber", 3));
    if let Err(e) = setup {
        return TestResult {
            name,
            passed: false,
            detail: format!("engine error: {}", e),
        };
    }
    let locked = engine.craftable(survivor).map(|ids| ids.is_empty()).unwrap_or(false);

    let params = InspectionParams::for_item(
        "Knowledge.PlantCordage",
        1.0,
        0.0,
        Some("Skill.Naturalist"),
        &Default::default(),
    );
    if let Err(e) = engine.start_inspection(survivor, "nettle_patch", params) {
        return TestResult {
            name,
            passed: false,
            detail: format!("inspection refused: {}", e),
        };
    }
    let queued = engine.pending_events();
    for _ in 0..205 {
        engine.update(0.1);
    }
    let unlocked = engine
        .craftable(survivor)
        .map(|ids| ids.iter().any(|id| id == "plant_cordage"))
        .unwrap_or(false);
    let started = engine.try_craft(survivor, "plant_cordage").is_ok();
    let crafting = engine.active_crafters() == vec![survivor];
    let naturalist = engine
        .skill_value(survivor, SkillDomain::Naturalist)
        .unwrap_or(0.0);

    TestResult {
        name,
        passed: locked && queued == 1 && unlocked && started && crafting && naturalist > 0.0,
        detail: format!(
            "20s study: locked before {}, craftable after {}, crafting {}, naturalist {:.0}",
            locked, unlocked, crafting, naturalist
        ),
    }
}
