//! Per-tick metabolic simulation: energy stores, vitals, hydration, heat.
//!
//! A survivor's body is modelled as a handful of energy pools (gut, blood
//! buffer, glycogen, fat), a cardio-respiratory response to effort and
//! altitude, a simple thermoregulation loop and a body-water balance. Each
//! tick runs the same pipeline:
//!
//! 1. [`compute_power_demand`]: instantaneous power from mass, speed, grade
//!    and carried load, split into fat and carbohydrate fuel.
//! 2. [`update_stores_and_vitals`]: absorb, burn, accrue anaerobic debt,
//!    then derive heart rate, blood pressure, SpO2, core temperature and
//!    sweat loss.
//! 3. [`compute_bar_targets`]: six normalized status bars, which the
//!    [`MetabolicSimulator`] smooths toward.
//!
//! ```
//! use mo56_logic::metabolism::{ActivityInputs, EnvironmentInputs, MetabolicConfig, MetabolicSimulator};
//!
//! let mut sim = MetabolicSimulator::new(MetabolicConfig::default());
//! let walking = ActivityInputs::new(1.4, 0.0, 10.0);
//! sim.update(0.25, &walking, &EnvironmentInputs::default());
//! assert!(sim.bars().output_capacity <= 100.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::status::{ChangeTracker, StatusBars, VitalsSnapshot};

/// Physiological constants used by the metabolic pipeline.
pub mod metabolic_constants {
    pub const JOULES_PER_KCAL: f32 = 4184.0;
    /// Baseline power draw of a body at rest (watts).
    pub const RESTING_POWER: f32 = 100.0;

    /// Body mass used when the caller cannot supply one.
    pub const DEFAULT_BODY_MASS_KG: f32 = 80.0;
    /// Supplied body masses are floored to this value.
    pub const MIN_BODY_MASS_KG: f32 = 40.0;

    /// Mechanical cost coefficients for locomotion.
    pub const HORIZONTAL_COST: f32 = 3.5;
    pub const GRAVITY: f32 = 9.81;
    pub const LOAD_COST: f32 = 4.0;
    /// Demand is capped at this multiple of max aerobic power.
    pub const PEAK_POWER_FACTOR: f32 = 1.5;

    /// Carbohydrate share of demand at zero and at the fat access limit.
    pub const CARB_SHARE_MIN: f32 = 0.15;
    pub const CARB_SHARE_MAX: f32 = 0.6;

    pub const BLOOD_BUFFER_MAX_KCAL: f32 = 40.0;
    /// Fraction of absorbed gut energy that reaches the blood buffer.
    pub const FAST_ABSORB_YIELD: f32 = 0.8;
    pub const SLOW_ABSORB_YIELD: f32 = 0.5;
    pub const FAT_CONVERSION_EFFICIENCY: f32 = 0.5;

    /// One debt unit per 0.1 kcal of unmet carbohydrate demand.
    pub const DEBT_UNITS_PER_KCAL: f32 = 10.0;
    pub const DEBT_RECOVERY_PER_MINUTE: f32 = 5.0;
    /// Unmet demand below this is treated as serviced.
    pub const UNMET_DEMAND_EPSILON: f32 = 1e-4;

    pub const BLOOD_GLUCOSE_BASELINE: f32 = 90.0;
    pub const BLOOD_GLUCOSE_PER_KCAL: f32 = 2.5;
    pub const BLOOD_GLUCOSE_MIN: f32 = 60.0;
    pub const BLOOD_GLUCOSE_MAX: f32 = 140.0;

    pub const SPO2_BASELINE: f32 = 98.0;
    pub const SPO2_MIN: f32 = 80.0;
    pub const SPO2_MAX: f32 = 100.0;
    pub const SPO2_ALTITUDE_PENALTY_MAX: f32 = 20.0;
    pub const SPO2_EFFORT_PENALTY_MAX: f32 = 6.0;

    pub const HEART_RATE_MIN: f32 = 50.0;
    pub const HEART_RATE_MAX: f32 = 200.0;
    pub const SYSTOLIC_MIN: f32 = 90.0;
    pub const SYSTOLIC_MAX: f32 = 200.0;
    pub const DIASTOLIC_MIN: f32 = 50.0;
    pub const DIASTOLIC_MAX: f32 = 140.0;

    pub const CORE_TEMP_BASELINE: f32 = 37.0;
    pub const CORE_TEMP_UPPER_SAFE: f32 = 39.5;
    pub const CORE_TEMP_MIN: f32 = CORE_TEMP_BASELINE - 1.0;
    pub const CORE_TEMP_MAX: f32 = CORE_TEMP_UPPER_SAFE + 1.5;
    /// Ambient temperature above which the environment adds heat load.
    pub const THERMONEUTRAL_AMBIENT: f32 = 21.0;
    pub const MAX_SWEAT_PER_HOUR: f32 = 1.2;

    /// Extra capacity allowance for gut contents in the endurance bar (kcal).
    pub const GUT_RESERVE_ALLOWANCE: f32 = 2000.0;
}

/// Tunable limits and rates for the metabolic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolicConfig {
    pub glycogen_muscle_max: f32,
    pub glycogen_liver_max: f32,
    /// Total body water of a fully hydrated survivor (liters).
    pub tbw_normal: f32,
    /// Sustainable aerobic power (watts).
    pub max_aerobic_power: f32,
    /// Highest power fat oxidation alone can supply (watts).
    pub fat_access_rate_max: f32,
    /// Gut absorption rates (kcal per minute).
    pub absorb_fast_rate: f32,
    pub absorb_slow_rate: f32,
    /// Fraction of the remaining gap closed by each bar smoothing step.
    pub bar_smoothing_alpha: f32,
    /// Change-notification tolerances.
    pub bar_tolerance: f32,
    pub vital_tolerance: f32,
}

impl Default for MetabolicConfig {
    fn default() -> Self {
        Self {
            glycogen_muscle_max: 2000.0,
            glycogen_liver_max: 500.0,
            tbw_normal: 42.0,
            max_aerobic_power: 800.0,
            fat_access_rate_max: 300.0,
            absorb_fast_rate: 80.0,
            absorb_slow_rate: 20.0,
            bar_smoothing_alpha: 0.1,
            bar_tolerance: 0.25,
            vital_tolerance: 0.5,
        }
    }
}

/// Energy stores, vitals, hydration and integrity of one survivor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetabolicState {
    // Energy (kcal)
    pub gut_energy_fast: f32,
    pub gut_energy_slow: f32,
    pub blood_energy_buffer: f32,
    pub glycogen_muscle: f32,
    pub glycogen_liver: f32,
    pub fat_store: f32,
    pub anaerobic_debt: f32,

    // Vitals
    pub heart_rate: f32,
    pub systolic_bp: f32,
    pub diastolic_bp: f32,
    pub spo2: f32,
    pub core_temp: f32,
    /// mg/dL
    pub blood_glucose: f32,

    // Hydration (liters)
    pub total_body_water: f32,
    pub sweat_loss_today: f32,

    // Integrity
    /// 0.0 = unhurt, 1.0 = maximally wounded.
    pub wound_level: f32,
    /// Liters per hour.
    pub bleed_rate: f32,
}

impl Default for MetabolicState {
    fn default() -> Self {
        Self {
            gut_energy_fast: 0.0,
            gut_energy_slow: 0.0,
            blood_energy_buffer: 10.0,
            glycogen_muscle: 1500.0,
            glycogen_liver: 400.0,
            fat_store: 150_000.0,
            anaerobic_debt: 0.0,
            heart_rate: 75.0,
            systolic_bp: 120.0,
            diastolic_bp: 80.0,
            spo2: 98.0,
            core_temp: 37.0,
            blood_glucose: 100.0,
            total_body_water: 42.0,
            sweat_loss_today: 0.0,
            wound_level: 0.0,
            bleed_rate: 0.0,
        }
    }
}

/// Movement inputs read once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityInputs {
    /// Ground speed in m/s.
    pub speed: f32,
    /// Grade as rise over run, -1.0..=1.0.
    pub slope: f32,
    /// Carried load in kg.
    pub load_kg: f32,
    /// Body mass without load; `None` when the caller has no figure.
    pub body_mass_kg: Option<f32>,
}

impl ActivityInputs {
    pub fn new(speed: f32, slope: f32, load_kg: f32) -> Self {
        Self {
            speed,
            slope,
            load_kg,
            body_mass_kg: None,
        }
        .sanitized()
    }

    pub fn with_body_mass(mut self, body_mass_kg: f32) -> Self {
        self.body_mass_kg = Some(body_mass_kg);
        self
    }

    /// Clamp every field into its valid range. Non-finite values become 0.
    pub fn sanitized(self) -> Self {
        Self {
            speed: finite_or_zero(self.speed).max(0.0),
            slope: finite_or_zero(self.slope).clamp(-1.0, 1.0),
            load_kg: finite_or_zero(self.load_kg).max(0.0),
            body_mass_kg: self.body_mass_kg.filter(|m| m.is_finite()),
        }
    }

    /// Body mass plus carried load.
    pub fn total_mass_kg(&self) -> f32 {
        use metabolic_constants::*;
        let base = match self.body_mass_kg {
            Some(mass) if mass.is_finite() => mass.max(MIN_BODY_MASS_KG),
            _ => DEFAULT_BODY_MASS_KG,
        };
        base + finite_or_zero(self.load_kg).max(0.0)
    }
}

/// Surroundings read once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInputs {
    /// Celsius.
    pub ambient_temp: f32,
    /// Meters above sea level.
    pub altitude_m: f32,
}

impl Default for EnvironmentInputs {
    fn default() -> Self {
        Self {
            ambient_temp: metabolic_constants::THERMONEUTRAL_AMBIENT,
            altitude_m: 0.0,
        }
    }
}

impl EnvironmentInputs {
    /// Replace non-finite fields with their defaults.
    pub fn sanitized(self) -> Self {
        let fallback = Self::default();
        Self {
            ambient_temp: if self.ambient_temp.is_finite() {
                self.ambient_temp
            } else {
                fallback.ambient_temp
            },
            altitude_m: if self.altitude_m.is_finite() {
                self.altitude_m
            } else {
                fallback.altitude_m
            },
        }
    }
}

/// Instantaneous power demand and its fuel split (watts).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerSplit {
    pub demand: f32,
    pub fat: f32,
    pub carb: f32,
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Linear remap of `value` from `[in_lo, in_hi]` to `[out_lo, out_hi]`,
/// clamped to the output range.
pub fn map_range_clamped(value: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let span = in_hi - in_lo;
    if span.abs() < f32::EPSILON {
        return if value >= in_hi { out_hi } else { out_lo };
    }
    let t = ((value - in_lo) / span).clamp(0.0, 1.0);
    out_lo + (out_hi - out_lo) * t
}

/// Take up to `amount` from `store`, returning what was actually taken.
fn draw_from(store: &mut f32, amount: f32) -> f32 {
    let taken = amount.clamp(0.0, store.max(0.0));
    *store -= taken;
    taken
}

/// Compute instantaneous power demand and split it into fat and carbohydrate.
pub fn compute_power_demand(config: &MetabolicConfig, activity: &ActivityInputs) -> PowerSplit {
    use metabolic_constants::*;

    let activity = activity.sanitized();
    let mass = activity.total_mass_kg();
    let speed = activity.speed;

    let horizontal = mass * speed * HORIZONTAL_COST;
    let climbing = mass * GRAVITY * speed * activity.slope;
    let load = activity.load_kg * speed * LOAD_COST;
    let raw = RESTING_POWER + horizontal + climbing + load;

    let peak = config.max_aerobic_power.max(0.0) * PEAK_POWER_FACTOR;
    let demand = raw.clamp(0.0, peak);

    let fat_limit = config.fat_access_rate_max.max(0.0);
    if demand < fat_limit {
        let carb_share = map_range_clamped(demand, 0.0, fat_limit, CARB_SHARE_MIN, CARB_SHARE_MAX);
        let carb = demand * carb_share;
        PowerSplit {
            demand,
            fat: demand - carb,
            carb,
        }
    } else {
        PowerSplit {
            demand,
            fat: fat_limit,
            carb: demand - fat_limit,
        }
    }
}

/// Advance energy stores and vitals by `dt` seconds.
///
/// `power.demand` is reduced in place when carbohydrate demand cannot be met
/// from any store. A non-positive or non-finite `dt` leaves everything
/// untouched.
pub fn update_stores_and_vitals(
    state: &mut MetabolicState,
    config: &MetabolicConfig,
    power: &mut PowerSplit,
    environment: &EnvironmentInputs,
    dt: f32,
) {
    use metabolic_constants::*;

    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let environment = environment.sanitized();
    let minutes = dt / 60.0;
    let hours = dt / 3600.0;

    // Digestion into the blood buffer
    let absorb_fast = state
        .gut_energy_fast
        .max(0.0)
        .min(config.absorb_fast_rate.max(0.0) * minutes);
    state.gut_energy_fast -= absorb_fast;
    let absorb_slow = state
        .gut_energy_slow
        .max(0.0)
        .min(config.absorb_slow_rate.max(0.0) * minutes);
    state.gut_energy_slow -= absorb_slow;

    state.blood_energy_buffer = (state.blood_energy_buffer
        + absorb_fast * FAST_ABSORB_YIELD
        + absorb_slow * SLOW_ABSORB_YIELD)
        .clamp(0.0, BLOOD_BUFFER_MAX_KCAL);

    // Carbohydrate demand, cheapest store first
    let mut remaining = power.carb.max(0.0) * dt / JOULES_PER_KCAL;
    remaining -= draw_from(&mut state.blood_energy_buffer, remaining);
    remaining -= draw_from(&mut state.glycogen_muscle, remaining);
    remaining -= draw_from(&mut state.glycogen_liver, remaining);
    if remaining > 0.0 {
        let converted = state
            .fat_store
            .max(0.0)
            .min(remaining * FAT_CONVERSION_EFFICIENCY);
        state.fat_store -= converted;
        remaining -= converted;
    }

    if remaining > UNMET_DEMAND_EPSILON {
        state.anaerobic_debt += remaining * DEBT_UNITS_PER_KCAL;
        power.demand = (power.demand - remaining * JOULES_PER_KCAL / dt).max(0.0);
    }
    state.anaerobic_debt = (state.anaerobic_debt - DEBT_RECOVERY_PER_MINUTE * minutes).max(0.0);

    let fat_used = power.fat.max(0.0) * dt / JOULES_PER_KCAL;
    state.fat_store = (state.fat_store - fat_used).max(0.0);

    // Cardio-respiratory response
    let effort = power.demand / config.max_aerobic_power.max(1.0);
    let wound = state.wound_level.clamp(0.0, 1.0);

    let altitude_penalty =
        (environment.altitude_m / 1000.0 * 1.5).clamp(0.0, SPO2_ALTITUDE_PENALTY_MAX);
    let effort_penalty = (effort * 4.0).clamp(0.0, SPO2_EFFORT_PENALTY_MAX);
    state.spo2 = (SPO2_BASELINE - altitude_penalty - effort_penalty).clamp(SPO2_MIN, SPO2_MAX);

    state.heart_rate = (60.0 + effort * 110.0 + state.anaerobic_debt * 0.1)
        .clamp(HEART_RATE_MIN, HEART_RATE_MAX);
    state.systolic_bp = (110.0 + effort * 60.0 + wound * 40.0).clamp(SYSTOLIC_MIN, SYSTOLIC_MAX);
    state.diastolic_bp =
        (70.0 + effort * 25.0 - wound * 20.0).clamp(DIASTOLIC_MIN, DIASTOLIC_MAX);

    // Thermoregulation. Resting metabolism at thermoneutral ambient is heat
    // neutral; cooling pulls the core back to baseline but never below it.
    let resting_effort = RESTING_POWER / config.max_aerobic_power.max(1.0);
    let heat_load = (effort - resting_effort).max(0.0) * 0.8
        + (environment.ambient_temp - THERMONEUTRAL_AMBIENT).max(0.0) * 0.03;
    let hydration_ratio = state.total_body_water / config.tbw_normal.max(0.1);
    let cooling = (hydration_ratio - 0.8).max(0.0) * 0.5;
    let delta = (heat_load - cooling) * minutes * 0.2;
    let mut core_temp = state.core_temp + delta;
    if delta < 0.0 {
        core_temp = core_temp.max(state.core_temp.min(CORE_TEMP_BASELINE));
    }
    state.core_temp = core_temp.clamp(CORE_TEMP_MIN, CORE_TEMP_MAX);

    // Water balance
    let sweat_rate = (heat_load * 0.5).clamp(0.0, MAX_SWEAT_PER_HOUR);
    let sweat_loss = sweat_rate * hours;
    state.sweat_loss_today += sweat_loss;
    state.total_body_water = (state.total_body_water - sweat_loss).max(0.0);

    if state.bleed_rate > 0.0 {
        let blood_loss = state.bleed_rate * hours;
        state.total_body_water = (state.total_body_water - blood_loss).max(0.0);
    }

    state.blood_glucose = (BLOOD_GLUCOSE_BASELINE
        + state.blood_energy_buffer * BLOOD_GLUCOSE_PER_KCAL)
        .clamp(BLOOD_GLUCOSE_MIN, BLOOD_GLUCOSE_MAX);
}

/// Compute the target value of each status bar from the current state.
pub fn compute_bar_targets(
    state: &MetabolicState,
    config: &MetabolicConfig,
    power: &PowerSplit,
) -> StatusBars {
    use metabolic_constants::*;

    // Headroom above resting metabolism: a survivor at rest has full capacity.
    let active_demand = power.demand - RESTING_POWER;
    let active_range = (config.max_aerobic_power - RESTING_POWER).max(1.0);
    let output_capacity = 100.0 - active_demand / active_range * 100.0;

    let glycogen = state.glycogen_muscle + state.glycogen_liver;
    let gut = state.gut_energy_fast + state.gut_energy_slow;
    let reserve_capacity =
        config.glycogen_muscle_max + config.glycogen_liver_max + GUT_RESERVE_ALLOWANCE;
    let endurance_reserve = (glycogen + gut) / reserve_capacity.max(1.0) * 100.0;

    let hydration = state.total_body_water / config.tbw_normal.max(0.1) * 100.0;

    let heat_strain = map_range_clamped(
        state.core_temp,
        CORE_TEMP_BASELINE - 0.5,
        CORE_TEMP_UPPER_SAFE,
        0.0,
        100.0,
    );

    let integrity = (1.0 - state.wound_level) * 100.0 - state.bleed_rate * 2.0;

    StatusBars {
        output_capacity,
        endurance_reserve,
        oxygenation: state.spo2,
        hydration,
        heat_strain,
        integrity,
    }
    .clamped()
}

/// Stateful driver: owns the metabolic state, the displayed bars and the
/// change tracker used for notifications.
#[derive(Debug, Clone)]
pub struct MetabolicSimulator {
    config: MetabolicConfig,
    state: MetabolicState,
    power: PowerSplit,
    bars: StatusBars,
    targets: StatusBars,
    first_evaluation: bool,
    tracker: ChangeTracker,
}

impl MetabolicSimulator {
    pub fn new(config: MetabolicConfig) -> Self {
        Self::with_state(config, MetabolicState::default())
    }

    /// Start from an existing state, e.g. one restored by the caller.
    pub fn with_state(config: MetabolicConfig, state: MetabolicState) -> Self {
        let bars = StatusBars::default();
        let tracker = ChangeTracker::new(
            VitalsSnapshot::capture(&bars, &state),
            config.bar_tolerance,
            config.vital_tolerance,
        );
        Self {
            config,
            state,
            power: PowerSplit::default(),
            bars,
            targets: bars,
            first_evaluation: true,
            tracker,
        }
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Returns `true` when the displayed vitals moved past the notification
    /// tolerance.
    pub fn update(
        &mut self,
        dt: f32,
        activity: &ActivityInputs,
        environment: &EnvironmentInputs,
    ) -> bool {
        self.power = compute_power_demand(&self.config, activity);
        update_stores_and_vitals(
            &mut self.state,
            &self.config,
            &mut self.power,
            environment,
            dt,
        );
        self.refresh_bars();
        self.tracker.observe(self.snapshot())
    }

    /// Add food to the gut. Pools never go negative.
    pub fn consume_food(&mut self, kcal_fast: f32, kcal_slow: f32) -> bool {
        self.state.gut_energy_fast = (self.state.gut_energy_fast + finite_or_zero(kcal_fast)).max(0.0);
        self.state.gut_energy_slow = (self.state.gut_energy_slow + finite_or_zero(kcal_slow)).max(0.0);
        self.after_mutation()
    }

    /// Drink `liters` of water; offsets the day's sweat loss.
    pub fn drink_water(&mut self, liters: f32) -> bool {
        let liters = finite_or_zero(liters).max(0.0);
        self.state.total_body_water = (self.state.total_body_water + liters).max(0.0);
        self.state.sweat_loss_today = (self.state.sweat_loss_today - liters).max(0.0);
        self.after_mutation()
    }

    /// Replace the current wound level (0–1) and bleed rate (L/h).
    pub fn apply_injury(&mut self, wound_level: f32, bleed_rate: f32) -> bool {
        self.state.wound_level = finite_or_zero(wound_level).clamp(0.0, 1.0);
        self.state.bleed_rate = finite_or_zero(bleed_rate).max(0.0);
        self.after_mutation()
    }

    /// Returns and clears the pending change flag.
    pub fn take_vitals_changed(&mut self) -> bool {
        self.tracker.take_pending()
    }

    pub fn config(&self) -> &MetabolicConfig {
        &self.config
    }

    pub fn state(&self) -> &MetabolicState {
        &self.state
    }

    /// Displayed (smoothed) bars.
    pub fn bars(&self) -> &StatusBars {
        &self.bars
    }

    /// Unsmoothed bar targets from the latest evaluation.
    pub fn targets(&self) -> &StatusBars {
        &self.targets
    }

    pub fn power(&self) -> &PowerSplit {
        &self.power
    }

    pub fn snapshot(&self) -> VitalsSnapshot {
        VitalsSnapshot::capture(&self.bars, &self.state)
    }

    fn after_mutation(&mut self) -> bool {
        self.refresh_bars();
        self.tracker.observe(self.snapshot())
    }

    fn refresh_bars(&mut self) {
        self.targets = compute_bar_targets(&self.state, &self.config, &self.power);
        if self.first_evaluation {
            self.bars = self.targets;
            self.first_evaluation = false;
        } else {
            self.bars
                .smooth_toward(&self.targets, self.config.bar_smoothing_alpha);
        }
    }
}

impl Default for MetabolicSimulator {
    fn default() -> Self {
        Self::new(MetabolicConfig::default())
    }
}
