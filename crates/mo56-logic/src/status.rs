//! Normalized status bars and change detection for vitals displays.
//!
//! Bars are 0–100 readouts derived from the metabolic state. Displayed bars
//! chase their targets with exponential smoothing so the readout does not
//! jitter from tick to tick. A [`ChangeTracker`] compares each new
//! [`VitalsSnapshot`] with the last one it reported and only flags a change
//! when something moved past a tolerance.

use serde::{Deserialize, Serialize};

use crate::metabolism::MetabolicState;

pub const BAR_MIN: f32 = 0.0;
pub const BAR_MAX: f32 = 100.0;

/// The six survivor status bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusBars {
    /// Power headroom left before hitting max aerobic output.
    pub output_capacity: f32,
    /// Glycogen plus gut contents relative to full stores.
    pub endurance_reserve: f32,
    pub oxygenation: f32,
    pub hydration: f32,
    /// Rises with core temperature; 0 is comfortable.
    pub heat_strain: f32,
    pub integrity: f32,
}

impl Default for StatusBars {
    fn default() -> Self {
        Self {
            output_capacity: BAR_MAX,
            endurance_reserve: BAR_MAX,
            oxygenation: BAR_MAX,
            hydration: BAR_MAX,
            heat_strain: BAR_MIN,
            integrity: BAR_MAX,
        }
    }
}

/// Bar identifiers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarKind {
    OutputCapacity,
    EnduranceReserve,
    Oxygenation,
    Hydration,
    HeatStrain,
    Integrity,
}

impl BarKind {
    pub const ALL: [BarKind; 6] = [
        BarKind::OutputCapacity,
        BarKind::EnduranceReserve,
        BarKind::Oxygenation,
        BarKind::Hydration,
        BarKind::HeatStrain,
        BarKind::Integrity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BarKind::OutputCapacity => "Output Capacity",
            BarKind::EnduranceReserve => "Endurance Reserve",
            BarKind::Oxygenation => "Oxygenation",
            BarKind::Hydration => "Hydration",
            BarKind::HeatStrain => "Heat Strain",
            BarKind::Integrity => "Integrity",
        }
    }
}

/// One exponential smoothing step: `current + alpha * (target - current)`.
///
/// `alpha` is clamped to 0.0–1.0 so the result never overshoots.
pub fn smooth(current: f32, target: f32, alpha: f32) -> f32 {
    let alpha = if alpha.is_finite() {
        alpha.clamp(0.0, 1.0)
    } else {
        0.0
    };
    current + alpha * (target - current)
}

fn clamp_bar(value: f32) -> f32 {
    if value.is_nan() {
        BAR_MIN
    } else {
        value.clamp(BAR_MIN, BAR_MAX)
    }
}

impl StatusBars {
    pub fn get(&self, kind: BarKind) -> f32 {
        match kind {
            BarKind::OutputCapacity => self.output_capacity,
            BarKind::EnduranceReserve => self.endurance_reserve,
            BarKind::Oxygenation => self.oxygenation,
            BarKind::Hydration => self.hydration,
            BarKind::HeatStrain => self.heat_strain,
            BarKind::Integrity => self.integrity,
        }
    }

    /// Every bar clamped to 0–100 (NaN reads as 0).
    pub fn clamped(self) -> Self {
        Self {
            output_capacity: clamp_bar(self.output_capacity),
            endurance_reserve: clamp_bar(self.endurance_reserve),
            oxygenation: clamp_bar(self.oxygenation),
            hydration: clamp_bar(self.hydration),
            heat_strain: clamp_bar(self.heat_strain),
            integrity: clamp_bar(self.integrity),
        }
    }

    /// Move every bar one smoothing step toward `target`.
    pub fn smooth_toward(&mut self, target: &StatusBars, alpha: f32) {
        self.output_capacity = smooth(self.output_capacity, target.output_capacity, alpha);
        self.endurance_reserve = smooth(self.endurance_reserve, target.endurance_reserve, alpha);
        self.oxygenation = smooth(self.oxygenation, target.oxygenation, alpha);
        self.hydration = smooth(self.hydration, target.hydration, alpha);
        self.heat_strain = smooth(self.heat_strain, target.heat_strain, alpha);
        self.integrity = smooth(self.integrity, target.integrity, alpha);
    }

    /// Bars in [`BarKind::ALL`] order.
    pub fn as_array(&self) -> [f32; 6] {
        [
            self.output_capacity,
            self.endurance_reserve,
            self.oxygenation,
            self.hydration,
            self.heat_strain,
            self.integrity,
        ]
    }
}

/// Everything a vitals display shows: bars plus raw vital signs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsSnapshot {
    pub bars: StatusBars,
    pub heart_rate: f32,
    pub systolic_bp: f32,
    pub diastolic_bp: f32,
    pub spo2: f32,
    pub core_temp: f32,
    pub blood_glucose: f32,
}

impl VitalsSnapshot {
    pub fn capture(bars: &StatusBars, state: &MetabolicState) -> Self {
        Self {
            bars: *bars,
            heart_rate: state.heart_rate,
            systolic_bp: state.systolic_bp,
            diastolic_bp: state.diastolic_bp,
            spo2: state.spo2,
            core_temp: state.core_temp,
            blood_glucose: state.blood_glucose,
        }
    }

    fn vitals(&self) -> [f32; 6] {
        [
            self.heart_rate,
            self.systolic_bp,
            self.diastolic_bp,
            self.spo2,
            self.core_temp,
            self.blood_glucose,
        ]
    }

    /// True when no bar differs by more than `bar_tolerance` and no vital
    /// by more than `vital_tolerance`.
    pub fn approx_eq(&self, other: &VitalsSnapshot, bar_tolerance: f32, vital_tolerance: f32) -> bool {
        let bars_close = self
            .bars
            .as_array()
            .iter()
            .zip(other.bars.as_array().iter())
            .all(|(a, b)| (a - b).abs() <= bar_tolerance);
        let vitals_close = self
            .vitals()
            .iter()
            .zip(other.vitals().iter())
            .all(|(a, b)| (a - b).abs() <= vital_tolerance);
        bars_close && vitals_close
    }
}

/// Tolerance-deduplicated change detection.
///
/// Holds the last reported snapshot; [`observe`](Self::observe) replaces it
/// only when the new one differs enough, and raises a pending flag that a
/// poller can clear with [`take_pending`](Self::take_pending).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeTracker {
    last: VitalsSnapshot,
    bar_tolerance: f32,
    vital_tolerance: f32,
    pending: bool,
}

impl ChangeTracker {
    pub fn new(initial: VitalsSnapshot, bar_tolerance: f32, vital_tolerance: f32) -> Self {
        Self {
            last: initial,
            bar_tolerance: bar_tolerance.max(0.0),
            vital_tolerance: vital_tolerance.max(0.0),
            pending: false,
        }
    }

    /// Compare `current` against the last reported snapshot. Returns `true`
    /// (and records `current`) when it moved past tolerance.
    pub fn observe(&mut self, current: VitalsSnapshot) -> bool {
        if current.approx_eq(&self.last, self.bar_tolerance, self.vital_tolerance) {
            return false;
        }
        self.last = current;
        self.pending = true;
        true
    }

    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn last_reported(&self) -> &VitalsSnapshot {
        &self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> VitalsSnapshot {
        VitalsSnapshot::capture(&StatusBars::default(), &MetabolicState::default())
    }

    #[test]
    fn default_bars() {
        let bars = StatusBars::default();
        assert_eq!(bars.output_capacity, 100.0);
        assert_eq!(bars.heat_strain, 0.0);
        assert_eq!(bars.get(BarKind::Integrity), 100.0);
    }

    #[test]
    fn smoothing_step() {
        assert!((smooth(0.0, 100.0, 0.1) - 10.0).abs() < f32::EPSILON);
        assert!((smooth(50.0, 50.0, 0.3) - 50.0).abs() < f32::EPSILON);
        // Out-of-range alpha cannot overshoot
        assert!((smooth(0.0, 100.0, 4.0) - 100.0).abs() < f32::EPSILON);
        assert!((smooth(10.0, 100.0, -1.0) - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn clamped_handles_nan_and_bounds() {
        let bars = StatusBars {
            output_capacity: -20.0,
            endurance_reserve: 250.0,
            oxygenation: f32::NAN,
            ..StatusBars::default()
        }
        .clamped();
        assert_eq!(bars.output_capacity, 0.0);
        assert_eq!(bars.endurance_reserve, 100.0);
        assert_eq!(bars.oxygenation, 0.0);
    }

    #[test]
    fn bar_kinds_cover_array_order() {
        let bars = StatusBars {
            output_capacity: 1.0,
            endurance_reserve: 2.0,
            oxygenation: 3.0,
            hydration: 4.0,
            heat_strain: 5.0,
            integrity: 6.0,
        };
        let arr = bars.as_array();
        for (i, kind) in BarKind::ALL.iter().enumerate() {
            assert_eq!(bars.get(*kind), arr[i]);
            assert!(!kind.label().is_empty());
        }
    }

    #[test]
    fn tolerance_boundaries() {
        let base = snapshot();
        let mut bar_nudge = base;
        bar_nudge.bars.hydration -= 0.25;
        assert!(base.approx_eq(&bar_nudge, 0.25, 0.5));
        bar_nudge.bars.hydration -= 0.1;
        assert!(!base.approx_eq(&bar_nudge, 0.25, 0.5));

        let mut vital_nudge = base;
        vital_nudge.heart_rate += 0.4;
        assert!(base.approx_eq(&vital_nudge, 0.25, 0.5));
        vital_nudge.heart_rate += 0.2;
        assert!(!base.approx_eq(&vital_nudge, 0.25, 0.5));
    }

    #[test]
    fn tracker_flags_only_real_changes() {
        let mut tracker = ChangeTracker::new(snapshot(), 0.25, 0.5);
        let mut next = snapshot();
        next.core_temp += 0.1;
        assert!(!tracker.observe(next));
        assert!(!tracker.take_pending());

        next.core_temp += 1.0;
        assert!(tracker.observe(next));
        assert_eq!(tracker.last_reported(), &next);
        assert!(tracker.take_pending());
        assert!(!tracker.take_pending());
    }

    #[test]
    fn slow_drift_is_reported_once_past_tolerance() {
        let mut tracker = ChangeTracker::new(snapshot(), 0.25, 0.5);
        let mut current = snapshot();
        let mut reports = 0;
        for _ in 0..10 {
            current.bars.endurance_reserve -= 0.1;
            if tracker.observe(current) {
                reports += 1;
            }
        }
        // 1.0 of drift in 0.1 steps crosses 0.25 three times
        assert_eq!(reports, 3);
    }
}
