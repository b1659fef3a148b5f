// src/optimizer/motion.rs - Energy demand scoring and energy estimates of a single motion

use super::segmenter::Motion;
use dxm_shared::constants::{
    MAX_ENERGY_CONSUMPTION, MAX_SAVINGS, MAX_SPEED_RATIO, MIN_ENERGY_CONSUMPTION, MIN_SAVINGS,
    MIN_SPEED_RATIO,
};
use dxm_shared::Waypoint;
use serde::Serialize;

/// Dimensionless estimate of how strongly a motion's energy use responds to its speed.
///
/// Motions whose duration barely changes at half speed (ratio near 1.0) are dominated by
/// technical overhead and score near 0; motions whose duration nearly doubles score near 1.
/// The result is not clamped.
pub fn energy_demand_score(duration_full: f64, duration_half: f64) -> f64 {
    if duration_half <= 0.0 {
        return 0.0;
    }
    let speed_ratio = duration_full / duration_half;
    (MAX_SPEED_RATIO - speed_ratio) / (MAX_SPEED_RATIO - MIN_SPEED_RATIO)
}

/// Fraction of the base savings achieved at `velocity` percent.
///
/// Below 45% the full savings apply; they fall to 80% at 60% velocity and vanish at 100%.
pub fn velocity_savings_factor(velocity: f64) -> f64 {
    let v = velocity.clamp(0.0, 100.0);
    if v < 45.0 {
        1.0
    } else if v < 60.0 {
        lerp(1.0, 0.8, inverse_lerp(45.0, 60.0, v))
    } else {
        lerp(0.8, 0.0, inverse_lerp(60.0, 100.0, v))
    }
}

/// A motion under optimization, tied to the program it was segmented from.
#[derive(Debug, Clone)]
pub struct OptimizableMotion {
    motion: Motion,
    duration_at_full_speed: f64,
    energy_demand_score: f64,
    velocity: f64,
}

impl OptimizableMotion {
    /// Pairs a motion measured at full speed with the same motion measured at half speed.
    /// `velocity` is the speed setting the full-speed measurement was taken at.
    pub fn new(full_speed: Motion, half_speed: &Motion, velocity: f64) -> Self {
        let duration_at_full_speed = full_speed.duration();
        let energy_demand_score = energy_demand_score(duration_at_full_speed, half_speed.duration());
        Self {
            motion: full_speed,
            duration_at_full_speed,
            energy_demand_score,
            velocity,
        }
    }

    pub fn energy_demand_score(&self) -> f64 {
        self.energy_demand_score
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    /// Duration as of the last synced simulation.
    pub fn duration(&self) -> f64 {
        self.motion.duration()
    }

    pub fn duration_at_full_speed(&self) -> f64 {
        self.duration_at_full_speed
    }

    pub fn total_distance(&self) -> f64 {
        self.motion.total_distance()
    }

    pub fn total_vertical_distance(&self) -> f64 {
        self.motion.total_vertical_distance()
    }

    pub fn actuated_waypoints(&self) -> Vec<usize> {
        self.motion.actuated_waypoints()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        self.motion.waypoints()
    }

    pub fn sync_durations(&mut self, locations: &[Waypoint]) {
        self.motion.sync_durations(locations);
    }

    /// Energy of the motion at full speed, in relative units.
    pub fn estimate_energy_expenditure_at_full_speed(&self) -> f64 {
        let score = clamp01(self.energy_demand_score);
        let duration = self.duration_at_full_speed.max(0.0);
        let power_draw = lerp(MIN_ENERGY_CONSUMPTION, MAX_ENERGY_CONSUMPTION, score);
        power_draw * duration
    }

    /// Energy of the motion at its current velocity, in relative units.
    pub fn estimate_energy_expenditure(&self) -> f64 {
        let energy_at_full = self.estimate_energy_expenditure_at_full_speed();
        let base_savings = lerp(MIN_SAVINGS, MAX_SAVINGS, clamp01(self.energy_demand_score));
        let savings = base_savings * velocity_savings_factor(self.velocity);
        energy_at_full * (1.0 - savings)
    }

    pub fn summary(&self) -> MotionSummary {
        let waypoints = self.motion.waypoints();
        MotionSummary {
            from: waypoints.first().map(|w| w.name.clone()).unwrap_or_default(),
            to: waypoints.last().map(|w| w.name.clone()).unwrap_or_default(),
            waypoints: waypoints.len(),
            energy_demand_score: self.energy_demand_score,
            velocity: self.velocity,
            duration: self.duration(),
            duration_at_full_speed: self.duration_at_full_speed,
        }
    }
}

/// Serializable view of an optimized motion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionSummary {
    pub from: String,
    pub to: String,
    pub waypoints: usize,
    pub energy_demand_score: f64,
    pub velocity: f64,
    pub duration: f64,
    pub duration_at_full_speed: f64,
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn inverse_lerp(a: f64, b: f64, x: f64) -> f64 {
    (x - a) / (b - a)
}

fn clamp01(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}
