// src/optimizer/result.rs - Energy savings estimate and the optimization result

use super::motion::{MotionSummary, OptimizableMotion};
use super::OptimizerError;
use dxm_shared::constants::MIN_ENERGY_CONSUMPTION;
use dxm_shared::ProgramId;

/// Estimated energy saved by the motions' current velocities, in percent of the full-speed energy.
///
/// Time not spent in any motion is charged at the minimum power draw on both sides.
pub fn estimate_energy_savings_percent(motions: &[OptimizableMotion], total_duration: f64) -> f64 {
    let motions_duration: f64 = motions.iter().map(|m| m.duration()).sum();
    let technical_energy = (total_duration - motions_duration) * MIN_ENERGY_CONSUMPTION;

    let optimized_energy = motions
        .iter()
        .map(|m| m.estimate_energy_expenditure())
        .sum::<f64>()
        + technical_energy;
    let full_speed_energy = motions
        .iter()
        .map(|m| m.estimate_energy_expenditure_at_full_speed())
        .sum::<f64>()
        + technical_energy;

    if full_speed_energy == 0.0 {
        return 0.0;
    }
    100.0 * (1.0 - optimized_energy / full_speed_energy)
}

/// An optimized program together with its estimated energy savings.
///
/// The program is a renamed duplicate owned by the caller.
#[derive(Debug, Clone)]
pub struct EnergyOptimizationResult {
    program: ProgramId,
    name: String,
    energy_savings_percent: f64,
    duration: f64,
    motions: Vec<MotionSummary>,
}

impl EnergyOptimizationResult {
    pub fn new(
        program: ProgramId,
        name: impl Into<String>,
        energy_savings_percent: f64,
        duration: f64,
        motions: Vec<MotionSummary>,
    ) -> Result<Self, OptimizerError> {
        if !energy_savings_percent.is_finite() {
            return Err(OptimizerError::InvalidSavings(energy_savings_percent));
        }
        Ok(Self {
            program,
            name: name.into(),
            energy_savings_percent,
            duration,
            motions,
        })
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn energy_savings_percent(&self) -> f64 {
        self.energy_savings_percent
    }

    /// Total duration of the optimized program.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Optimized motions, most energy-responsive first.
    pub fn motions(&self) -> &[MotionSummary] {
        &self.motions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::motion::tests::single_leg;

    fn motion(full: f64, half: f64, velocity: f64) -> OptimizableMotion {
        let mut m = OptimizableMotion::new(single_leg(full), &single_leg(half), 100.0);
        m.set_velocity(velocity);
        m
    }

    #[test]
    fn test_no_savings_at_full_speed() {
        let motions = vec![motion(5.0, 8.0, 100.0), motion(1.0, 1.05, 100.0)];
        assert_eq!(estimate_energy_savings_percent(&motions, 10.0), 0.0);
    }

    #[test]
    fn test_savings_with_slow_motions() {
        // score clamps to 1.0: 8 power units over 5s, 40% saved below 45% velocity
        let motions = vec![motion(5.0, 10.0, 40.0)];
        let percent = estimate_energy_savings_percent(&motions, 7.0);
        let full = 40.0 + 2.0;
        let optimized = 24.0 + 2.0;
        assert!((percent - 100.0 * (1.0 - optimized / full)).abs() < 1e-9);
    }

    #[test]
    fn test_savings_bounds() {
        for velocity in [0.0, 30.0, 45.0, 55.0, 60.0, 75.0, 100.0] {
            let motions = vec![motion(5.0, 9.0, velocity), motion(2.0, 2.2, velocity)];
            let percent = estimate_energy_savings_percent(&motions, 7.5);
            assert!((0.0..100.0).contains(&percent), "velocity {} gave {}", velocity, percent);
        }
    }

    #[test]
    fn test_empty_program_saves_nothing() {
        assert_eq!(estimate_energy_savings_percent(&[], 0.0), 0.0);
        assert_eq!(estimate_energy_savings_percent(&[], 4.0), 0.0);
    }

    #[test]
    fn test_result_rejects_non_finite_savings() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = EnergyOptimizationResult::new(ProgramId(1), "p", bad, 1.0, Vec::new()).unwrap_err();
            assert!(matches!(err, OptimizerError::InvalidSavings(_)));
        }
        let ok = EnergyOptimizationResult::new(ProgramId(3), "p", 12.5, 9.0, Vec::new()).unwrap();
        assert_eq!(ok.program(), ProgramId(3));
        assert_eq!(ok.energy_savings_percent(), 12.5);
        assert_eq!(ok.duration(), 9.0);
    }
}
