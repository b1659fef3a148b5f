// src/optimizer/heuristic.rs - Two-pass randomized velocity search with rollback

use super::{
    discard, finish, prepare_baseline, validate_request, Baseline, EnergyOptimizationResult,
    EnergyOptimizer, GaussianSampler, HostContext, OptimizableMotion, OptimizerError,
};
use dxm_shared::config::SearchSettings;
use dxm_shared::{ProgramHost, ProgramId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lowers the velocity of the most energy-responsive motions first.
///
/// Each pass walks the ranked motions once, drawing a velocity around the pass target and
/// re-simulating the whole program after every change. A change that breaks the duration limit is
/// walked back up in fixed steps towards the velocity the motion had before the pass, which is
/// known to be feasible.
pub struct HeuristicEnergyOptimizer<R = StdRng> {
    settings: SearchSettings,
    sampler: GaussianSampler<R>,
}

impl HeuristicEnergyOptimizer<StdRng> {
    pub fn new(settings: SearchSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    pub fn seeded(settings: SearchSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> HeuristicEnergyOptimizer<R> {
    pub fn with_rng(settings: SearchSettings, rng: R) -> Self {
        let sampler = GaussianSampler::new(rng, settings.std_dev, settings.clamp_range);
        Self { settings, sampler }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    fn search(
        &mut self,
        host: &mut dyn ProgramHost,
        baseline: &mut Baseline,
        duration_limit: f64,
    ) -> Result<f64, OptimizerError> {
        let mut duration = baseline.duration;
        let targets = self.settings.pass_targets.clone();
        for (pass, target) in targets.into_iter().enumerate() {
            duration = self.run_pass(
                host,
                baseline.program,
                &mut baseline.motions,
                target,
                duration_limit,
                duration,
            )?;
            tracing::info!(
                "Pass {} (target {}%) done: {:.3}s of {:.3}s",
                pass + 1,
                target,
                duration,
                duration_limit
            );
        }
        Ok(duration)
    }

    fn run_pass(
        &mut self,
        host: &mut dyn ProgramHost,
        program: ProgramId,
        motions: &mut [OptimizableMotion],
        target: f64,
        duration_limit: f64,
        mut duration: f64,
    ) -> Result<f64, OptimizerError> {
        for (rank, motion) in motions.iter_mut().enumerate() {
            let previous_velocity = motion.velocity();
            let mut velocity = self.sampler.next_gaussian(target);

            duration = apply_velocity(host, program, motion, velocity)?;
            while duration >= duration_limit {
                if velocity == previous_velocity {
                    return Err(OptimizerError::RollbackFailed {
                        motion: rank,
                        velocity,
                        duration,
                        limit: duration_limit,
                    });
                }
                // a sample above the pre-pass velocity goes straight back to it
                velocity = (velocity + self.settings.rollback_step).min(previous_velocity);
                duration = apply_velocity(host, program, motion, velocity)?;
            }
            tracing::debug!(
                "Motion {} (score {:.3}): {}% -> {:.1}%, program {:.3}s",
                rank,
                motion.energy_demand_score(),
                previous_velocity,
                velocity,
                duration
            );
        }
        Ok(duration)
    }
}

/// Sets the motion's velocity and returns the re-simulated program duration.
fn apply_velocity(
    host: &mut dyn ProgramHost,
    program: ProgramId,
    motion: &mut OptimizableMotion,
    velocity: f64,
) -> Result<f64, OptimizerError> {
    host.set_velocity(program, &motion.actuated_waypoints(), velocity)
        .context(program, "set velocity in")?;
    motion.set_velocity(velocity);
    Ok(host.simulate(program).context(program, "simulate")?.total_duration)
}

impl<R: Rng> EnergyOptimizer for HeuristicEnergyOptimizer<R> {
    fn optimize(
        &mut self,
        host: &mut dyn ProgramHost,
        program: ProgramId,
        duration_limit: f64,
    ) -> Result<Option<EnergyOptimizationResult>, OptimizerError> {
        validate_request(&self.settings, duration_limit)?;

        let Some(mut baseline) = prepare_baseline(host, program, duration_limit, &self.settings)?
        else {
            return Ok(None);
        };

        let outcome = self
            .search(host, &mut baseline, duration_limit)
            .and_then(|duration| finish(host, &mut baseline, duration, duration_limit));
        match outcome {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                tracing::warn!("Optimization of program {} abandoned: {}", program, e);
                discard(host, baseline.program);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxm_simulator::{LocationSpec, OperationSpec, ProgramSpec, RobotModel, SimulatedHost};

    fn sweep_program() -> ProgramSpec {
        ProgramSpec {
            name: "Sweep".to_string(),
            operations: vec![OperationSpec {
                name: "Op".to_string(),
                locations: vec![
                    LocationSpec::joint("a", [0.0, 0.0, 0.0]),
                    LocationSpec::joint("b", [1500.0, 0.0, 0.0]),
                    LocationSpec::linear("c", [1500.0, 0.0, 200.0]),
                    LocationSpec::joint("d", [1500.0, 60.0, 200.0]),
                ],
            }],
        }
    }

    fn host_with(spec: &ProgramSpec) -> (SimulatedHost, ProgramId) {
        let mut host = SimulatedHost::new(RobotModel::default());
        let id = host.load(spec).unwrap();
        (host, id)
    }

    #[test]
    fn test_rejects_non_finite_limit_before_touching_host() {
        let (mut host, id) = host_with(&sweep_program());
        let mut optimizer = HeuristicEnergyOptimizer::seeded(SearchSettings::default(), 1);
        for limit in [f64::NAN, f64::INFINITY, -1.0] {
            let err = optimizer.optimize(&mut host, id, limit).unwrap_err();
            assert!(matches!(err, OptimizerError::InvalidDurationLimit(_)));
        }
        assert_eq!(host.simulation_count(), 0);
        assert_eq!(host.live_programs(), 1);
    }

    #[test]
    fn test_generous_limit_slows_the_sweep() {
        let (mut host, id) = host_with(&sweep_program());
        let mut optimizer = HeuristicEnergyOptimizer::seeded(SearchSettings::default(), 7);
        let result = optimizer.optimize(&mut host, id, 100.0).unwrap().unwrap();
        assert!(result.duration() < 100.0);
        assert_eq!(result.name(), "En. optimal (100.00 s) Sweep");
        // two motions: the long sweep a-b and the hop c-d
        assert_eq!(result.motions().len(), 2);
        let sweep = &result.motions()[0];
        assert_eq!(sweep.from, "a");
        assert!((40.0..=50.0).contains(&sweep.velocity));
        assert!(result.energy_savings_percent() > 0.0);
        assert_eq!(host.live_programs(), 2);
        assert_eq!(host.program_name(id).unwrap(), "Sweep");
    }

    #[test]
    fn test_same_seed_same_result() {
        let spec = sweep_program();
        let (mut host_a, id_a) = host_with(&spec);
        let (mut host_b, id_b) = host_with(&spec);
        let a = HeuristicEnergyOptimizer::seeded(SearchSettings::default(), 99)
            .optimize(&mut host_a, id_a, 5.0)
            .unwrap()
            .unwrap();
        let b = HeuristicEnergyOptimizer::seeded(SearchSettings::default(), 99)
            .optimize(&mut host_b, id_b, 5.0)
            .unwrap()
            .unwrap();
        assert_eq!(a.duration(), b.duration());
        assert_eq!(a.energy_savings_percent(), b.energy_savings_percent());
        assert_eq!(a.motions(), b.motions());
    }
}
