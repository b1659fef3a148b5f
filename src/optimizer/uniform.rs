// src/optimizer/uniform.rs - Slowest uniform joint speed that still meets the duration limit

use super::{
    discard, finish, prepare_baseline, validate_request, Baseline, EnergyOptimizationResult,
    EnergyOptimizer, HostContext, OptimizerError,
};
use dxm_shared::config::SearchSettings;
use dxm_shared::{ProgramHost, ProgramId};

const SWEEP_START: u32 = 5;
const SWEEP_STEP: usize = 5;
const SWEEP_END: u32 = 100;

/// Tries uniform joint speeds 5%, 10%, ..., 100% and keeps the first that meets the limit.
///
/// Every motion of the returned program runs at the same speed, so this serves as a reference
/// point for the heuristic search.
pub struct UniformSpeedOptimizer {
    settings: SearchSettings,
}

impl UniformSpeedOptimizer {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    /// Returns the duration reached at the chosen speed, or `None` if no speed qualified.
    fn sweep(
        &self,
        host: &mut dyn ProgramHost,
        baseline: &mut Baseline,
        duration_limit: f64,
    ) -> Result<Option<f64>, OptimizerError> {
        let program = baseline.program;
        for speed in (SWEEP_START..=SWEEP_END).step_by(SWEEP_STEP) {
            let speed = f64::from(speed);
            host.set_joint_speed(program, speed)
                .context(program, "set joint speed of")?;
            let duration = host.simulate(program).context(program, "simulate")?.total_duration;
            tracing::debug!("Uniform speed {}%: {:.3}s", speed, duration);
            if duration < duration_limit {
                for motion in &mut baseline.motions {
                    motion.set_velocity(speed);
                }
                return Ok(Some(duration));
            }
        }
        Ok(None)
    }
}

impl EnergyOptimizer for UniformSpeedOptimizer {
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
            .sweep(host, &mut baseline, duration_limit)
            .and_then(|duration| match duration {
                Some(duration) => finish(host, &mut baseline, duration, duration_limit).map(Some),
                None => Ok(None),
            });
        match outcome {
            Ok(Some(result)) => Ok(Some(result)),
            Ok(None) => {
                host.delete(baseline.program)
                    .context(baseline.program, "delete")?;
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Uniform optimization of program {} abandoned: {}", program, e);
                discard(host, baseline.program);
                Err(e)
            }
        }
    }
}
