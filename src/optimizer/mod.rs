// src/optimizer/mod.rs - Energy optimization of robot programs under a duration limit

pub mod heuristic;
pub mod motion;
pub mod result;
pub mod sampler;
pub mod segmenter;
pub mod uniform;

pub use heuristic::HeuristicEnergyOptimizer;
pub use motion::{MotionSummary, OptimizableMotion};
pub use result::{estimate_energy_savings_percent, EnergyOptimizationResult};
pub use sampler::GaussianSampler;
pub use segmenter::{segment_motions, Motion};
pub use uniform::UniformSpeedOptimizer;

use dxm_shared::config::{OptimizerConfig, SearchSettings, Strategy};
use dxm_shared::{HostError, ProgramHost, ProgramId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("Invalid duration limit: {0}")]
    InvalidDurationLimit(f64),
    #[error("Invalid search settings: {0}")]
    InvalidSettings(String),
    #[error("Invalid optimization state: {full} motions at full speed but {half} at half speed")]
    MotionCountMismatch { full: usize, half: usize },
    #[error("Failed to {action} program {program}: {source}")]
    Host {
        program: ProgramId,
        action: &'static str,
        #[source]
        source: HostError,
    },
    #[error(
        "Invalid optimization state: rollback of motion {motion} to {velocity}% left duration {duration:.3}s at or over limit {limit:.3}s"
    )]
    RollbackFailed {
        motion: usize,
        velocity: f64,
        duration: f64,
        limit: f64,
    },
    #[error("Energy savings must be a finite percentage, got {0}")]
    InvalidSavings(f64),
}

/// Attaches the program and the attempted action to host failures.
pub(crate) trait HostContext<T> {
    fn context(self, program: ProgramId, action: &'static str) -> Result<T, OptimizerError>;
}

impl<T> HostContext<T> for Result<T, HostError> {
    fn context(self, program: ProgramId, action: &'static str) -> Result<T, OptimizerError> {
        self.map_err(|source| OptimizerError::Host {
            program,
            action,
            source,
        })
    }
}

/// Searches for a variant of a program that stays under a duration limit while using less energy.
pub trait EnergyOptimizer {
    /// Returns a renamed duplicate of `program`, or `None` when no variant stays strictly under
    /// `duration_limit`. The input program is never modified.
    fn optimize(
        &mut self,
        host: &mut dyn ProgramHost,
        program: ProgramId,
        duration_limit: f64,
    ) -> Result<Option<EnergyOptimizationResult>, OptimizerError>;
}

/// Builds the optimizer selected by the configuration.
pub fn build_optimizer(config: &OptimizerConfig) -> Box<dyn EnergyOptimizer> {
    match (config.strategy, config.seed) {
        (Strategy::Heuristic, Some(seed)) => {
            Box::new(HeuristicEnergyOptimizer::seeded(config.search.clone(), seed))
        }
        (Strategy::Heuristic, None) => Box::new(HeuristicEnergyOptimizer::new(config.search.clone())),
        (Strategy::Uniform, _) => Box::new(UniformSpeedOptimizer::new(config.search.clone())),
    }
}

pub fn optimized_program_name(duration_limit: f64, original: &str) -> String {
    format!("En. optimal ({:.2} s) {}", duration_limit, original)
}

pub(crate) fn validate_request(
    settings: &SearchSettings,
    duration_limit: f64,
) -> Result<(), OptimizerError> {
    if !duration_limit.is_finite() || duration_limit < 0.0 {
        return Err(OptimizerError::InvalidDurationLimit(duration_limit));
    }
    settings.validate().map_err(OptimizerError::InvalidSettings)
}

/// Full-speed duplicate of a program that is known to meet the duration limit, with its motions
/// ranked by descending energy demand score.
pub(crate) struct Baseline {
    pub program: ProgramId,
    pub name: String,
    pub duration: f64,
    pub motions: Vec<OptimizableMotion>,
}

/// Deletes a temporary program, logging instead of failing so the original error survives.
pub(crate) fn discard(host: &mut dyn ProgramHost, program: ProgramId) {
    if let Err(e) = host.delete(program) {
        tracing::warn!("Failed to delete temporary program {}: {}", program, e);
    }
}

fn duplicate_for_optimization(
    host: &mut dyn ProgramHost,
    program: ProgramId,
    name: &str,
) -> Result<ProgramId, OptimizerError> {
    let copy = host.duplicate(program).context(program, "duplicate")?;
    if let Err(e) = host
        .rename(copy, &format!("Temp copy of {} for heuristic optimization", name))
        .context(copy, "rename")
    {
        discard(host, copy);
        return Err(e);
    }
    Ok(copy)
}

/// Measures both baselines and ranks the motions.
///
/// Returns `None`, with nothing left behind in the host, when even full speed cannot meet the
/// limit. On success the caller owns `Baseline::program`.
pub(crate) fn prepare_baseline(
    host: &mut dyn ProgramHost,
    program: ProgramId,
    duration_limit: f64,
    settings: &SearchSettings,
) -> Result<Option<Baseline>, OptimizerError> {
    let name = host.program_name(program).context(program, "read")?;
    let full = duplicate_for_optimization(host, program, &name)?;

    match measure_and_rank(host, program, full, &name, duration_limit, settings) {
        Ok(Some((duration, motions))) => Ok(Some(Baseline {
            program: full,
            name,
            duration,
            motions,
        })),
        Ok(None) => {
            host.delete(full).context(full, "delete")?;
            Ok(None)
        }
        Err(e) => {
            discard(host, full);
            Err(e)
        }
    }
}

fn measure_and_rank(
    host: &mut dyn ProgramHost,
    program: ProgramId,
    full: ProgramId,
    name: &str,
    duration_limit: f64,
    settings: &SearchSettings,
) -> Result<Option<(f64, Vec<OptimizableMotion>)>, OptimizerError> {
    host.set_joint_speed(full, settings.full_speed)
        .context(full, "set joint speed of")?;
    let duration = host.simulate(full).context(full, "simulate")?.total_duration;
    if duration >= duration_limit {
        tracing::info!(
            "'{}' takes {:.3}s at full speed, no optimization possible within {:.3}s",
            name,
            duration,
            duration_limit
        );
        return Ok(None);
    }

    let half = duplicate_for_optimization(host, program, name)?;
    let half_motions = match measure_motions(host, half, settings.half_speed) {
        Ok(motions) => {
            host.delete(half).context(half, "delete")?;
            motions
        }
        Err(e) => {
            discard(host, half);
            return Err(e);
        }
    };

    let full_locations = host.locations(full).context(full, "read locations of")?;
    let full_motions = segment_motions(&full_locations);
    if full_motions.len() != half_motions.len() {
        return Err(OptimizerError::MotionCountMismatch {
            full: full_motions.len(),
            half: half_motions.len(),
        });
    }

    let mut motions: Vec<OptimizableMotion> = full_motions
        .into_iter()
        .zip(half_motions.iter())
        .map(|(at_full, at_half)| OptimizableMotion::new(at_full, at_half, settings.full_speed))
        .collect();
    // stable: equal scores keep program order
    motions.sort_by(|a, b| b.energy_demand_score().total_cmp(&a.energy_demand_score()));

    tracing::info!(
        "'{}' takes {:.3}s at full speed; {} motions ranked for optimization",
        name,
        duration,
        motions.len()
    );
    Ok(Some((duration, motions)))
}

fn measure_motions(
    host: &mut dyn ProgramHost,
    program: ProgramId,
    speed: f64,
) -> Result<Vec<Motion>, OptimizerError> {
    host.set_joint_speed(program, speed)
        .context(program, "set joint speed of")?;
    host.simulate(program).context(program, "simulate")?;
    let locations = host.locations(program).context(program, "read locations of")?;
    Ok(segment_motions(&locations))
}

/// Syncs motion durations with the last simulation, renames the program and builds the result.
pub(crate) fn finish(
    host: &mut dyn ProgramHost,
    baseline: &mut Baseline,
    duration: f64,
    duration_limit: f64,
) -> Result<EnergyOptimizationResult, OptimizerError> {
    let program = baseline.program;
    let locations = host.locations(program).context(program, "read locations of")?;
    for motion in &mut baseline.motions {
        motion.sync_durations(&locations);
    }
    let savings = estimate_energy_savings_percent(&baseline.motions, duration);
    let name = optimized_program_name(duration_limit, &baseline.name);
    let result = EnergyOptimizationResult::new(
        program,
        name.clone(),
        savings,
        duration,
        baseline.motions.iter().map(|m| m.summary()).collect(),
    )?;
    host.rename(program, &name).context(program, "rename")?;
    tracing::info!(
        "Optimized '{}': {:.3}s (limit {:.3}s), estimated savings {:.2}%",
        baseline.name,
        duration,
        duration_limit,
        savings
    );
    Ok(result)
}
