// dxm_shared::host.rs
// Narrow interface over the simulation host that owns programs and their simulation player.

use crate::report::SimulationReport;
use crate::{ProgramId, Waypoint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("No active session available")]
    NoActiveSession,
    #[error("Unknown program {0}")]
    UnknownProgram(ProgramId),
    #[error("Program {program} has no waypoint at index {index}")]
    UnknownWaypoint { program: ProgramId, index: usize },
    #[error("Invalid speed: {0}")]
    InvalidSpeed(f64),
    #[error("Simulation failed: {0}")]
    Simulation(String),
}

/// Services the optimizer consumes from its environment.
///
/// Implementations hold all mutable program state; callers only see handles and snapshots.
/// `simulate` must be deterministic for a fixed velocity assignment.
pub trait ProgramHost {
    fn program_name(&self, program: ProgramId) -> Result<String, HostError>;

    /// Leaf locations in tree order, with durations as of the last simulation.
    fn locations(&self, program: ProgramId) -> Result<Vec<Waypoint>, HostError>;

    /// Creates an independent copy. The caller owns the copy and must delete it.
    fn duplicate(&mut self, program: ProgramId) -> Result<ProgramId, HostError>;

    fn rename(&mut self, program: ProgramId, name: &str) -> Result<(), HostError>;

    fn delete(&mut self, program: ProgramId) -> Result<(), HostError>;

    /// Sets the joint speed of every joint location in the program.
    fn set_joint_speed(&mut self, program: ProgramId, percent: f64) -> Result<(), HostError>;

    /// Sets the joint speed of the given leaf locations.
    fn set_velocity(
        &mut self,
        program: ProgramId,
        waypoints: &[usize],
        percent: f64,
    ) -> Result<(), HostError>;

    /// Plays the program and records per-leaf durations.
    fn simulate(&mut self, program: ProgramId) -> Result<SimulationReport, HostError>;
}
