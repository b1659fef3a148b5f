pub mod kinematics;

use crate::program::ProgramSpec;
use dxm_shared::{
    HostError, LocationKind, MotionType, OperationResultCollection, Position, ProgramHost,
    ProgramId, SimulationReport, Waypoint,
};
use kinematics::RobotModel;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct SimLocation {
    name: String,
    parent: usize,
    position: Position,
    motion: MotionType,
    kind: LocationKind,
    joint_speed: f64,
    linear_speed: Option<f64>,
    dwell: f64,
    duration: f64,
}

#[derive(Debug, Clone)]
struct SimProgram {
    name: String,
    locations: Vec<SimLocation>,
    total_duration: f64,
}

/// In-memory host that owns programs and plays them against a [`RobotModel`].
///
/// Simulation is deterministic: the same speed assignment always yields the same durations.
#[derive(Debug)]
pub struct SimulatedHost {
    robot: RobotModel,
    programs: BTreeMap<ProgramId, SimProgram>,
    next_id: u64,
    session_open: bool,
    simulations: usize,
}

impl SimulatedHost {
    pub fn new(robot: RobotModel) -> Self {
        tracing::info!(
            "Simulated host ready: joint speed {} mm/s, acceleration {} mm/s²",
            robot.joint_max_speed,
            robot.joint_acceleration
        );
        Self {
            robot,
            programs: BTreeMap::new(),
            next_id: 1,
            session_open: true,
            simulations: 0,
        }
    }

    /// Loads a program; the caller gets the handle of the new program.
    pub fn load(&mut self, spec: &ProgramSpec) -> Result<ProgramId, HostError> {
        self.ensure_session()?;
        let mut locations = Vec::with_capacity(spec.location_count());
        for (parent, op) in spec.operations.iter().enumerate() {
            for loc in &op.locations {
                locations.push(SimLocation {
                    name: loc.name.clone(),
                    parent,
                    position: loc.position,
                    motion: loc.motion,
                    kind: loc.kind,
                    joint_speed: loc.joint_speed,
                    linear_speed: loc.linear_speed,
                    dwell: loc.dwell,
                    duration: 0.0,
                });
            }
        }
        let id = self.insert(SimProgram {
            name: spec.name.clone(),
            locations,
            total_duration: 0.0,
        });
        tracing::debug!("Loaded program '{}' as {}", spec.name, id);
        Ok(id)
    }

    /// Ends the session; every later host call fails with [`HostError::NoActiveSession`].
    pub fn close_session(&mut self) {
        self.session_open = false;
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of simulations played so far.
    pub fn simulation_count(&self) -> usize {
        self.simulations
    }

    /// Total duration recorded by the last simulation of the program.
    pub fn last_duration(&self, program: ProgramId) -> Result<f64, HostError> {
        Ok(self.program(program)?.total_duration)
    }

    /// Joint speed setting of every location, in tree order.
    pub fn joint_speeds(&self, program: ProgramId) -> Result<Vec<(String, f64)>, HostError> {
        Ok(self
            .program(program)?
            .locations
            .iter()
            .map(|loc| (loc.name.clone(), loc.joint_speed))
            .collect())
    }

    fn insert(&mut self, program: SimProgram) -> ProgramId {
        let id = ProgramId(self.next_id);
        self.next_id += 1;
        self.programs.insert(id, program);
        id
    }

    fn ensure_session(&self) -> Result<(), HostError> {
        if self.session_open {
            Ok(())
        } else {
            Err(HostError::NoActiveSession)
        }
    }

    fn program(&self, program: ProgramId) -> Result<&SimProgram, HostError> {
        self.ensure_session()?;
        self.programs
            .get(&program)
            .ok_or(HostError::UnknownProgram(program))
    }

    fn program_mut(&mut self, program: ProgramId) -> Result<&mut SimProgram, HostError> {
        self.ensure_session()?;
        self.programs
            .get_mut(&program)
            .ok_or(HostError::UnknownProgram(program))
    }
}

fn check_speed(percent: f64) -> Result<(), HostError> {
    if percent > 0.0 && percent.is_finite() {
        Ok(())
    } else {
        Err(HostError::InvalidSpeed(percent))
    }
}

impl ProgramHost for SimulatedHost {
    fn program_name(&self, program: ProgramId) -> Result<String, HostError> {
        Ok(self.program(program)?.name.clone())
    }

    fn locations(&self, program: ProgramId) -> Result<Vec<Waypoint>, HostError> {
        Ok(self
            .program(program)?
            .locations
            .iter()
            .enumerate()
            .map(|(index, loc)| Waypoint {
                index,
                name: loc.name.clone(),
                parent: loc.parent,
                position: loc.position,
                duration: loc.duration,
                motion_type: loc.motion,
                kind: loc.kind,
            })
            .collect())
    }

    fn duplicate(&mut self, program: ProgramId) -> Result<ProgramId, HostError> {
        let copy = self.program(program)?.clone();
        let id = self.insert(copy);
        tracing::debug!("Duplicated program {} as {}", program, id);
        Ok(id)
    }

    fn rename(&mut self, program: ProgramId, name: &str) -> Result<(), HostError> {
        self.program_mut(program)?.name = name.to_string();
        Ok(())
    }

    fn delete(&mut self, program: ProgramId) -> Result<(), HostError> {
        self.ensure_session()?;
        self.programs
            .remove(&program)
            .map(|_| ())
            .ok_or(HostError::UnknownProgram(program))
    }

    fn set_joint_speed(&mut self, program: ProgramId, percent: f64) -> Result<(), HostError> {
        check_speed(percent)?;
        for loc in &mut self.program_mut(program)?.locations {
            if loc.motion == MotionType::Joint {
                loc.joint_speed = percent;
            }
        }
        Ok(())
    }

    fn set_velocity(
        &mut self,
        program: ProgramId,
        waypoints: &[usize],
        percent: f64,
    ) -> Result<(), HostError> {
        check_speed(percent)?;
        let target = self.program_mut(program)?;
        if let Some(&index) = waypoints.iter().find(|&&i| i >= target.locations.len()) {
            return Err(HostError::UnknownWaypoint { program, index });
        }
        for &index in waypoints {
            let loc = &mut target.locations[index];
            if loc.motion == MotionType::Joint {
                tracing::trace!("Setting speed for {} to {}", loc.name, percent);
                loc.joint_speed = percent;
            }
        }
        Ok(())
    }

    fn simulate(&mut self, program: ProgramId) -> Result<SimulationReport, HostError> {
        let robot = self.robot.clone();
        let target = self.program_mut(program)?;
        let mut leaves = OperationResultCollection::new();
        let mut total = 0.0;
        let mut previous: Option<Position> = None;
        for loc in &mut target.locations {
            loc.duration = match previous {
                None => robot.settle_time,
                Some(from) => {
                    let distance = from.distance_to(&loc.position);
                    match loc.motion {
                        MotionType::Joint => robot.joint_leg_time(distance, loc.joint_speed),
                        MotionType::Linear => robot.linear_leg_time(distance, loc.linear_speed),
                    }
                }
            };
            if !loc.duration.is_finite() {
                return Err(HostError::Simulation(format!(
                    "non-finite duration at location '{}'",
                    loc.name
                )));
            }
            total += loc.duration + loc.dwell;
            leaves
                .add(loc.name.clone(), loc.duration)
                .map_err(|e| HostError::Simulation(e.to_string()))?;
            previous = Some(loc.position);
        }
        target.total_duration = total;
        self.simulations += 1;
        tracing::debug!("Simulated program {}: {:.3}s", program, total);
        Ok(SimulationReport {
            total_duration: total,
            leaves,
        })
    }
}
