// Shared fixtures for integration tests
#![allow(dead_code)]

use dxm_shared::{HostError, ProgramHost, ProgramId, SimulationReport, Waypoint};
use dxm_simulator::{load_program, RobotModel, SimulatedHost};
use std::collections::HashSet;

pub const PICK_AND_WELD: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/dxm_simulator/programs/pick_and_weld.toml");

pub fn pick_and_weld_host() -> (SimulatedHost, ProgramId) {
    let spec = load_program(PICK_AND_WELD).expect("sample program loads");
    let mut host = SimulatedHost::new(RobotModel::default());
    let id = host.load(&spec).expect("program loads into host");
    (host, id)
}

/// Duration of a program when every joint location runs at `speed`, measured on a copy.
pub fn duration_at(host: &mut SimulatedHost, program: ProgramId, speed: f64) -> f64 {
    let copy = host.duplicate(program).unwrap();
    host.set_joint_speed(copy, speed).unwrap();
    let duration = host.simulate(copy).unwrap().total_duration;
    host.delete(copy).unwrap();
    duration
}

/// Fails the n-th simulation (1-based) and delegates everything else.
pub struct FlakyHost {
    pub inner: SimulatedHost,
    pub fail_on: usize,
    calls: usize,
}

impl FlakyHost {
    pub fn new(inner: SimulatedHost, fail_on: usize) -> Self {
        Self { inner, fail_on, calls: 0 }
    }
}

/// Adds a growing offset to every simulated duration after the first `honest` simulations,
/// as a host whose results degrade between measurements would.
pub struct DriftingHost {
    pub inner: SimulatedHost,
    pub honest: usize,
    calls: usize,
}

impl DriftingHost {
    pub fn new(inner: SimulatedHost, honest: usize) -> Self {
        Self { inner, honest, calls: 0 }
    }
}

/// Hides trailing locations of any program slowed to half speed, so that the two baselines
/// segment differently.
pub struct MisalignedHost {
    pub inner: SimulatedHost,
    pub keep: usize,
    half_speed: HashSet<ProgramId>,
}

impl MisalignedHost {
    pub fn new(inner: SimulatedHost, keep: usize) -> Self {
        Self { inner, keep, half_speed: HashSet::new() }
    }
}

macro_rules! delegate_host {
    ($host:ty, |$this:ident, $program:ident| $simulate:block, |$lthis:ident, $lprogram:ident| $locations:block, |$sthis:ident, $sprogram:ident, $percent:ident| $speed:block) => {
        impl ProgramHost for $host {
            fn program_name(&self, program: ProgramId) -> Result<String, HostError> {
                self.inner.program_name(program)
            }
            fn locations(&self, $lprogram: ProgramId) -> Result<Vec<Waypoint>, HostError> {
                let $lthis = self;
                $locations
            }
            fn duplicate(&mut self, program: ProgramId) -> Result<ProgramId, HostError> {
                self.inner.duplicate(program)
            }
            fn rename(&mut self, program: ProgramId, name: &str) -> Result<(), HostError> {
                self.inner.rename(program, name)
            }
            fn delete(&mut self, program: ProgramId) -> Result<(), HostError> {
                self.inner.delete(program)
            }
            fn set_joint_speed(&mut self, $sprogram: ProgramId, $percent: f64) -> Result<(), HostError> {
                let $sthis = self;
                $speed
            }
            fn set_velocity(
                &mut self,
                program: ProgramId,
                waypoints: &[usize],
                percent: f64,
            ) -> Result<(), HostError> {
                self.inner.set_velocity(program, waypoints, percent)
            }
            fn simulate(&mut self, $program: ProgramId) -> Result<SimulationReport, HostError> {
                let $this = self;
                $simulate
            }
        }
    };
}

delegate_host!(
    FlakyHost,
    |this, program| {
        this.calls += 1;
        if this.calls == this.fail_on {
            return Err(HostError::Simulation("simulation player crashed".to_string()));
        }
        this.inner.simulate(program)
    },
    |this, program| { this.inner.locations(program) },
    |this, program, percent| { this.inner.set_joint_speed(program, percent) }
);

delegate_host!(
    DriftingHost,
    |this, program| {
        this.calls += 1;
        let mut report = this.inner.simulate(program)?;
        if this.calls > this.honest {
            report.total_duration += 1000.0 * (this.calls - this.honest) as f64;
        }
        Ok(report)
    },
    |this, program| { this.inner.locations(program) },
    |this, program, percent| { this.inner.set_joint_speed(program, percent) }
);

delegate_host!(
    MisalignedHost,
    |this, program| { this.inner.simulate(program) },
    |this, program| {
        let mut locations = this.inner.locations(program)?;
        if this.half_speed.contains(&program) {
            locations.truncate(this.keep);
        }
        Ok(locations)
    },
    |this, program, percent| {
        if percent < 100.0 {
            this.half_speed.insert(program);
        }
        this.inner.set_joint_speed(program, percent)
    }
);

/// One `set_velocity` call as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityCall {
    pub waypoints: Vec<usize>,
    pub percent: f64,
}

/// Records every velocity change in call order.
///
/// With `slow_above` set, any simulation that follows a velocity change above that percent is
/// reported as taking far longer, like a host whose duration is not monotonic in speed.
pub struct RecordingHost {
    pub inner: SimulatedHost,
    pub calls: Vec<VelocityCall>,
    slow_above: Option<f64>,
    last_percent: Option<f64>,
}

impl RecordingHost {
    pub fn new(inner: SimulatedHost) -> Self {
        Self { inner, calls: Vec::new(), slow_above: None, last_percent: None }
    }

    pub fn slow_above(mut self, percent: f64) -> Self {
        self.slow_above = Some(percent);
        self
    }

    /// Consecutive calls on the same waypoints, one run per motion visit.
    pub fn runs(&self) -> Vec<(Vec<usize>, Vec<f64>)> {
        let mut runs: Vec<(Vec<usize>, Vec<f64>)> = Vec::new();
        for call in &self.calls {
            match runs.last_mut() {
                Some((waypoints, percents)) if *waypoints == call.waypoints => {
                    percents.push(call.percent)
                }
                _ => runs.push((call.waypoints.clone(), vec![call.percent])),
            }
        }
        runs
    }
}

impl ProgramHost for RecordingHost {
    fn program_name(&self, program: ProgramId) -> Result<String, HostError> {
        self.inner.program_name(program)
    }

    fn locations(&self, program: ProgramId) -> Result<Vec<Waypoint>, HostError> {
        self.inner.locations(program)
    }

    fn duplicate(&mut self, program: ProgramId) -> Result<ProgramId, HostError> {
        self.inner.duplicate(program)
    }

    fn rename(&mut self, program: ProgramId, name: &str) -> Result<(), HostError> {
        self.inner.rename(program, name)
    }

    fn delete(&mut self, program: ProgramId) -> Result<(), HostError> {
        self.inner.delete(program)
    }

    fn set_joint_speed(&mut self, program: ProgramId, percent: f64) -> Result<(), HostError> {
        self.inner.set_joint_speed(program, percent)
    }

    fn set_velocity(
        &mut self,
        program: ProgramId,
        waypoints: &[usize],
        percent: f64,
    ) -> Result<(), HostError> {
        self.calls.push(VelocityCall { waypoints: waypoints.to_vec(), percent });
        self.last_percent = Some(percent);
        self.inner.set_velocity(program, waypoints, percent)
    }

    fn simulate(&mut self, program: ProgramId) -> Result<SimulationReport, HostError> {
        let mut report = self.inner.simulate(program)?;
        if let (Some(threshold), Some(percent)) = (self.slow_above, self.last_percent) {
            if percent > threshold {
                report.total_duration += 1000.0;
            }
        }
        Ok(report)
    }
}
