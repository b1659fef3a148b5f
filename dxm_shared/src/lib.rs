// dxm_shared: shared model, host traits and configuration for the optimizer and simulator

pub mod config;
pub mod constants;
pub mod host;
pub mod report;

pub use host::{HostError, ProgramHost};
pub use report::{OperationResult, OperationResultCollection, ReportError, SimulationReport};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a program (operation tree) owned by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProgramId(pub u64);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Absolute location of a waypoint in mm.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Signed Z difference; positive when `other` is above `self`.
    pub fn vertical_distance_to(&self, other: &Position) -> f64 {
        other.z - self.z
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Position {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Position> for [f64; 3] {
    fn from(p: Position) -> Self {
        [p.x, p.y, p.z]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionType {
    #[default]
    Joint,
    Linear,
}

/// What kind of leaf a location is. Only via locations take part in joint motions;
/// process locations (welds) always bound them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    #[default]
    Via,
    Weld,
}

/// Snapshot of one leaf location of a program, as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    /// Position of the leaf in tree order; stable across duplicates.
    pub index: usize,
    pub name: String,
    /// Identifies the parent operation the leaf belongs to.
    pub parent: usize,
    pub position: Position,
    /// Duration of the travel leg ending at this leaf, as of the last simulation.
    pub duration: f64,
    pub motion_type: MotionType,
    pub kind: LocationKind,
}

impl Waypoint {
    pub fn is_joint_via(&self) -> bool {
        self.motion_type == MotionType::Joint && self.kind == LocationKind::Via
    }
}
