// dxm_simulator::program.rs
// Program files: one robotic program made of operations holding ordered locations.

use dxm_shared::{LocationKind, MotionType, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid program: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProgramSpec {
    pub name: String,
    #[serde(default)]
    pub operations: Vec<OperationSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OperationSpec {
    pub name: String,
    #[serde(default)]
    pub locations: Vec<LocationSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LocationSpec {
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub motion: MotionType,
    #[serde(default)]
    pub kind: LocationKind,
    #[serde(default = "default_joint_speed")]
    pub joint_speed: f64,
    /// Cartesian speed of linear moves (mm/s); robot default when absent.
    #[serde(default)]
    pub linear_speed: Option<f64>,
    /// Process time spent at the location (s), e.g. welding.
    #[serde(default)]
    pub dwell: f64,
}

fn default_joint_speed() -> f64 { 100.0 }

impl LocationSpec {
    pub fn joint(name: &str, position: [f64; 3]) -> Self {
        Self {
            name: name.to_string(),
            position: position.into(),
            motion: MotionType::Joint,
            kind: LocationKind::Via,
            joint_speed: default_joint_speed(),
            linear_speed: None,
            dwell: 0.0,
        }
    }

    pub fn linear(name: &str, position: [f64; 3]) -> Self {
        Self {
            motion: MotionType::Linear,
            ..Self::joint(name, position)
        }
    }

    pub fn weld(name: &str, position: [f64; 3], dwell: f64) -> Self {
        Self {
            kind: LocationKind::Weld,
            dwell,
            ..Self::joint(name, position)
        }
    }
}

impl ProgramSpec {
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.name.trim().is_empty() {
            return Err(ProgramError::Invalid("program name is empty".to_string()));
        }
        for op in &self.operations {
            if op.name.trim().is_empty() {
                return Err(ProgramError::Invalid(format!(
                    "operation in '{}' has an empty name",
                    self.name
                )));
            }
            for loc in &op.locations {
                if loc.name.trim().is_empty() {
                    return Err(ProgramError::Invalid(format!(
                        "location in '{}' has an empty name",
                        op.name
                    )));
                }
                if !loc.position.is_finite() {
                    return Err(ProgramError::Invalid(format!(
                        "location '{}' has a non-finite position",
                        loc.name
                    )));
                }
                if !(loc.joint_speed > 0.0 && loc.joint_speed.is_finite()) {
                    return Err(ProgramError::Invalid(format!(
                        "location '{}' has invalid joint speed {}",
                        loc.name, loc.joint_speed
                    )));
                }
                if let Some(speed) = loc.linear_speed {
                    if !(speed > 0.0 && speed.is_finite()) {
                        return Err(ProgramError::Invalid(format!(
                            "location '{}' has invalid linear speed {}",
                            loc.name, speed
                        )));
                    }
                }
                if !(loc.dwell >= 0.0 && loc.dwell.is_finite()) {
                    return Err(ProgramError::Invalid(format!(
                        "location '{}' has invalid dwell {}",
                        loc.name, loc.dwell
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn location_count(&self) -> usize {
        self.operations.iter().map(|op| op.locations.len()).sum()
    }
}

pub fn load_program(path: &str) -> Result<ProgramSpec, ProgramError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read program file '{}': {}", path, e);
        ProgramError::Io(e)
    })?;
    let program: ProgramSpec = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse program TOML: {}", e);
        ProgramError::Toml(e)
    })?;
    program.validate()?;
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = r#"
name = "Cell_A"

[[operations]]
name = "Pick"

[[operations.locations]]
name = "home"
position = [0.0, 0.0, 500.0]

[[operations.locations]]
name = "approach"
position = [800.0, 200.0, 300.0]
joint_speed = 80.0

[[operations.locations]]
name = "grip"
position = [800.0, 200.0, 250.0]
motion = "linear"
linear_speed = 100.0

[[operations]]
name = "Weld"

[[operations.locations]]
name = "spot1"
position = [600.0, -100.0, 250.0]
kind = "weld"
dwell = 1.5
"#;

    #[test]
    fn test_parse_program() {
        let program: ProgramSpec = toml::from_str(PROGRAM).unwrap();
        program.validate().unwrap();
        assert_eq!(program.name, "Cell_A");
        assert_eq!(program.operations.len(), 2);
        assert_eq!(program.location_count(), 4);
        let pick = &program.operations[0];
        assert_eq!(pick.locations[0].motion, MotionType::Joint);
        assert_eq!(pick.locations[0].joint_speed, 100.0);
        assert_eq!(pick.locations[1].joint_speed, 80.0);
        assert_eq!(pick.locations[2].motion, MotionType::Linear);
        assert_eq!(pick.locations[2].linear_speed, Some(100.0));
        let spot = &program.operations[1].locations[0];
        assert_eq!(spot.kind, LocationKind::Weld);
        assert_eq!(spot.dwell, 1.5);
        assert_eq!(spot.position, Position::new(600.0, -100.0, 250.0));
    }

    #[test]
    fn test_validation_rejects_bad_speed() {
        let mut program: ProgramSpec = toml::from_str(PROGRAM).unwrap();
        program.operations[0].locations[1].joint_speed = 0.0;
        assert!(matches!(program.validate(), Err(ProgramError::Invalid(_))));
    }

    #[test]
    fn test_load_program_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.toml");
        std::fs::write(&path, PROGRAM).unwrap();
        let program = load_program(path.to_str().unwrap()).unwrap();
        assert_eq!(program.operations[1].name, "Weld");
        assert!(matches!(load_program("/nonexistent.toml"), Err(ProgramError::Io(_))));
    }
}
