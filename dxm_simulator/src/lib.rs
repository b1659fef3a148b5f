// dxm_simulator: deterministic in-memory simulation host for robot programs

pub mod program;
pub mod simulator;

pub use program::{load_program, LocationSpec, OperationSpec, ProgramError, ProgramSpec};
pub use simulator::kinematics::RobotModel;
pub use simulator::SimulatedHost;
