// dxm-rs: energy optimization of robotic motion programs under a duration limit

pub mod optimizer;

pub use dxm_shared::{config, constants};
pub use optimizer::{
    build_optimizer, EnergyOptimizationResult, EnergyOptimizer, HeuristicEnergyOptimizer,
    OptimizerError, UniformSpeedOptimizer,
};
