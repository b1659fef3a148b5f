// src/main.rs - Command line entry point for energy optimization of robot programs
use clap::{Parser, Subcommand, ValueEnum};
use dxm_rs::config::{self, Config, Strategy};
use dxm_rs::optimizer::{build_optimizer, MotionSummary};
use dxm_shared::ProgramHost;
use dxm_simulator::{load_program, RobotModel, SimulatedHost};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "dxm", version, about = "Lower the energy use of robot programs under a duration limit")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for a variant of the program that finishes under the limit with less energy
    Optimize {
        /// Program file (TOML)
        #[arg(short, long)]
        program: String,
        /// Duration limit in seconds; the result stays strictly under it
        #[arg(short, long)]
        limit: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Write the optimized speeds as JSON
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Simulate the program at a uniform joint speed and print per-location durations
    Simulate {
        #[arg(short, long)]
        program: String,
        #[arg(long, default_value_t = 100.0)]
        speed: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Heuristic,
    Uniform,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Heuristic => Strategy::Heuristic,
            StrategyArg::Uniform => Strategy::Uniform,
        }
    }
}

#[derive(Debug, Serialize)]
struct OptimizationReport<'a> {
    program: &'a str,
    duration_limit: f64,
    duration: f64,
    energy_savings_percent: f64,
    motions: &'a [MotionSummary],
    joint_speeds: Vec<(String, f64)>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    let level_name = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let level = tracing::Level::from_str(level_name).unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    tracing::info!("Starting dxm {}", env!("CARGO_PKG_VERSION"));

    let mut host = SimulatedHost::new(RobotModel::from(&config.robot));

    match cli.command {
        Command::Optimize {
            program,
            limit,
            seed,
            strategy,
            output,
        } => {
            let spec = load_program(&program)?;
            let id = host.load(&spec)?;

            let mut optimizer_config = config.optimizer.clone();
            if let Some(seed) = seed {
                optimizer_config.seed = Some(seed);
            }
            if let Some(strategy) = strategy {
                optimizer_config.strategy = strategy.into();
            }
            tracing::info!(
                "Optimizing '{}' with {:?} strategy, limit {:.3}s",
                spec.name,
                optimizer_config.strategy,
                limit
            );

            let mut optimizer = build_optimizer(&optimizer_config);
            match optimizer.optimize(&mut host, id, limit)? {
                None => {
                    println!("No optimization found within the duration limit of {} s.", limit);
                }
                Some(result) => {
                    println!("{}", result.name());
                    println!("  duration: {:.3} s (limit {:.3} s)", result.duration(), limit);
                    println!("  estimated energy savings: {:.2} %", result.energy_savings_percent());
                    for motion in result.motions() {
                        println!(
                            "  {} -> {}: score {:.3}, velocity {:.1} %, {:.3} s",
                            motion.from, motion.to, motion.energy_demand_score, motion.velocity, motion.duration
                        );
                    }
                    if let Some(path) = output {
                        let report = OptimizationReport {
                            program: result.name(),
                            duration_limit: limit,
                            duration: result.duration(),
                            energy_savings_percent: result.energy_savings_percent(),
                            motions: result.motions(),
                            joint_speeds: host.joint_speeds(result.program())?,
                        };
                        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                        tracing::info!("Wrote optimization report to {}", path);
                    }
                }
            }
        }
        Command::Simulate { program, speed } => {
            let spec = load_program(&program)?;
            let id = host.load(&spec)?;
            host.set_joint_speed(id, speed)?;
            let report = host.simulate(id)?;
            print!("{}", report.leaves);
            println!("Total: {:.3}s at {}% joint speed", report.total_duration, speed);
        }
    }

    Ok(())
}
