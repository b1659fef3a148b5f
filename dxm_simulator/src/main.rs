// sim_harness: play one program at a uniform joint speed and record per-location durations

use config as config_rs;
use csv::Writer;
use dxm_shared::config::RobotConfig;
use dxm_shared::ProgramHost;
use dxm_simulator::{load_program, RobotModel, SimulatedHost};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

#[derive(Debug, Deserialize)]
struct HarnessConfig {
    simulation: SimulationConfig,
    #[serde(default)]
    robot: RobotConfig,
}

#[derive(Debug, Deserialize)]
struct SimulationConfig {
    program: String,
    output_dir: String,
    #[serde(default = "default_speed")]
    joint_speed: f64,
    #[serde(default)]
    jsonl: bool,
}

fn default_speed() -> f64 { 100.0 }

#[derive(Debug, Serialize)]
struct LocationRecord<'a> {
    index: usize,
    name: &'a str,
    parent: usize,
    x: f64,
    y: f64,
    z: f64,
    motion: &'a str,
    duration: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "dxm_simulator/sim.toml".to_string());
    let settings = config_rs::Config::builder()
        .add_source(config_rs::File::with_name(&config_path))
        .add_source(config_rs::Environment::with_prefix("DXM_SIM").separator("__"))
        .build()?;
    let harness: HarnessConfig = settings.try_deserialize()?;
    harness.robot.validate()?;
    tracing::info!("Loaded harness config: {:?}", harness);

    let spec = load_program(&harness.simulation.program)?;
    let mut host = SimulatedHost::new(RobotModel::from(&harness.robot));
    let program = host.load(&spec)?;
    host.set_joint_speed(program, harness.simulation.joint_speed)?;
    let report = host.simulate(program)?;
    println!("{}", report.leaves);
    tracing::info!(
        "Program '{}' at {}% joint speed: {:.3}s",
        spec.name,
        harness.simulation.joint_speed,
        report.total_duration
    );

    let output_dir = std::path::Path::new(&harness.simulation.output_dir);
    std::fs::create_dir_all(output_dir)?;
    let mut wtr = Writer::from_path(output_dir.join("results.csv"))?;
    let mut jsonl = if harness.simulation.jsonl {
        Some(File::create(output_dir.join("results.jsonl"))?)
    } else {
        None
    };
    for waypoint in host.locations(program)? {
        let record = LocationRecord {
            index: waypoint.index,
            name: &waypoint.name,
            parent: waypoint.parent,
            x: waypoint.position.x,
            y: waypoint.position.y,
            z: waypoint.position.z,
            motion: match waypoint.motion_type {
                dxm_shared::MotionType::Joint => "joint",
                dxm_shared::MotionType::Linear => "linear",
            },
            duration: waypoint.duration,
        };
        wtr.serialize(&record)?;
        if let Some(file) = jsonl.as_mut() {
            writeln!(file, "{}", serde_json::to_string(&record)?)?;
        }
    }
    wtr.flush()?;
    tracing::info!("Wrote results to {}", output_dir.display());
    Ok(())
}
