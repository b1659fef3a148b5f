// Benchmark for motion segmentation and a complete seeded optimization
// Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use dxm_rs::config::SearchSettings;
use dxm_rs::optimizer::{segment_motions, EnergyOptimizer, HeuristicEnergyOptimizer};
use dxm_shared::{LocationKind, MotionType, Position, ProgramHost, Waypoint};
use dxm_simulator::{LocationSpec, OperationSpec, ProgramSpec, RobotModel, SimulatedHost};

/// Weld cells of four spots, each approached through two joint vias.
fn weld_cells(cells: usize) -> ProgramSpec {
    let operations = (0..cells)
        .map(|cell| {
            let x = cell as f64 * 150.0;
            let mut locations = vec![
                LocationSpec::joint("via_in", [x, -800.0, 1100.0]),
                LocationSpec::joint("via_above", [x, 0.0, 700.0]),
            ];
            for spot in 0..4 {
                let y = spot as f64 * 40.0;
                locations.push(LocationSpec::weld("spot", [x, y, 500.0], 0.8));
                locations.push(LocationSpec::joint("hop", [x + 20.0, y + 20.0, 540.0]));
            }
            locations.push(LocationSpec::linear("retract", [x, 200.0, 900.0]));
            OperationSpec {
                name: format!("Cell {}", cell),
                locations,
            }
        })
        .collect();
    ProgramSpec {
        name: "WeldCells".to_string(),
        operations,
    }
}

fn bench_segmentation(c: &mut Criterion) {
    let locations: Vec<Waypoint> = (0..10_000)
        .map(|i| Waypoint {
            index: i,
            name: format!("loc{}", i),
            parent: i / 100,
            position: Position::new(i as f64, 0.0, (i % 7) as f64 * 50.0),
            duration: 0.25,
            motion_type: if i % 9 == 0 { MotionType::Linear } else { MotionType::Joint },
            kind: if i % 13 == 0 { LocationKind::Weld } else { LocationKind::Via },
        })
        .collect();
    c.bench_function("segment 10k locations", |b| {
        b.iter(|| {
            let motions = segment_motions(&locations);
            assert!(!motions.is_empty());
        });
    });
}

fn bench_heuristic_optimization(c: &mut Criterion) {
    let spec = weld_cells(20);
    c.bench_function("optimize 20 weld cells", |b| {
        b.iter(|| {
            let mut host = SimulatedHost::new(RobotModel::default());
            let id = host.load(&spec).unwrap();
            let copy = host.duplicate(id).unwrap();
            let full = host.simulate(copy).unwrap().total_duration;
            host.delete(copy).unwrap();

            let mut optimizer = HeuristicEnergyOptimizer::seeded(SearchSettings::default(), 1);
            let result = optimizer.optimize(&mut host, id, full * 1.2).unwrap();
            assert!(result.is_some());
        });
    });
}

criterion_group!(benches, bench_segmentation, bench_heuristic_optimization);
criterion_main!(benches);
