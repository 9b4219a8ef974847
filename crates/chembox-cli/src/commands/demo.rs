use super::{drive, print_summary};
use crate::cli::DemoArgs;
use crate::error::{CliError, Result};
use chembox::engine::config::SimulationConfig;
use chembox::engine::simulation::Simulation;
use nalgebra::Point2;
use tracing::info;

const DEMO_SPAWNS: [(&str, f64, f64); 5] = [
    ("O", 420.0, 360.0),
    ("H", 380.0, 360.0),
    ("H", 460.0, 360.0),
    ("Na", 700.0, 200.0),
    ("O", 740.0, 200.0),
];

/// Built-in scenario: a water trio close enough to bond, plus a sodium–oxygen
/// pair that classifies unstable and decays once its lifetime elapses.
pub fn run(args: DemoArgs) -> Result<()> {
    let config = SimulationConfig {
        seed: Some(args.seed),
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(config);

    for (symbol, x, y) in DEMO_SPAWNS {
        sim.spawn_atom(symbol, Point2::new(x, y))
            .ok_or_else(|| CliError::Argument(format!("unknown element '{symbol}'")))?;
    }

    info!(
        atoms = sim.scene().atom_count(),
        ticks = args.ticks,
        "demo scene spawned"
    );

    drive(&mut sim, args.ticks, args.dt, None);
    print_summary(&sim);
    Ok(())
}
