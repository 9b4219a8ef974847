use super::{drive, print_summary};
use crate::cli::RunArgs;
use crate::error::Result;
use crate::scenario::Scenario;
use chembox::core::chemistry::compositions::CompositionRules;
use chembox::core::chemistry::templates::TemplateRegistry;
use chembox::engine::config::SimulationConfig;
use chembox::engine::simulation::Simulation;
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None if args.charged => SimulationConfig::charged(),
        None => SimulationConfig::default(),
    };
    if let Some(path) = &args.rules {
        config.compositions = CompositionRules::load(path)?;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let mut templates = TemplateRegistry::builtin();
    if let Some(path) = &args.templates {
        templates.extend_from(TemplateRegistry::load(path)?);
    }

    let scenario = Scenario::load(&args.scenario)?;
    let mut sim = Simulation::with_templates(config, templates);
    scenario.apply(&mut sim)?;
    info!(
        atoms = sim.scene().atom_count(),
        molecules = sim.scene().molecule_count(),
        "scenario loaded from '{}'",
        args.scenario.display()
    );

    drive(&mut sim, args.ticks, args.dt, args.report_every);
    print_summary(&sim);
    Ok(())
}
