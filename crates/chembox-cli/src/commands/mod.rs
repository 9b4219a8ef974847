pub mod demo;
pub mod run;

use chembox::engine::simulation::Simulation;
use indicatif::ProgressBar;
use tracing::info;

/// Drives the simulation for `ticks` ticks with a progress bar, optionally
/// logging an intermediate summary every `report_every` ticks.
pub fn drive(sim: &mut Simulation, ticks: u64, dt: f64, report_every: Option<u64>) {
    let progress = ProgressBar::new(ticks);
    for tick in 0..ticks {
        sim.update(dt);
        progress.inc(1);
        if let Some(every) = report_every {
            if every > 0 && (tick + 1) % every == 0 {
                info!(
                    tick = tick + 1,
                    time = sim.time(),
                    molecules = sim.scene().molecule_count(),
                    bonds = sim.scene().bonds().len(),
                    "progress"
                );
            }
        }
    }
    progress.finish_and_clear();
}

/// Prints the final state of the sandbox to stdout, one line per molecule.
pub fn print_summary(sim: &Simulation) {
    let snapshot = sim.snapshot();
    let total_atoms: usize = snapshot.molecules.iter().map(|m| m.atoms.len()).sum();
    println!(
        "t = {:.2}s   molecules: {}   atoms: {}",
        snapshot.time,
        snapshot.molecules.len(),
        total_atoms
    );

    let mut rows: Vec<_> = snapshot
        .molecules
        .iter()
        .map(|molecule| {
            (
                molecule.formula.clone(),
                molecule.atoms.len(),
                molecule.bonds.len(),
                molecule.is_unstable,
            )
        })
        .collect();
    rows.sort();

    for (formula, atoms, bonds, unstable) in rows {
        println!(
            "  {:<12} atoms: {:>2}   bonds: {:>2}{}",
            formula,
            atoms,
            bonds,
            if unstable { "   UNSTABLE" } else { "" }
        );
    }
}
