use crate::error::{CliError, Result};
use chembox::engine::simulation::Simulation;
use nalgebra::Point2;
use serde::Deserialize;
use std::path::Path;

/// A scenario file: the initial contents of the sandbox.
///
/// ```toml
/// [[atoms]]
/// symbol = "O"
/// x = 400.0
/// y = 300.0
///
/// [[groups]]
/// template = "H2O"
/// x = 200.0
/// y = 200.0
/// ```
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub atoms: Vec<AtomSpawn>,
    pub groups: Vec<GroupSpawn>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AtomSpawn {
    pub symbol: String,
    pub x: f64,
    pub y: f64,
    /// Explicit formal charge; omitted means the simulation's charge model decides.
    #[serde(default)]
    pub charge: Option<i8>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GroupSpawn {
    pub template: String,
    pub x: f64,
    pub y: f64,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: anyhow::Error::new(e),
        })
    }

    /// Spawns everything the scenario lists into a fresh simulation.
    ///
    /// Unknown element symbols and unknown template names are argument errors;
    /// nothing is half-spawned on failure because each entry is atomic.
    pub fn apply(&self, sim: &mut Simulation) -> Result<()> {
        for atom in &self.atoms {
            let position = Point2::new(atom.x, atom.y);
            let spawned = match atom.charge {
                Some(charge) => sim.spawn_atom_charged(&atom.symbol, position, charge),
                None => sim.spawn_atom(&atom.symbol, position),
            };
            if spawned.is_none() {
                return Err(CliError::Argument(format!(
                    "unknown element '{}' in scenario",
                    atom.symbol
                )));
            }
        }
        for group in &self.groups {
            if sim
                .spawn_group(&group.template, Point2::new(group.x, group.y))
                .is_none()
            {
                return Err(CliError::Argument(format!(
                    "unknown group template '{}' in scenario",
                    group.template
                )));
            }
        }
        Ok(())
    }
}
