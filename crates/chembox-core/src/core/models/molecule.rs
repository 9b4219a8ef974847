use super::ids::AtomId;

/// A connected set of atoms under the bond relation.
///
/// The atom list is exactly one connected component of the scene's bond graph;
/// whenever physics cuts the last bond between two sub-clusters, the owning
/// scene splits the molecule in the same tick. Composition, center, and net
/// charge are derived by the scene, which owns the atom storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    /// Atoms belonging to this molecule. Never listed by any other molecule.
    pub atoms: Vec<AtomId>,
    /// Simulation-clock timestamp of the first tick this molecule was observed
    /// unstable; cleared the moment it is observed stable again.
    pub unstable_since: Option<f64>,
}

impl Molecule {
    pub fn new(atoms: Vec<AtomId>) -> Self {
        Self {
            atoms,
            unstable_since: None,
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
