use super::atom::Atom;
use super::bond::{Bond, BondOrder};
use super::ids::{AtomId, MoleculeId};
use super::molecule::Molecule;
use crate::core::chemistry::bonding::{self, BondingRules};
use crate::core::chemistry::compositions::{self, Composition};
use crate::core::chemistry::element;
use nalgebra::Point2;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashSet;
use tracing::debug;

/// The owned container for everything in the sandbox.
///
/// All structural mutation (spawn, delete, bond, merge, split) goes through the
/// scene so collaborators never manipulate atom or molecule internals directly,
/// and so the symmetric bond relation, the adjacency cache, and the
/// atom→molecule back-references can never drift apart. The scene is explicitly
/// owned by its caller; multiple independent scenes coexist freely.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for molecules.
    molecules: SlotMap<MoleculeId, Molecule>,
    /// All bonds in the scene, one record per bonded pair.
    bonds: Vec<Bond>,
    /// Cached adjacency for bond connectivity, indexed by atom ID. Unique
    /// neighbors; the multiplicity lives on the `Bond` record.
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(id)
    }

    pub fn molecule_mut(&mut self, id: MoleculeId) -> Option<&mut Molecule> {
        self.molecules.get_mut(id)
    }

    pub fn molecules_iter(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.molecules.iter()
    }

    pub fn molecule_count(&self) -> usize {
        self.molecules.len()
    }

    /// Stable iteration snapshot of molecule IDs, for passes that mutate the
    /// molecule collection while scanning it.
    pub fn molecule_ids(&self) -> Vec<MoleculeId> {
        self.molecules.keys().collect()
    }

    /// Stable iteration snapshot of atom IDs.
    pub fn atom_ids(&self) -> Vec<AtomId> {
        self.atoms.keys().collect()
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bonded_neighbors(&self, atom_id: AtomId) -> Option<&[AtomId]> {
        self.bond_adjacency.get(atom_id).map(|v| v.as_slice())
    }

    pub fn bond_order_between(&self, a: AtomId, b: AtomId) -> Option<BondOrder> {
        self.bonds
            .iter()
            .find(|bond| bond.connects(a, b))
            .map(|bond| bond.order)
    }

    /// Valence slots currently consumed by this atom's bonds, counting a
    /// double bond twice.
    pub fn used_valence(&self, atom_id: AtomId) -> u32 {
        self.bonds
            .iter()
            .filter(|bond| bond.contains(atom_id))
            .map(|bond| u32::from(bond.order.multiplicity()))
            .sum()
    }

    /// Remaining valence slots, clamped at zero. The used count can exceed the
    /// element valence transiently (manual bonding, templates); that is a
    /// detectable instability condition, not an error.
    pub fn free_valence(&self, atom_id: AtomId) -> u32 {
        let Some(atom) = self.atoms.get(atom_id) else {
            return 0;
        };
        u32::from(atom.element.valence).saturating_sub(self.used_valence(atom_id))
    }

    pub fn molecule_of(&self, atom_id: AtomId) -> Option<MoleculeId> {
        self.atoms.get(atom_id).map(|atom| atom.molecule_id)
    }

    /// Creates a new atom as a molecule of one.
    ///
    /// Returns `None` only if `symbol` names no known element; the request is
    /// then a no-op.
    pub fn spawn_atom(&mut self, symbol: &str, position: Point2<f64>, charge: i8) -> Option<AtomId> {
        let spec = element::lookup(symbol)?;
        let molecule_id = self.molecules.insert(Molecule::new(Vec::new()));
        let mut atom = Atom::new(spec, position, charge);
        atom.molecule_id = molecule_id;
        let atom_id = self.atoms.insert(atom);
        self.molecules[molecule_id].atoms.push(atom_id);
        self.bond_adjacency.insert(atom_id, Vec::new());
        Some(atom_id)
    }

    /// Rule-checked bond creation: no-op returning `false` unless
    /// [`bonding::can_bond`] holds for the pair.
    pub fn make_bond(&mut self, rules: &BondingRules, a: AtomId, b: AtomId) -> bool {
        if !bonding::can_bond(self, rules, a, b) {
            return false;
        }
        self.form_bond(a, b)
    }

    /// Unchecked bond creation or upgrade, used by rule-checked bonding and by
    /// group templates (whose bonds are authored, not negotiated).
    ///
    /// A second bond between an already single-bonded pair upgrades it to a
    /// double bond; a double-bonded pair is refused. Bonding two atoms from
    /// different molecules merges their molecules.
    pub fn form_bond(&mut self, a: AtomId, b: AtomId) -> bool {
        if a == b || !self.atoms.contains_key(a) || !self.atoms.contains_key(b) {
            return false;
        }

        if let Some(bond) = self.bonds.iter_mut().find(|bond| bond.connects(a, b)) {
            match bond.order {
                BondOrder::Single => {
                    bond.order = BondOrder::Double;
                    return true;
                }
                BondOrder::Double => return false,
            }
        }

        self.bonds.push(Bond::new(a, b, BondOrder::Single));
        self.bond_adjacency[a].push(b);
        self.bond_adjacency[b].push(a);

        let mol_a = self.atoms[a].molecule_id;
        let mol_b = self.atoms[b].molecule_id;
        if mol_a != mol_b {
            self.merge_into(mol_a, mol_b);
        }
        true
    }

    /// Symmetric bond removal, one order level at a time: a double bond
    /// downgrades to single, a single bond disappears. Does not split the
    /// molecule; splitting is evaluated once per tick by the physics stepper.
    pub fn remove_bond(&mut self, a: AtomId, b: AtomId) {
        let Some(index) = self.bonds.iter().position(|bond| bond.connects(a, b)) else {
            return;
        };
        match self.bonds[index].order {
            BondOrder::Double => {
                self.bonds[index].order = BondOrder::Single;
            }
            BondOrder::Single => {
                self.bonds.swap_remove(index);
                if let Some(adjacency) = self.bond_adjacency.get_mut(a) {
                    adjacency.retain(|&id| id != b);
                }
                if let Some(adjacency) = self.bond_adjacency.get_mut(b) {
                    adjacency.retain(|&id| id != a);
                }
            }
        }
    }

    /// Removes every bond this atom participates in, regardless of order.
    pub fn sever_all_bonds(&mut self, atom_id: AtomId) {
        let neighbors = self
            .bond_adjacency
            .get(atom_id)
            .map(|v| v.to_vec())
            .unwrap_or_default();
        self.bonds.retain(|bond| !bond.contains(atom_id));
        if let Some(adjacency) = self.bond_adjacency.get_mut(atom_id) {
            adjacency.clear();
        }
        for neighbor in neighbors {
            if let Some(adjacency) = self.bond_adjacency.get_mut(neighbor) {
                adjacency.retain(|&id| id != atom_id);
            }
        }
    }

    /// Deletes an atom: severs all its bonds symmetrically, removes it from its
    /// molecule, drops the molecule if now empty, and otherwise splits the
    /// remainder into its connected components immediately.
    pub fn delete_atom(&mut self, atom_id: AtomId) -> Option<Atom> {
        if !self.atoms.contains_key(atom_id) {
            return None;
        }
        self.sever_all_bonds(atom_id);
        self.bond_adjacency.remove(atom_id);
        let atom = self.atoms.remove(atom_id)?;

        let molecule_id = atom.molecule_id;
        if let Some(molecule) = self.molecules.get_mut(molecule_id) {
            molecule.atoms.retain(|&id| id != atom_id);
            if molecule.is_empty() {
                self.molecules.remove(molecule_id);
            } else {
                self.split_disconnected(molecule_id);
            }
        }
        Some(atom)
    }

    /// Atomic ownership transfer: every atom of `source` moves into `target`
    /// (back-references included) and `source` is removed from the scene.
    ///
    /// The target molecule keeps its own instability timer; the source's is
    /// discarded with it.
    pub fn merge_into(&mut self, target: MoleculeId, source: MoleculeId) {
        if target == source
            || !self.molecules.contains_key(target)
            || !self.molecules.contains_key(source)
        {
            return;
        }
        let moved = self.molecules.remove(source).map(|m| m.atoms).unwrap_or_default();
        for &atom_id in &moved {
            if let Some(atom) = self.atoms.get_mut(atom_id) {
                atom.molecule_id = target;
            }
        }
        debug!(?target, ?source, moved = moved.len(), "merged molecules");
        self.molecules[target].atoms.extend(moved);
    }

    /// Recomputes connected components of a molecule's atom set under the
    /// current bond relation. The first component stays in place (keeping the
    /// instability timer); each further component becomes a new molecule.
    ///
    /// Returns the IDs of the newly created molecules.
    pub fn split_disconnected(&mut self, molecule_id: MoleculeId) -> Vec<MoleculeId> {
        let Some(molecule) = self.molecules.get(molecule_id) else {
            return Vec::new();
        };
        let members: HashSet<AtomId> = molecule.atoms.iter().copied().collect();
        let order = molecule.atoms.clone();

        let mut components: Vec<Vec<AtomId>> = Vec::new();
        let mut visited: HashSet<AtomId> = HashSet::new();
        for &start in &order {
            if visited.contains(&start) {
                continue;
            }
            let mut stack = vec![start];
            let mut component = Vec::new();
            while let Some(current) = stack.pop() {
                if !visited.insert(current) {
                    continue;
                }
                component.push(current);
                if let Some(neighbors) = self.bond_adjacency.get(current) {
                    for &neighbor in neighbors {
                        if members.contains(&neighbor) && !visited.contains(&neighbor) {
                            stack.push(neighbor);
                        }
                    }
                }
            }
            components.push(component);
        }

        if components.len() <= 1 {
            return Vec::new();
        }

        let mut rest = components.split_off(1);
        self.molecules[molecule_id].atoms = components.pop().unwrap_or_default();

        let mut created = Vec::with_capacity(rest.len());
        for component in rest.drain(..) {
            let new_id = self.molecules.insert(Molecule::new(Vec::new()));
            for &atom_id in &component {
                if let Some(atom) = self.atoms.get_mut(atom_id) {
                    atom.molecule_id = new_id;
                }
            }
            self.molecules[new_id].atoms = component;
            created.push(new_id);
        }
        debug!(?molecule_id, parts = created.len() + 1, "split molecule");
        created
    }

    /// Elemental composition of a molecule: symbol → count.
    pub fn composition(&self, molecule_id: MoleculeId) -> Composition {
        let mut counts = Composition::new();
        if let Some(molecule) = self.molecules.get(molecule_id) {
            for &atom_id in &molecule.atoms {
                if let Some(atom) = self.atoms.get(atom_id) {
                    *counts.entry(atom.symbol().to_string()).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Display formula of a molecule, e.g. `"H2O"`.
    pub fn molecule_formula(&self, molecule_id: MoleculeId) -> String {
        compositions::formula(&self.composition(molecule_id))
    }

    /// Geometric center of a molecule's atoms; the origin for an empty one.
    pub fn molecule_center(&self, molecule_id: MoleculeId) -> Point2<f64> {
        let Some(molecule) = self.molecules.get(molecule_id) else {
            return Point2::origin();
        };
        if molecule.is_empty() {
            return Point2::origin();
        }
        let mut sum = nalgebra::Vector2::zeros();
        let mut count = 0usize;
        for &atom_id in &molecule.atoms {
            if let Some(atom) = self.atoms.get(atom_id) {
                sum += atom.position.coords;
                count += 1;
            }
        }
        if count == 0 {
            Point2::origin()
        } else {
            Point2::from(sum / count as f64)
        }
    }

    /// Sum of formal charges across a molecule's atoms.
    pub fn net_charge(&self, molecule_id: MoleculeId) -> i32 {
        self.molecules
            .get(molecule_id)
            .map(|molecule| {
                molecule
                    .atoms
                    .iter()
                    .filter_map(|&id| self.atoms.get(id))
                    .map(|atom| i32::from(atom.charge))
                    .sum()
            })
            .unwrap_or(0)
    }

    pub fn set_fixed(&mut self, atom_id: AtomId, fixed: bool) {
        if let Some(atom) = self.atoms.get_mut(atom_id) {
            atom.fixed = fixed;
        }
    }

    /// Removes everything from the scene.
    pub fn clear(&mut self) {
        self.atoms.clear();
        self.molecules.clear();
        self.bonds.clear();
        self.bond_adjacency.clear();
    }

    /// Verifies the structural invariants: bond symmetry between the bond list
    /// and the adjacency cache, atom↔molecule back-reference agreement, and
    /// every molecule being exactly one connected component.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        for bond in &self.bonds {
            for (from, to) in [
                (bond.atom1_id, bond.atom2_id),
                (bond.atom2_id, bond.atom1_id),
            ] {
                let adjacency = self
                    .bond_adjacency
                    .get(from)
                    .ok_or_else(|| format!("missing adjacency for {from:?}"))?;
                if !adjacency.contains(&to) {
                    return Err(format!("asymmetric bond {from:?} -> {to:?}"));
                }
            }
        }

        let mut seen: HashSet<AtomId> = HashSet::new();
        for (molecule_id, molecule) in self.molecules.iter() {
            for &atom_id in &molecule.atoms {
                if !seen.insert(atom_id) {
                    return Err(format!("atom {atom_id:?} listed in two molecules"));
                }
                let atom = self
                    .atoms
                    .get(atom_id)
                    .ok_or_else(|| format!("molecule {molecule_id:?} lists dead atom"))?;
                if atom.molecule_id != molecule_id {
                    return Err(format!("back-reference mismatch for {atom_id:?}"));
                }
            }
        }
        if seen.len() != self.atoms.len() {
            return Err("orphan atoms outside any molecule".to_string());
        }

        for (molecule_id, molecule) in self.molecules.iter() {
            if molecule.is_empty() {
                return Err(format!("empty molecule {molecule_id:?} retained"));
            }
            let members: HashSet<AtomId> = molecule.atoms.iter().copied().collect();
            let mut stack = vec![molecule.atoms[0]];
            let mut reached: HashSet<AtomId> = HashSet::new();
            while let Some(current) = stack.pop() {
                if !reached.insert(current) {
                    continue;
                }
                if let Some(neighbors) = self.bond_adjacency.get(current) {
                    for &neighbor in neighbors {
                        if members.contains(&neighbor) {
                            stack.push(neighbor);
                        }
                    }
                }
            }
            if reached.len() != members.len() {
                return Err(format!("molecule {molecule_id:?} is not connected"));
            }
        }
        Ok(())
    }
}
