use super::ids::{AtomId, MoleculeId};
use nalgebra::Point2;

/// Read-only view of the scene for a rendering shell.
///
/// Valid for the duration of a single frame: the underlying molecules may be
/// split, merged, or deleted by the next `update` call, so a shell must treat
/// the snapshot as invalidated afterwards and never mutate through it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// Simulation-clock time the snapshot was taken at.
    pub time: f64,
    pub molecules: Vec<MoleculeView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeView {
    pub id: MoleculeId,
    /// Composition-derived display formula, e.g. `"H2O"`.
    pub formula: String,
    pub is_unstable: bool,
    pub center: Point2<f64>,
    pub atoms: Vec<AtomView>,
    pub bonds: Vec<BondView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomView {
    pub id: AtomId,
    pub symbol: &'static str,
    pub position: Point2<f64>,
    pub charge: i8,
    pub free_valence: u32,
    pub color: [u8; 3],
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondView {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    /// 1 for a single bond, 2 for a double bond.
    pub multiplicity: u8,
}
