use crate::core::models::bond::BondOrder;
use crate::core::models::ids::AtomId;
use crate::core::models::scene::Scene;
use serde::Deserialize;

/// Data driving the bond rule engine.
///
/// Forbidden pairs model chemically implausible direct bonds (metal–metal and
/// the like); the pair list is unordered, so `("Na", "Ca")` also forbids
/// `("Ca", "Na")`. Like the composition tables, this is swappable
/// configuration, and a TOML rules file overrides it field by field.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BondingRules {
    /// Unordered element-symbol pairs that may never bond directly.
    pub forbidden_pairs: Vec<(String, String)>,
    /// Cap on the multiplicity between any single pair of atoms.
    pub max_bond_order: BondOrder,
    /// When enabled, a bond additionally requires both atoms neutral
    /// (covalent) or a strictly negative charge product (ionic).
    pub charge_pairing: bool,
}

impl BondingRules {
    /// Neutral-model rules: metal–metal pairs forbidden, double bonds allowed,
    /// charges ignored.
    pub fn baseline() -> Self {
        Self {
            forbidden_pairs: pairs(&[("Na", "Na"), ("Ca", "Ca"), ("Na", "Ca")]),
            max_bond_order: BondOrder::Double,
            charge_pairing: false,
        }
    }

    /// Charge-aware rules: a wider forbidden set, single bonds only, and
    /// charge compatibility required.
    pub fn charge_paired() -> Self {
        Self {
            forbidden_pairs: pairs(&[
                ("Na", "Na"),
                ("Ca", "Ca"),
                ("Na", "Ca"),
                ("Na", "C"),
                ("Ca", "C"),
                ("Ca", "S"),
                ("Na", "S"),
            ]),
            max_bond_order: BondOrder::Single,
            charge_pairing: true,
        }
    }

    /// True if the unordered symbol pair is forbidden.
    pub fn forbids(&self, a: &str, b: &str) -> bool {
        self.forbidden_pairs
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }
}

impl Default for BondingRules {
    fn default() -> Self {
        Self::baseline()
    }
}

fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Decides whether two atoms may form (or upgrade) a bond right now.
///
/// Pure with respect to the scene: no side effects. Called before every bond
/// creation, both for manual collaborator-initiated bonding and for automatic
/// proximity bonding during physics stepping.
pub fn can_bond(scene: &Scene, rules: &BondingRules, a: AtomId, b: AtomId) -> bool {
    if a == b {
        return false;
    }
    let (Some(atom_a), Some(atom_b)) = (scene.atom(a), scene.atom(b)) else {
        return false;
    };

    if let Some(order) = scene.bond_order_between(a, b) {
        if order.multiplicity() >= rules.max_bond_order.multiplicity() {
            return false;
        }
    }

    if scene.free_valence(a) == 0 || scene.free_valence(b) == 0 {
        return false;
    }

    if rules.forbids(atom_a.symbol(), atom_b.symbol()) {
        return false;
    }

    if rules.charge_pairing {
        let product = i32::from(atom_a.charge) * i32::from(atom_b.charge);
        let both_neutral = atom_a.charge == 0 && atom_b.charge == 0;
        if !both_neutral && product >= 0 {
            return false;
        }
    }

    true
}
