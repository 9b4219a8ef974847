use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Elemental composition of a molecule: symbol → atom count.
///
/// Ordered map so derived formula strings are deterministic.
pub type Composition = BTreeMap<String, u32>;

/// Renders a composition as a display formula, e.g. `{H:2, O:1}` → `"H2O"`.
pub fn formula(composition: &Composition) -> String {
    let mut out = String::new();
    for (symbol, count) in composition {
        out.push_str(symbol);
        if *count != 1 {
            out.push_str(&count.to_string());
        }
    }
    out
}

/// Hand-authored composition heuristics driving the stability monitor.
///
/// These tables are an approximation, not a valence-bond solver; they are kept
/// as swappable configuration data so the heuristic can be replaced without
/// touching physics or rendering. A rules file loaded from TOML overrides the
/// baseline field by field: omitted fields keep their baseline values.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompositionRules {
    /// Compositions that are never flagged unstable. An exact match here
    /// overrides every other heuristic, including over-bonding.
    pub stable: Vec<Composition>,
    /// Compositions flagged unstable on exact match.
    pub unstable: Vec<Composition>,
    /// Compositions flagged unstable whenever the molecule contains at least
    /// the listed counts (subset match, not exact).
    pub impossible: Vec<Composition>,
    /// Policy for multi-atom compositions matching no table: `true` presumes
    /// them unstable until proven otherwise. A deliberate simplification
    /// carried as configuration, not chemistry ground truth.
    pub default_unstable: bool,
    /// Flag molecules whose formal charges do not sum to zero.
    pub net_charge_rule: bool,
}

impl CompositionRules {
    /// The neutral-model ruleset: full composition tables, conservative
    /// default-unstable policy, charges ignored.
    pub fn baseline() -> Self {
        Self {
            stable: vec![
                comp(&[("H", 2)]),
                comp(&[("O", 2)]),
                comp(&[("O", 3)]),
                comp(&[("Cl", 2)]),
                comp(&[("H", 2), ("O", 1)]),
                comp(&[("H", 2), ("O", 2)]),
                comp(&[("H", 1), ("Cl", 1)]),
                comp(&[("Ca", 1), ("O", 1)]),
                comp(&[("Na", 2), ("O", 1)]),
                comp(&[("Na", 2), ("O", 2)]),
                comp(&[("Na", 1), ("Cl", 1)]),
                comp(&[("Ca", 1), ("Cl", 2)]),
                comp(&[("O", 1), ("Cl", 2)]),
                comp(&[("Ca", 1), ("O", 2), ("H", 2)]),
                comp(&[("Na", 1), ("O", 1), ("H", 1)]),
                comp(&[("Ca", 1), ("H", 2)]),
                comp(&[("Na", 1), ("H", 1)]),
            ],
            unstable: vec![
                comp(&[("Na", 1), ("Ca", 1)]),
                comp(&[("Na", 1), ("O", 1)]),
                comp(&[("Ca", 1), ("Cl", 1)]),
                comp(&[("Na", 1), ("H", 1)]),
                comp(&[("Ca", 1), ("H", 2)]),
                comp(&[("H", 1), ("O", 3), ("Cl", 1)]),
                comp(&[("H", 1), ("O", 1), ("Cl", 1)]),
                comp(&[("Na", 1), ("Ca", 1), ("Cl", 1)]),
                comp(&[("Na", 1), ("Ca", 1), ("O", 1)]),
            ],
            impossible: vec![
                comp(&[("Na", 1), ("Ca", 1)]),
                comp(&[("Na", 2)]),
                comp(&[("Ca", 2)]),
                comp(&[("Na", 1), ("Cl", 3)]),
                comp(&[("Na", 2), ("Cl", 1)]),
                comp(&[("Ca", 1), ("Cl", 3)]),
                comp(&[("Ca", 2), ("Cl", 1)]),
                comp(&[("Ca", 1), ("O", 3)]),
                comp(&[("Na", 1), ("O", 3)]),
                comp(&[("H", 1), ("O", 3)]),
                comp(&[("Ca", 1), ("H", 3)]),
                comp(&[("Na", 1), ("H", 3)]),
            ],
            default_unstable: true,
            net_charge_rule: false,
        }
    }

    /// The charge-aware ruleset: no composition tables; instability comes from
    /// over-bonding and charge imbalance alone.
    pub fn charge_balance() -> Self {
        Self {
            stable: Vec::new(),
            unstable: Vec::new(),
            impossible: Vec::new(),
            default_unstable: false,
            net_charge_rule: true,
        }
    }

    pub fn load(path: &Path) -> Result<Self, RulesLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| RulesLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| RulesLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn matches_stable(&self, composition: &Composition) -> bool {
        self.stable.iter().any(|entry| entry == composition)
    }

    pub fn matches_unstable(&self, composition: &Composition) -> bool {
        self.unstable.iter().any(|entry| entry == composition)
    }

    /// Subset match: every listed element is present in at least the listed count.
    pub fn matches_impossible(&self, composition: &Composition) -> bool {
        self.impossible.iter().any(|entry| {
            entry
                .iter()
                .all(|(symbol, count)| composition.get(symbol).copied().unwrap_or(0) >= *count)
        })
    }
}

impl Default for CompositionRules {
    fn default() -> Self {
        Self::baseline()
    }
}

fn comp(entries: &[(&str, u32)]) -> Composition {
    entries
        .iter()
        .map(|(symbol, count)| (symbol.to_string(), *count))
        .collect()
}

#[derive(Debug, Error)]
pub enum RulesLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}
