use crate::core::chemistry::bonding::BondingRules;
use crate::core::chemistry::compositions::CompositionRules;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Rectangular simulation area. Atoms are clamped to stay inside it.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
    /// Wall inset: positions are clamped to `[margin, extent - margin]`.
    pub margin: f64,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self {
            width: 940.0,
            height: 720.0,
            margin: 4.0,
        }
    }
}

/// Constants driving the physics stepper.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsParams {
    /// Scale of the per-axis thermal jitter.
    pub diffuse_strength: f64,
    /// Maximum distance for automatic bond creation.
    pub bond_distance: f64,
    /// Distance beyond which an existing bond breaks. Greater than
    /// `bond_distance` so bonds do not flicker at the threshold.
    pub bond_break_distance: f64,
    /// Spring constant of the bond springs.
    pub bond_spring_k: f64,
    /// Preferred bond length as a fraction of `bond_distance`.
    pub bond_preferred_scale: f64,
    /// Strength of the short-range overlap repulsion.
    pub repulsion_strength: f64,
    /// Long-range attraction scale for opposite formal charges.
    pub attraction_factor: f64,
    /// Long-range repulsion scale for like formal charges.
    pub repulsion_factor: f64,
    /// Speed clamp applied after each velocity integration.
    pub max_speed: f64,
    pub bounds: CanvasBounds,
}

impl PhysicsParams {
    pub fn baseline() -> Self {
        Self {
            diffuse_strength: 1.0,
            bond_distance: 120.0,
            bond_break_distance: 200.0,
            bond_spring_k: 0.14,
            bond_preferred_scale: 0.6,
            repulsion_strength: 0.8,
            attraction_factor: 0.0,
            repulsion_factor: 0.0,
            max_speed: 4.0,
            bounds: CanvasBounds::default(),
        }
    }

    pub fn charged() -> Self {
        Self {
            diffuse_strength: 0.6,
            bond_distance: 70.0,
            bond_break_distance: 180.0,
            bond_spring_k: 0.12,
            bond_preferred_scale: 0.6,
            repulsion_strength: 0.6,
            attraction_factor: 80.0,
            repulsion_factor: 30.0,
            max_speed: 3.5,
            bounds: CanvasBounds {
                width: 980.0,
                height: 720.0,
                margin: 4.0,
            },
        }
    }

    /// Preferred rest length of a bond spring.
    pub fn preferred_bond_length(&self) -> f64 {
        self.bond_distance * self.bond_preferred_scale
    }
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Timing and impulse constants for the stability monitor.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StabilityParams {
    /// How long a molecule must stay continuously unstable before it is
    /// forcibly disassembled, in simulation seconds.
    pub unstable_lifetime: f64,
    /// Disassembly pushes each atom outward with a magnitude drawn uniformly
    /// from `[impulse_min, impulse_max)`.
    pub impulse_min: f64,
    pub impulse_max: f64,
}

impl Default for StabilityParams {
    fn default() -> Self {
        Self {
            unstable_lifetime: 5.0,
            impulse_min: 5.0,
            impulse_max: 8.0,
        }
    }
}

/// How spawned atoms get their formal charge.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChargeModel {
    /// Every atom spawns neutral; charge forces and charge rules are inert.
    #[default]
    Neutral,
    /// Atoms spawn with their element's default formal charge.
    Formal,
}

/// Complete parameterization of one simulation.
///
/// `default()` is the neutral-model sandbox (composition tables, double bonds,
/// no charges); [`SimulationConfig::charged`] is the charge-aware variant
/// (formal charges, ionic pairing, charge-imbalance instability). Loading from
/// TOML overrides the defaults field by field.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub physics: PhysicsParams,
    pub stability: StabilityParams,
    pub bonding: BondingRules,
    pub compositions: CompositionRules,
    pub charge_model: ChargeModel,
    /// RNG seed. A fixed seed plus an identical call sequence reproduces the
    /// exact trajectory; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// The charge-aware variant preset.
    pub fn charged() -> Self {
        Self {
            physics: PhysicsParams::charged(),
            stability: StabilityParams {
                unstable_lifetime: 1.5,
                ..StabilityParams::default()
            },
            bonding: BondingRules::charge_paired(),
            compositions: CompositionRules::charge_balance(),
            charge_model: ChargeModel::Formal,
            seed: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
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
