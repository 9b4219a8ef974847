use super::element;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One atom inside a group template: element, offset from the spawn point, and
/// an optional formal-charge override.
///
/// The charge is an explicit optional field; templates that do not care leave
/// it unset and the spawning code falls back to the active charge model.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TemplateAtom {
    pub symbol: String,
    pub dx: f64,
    pub dy: f64,
    #[serde(default)]
    pub charge: Option<i8>,
}

/// A predefined cluster of atoms with authored bonds, spawnable in one call.
///
/// Purely a batch convenience over spawn-atom plus form-bond; bond entries are
/// indices into `atoms` and bypass the rule engine, exactly like a collaborator
/// wiring the cluster by hand.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GroupTemplate {
    pub atoms: Vec<TemplateAtom>,
    #[serde(default)]
    pub bonds: Vec<(usize, usize)>,
}

/// Named collection of group templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    registry: HashMap<String, GroupTemplate>,
}

impl TemplateRegistry {
    /// The built-in groups: OH, H2O, CO2, NaCl, Ca(OH)2, H2SO4.
    pub fn builtin() -> Self {
        let mut registry = HashMap::new();
        registry.insert(
            "OH".to_string(),
            template(&[("O", -18.0, 0.0, 0), ("H", 18.0, 0.0, 0)], &[(0, 1)]),
        );
        registry.insert(
            "H2O".to_string(),
            template(
                &[
                    ("O", 0.0, 0.0, 0),
                    ("H", -36.0, -12.0, 0),
                    ("H", 36.0, -12.0, 0),
                ],
                &[(0, 1), (0, 2)],
            ),
        );
        registry.insert(
            "CO2".to_string(),
            template(
                &[
                    ("C", 0.0, 0.0, 0),
                    ("O", -56.0, 0.0, 0),
                    ("O", 56.0, 0.0, 0),
                ],
                &[(0, 1), (0, 2)],
            ),
        );
        registry.insert(
            "NaCl".to_string(),
            template(&[("Na", -20.0, 0.0, 1), ("Cl", 20.0, 0.0, -1)], &[(0, 1)]),
        );
        registry.insert(
            "Ca(OH)2".to_string(),
            template(
                &[
                    ("Ca", 0.0, 0.0, 2),
                    ("O", -44.0, -18.0, -1),
                    ("H", -66.0, -10.0, 0),
                    ("O", 44.0, -18.0, -1),
                    ("H", 66.0, -10.0, 0),
                ],
                &[(0, 1), (1, 2), (0, 3), (3, 4)],
            ),
        );
        registry.insert(
            "H2SO4".to_string(),
            template(
                &[
                    ("S", 0.0, 0.0, 0),
                    ("O", -44.0, -36.0, 0),
                    ("O", 44.0, -36.0, 0),
                    ("O", -44.0, 36.0, 0),
                    ("O", 44.0, 36.0, 0),
                    ("H", -72.0, 56.0, 0),
                    ("H", 72.0, 56.0, 0),
                ],
                &[(0, 1), (0, 2), (0, 3), (0, 4), (3, 5), (4, 6)],
            ),
        );
        Self { registry }
    }

    /// Loads user-defined templates from a TOML file, validating element
    /// symbols and bond indices at load time.
    pub fn load(path: &Path) -> Result<Self, TemplateLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| TemplateLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let registry: HashMap<String, GroupTemplate> =
            toml::from_str(&content).map_err(|e| TemplateLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        for (name, template) in &registry {
            validate(name, template)?;
        }
        Ok(Self { registry })
    }

    pub fn get(&self, name: &str) -> Option<&GroupTemplate> {
        self.registry.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(|s| s.as_str())
    }

    /// Absorbs every template from `other`, overwriting same-named entries.
    pub fn extend_from(&mut self, other: TemplateRegistry) {
        self.registry.extend(other.registry);
    }
}

fn template(atoms: &[(&str, f64, f64, i8)], bonds: &[(usize, usize)]) -> GroupTemplate {
    GroupTemplate {
        atoms: atoms
            .iter()
            .map(|&(symbol, dx, dy, charge)| TemplateAtom {
                symbol: symbol.to_string(),
                dx,
                dy,
                charge: Some(charge),
            })
            .collect(),
        bonds: bonds.to_vec(),
    }
}

fn validate(name: &str, template: &GroupTemplate) -> Result<(), TemplateLoadError> {
    for atom in &template.atoms {
        if element::lookup(&atom.symbol).is_none() {
            return Err(TemplateLoadError::UnknownElement {
                template: name.to_string(),
                symbol: atom.symbol.clone(),
            });
        }
    }
    for &(i, j) in &template.bonds {
        if i >= template.atoms.len() || j >= template.atoms.len() || i == j {
            return Err(TemplateLoadError::InvalidBond {
                template: name.to_string(),
                bond: (i, j),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum TemplateLoadError {
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
    #[error("Template '{template}' references unknown element '{symbol}'")]
    UnknownElement { template: String, symbol: String },
    #[error("Template '{template}' has invalid bond entry {bond:?}")]
    InvalidBond { template: String, bond: (usize, usize) },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_registry_contains_the_six_groups() {
        let registry = TemplateRegistry::builtin();
        for name in ["OH", "H2O", "CO2", "NaCl", "Ca(OH)2", "H2SO4"] {
            assert!(registry.get(name).is_some(), "missing template {name}");
        }
        assert_eq!(registry.names().count(), 6);
    }

    #[test]
    fn builtin_templates_are_internally_valid() {
        let registry = TemplateRegistry::builtin();
        for name in registry.names() {
            validate(name, registry.get(name).unwrap()).unwrap();
        }
    }

    #[test]
    fn sulfuric_acid_wiring_matches_its_structure() {
        let registry = TemplateRegistry::builtin();
        let h2so4 = registry.get("H2SO4").unwrap();
        assert_eq!(h2so4.atoms.len(), 7);
        assert_eq!(h2so4.bonds.len(), 6);
        assert_eq!(h2so4.atoms[0].symbol, "S");
    }

    #[test]
    fn hydroxide_template_carries_explicit_charges() {
        let registry = TemplateRegistry::builtin();
        let caoh2 = registry.get("Ca(OH)2").unwrap();
        assert_eq!(caoh2.atoms[0].charge, Some(2));
        assert_eq!(caoh2.atoms[1].charge, Some(-1));
        assert_eq!(caoh2.atoms[2].charge, Some(0));
    }

    #[test]
    fn load_accepts_a_valid_template_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("groups.toml");
        std::fs::write(
            &path,
            r#"
[HCl]
atoms = [
    { symbol = "H", dx = -14.0, dy = 0.0 },
    { symbol = "Cl", dx = 14.0, dy = 0.0 },
]
bonds = [[0, 1]]
"#,
        )
        .unwrap();

        let registry = TemplateRegistry::load(&path).unwrap();
        let hcl = registry.get("HCl").unwrap();
        assert_eq!(hcl.atoms.len(), 2);
        assert_eq!(hcl.atoms[0].charge, None);
    }

    #[test]
    fn load_rejects_unknown_elements_and_bad_bond_indices() {
        let dir = tempdir().unwrap();

        let bad_element = dir.path().join("element.toml");
        std::fs::write(
            &bad_element,
            r#"
[X2]
atoms = [{ symbol = "Xx", dx = 0.0, dy = 0.0 }]
bonds = []
"#,
        )
        .unwrap();
        assert!(matches!(
            TemplateRegistry::load(&bad_element),
            Err(TemplateLoadError::UnknownElement { .. })
        ));

        let bad_bond = dir.path().join("bond.toml");
        std::fs::write(
            &bad_bond,
            r#"
[HH]
atoms = [
    { symbol = "H", dx = -10.0, dy = 0.0 },
    { symbol = "H", dx = 10.0, dy = 0.0 },
]
bonds = [[0, 5]]
"#,
        )
        .unwrap();
        assert!(matches!(
            TemplateRegistry::load(&bad_bond),
            Err(TemplateLoadError::InvalidBond { .. })
        ));
    }

    #[test]
    fn extend_from_overwrites_same_named_entries() {
        let mut registry = TemplateRegistry::builtin();
        let mut extra = HashMap::new();
        extra.insert(
            "OH".to_string(),
            template(&[("O", 0.0, 0.0, -1)], &[]),
        );
        registry.extend_from(TemplateRegistry { registry: extra });
        assert_eq!(registry.get("OH").unwrap().atoms.len(), 1);
    }
}
