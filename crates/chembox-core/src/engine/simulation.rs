use super::config::{ChargeModel, SimulationConfig};
use super::{physics, stability};
use crate::core::chemistry::element::{self, ElementSpec};
use crate::core::chemistry::templates::TemplateRegistry;
use crate::core::models::ids::{AtomId, MoleculeId};
use crate::core::models::scene::Scene;
use crate::core::models::snapshot::{AtomView, BondView, MoleculeView, SceneSnapshot};
use nalgebra::{Point2, Vector2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// The sandbox session a rendering/input shell drives.
///
/// Owns the scene, the configuration, the RNG, and the simulation clock. The
/// shell forwards pointer/key events into the spawn/delete/bond/fix entry
/// points, calls [`Simulation::update`] once per frame, and renders from
/// [`Simulation::snapshot`]. Externally triggered mutations must happen
/// strictly between `update` calls, never during one; single-threaded use
/// makes that the natural order.
///
/// With a fixed seed, an identical sequence of calls reproduces the exact
/// trajectory.
#[derive(Debug)]
pub struct Simulation {
    scene: Scene,
    config: SimulationConfig,
    templates: TemplateRegistry,
    rng: StdRng,
    time: f64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_templates(config, TemplateRegistry::builtin())
    }

    pub fn with_templates(config: SimulationConfig, templates: TemplateRegistry) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            scene: Scene::new(),
            config,
            templates,
            rng,
            time: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[cfg(test)]
    pub(crate) fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Simulation-clock seconds elapsed across all `update` calls.
    pub fn time(&self) -> f64 {
        self.time
    }

    fn default_charge(&self, spec: &ElementSpec) -> i8 {
        match self.config.charge_model {
            ChargeModel::Neutral => 0,
            ChargeModel::Formal => spec.formal_charge,
        }
    }

    /// Spawns one atom as a molecule of one. Unknown symbols yield `None` and
    /// change nothing.
    pub fn spawn_atom(&mut self, symbol: &str, position: Point2<f64>) -> Option<AtomId> {
        let spec = element::lookup(symbol)?;
        let charge = self.default_charge(spec);
        self.scene.spawn_atom(symbol, position, charge)
    }

    /// Spawns one atom with an explicit formal charge, overriding the charge model.
    pub fn spawn_atom_charged(
        &mut self,
        symbol: &str,
        position: Point2<f64>,
        charge: i8,
    ) -> Option<AtomId> {
        self.scene.spawn_atom(symbol, position, charge)
    }

    /// Instantiates a named group template around `position`: its atoms at
    /// their offsets, its authored bonds wired directly.
    ///
    /// Returns the molecule containing the template's first atom, or `None`
    /// for an unknown or empty template.
    pub fn spawn_group(&mut self, name: &str, position: Point2<f64>) -> Option<MoleculeId> {
        let template = self.templates.get(name)?.clone();
        if template.atoms.is_empty() {
            return None;
        }
        // Reject before mutating so a bad template cannot half-spawn.
        for atom in &template.atoms {
            element::lookup(&atom.symbol)?;
        }

        let mut spawned = Vec::with_capacity(template.atoms.len());
        for atom in &template.atoms {
            let spec = element::lookup(&atom.symbol)?;
            let charge = atom.charge.unwrap_or_else(|| self.default_charge(spec));
            let atom_id = self.scene.spawn_atom(
                &atom.symbol,
                position + Vector2::new(atom.dx, atom.dy),
                charge,
            )?;
            spawned.push(atom_id);
        }
        for &(i, j) in &template.bonds {
            if let (Some(&a), Some(&b)) = (spawned.get(i), spawned.get(j)) {
                self.scene.form_bond(a, b);
            }
        }
        self.scene.molecule_of(spawned[0])
    }

    /// Deletes an atom, severing its bonds and splitting its molecule as needed.
    pub fn delete_atom(&mut self, atom_id: AtomId) -> bool {
        self.scene.delete_atom(atom_id).is_some()
    }

    /// Manual collaborator-initiated bonding. Returns whether a bond was
    /// created or upgraded; a rejected request changes nothing.
    pub fn request_bond(&mut self, a: AtomId, b: AtomId) -> bool {
        self.scene.make_bond(&self.config.bonding, a, b)
    }

    pub fn set_fixed(&mut self, atom_id: AtomId, fixed: bool) {
        self.scene.set_fixed(atom_id, fixed);
    }

    /// Repositions an atom under external control (dragging) and zeroes its
    /// velocity so it does not fly off on release.
    pub fn move_atom(&mut self, atom_id: AtomId, position: Point2<f64>) {
        if let Some(atom) = self.scene.atom_mut(atom_id) {
            atom.position = position;
            atom.velocity = Vector2::zeros();
        }
    }

    /// Advances the whole scene by one tick: physics stepper (forces,
    /// integration, bond maintenance, splits), then stability monitor
    /// (classification, timers, disassembly). Exactly once per frame.
    pub fn update(&mut self, dt: f64) {
        self.time += dt;
        physics::step(
            &mut self.scene,
            &self.config.physics,
            &self.config.bonding,
            &mut self.rng,
            dt,
        );
        stability::run(
            &mut self.scene,
            &self.config.compositions,
            &self.config.stability,
            self.time,
            &mut self.rng,
        );
    }

    /// Removes everything from the scene; the clock keeps running.
    pub fn clear(&mut self) {
        self.scene.clear();
    }

    /// Read-only view for rendering, valid until the next `update` call.
    pub fn snapshot(&self) -> SceneSnapshot {
        let scene = &self.scene;
        let mut bonds_by_molecule: HashMap<MoleculeId, Vec<BondView>> = HashMap::new();
        for bond in scene.bonds() {
            if let Some(molecule_id) = scene.molecule_of(bond.atom1_id) {
                bonds_by_molecule
                    .entry(molecule_id)
                    .or_default()
                    .push(BondView {
                        atom1_id: bond.atom1_id,
                        atom2_id: bond.atom2_id,
                        multiplicity: bond.order.multiplicity(),
                    });
            }
        }

        let mut molecules = Vec::with_capacity(scene.molecule_count());
        for (molecule_id, molecule) in scene.molecules_iter() {
            let atoms: Vec<AtomView> = molecule
                .atoms
                .iter()
                .filter_map(|&atom_id| {
                    scene.atom(atom_id).map(|atom| AtomView {
                        id: atom_id,
                        symbol: atom.symbol(),
                        position: atom.position,
                        charge: atom.charge,
                        free_valence: scene.free_valence(atom_id),
                        color: atom.element.color,
                        radius: atom.radius(),
                    })
                })
                .collect();
            molecules.push(MoleculeView {
                id: molecule_id,
                formula: scene.molecule_formula(molecule_id),
                is_unstable: stability::molecule_is_unstable(
                    scene,
                    &self.config.compositions,
                    molecule_id,
                ),
                center: scene.molecule_center(molecule_id),
                atoms,
                bonds: bonds_by_molecule.remove(&molecule_id).unwrap_or_default(),
            });
        }
        SceneSnapshot {
            time: self.time,
            molecules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{PhysicsParams, StabilityParams};

    fn seeded(mut config: SimulationConfig, seed: u64) -> Simulation {
        config.seed = Some(seed);
        Simulation::new(config)
    }

    /// Physics with nothing moving on its own: no jitter, no auto-bonding,
    /// no springs. Manual wiring plus stability only.
    fn inert_physics() -> PhysicsParams {
        PhysicsParams {
            diffuse_strength: 0.0,
            bond_distance: 0.0,
            bond_spring_k: 0.0,
            ..PhysicsParams::baseline()
        }
    }

    #[test]
    fn water_forms_from_proximate_atoms() {
        let mut sim = seeded(SimulationConfig::default(), 42);
        let o = sim.spawn_atom("O", Point2::new(470.0, 360.0)).unwrap();
        let h1 = sim.spawn_atom("H", Point2::new(430.0, 360.0)).unwrap();
        let h2 = sim.spawn_atom("H", Point2::new(510.0, 360.0)).unwrap();

        for _ in 0..3 {
            sim.update(1.0 / 60.0);
        }

        assert_eq!(sim.scene().molecule_count(), 1);
        let molecule_id = sim.scene().molecule_of(o).unwrap();
        assert_eq!(sim.scene().molecule_formula(molecule_id), "H2O");
        assert_eq!(sim.scene().bonds().len(), 2);
        assert!(sim.scene().bond_order_between(o, h1).is_some());
        assert!(sim.scene().bond_order_between(o, h2).is_some());
        assert!(sim.scene().bond_order_between(h1, h2).is_none());

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.molecules.len(), 1);
        assert!(!snapshot.molecules[0].is_unstable);
        sim.scene_mut().check_invariants().unwrap();
    }

    #[test]
    fn unstable_composition_decays_into_singletons() {
        let config = SimulationConfig {
            physics: inert_physics(),
            stability: StabilityParams {
                unstable_lifetime: 3.0,
                ..StabilityParams::default()
            },
            ..SimulationConfig::default()
        };
        let mut sim = seeded(config, 5);
        let na = sim.spawn_atom("Na", Point2::new(100.0, 100.0)).unwrap();
        let o = sim.spawn_atom("O", Point2::new(140.0, 100.0)).unwrap();
        assert!(sim.request_bond(na, o));
        let molecule_id = sim.scene().molecule_of(na).unwrap();

        sim.update(1.0);
        assert_eq!(
            sim.scene().molecule(molecule_id).unwrap().unstable_since,
            Some(1.0),
            "timer starts on the first unstable tick"
        );

        sim.update(1.0);
        sim.update(1.0);
        assert_eq!(sim.scene().molecule_count(), 1, "still within the lifetime");

        sim.update(1.0);
        assert!(sim.scene().bonds().is_empty());
        assert_eq!(sim.scene().molecule_count(), 2);
        assert_ne!(sim.scene().molecule_of(na), sim.scene().molecule_of(o));
        sim.scene_mut().check_invariants().unwrap();
    }

    #[test]
    fn trajectories_are_deterministic_for_a_fixed_seed() {
        let build = || {
            let mut sim = seeded(SimulationConfig::default(), 1234);
            sim.spawn_atom("O", Point2::new(400.0, 300.0)).unwrap();
            sim.spawn_atom("H", Point2::new(430.0, 300.0)).unwrap();
            sim.spawn_atom("Na", Point2::new(600.0, 400.0)).unwrap();
            sim.spawn_group("H2O", Point2::new(200.0, 200.0)).unwrap();
            for _ in 0..50 {
                sim.update(1.0 / 60.0);
            }
            sim
        };

        let a = build();
        let b = build();
        let positions = |sim: &Simulation| -> Vec<(String, f64, f64)> {
            let mut rows: Vec<_> = sim
                .scene()
                .atoms_iter()
                .map(|(_, atom)| (atom.symbol().to_string(), atom.position.x, atom.position.y))
                .collect();
            rows.sort_by(|x, y| x.partial_cmp(y).unwrap());
            rows
        };
        assert_eq!(positions(&a), positions(&b));
        assert_eq!(a.scene().bonds().len(), b.scene().bonds().len());
    }

    #[test]
    fn spawn_group_instantiates_the_template_as_one_molecule() {
        let mut sim = seeded(SimulationConfig::default(), 1);
        let molecule_id = sim.spawn_group("H2O", Point2::new(300.0, 300.0)).unwrap();

        let molecule = sim.scene().molecule(molecule_id).unwrap();
        assert_eq!(molecule.len(), 3);
        assert_eq!(sim.scene().molecule_formula(molecule_id), "H2O");
        assert_eq!(sim.scene().bonds().len(), 2);
        assert_eq!(sim.scene().molecule_count(), 1);

        assert!(sim.spawn_group("NoSuchGroup", Point2::origin()).is_none());
        sim.scene_mut().check_invariants().unwrap();
    }

    #[test]
    fn template_charges_override_the_charge_model() {
        let mut sim = seeded(SimulationConfig::default(), 1);
        let molecule_id = sim.spawn_group("NaCl", Point2::new(300.0, 300.0)).unwrap();
        let molecule = sim.scene().molecule(molecule_id).unwrap().clone();

        let charges: Vec<i8> = molecule
            .atoms
            .iter()
            .map(|&id| sim.scene().atom(id).unwrap().charge)
            .collect();
        // Explicit template charges apply even under the neutral model.
        assert_eq!(charges, vec![1, -1]);
    }

    #[test]
    fn charge_model_controls_spawn_defaults() {
        let mut neutral = seeded(SimulationConfig::default(), 1);
        let na = neutral.spawn_atom("Na", Point2::origin()).unwrap();
        assert_eq!(neutral.scene().atom(na).unwrap().charge, 0);

        let mut formal = seeded(SimulationConfig::charged(), 1);
        let na = formal.spawn_atom("Na", Point2::origin()).unwrap();
        let cl = formal.spawn_atom("Cl", Point2::origin()).unwrap();
        assert_eq!(formal.scene().atom(na).unwrap().charge, 1);
        assert_eq!(formal.scene().atom(cl).unwrap().charge, -1);

        let override_ = formal
            .spawn_atom_charged("Na", Point2::origin(), 0)
            .unwrap();
        assert_eq!(formal.scene().atom(override_).unwrap().charge, 0);
    }

    #[test]
    fn unknown_spawn_requests_are_noops() {
        let mut sim = seeded(SimulationConfig::default(), 1);
        assert!(sim.spawn_atom("Zz", Point2::origin()).is_none());
        assert_eq!(sim.scene().atom_count(), 0);
        assert_eq!(sim.scene().molecule_count(), 0);
    }

    #[test]
    fn rejected_bond_requests_change_nothing() {
        let mut sim = seeded(SimulationConfig::default(), 1);
        let na1 = sim.spawn_atom("Na", Point2::new(100.0, 100.0)).unwrap();
        let na2 = sim.spawn_atom("Na", Point2::new(110.0, 100.0)).unwrap();

        assert!(!sim.request_bond(na1, na2));
        assert!(!sim.request_bond(na1, na1));
        assert!(sim.scene().bonds().is_empty());
        assert_eq!(sim.scene().molecule_count(), 2);
    }

    #[test]
    fn fixed_atoms_hold_still_while_dragged() {
        let mut sim = seeded(SimulationConfig::default(), 9);
        let o = sim.spawn_atom("O", Point2::new(400.0, 300.0)).unwrap();
        sim.set_fixed(o, true);

        for _ in 0..20 {
            sim.update(1.0 / 60.0);
        }
        assert_eq!(sim.scene().atom(o).unwrap().position, Point2::new(400.0, 300.0));

        sim.move_atom(o, Point2::new(250.0, 250.0));
        assert_eq!(sim.scene().atom(o).unwrap().position, Point2::new(250.0, 250.0));
        assert_eq!(sim.scene().atom(o).unwrap().velocity, Vector2::zeros());
        sim.set_fixed(o, false);
    }

    #[test]
    fn snapshot_reports_bonds_charges_and_free_valence() {
        let mut sim = seeded(SimulationConfig::charged(), 3);
        sim.spawn_group("NaCl", Point2::new(300.0, 300.0)).unwrap();

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.molecules.len(), 1);
        let view = &snapshot.molecules[0];
        assert_eq!(view.formula, "ClNa");
        assert_eq!(view.bonds.len(), 1);
        assert_eq!(view.bonds[0].multiplicity, 1);
        assert_eq!(view.atoms.len(), 2);
        for atom in &view.atoms {
            assert_eq!(atom.free_valence, 0);
            assert_ne!(atom.charge, 0);
        }
        // Net charge balances, so the charge-aware rules call it stable.
        assert!(!view.is_unstable);
    }

    #[test]
    fn invariants_hold_through_a_busy_run() {
        let mut sim = seeded(SimulationConfig::default(), 77);
        let spawns = [
            ("O", 430.0, 340.0),
            ("H", 460.0, 360.0),
            ("H", 400.0, 360.0),
            ("Na", 500.0, 300.0),
            ("Cl", 530.0, 320.0),
            ("Ca", 350.0, 300.0),
            ("O", 380.0, 280.0),
            ("H", 410.0, 300.0),
        ];
        for (symbol, x, y) in spawns {
            sim.spawn_atom(symbol, Point2::new(x, y)).unwrap();
        }

        for tick in 0..200 {
            sim.update(1.0 / 60.0);
            if tick % 20 == 0 {
                sim.scene_mut().check_invariants().unwrap();
            }
        }
        sim.scene_mut().check_invariants().unwrap();
        assert_eq!(sim.scene().atom_count(), 8, "atoms never expire on their own");
    }

    #[test]
    fn clear_resets_the_scene_but_not_the_clock() {
        let mut sim = seeded(SimulationConfig::default(), 2);
        sim.spawn_group("CO2", Point2::new(300.0, 300.0)).unwrap();
        sim.update(1.0);
        sim.clear();

        assert_eq!(sim.scene().atom_count(), 0);
        assert_eq!(sim.scene().molecule_count(), 0);
        assert_eq!(sim.time(), 1.0);
    }
}
