use super::config::StabilityParams;
use crate::core::chemistry::compositions::CompositionRules;
use crate::core::models::ids::MoleculeId;
use crate::core::models::scene::Scene;
use nalgebra::Vector2;
use rand::Rng;
use tracing::{debug, info};

/// Classifies one molecule against the composition rules.
///
/// Check order matters and is part of the contract: a stable exact match
/// overrides every other heuristic, including over-bonding. Single-atom
/// molecules are always stable. The classification is pure: calling it twice
/// on the same state yields the same answer.
pub fn molecule_is_unstable(
    scene: &Scene,
    rules: &CompositionRules,
    molecule_id: MoleculeId,
) -> bool {
    let Some(molecule) = scene.molecule(molecule_id) else {
        return false;
    };
    if molecule.len() <= 1 {
        return false;
    }

    let composition = scene.composition(molecule_id);
    if rules.matches_stable(&composition) {
        return false;
    }
    if rules.matches_unstable(&composition) {
        return true;
    }
    if rules.matches_impossible(&composition) {
        return true;
    }

    let over_bonded = molecule.atoms.iter().any(|&atom_id| {
        scene
            .atom(atom_id)
            .is_some_and(|atom| scene.used_valence(atom_id) > u32::from(atom.element.valence))
    });
    if over_bonded {
        return true;
    }

    if rules.net_charge_rule && scene.net_charge(molecule_id) != 0 {
        return true;
    }

    rules.default_unstable
}

/// One stability pass: refresh every molecule's instability timer, then
/// disassemble the ones whose lifetime has elapsed.
///
/// `now` is the simulation clock. Disassembly is atomic within the tick and
/// always ends in a split, so a decayed molecule is observed only as its
/// singleton remnants.
pub fn run<R: Rng>(
    scene: &mut Scene,
    rules: &CompositionRules,
    params: &StabilityParams,
    now: f64,
    rng: &mut R,
) {
    for molecule_id in scene.molecule_ids() {
        let unstable = molecule_is_unstable(scene, rules, molecule_id);
        let Some(molecule) = scene.molecule_mut(molecule_id) else {
            continue;
        };
        if unstable {
            if molecule.unstable_since.is_none() {
                molecule.unstable_since = Some(now);
                debug!(?molecule_id, now, "molecule became unstable");
            }
        } else {
            molecule.unstable_since = None;
        }
    }

    for molecule_id in scene.molecule_ids() {
        let Some(molecule) = scene.molecule(molecule_id) else {
            continue;
        };
        let Some(since) = molecule.unstable_since else {
            continue;
        };
        if now - since >= params.unstable_lifetime {
            disassemble(scene, params, molecule_id, rng);
            scene.split_disconnected(molecule_id);
        }
    }
}

/// Tears a molecule apart: removes every bond symmetrically and pushes each
/// atom outward from the former center with a randomized impulse. The caller
/// runs the split that dissolves the now-bondless molecule into singletons.
pub fn disassemble<R: Rng>(
    scene: &mut Scene,
    params: &StabilityParams,
    molecule_id: MoleculeId,
    rng: &mut R,
) {
    let Some(molecule) = scene.molecule(molecule_id) else {
        return;
    };
    let formula = scene.molecule_formula(molecule_id);
    let center = scene.molecule_center(molecule_id);
    let atom_ids = molecule.atoms.clone();

    for &atom_id in &atom_ids {
        scene.sever_all_bonds(atom_id);
    }

    let spread = params.impulse_max - params.impulse_min;
    for &atom_id in &atom_ids {
        let magnitude = if spread > 0.0 {
            params.impulse_min + rng.gen_range(0.0..spread)
        } else {
            params.impulse_min
        };
        let Some(atom) = scene.atom_mut(atom_id) else {
            continue;
        };
        let offset = atom.position - center;
        let direction = if offset.norm() < 1e-6 {
            // An atom sitting exactly at the center still needs a direction.
            Vector2::x()
        } else {
            offset.normalize()
        };
        atom.velocity += direction * magnitude;
    }

    if let Some(molecule) = scene.molecule_mut(molecule_id) {
        molecule.unstable_since = None;
    }
    info!(?molecule_id, %formula, atoms = atom_ids.len(), "disassembled unstable molecule");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chemistry::bonding::BondingRules;
    use crate::core::models::ids::AtomId;
    use nalgebra::Point2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn spawn(scene: &mut Scene, symbol: &str, x: f64, y: f64, charge: i8) -> AtomId {
        scene.spawn_atom(symbol, Point2::new(x, y), charge).unwrap()
    }

    fn water(scene: &mut Scene) -> MoleculeId {
        let rules = BondingRules::baseline();
        let o = spawn(scene, "O", 100.0, 100.0, 0);
        let h1 = spawn(scene, "H", 140.0, 100.0, 0);
        let h2 = spawn(scene, "H", 60.0, 100.0, 0);
        assert!(scene.make_bond(&rules, o, h1));
        assert!(scene.make_bond(&rules, o, h2));
        scene.molecule_of(o).unwrap()
    }

    fn sodium_oxide_pair(scene: &mut Scene) -> (AtomId, AtomId, MoleculeId) {
        let rules = BondingRules::baseline();
        let na = spawn(scene, "Na", 100.0, 100.0, 0);
        let o = spawn(scene, "O", 140.0, 100.0, 0);
        assert!(scene.make_bond(&rules, na, o));
        (na, o, scene.molecule_of(na).unwrap())
    }

    mod classification {
        use super::*;

        #[test]
        fn singletons_are_always_stable() {
            let mut scene = Scene::new();
            let na = spawn(&mut scene, "Na", 0.0, 0.0, 1);
            let rules = CompositionRules::baseline();
            assert!(!molecule_is_unstable(
                &scene,
                &rules,
                scene.molecule_of(na).unwrap()
            ));
        }

        #[test]
        fn stable_table_match_is_stable() {
            let mut scene = Scene::new();
            let molecule_id = water(&mut scene);
            let rules = CompositionRules::baseline();
            assert!(!molecule_is_unstable(&scene, &rules, molecule_id));
        }

        #[test]
        fn unstable_table_match_is_unstable() {
            let mut scene = Scene::new();
            let (_, _, molecule_id) = sodium_oxide_pair(&mut scene);
            let rules = CompositionRules::baseline();
            assert!(molecule_is_unstable(&scene, &rules, molecule_id));
        }

        #[test]
        fn unknown_composition_follows_the_default_policy() {
            let mut scene = Scene::new();
            let rules_conservative = CompositionRules::baseline();
            let mut rules_lenient = CompositionRules::baseline();
            rules_lenient.default_unstable = false;

            // H-S is in neither table.
            let h = spawn(&mut scene, "H", 0.0, 0.0, 0);
            let s = spawn(&mut scene, "S", 10.0, 0.0, 0);
            assert!(scene.make_bond(&BondingRules::baseline(), h, s));
            let molecule_id = scene.molecule_of(h).unwrap();

            assert!(molecule_is_unstable(&scene, &rules_conservative, molecule_id));
            assert!(!molecule_is_unstable(&scene, &rules_lenient, molecule_id));
        }

        #[test]
        fn over_bonding_is_unstable_unless_composition_is_stable() {
            let mut scene = Scene::new();
            let rules = CompositionRules::baseline();
            // H-H via template-style wiring, then force a second (double) bond:
            // each hydrogen now uses 2 of its 1 valence slots.
            let h1 = spawn(&mut scene, "H", 0.0, 0.0, 0);
            let h2 = spawn(&mut scene, "H", 10.0, 0.0, 0);
            scene.form_bond(h1, h2);
            scene.form_bond(h1, h2);
            let molecule_id = scene.molecule_of(h1).unwrap();
            assert!(scene.used_valence(h1) > 1);

            // {H:2} is in the stable table, which overrides the violation.
            assert!(!molecule_is_unstable(&scene, &rules, molecule_id));

            // An H-S double bond is over-bonded for H and in no table.
            let mut lenient = CompositionRules::baseline();
            lenient.default_unstable = false;
            let h = spawn(&mut scene, "H", 50.0, 0.0, 0);
            let s = spawn(&mut scene, "S", 60.0, 0.0, 0);
            scene.form_bond(h, s);
            scene.form_bond(h, s);
            let hs_id = scene.molecule_of(h).unwrap();
            assert!(molecule_is_unstable(&scene, &lenient, hs_id));
        }

        #[test]
        fn net_charge_rule_flags_imbalance() {
            let mut scene = Scene::new();
            let rules = CompositionRules::charge_balance();
            let na = spawn(&mut scene, "Na", 0.0, 0.0, 1);
            let cl = spawn(&mut scene, "Cl", 20.0, 0.0, -1);
            scene.form_bond(na, cl);
            let molecule_id = scene.molecule_of(na).unwrap();

            // +1 and -1 balance out.
            assert!(!molecule_is_unstable(&scene, &rules, molecule_id));

            scene.atom_mut(cl).unwrap().charge = 0;
            assert!(molecule_is_unstable(&scene, &rules, molecule_id));
        }

        #[test]
        fn classification_is_idempotent() {
            let mut scene = Scene::new();
            let (_, _, molecule_id) = sodium_oxide_pair(&mut scene);
            let rules = CompositionRules::baseline();
            let first = molecule_is_unstable(&scene, &rules, molecule_id);
            let second = molecule_is_unstable(&scene, &rules, molecule_id);
            assert_eq!(first, second);
        }
    }

    mod timers_and_decay {
        use super::*;

        #[test]
        fn timer_is_set_on_first_unstable_tick_and_persists() {
            let mut scene = Scene::new();
            let (_, _, molecule_id) = sodium_oxide_pair(&mut scene);
            let rules = CompositionRules::baseline();
            let params = StabilityParams::default();
            let mut rng = rng();

            run(&mut scene, &rules, &params, 1.0, &mut rng);
            assert_eq!(scene.molecule(molecule_id).unwrap().unstable_since, Some(1.0));
            run(&mut scene, &rules, &params, 2.0, &mut rng);
            assert_eq!(scene.molecule(molecule_id).unwrap().unstable_since, Some(1.0));
        }

        #[test]
        fn timer_clears_when_the_molecule_turns_stable() {
            let mut scene = Scene::new();
            let (na, o, molecule_id) = sodium_oxide_pair(&mut scene);
            let rules = CompositionRules::baseline();
            let params = StabilityParams::default();
            let mut rng = rng();

            run(&mut scene, &rules, &params, 1.0, &mut rng);
            assert!(scene.molecule(molecule_id).unwrap().unstable_since.is_some());

            // A second sodium makes it Na2O, which is in the stable table.
            // Bond from the existing molecule's side so it stays the merge target.
            let rules_bonding = BondingRules::baseline();
            let na2 = spawn(&mut scene, "Na", 120.0, 100.0, 0);
            assert!(scene.make_bond(&rules_bonding, o, na2));
            assert_eq!(scene.molecule_of(na2), Some(molecule_id));
            let _ = na;

            run(&mut scene, &rules, &params, 2.0, &mut rng);
            assert_eq!(scene.molecule(molecule_id).unwrap().unstable_since, None);
        }

        #[test]
        fn lifetime_elapse_disassembles_into_singletons() {
            let mut scene = Scene::new();
            let (na, o, molecule_id) = sodium_oxide_pair(&mut scene);
            let rules = CompositionRules::baseline();
            let params = StabilityParams {
                unstable_lifetime: 3.0,
                ..StabilityParams::default()
            };
            let mut rng = rng();

            run(&mut scene, &rules, &params, 1.0, &mut rng);
            assert_eq!(scene.molecule(molecule_id).unwrap().unstable_since, Some(1.0));
            run(&mut scene, &rules, &params, 2.0, &mut rng);
            run(&mut scene, &rules, &params, 3.0, &mut rng);
            assert_eq!(scene.molecule_count(), 1, "not due yet");

            run(&mut scene, &rules, &params, 4.0, &mut rng);
            assert!(scene.bonds().is_empty());
            assert_eq!(scene.molecule_count(), 2);
            assert_ne!(scene.molecule_of(na), scene.molecule_of(o));
            scene.check_invariants().unwrap();
        }

        #[test]
        fn disassembly_pushes_atoms_outward_from_the_center() {
            let mut scene = Scene::new();
            let (na, o, molecule_id) = sodium_oxide_pair(&mut scene);
            let params = StabilityParams::default();
            let center = scene.molecule_center(molecule_id);
            let mut rng = rng();

            disassemble(&mut scene, &params, molecule_id, &mut rng);

            for atom_id in [na, o] {
                let atom = scene.atom(atom_id).unwrap();
                let outward = atom.position - center;
                let speed = atom.velocity.norm();
                assert!(speed >= params.impulse_min && speed < params.impulse_max);
                assert!(
                    atom.velocity.dot(&outward) > 0.0,
                    "impulse should point away from the center"
                );
            }
            assert!(scene.bonds().is_empty());
            assert_eq!(scene.molecule(molecule_id).unwrap().unstable_since, None);
        }

        #[test]
        fn disassembly_gives_centered_atoms_an_arbitrary_direction() {
            let mut scene = Scene::new();
            // Two coincident atoms: both sit exactly at the molecule center.
            let a = spawn(&mut scene, "H", 100.0, 100.0, 0);
            let b = spawn(&mut scene, "Cl", 100.0, 100.0, 0);
            scene.form_bond(a, b);
            let molecule_id = scene.molecule_of(a).unwrap();
            let mut rng = rng();

            disassemble(&mut scene, &StabilityParams::default(), molecule_id, &mut rng);
            for atom_id in [a, b] {
                let velocity = scene.atom(atom_id).unwrap().velocity;
                assert!(velocity.norm() > 0.0);
                assert!(velocity.x.is_finite() && velocity.y.is_finite());
            }
        }
    }
}
