use super::config::PhysicsParams;
use crate::core::chemistry::bonding::BondingRules;
use crate::core::models::ids::AtomId;
use crate::core::models::scene::Scene;
use nalgebra::{Point2, Vector2};
use rand::Rng;
use tracing::debug;

/// Below this squared separation a pair contributes no directional force;
/// coincident centers must not turn into NaN.
const MIN_PAIR_DISTANCE_SQ: f64 = 1e-6;

/// Charge forces fall off as `1 / (distance + CHARGE_FALLOFF_OFFSET)`, which
/// keeps them finite at contact.
const CHARGE_FALLOFF_OFFSET: f64 = 10.0;

/// Advances every atom by one time increment and maintains the bond graph.
///
/// Order per tick: force accumulation and velocity integration, position
/// integration with wall clamping, distance-based bond maintenance over all
/// pairs, then one split pass recomputing molecule connectivity. Nothing here
/// can fail: atoms and bonds only ever reference live objects owned by the
/// scene, and degenerate geometry is guarded.
pub fn step<R: Rng>(
    scene: &mut Scene,
    params: &PhysicsParams,
    bonding: &BondingRules,
    rng: &mut R,
    dt: f64,
) {
    accumulate_and_integrate_velocities(scene, params, rng, dt);
    integrate_positions(scene, params);
    maintain_bonds(scene, params, bonding);
    split_molecules(scene);
}

struct Body {
    id: AtomId,
    position: Point2<f64>,
    radius: f64,
    charge: f64,
    fixed: bool,
}

fn accumulate_and_integrate_velocities<R: Rng>(
    scene: &mut Scene,
    params: &PhysicsParams,
    rng: &mut R,
    dt: f64,
) {
    let bodies: Vec<Body> = scene
        .atoms_iter()
        .map(|(id, atom)| Body {
            id,
            position: atom.position,
            radius: atom.radius(),
            charge: f64::from(atom.charge),
            fixed: atom.fixed,
        })
        .collect();

    for body in &bodies {
        if body.fixed {
            continue;
        }

        // Thermal jitter.
        let mut force = Vector2::new(
            rng.gen_range(-1.0..1.0) * params.diffuse_strength,
            rng.gen_range(-1.0..1.0) * params.diffuse_strength,
        );

        // Pairwise interactions with every other atom.
        for other in &bodies {
            if other.id == body.id {
                continue;
            }
            let delta = other.position - body.position;
            let distance_sq = delta.norm_squared();
            if distance_sq < MIN_PAIR_DISTANCE_SQ {
                continue;
            }
            let distance = distance_sq.sqrt();
            let direction = delta / distance;

            let charge_product = body.charge * other.charge;
            if charge_product < 0.0 {
                let strength =
                    params.attraction_factor * charge_product.abs() / (distance + CHARGE_FALLOFF_OFFSET);
                force += direction * strength;
            } else if charge_product > 0.0 {
                let strength =
                    params.repulsion_factor * charge_product / (distance + CHARGE_FALLOFF_OFFSET);
                force -= direction * strength;
            }

            let min_distance = body.radius + other.radius;
            if distance < min_distance {
                force -= direction * (min_distance - distance) * params.repulsion_strength;
            }
        }

        // Spring force toward each bonded partner; a double bond pulls twice.
        let preferred = params.preferred_bond_length();
        let neighbors = scene
            .bonded_neighbors(body.id)
            .map(|n| n.to_vec())
            .unwrap_or_default();
        for neighbor in neighbors {
            let Some(partner) = scene.atom(neighbor) else {
                continue;
            };
            let delta = partner.position - body.position;
            let distance = delta.norm();
            if distance < MIN_PAIR_DISTANCE_SQ.sqrt() {
                continue;
            }
            let multiplicity = scene
                .bond_order_between(body.id, neighbor)
                .map(|order| f64::from(order.multiplicity()))
                .unwrap_or(1.0);
            force +=
                (delta / distance) * params.bond_spring_k * (distance - preferred) * multiplicity;
        }

        if let Some(atom) = scene.atom_mut(body.id) {
            atom.velocity += force * dt;
            let speed = atom.velocity.norm();
            if speed > params.max_speed {
                atom.velocity *= params.max_speed / speed;
            }
        }
    }
}

fn integrate_positions(scene: &mut Scene, params: &PhysicsParams) {
    let bounds = params.bounds;
    for (_, atom) in scene.atoms_iter_mut() {
        if atom.fixed {
            continue;
        }
        atom.position += atom.velocity;
        atom.position.x = atom
            .position
            .x
            .clamp(bounds.margin, bounds.width - bounds.margin);
        atom.position.y = atom
            .position
            .y
            .clamp(bounds.margin, bounds.height - bounds.margin);
    }
}

/// Breaks bonds stretched past the break distance (one order level per tick)
/// and forms rule-approved bonds between close unbonded or upgradable pairs.
fn maintain_bonds(scene: &mut Scene, params: &PhysicsParams, bonding: &BondingRules) {
    let ids = scene.atom_ids();
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let (a, b) = (ids[i], ids[j]);
            let (Some(pos_a), Some(pos_b)) = (
                scene.atom(a).map(|atom| atom.position),
                scene.atom(b).map(|atom| atom.position),
            ) else {
                continue;
            };
            let distance = (pos_b - pos_a).norm();

            if scene.bond_order_between(a, b).is_some() && distance > params.bond_break_distance {
                scene.remove_bond(a, b);
                debug!(?a, ?b, distance, "bond broken by separation");
            } else if distance <= params.bond_distance && scene.make_bond(bonding, a, b) {
                debug!(?a, ?b, distance, "bond formed by proximity");
            }
        }
    }
}

fn split_molecules(scene: &mut Scene) {
    for molecule_id in scene.molecule_ids() {
        scene.split_disconnected(molecule_id);
    }
}
