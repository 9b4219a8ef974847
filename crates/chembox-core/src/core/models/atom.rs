use super::ids::MoleculeId;
use crate::core::chemistry::element::ElementSpec;
use nalgebra::{Point2, Vector2};

/// A point particle in the sandbox.
///
/// Atoms never expire on their own: they are created by explicit spawn and
/// destroyed only by explicit deletion. Bond bookkeeping lives on the owning
/// [`Scene`](super::scene::Scene), which keeps the symmetric bond relation and
/// the adjacency cache consistent; an atom only carries its own kinematic state
/// and a back-reference to the molecule it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Current position on the canvas.
    pub position: Point2<f64>,
    /// Current velocity, integrated once per tick.
    pub velocity: Vector2<f64>,
    /// The element this atom is an instance of (shared, read-only).
    pub element: &'static ElementSpec,
    /// Formal charge. Zero under the neutral charge model; defaults to the
    /// element's formal charge under the charge-aware model unless overridden.
    pub charge: i8,
    /// When true the physics stepper must not move this atom (a collaborator
    /// is repositioning it manually).
    pub fixed: bool,
    /// The molecule this atom currently belongs to. Exactly one at all times.
    pub molecule_id: MoleculeId,
}

impl Atom {
    pub fn new(element: &'static ElementSpec, position: Point2<f64>, charge: i8) -> Self {
        Self {
            position,
            velocity: Vector2::zeros(),
            element,
            charge,
            fixed: false,
            molecule_id: MoleculeId::default(),
        }
    }

    /// Element symbol shorthand.
    pub fn symbol(&self) -> &'static str {
        self.element.symbol
    }

    /// Collision radius shorthand.
    pub fn radius(&self) -> f64 {
        self.element.radius
    }
}
