//! # Core Models Module
//!
//! Data structures for the sandbox scene graph.
//!
//! - [`atom`] - Individual atom: position, velocity, element, charge, bond bookkeeping
//! - [`bond`] - Symmetric bond relation between two atoms with a single/double order
//! - [`molecule`] - A connected component of atoms under the bond relation
//! - [`scene`] - The owning container and composition root for all of the above
//! - [`snapshot`] - Read-only per-frame view handed to a rendering shell
//! - [`ids`] - Unique identifier types for atoms and molecules

pub mod atom;
pub mod bond;
pub mod ids;
pub mod molecule;
pub mod scene;
pub mod snapshot;
