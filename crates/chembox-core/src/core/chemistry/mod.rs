//! # Chemistry Module
//!
//! The chemical knowledge of the sandbox, kept separate from the scene graph so
//! every rule is swappable data rather than hard-coded behavior.
//!
//! - [`element`] - Static element table: valence, display color, formal charge, radius
//! - [`bonding`] - Pure bond-rule engine deciding whether two atoms may bond
//! - [`compositions`] - Known-stable / known-unstable / impossible composition tables
//! - [`templates`] - Predefined atom clusters (OH, H2O, ...) spawnable in one call

pub mod bonding;
pub mod compositions;
pub mod element;
pub mod templates;
