//! # chembox Core Library
//!
//! A particle-based 2D chemistry sandbox: atoms move under diffusion and
//! repulsion forces, form and break chemical bonds according to valence rules,
//! merge into molecule graphs, and disassemble once an instability timeout elapses.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict two-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains the owned scene graph (`Scene`, `Atom`,
//!   `Molecule`, `Bond`), the static element table, and the chemical rule data
//!   (bonding rules, composition tables, group templates). Everything here is
//!   either plain data or structural bookkeeping; nothing in this layer advances time.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer advances the sandbox tick
//!   by tick. The physics stepper accumulates forces, integrates motion, and maintains
//!   bonds by distance; the stability monitor classifies molecules against the
//!   composition tables and disassembles the ones that stay unstable too long.
//!   [`engine::simulation::Simulation`] ties both into a single per-frame `update`
//!   call and is the entry point a rendering/input shell consumes.
//!
//! The simulation is single-threaded and frame-driven: one blocking `update(dt)`
//! per rendered frame, deterministic for a fixed seed and call sequence.

pub mod core;
pub mod engine;
