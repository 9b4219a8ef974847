//! # Engine Module
//!
//! The stateful layer that advances the sandbox tick by tick.
//!
//! - [`config`] - Simulation parameters: physics constants, stability timing,
//!   rule data, charge model, RNG seed
//! - [`physics`] - The per-tick stepper: forces, clamped integration, distance-based
//!   bond maintenance, and the molecule split pass
//! - [`stability`] - The stability monitor: classification against the composition
//!   rules, instability timers, and disassembly
//! - [`simulation`] - The facade a rendering/input shell drives: spawn, delete,
//!   bond, fix, one `update(dt)` per frame, and a read-only snapshot

pub mod config;
pub mod physics;
pub mod simulation;
pub mod stability;
