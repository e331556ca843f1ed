//! Pairing, stepping, and run orchestration for the Tradenet simulation.
//!
//! This crate drives whole populations: it groups co-located agents,
//! matches them into trading pairs, advances the simulation clock, and
//! repeats independent runs under a shared behavior assignment.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `tradenet-config.yaml` into
//!   strongly-typed structs.
//! - [`pairing`] -- The per-node greedy cost-minimizing pairing engine.
//! - [`population`] -- Builds the starting population from the config.
//! - [`report`] -- Per-run agent reports and cross-run averages.
//! - [`runner`] -- Runs one simulation to completion, or a batch of runs.
//! - [`simulation`] -- The [`Simulation`] state and its step cycle.
//!
//! [`Simulation`]: simulation::Simulation

pub mod config;
pub mod pairing;
pub mod population;
pub mod report;
pub mod runner;
pub mod simulation;
