//! Heartflow Test Harness - Synthetic input and scenario simulation
//!
//! This crate provides:
//! - A seeded synthetic performer producing landmark frames
//! - A frame-loop simulator driving the flow engine with a fixed-step clock
//! - End-to-end scenarios over the whole pipeline

pub mod performer;
pub mod scenarios;
pub mod simulator;

pub use performer::*;
pub use scenarios::*;
pub use simulator::*;
