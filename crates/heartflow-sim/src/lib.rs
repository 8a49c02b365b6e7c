//! Heartflow Simulation - travelers flowing from the body to the heart
//!
//! This crate implements the per-frame simulation loop:
//! 1. Snapshot the latest landmark frame
//! 2. Rebuild waypoint paths (arms, face, legs) around the heart point
//! 3. Run the emission controllers (hands, mouth, eyes, legs)
//! 4. Update, render, and prune every live traveler
//! 5. Step the physics world

pub mod emission;
pub mod engine;
pub mod mapper;
pub mod paths;
pub mod pool;
pub mod render;
pub mod traveler;
pub mod velocity;

pub use emission::*;
pub use engine::*;
pub use mapper::*;
pub use paths::*;
pub use pool::*;
pub use render::*;
pub use traveler::*;
pub use velocity::*;
