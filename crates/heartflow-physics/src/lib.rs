//! Heartflow Physics - the world travelers live in
//!
//! The simulation only ever talks to a physics engine through the
//! [`PhysicsWorld`] trait: create a circle, push it, set its velocity,
//! rescale it, read where it is, remove it. [`PointWorld`] is a small
//! integrator implementing that contract. It models drag and gravity,
//! optionally inside canvas walls. Bodies never collide with each other.

pub mod error;
pub mod point;
pub mod world;

pub use error::*;
pub use point::*;
pub use world::*;
