//! Heartflow Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every Heartflow crate:
//! - Landmark frames as produced by an external body/hand tracker
//! - Canvas geometry (display-space points)
//! - Regions (the logical source of a traveler)
//! - Frame timestamps and the frame clock
//! - The latest-frame slot trackers publish into
//! - JSON-lines landmark recordings
//! - Simulation configuration and error types

pub mod config;
pub mod error;
pub mod feed;
pub mod geometry;
pub mod landmark;
pub mod recording;
pub mod region;
pub mod time;

pub use config::*;
pub use error::*;
pub use feed::*;
pub use geometry::*;
pub use landmark::*;
pub use recording::*;
pub use region::*;
pub use time::*;
