//! Gemfall: a tile-grid digging puzzle in the boulder-and-diamond family.
//!
//! `domain` holds the pure rules, `sim` the mutable world and its
//! per-tick `step`. The terminal front end lives in the binary.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod sim;
