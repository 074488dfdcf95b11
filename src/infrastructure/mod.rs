//! Infrastructure layer providing external service integrations.
//!
//! This module contains the in-memory map, file persistence, asset
//! fetching and command line configuration.

pub mod assets;
pub mod config;
pub mod map;
pub mod persistence;

pub use assets::*;
pub use config::*;
pub use map::*;
pub use persistence::*;
