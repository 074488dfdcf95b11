//! mapstack - Map Editor State Library
//!
//! Layer z-ordering and observable editor state for a map-based route
//! editor, with a terminal inspector built on top.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
