//! Application layer managing state and workflows.
//!
//! This module holds the observable editor state shared by views and the
//! terminal inspector's own UI state.

pub mod app;
pub mod observable;
pub mod state;

pub use app::*;
pub use observable::*;
pub use state::*;
