pub mod models;
pub mod zorder;
pub mod od;
pub mod errors;

pub use models::*;
pub use zorder::*;
pub use od::*;
pub use errors::*;
