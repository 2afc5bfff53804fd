pub mod error;
pub mod config;

#[cfg(feature = "validation")]
pub mod validation;

// Portal domain modules
pub mod assignment;
pub mod attendance;
pub mod class;
pub mod communication;
pub mod event;
pub mod family;
pub mod grade;
pub mod models;
pub mod stats;

pub use error::*;
pub use config::*;

pub use assignment::*;
pub use attendance::*;
pub use class::*;
pub use communication::*;
pub use event::*;
pub use family::*;
pub use grade::*;
pub use models::*;
pub use stats::*;
