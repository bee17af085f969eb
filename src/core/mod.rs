//! Core types, errors and ambient utilities

pub mod types;
pub mod error;
pub mod logging;
pub mod lifecycle;

pub use types::*;
pub use error::Error;
pub use lifecycle::Component;
