//! Models Module - Data Structures & Configuration
//!
//! Configuration, the error type and the records shared across layers.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
