//! Providers Module - External Services
//!
//! OpenAI chat completions and web page fetching.

pub mod openai;
pub mod web;

pub use openai::*;
pub use web::*;
