//! Minimal configuration module for ghsearch core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{SearchConfig, DEFAULT_BASE_URL};
