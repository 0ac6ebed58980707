//! Terminal output for the CLI
//!
//! Formatting of results, errors and history, plus Unicode-aware text
//! helpers.

pub mod formatter;
pub mod text_utils;

pub use text_utils::terminal_width;
