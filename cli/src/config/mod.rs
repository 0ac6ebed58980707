//! Configuration discovery for the CLI

pub mod loader;

pub use loader::{resolve_store_path, CliConfigLoader};
