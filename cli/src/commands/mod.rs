//! CLI command implementations

pub mod history;
pub mod interactive;
pub mod search;
pub mod settings;
pub mod token;

pub use history::{history_command, HistoryAction};
pub use interactive::interactive_command;
pub use search::search_command;
pub use settings::settings_command;
pub use token::{token_command, TokenAction};
