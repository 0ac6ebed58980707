//! Search history command

use crate::config::CliConfigLoader;
use crate::context::AppContext;
use crate::output::formatter::{format_history, format_popular, success};
use anyhow::Result;
use std::path::Path;

/// What to do with the search history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    List,
    Popular,
    Clear,
    Remove(String),
}

/// List or edit the recorded searches
pub async fn history_command(
    action: HistoryAction,
    config_loader: CliConfigLoader,
    store_path: &Path,
) -> Result<()> {
    let mut context = AppContext::load(&config_loader, store_path).await?;

    match action {
        HistoryAction::List => {
            println!("🕘 Recent searches\n");
            for line in format_history(&context.history.entries()) {
                println!("{}", line);
            }
        }
        HistoryAction::Popular => {
            for line in format_popular(&context.history.popular_queries()) {
                println!("{}", line);
            }
        }
        HistoryAction::Clear => {
            context.history.clear();
            context.persist().await?;
            println!("{}", success("Search history cleared"));
        }
        HistoryAction::Remove(query) => {
            if context.history.remove(&query) {
                context.persist().await?;
                println!("{}", success(&format!("Removed \"{}\"", query)));
            } else {
                println!("❓ \"{}\" is not in the history", query);
            }
        }
    }

    Ok(())
}
