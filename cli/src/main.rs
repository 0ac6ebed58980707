//! # ghsearch CLI
//!
//! Command-line interface for ghsearch - search code on GitHub from the
//! terminal.
//!
//! ## Usage
//!
//! - `ghsearch` - Start interactive mode
//! - `ghsearch "query"` - Run a single search
//! - `ghsearch token set <TOKEN>` - Save a GitHub token
//! - `ghsearch history` - Show recent searches
//! - `ghsearch settings` - Show or change saved settings

use anyhow::Result;
use clap::{Parser, Subcommand};
use ghsearch_core::storage::Theme;
use std::path::PathBuf;

mod commands;
mod config;
mod context;
mod output;

use commands::{
    history_command, interactive_command, search_command, settings_command, token_command,
    HistoryAction, TokenAction,
};
use crate::config::{resolve_store_path, CliConfigLoader};

/// ghsearch - GitHub code search from the terminal
#[derive(Parser)]
#[command(name = "ghsearch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search code on GitHub from the terminal")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub token override
    #[arg(long)]
    token: Option<String>,

    /// API base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Results per page (1-100)
    #[arg(long)]
    per_page: Option<u32>,

    /// Debounce delay in milliseconds (interactive mode)
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Hide non-programming files such as docs, images and lockfiles
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    code_only: Option<bool>,

    /// Where the token, settings and history are saved
    #[arg(long, env = "GHSEARCH_STORE")]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Number of pages to fetch (for single search mode)
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Print results as JSON (for single search mode)
    #[arg(long)]
    json: bool,

    /// The query to search for (if provided, runs a single search)
    query: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the GitHub token
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },

    /// Show or edit the search history
    History {
        /// Show the most frequent searches instead
        #[arg(long)]
        popular: bool,

        /// Delete the whole history
        #[arg(long, conflicts_with_all = ["popular", "remove"])]
        clear: bool,

        /// Delete one query from the history
        #[arg(long, value_name = "QUERY", conflicts_with = "popular")]
        remove: Option<String>,
    },

    /// Show or change saved settings
    Settings {
        /// Hide non-programming files by default
        #[arg(long, value_name = "BOOL")]
        exclude_non_programming: Option<bool>,

        /// Colour scheme: light, dark or system
        #[arg(long)]
        theme: Option<Theme>,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Validate and save a token
    Set { token: String },
    /// Show the saved token, masked
    Show,
    /// Forget the saved token
    Clear,
    /// Validate the saved token again
    Refresh,
}

impl From<TokenCommand> for TokenAction {
    fn from(command: TokenCommand) -> Self {
        match command {
            TokenCommand::Set { token } => TokenAction::Set(token),
            TokenCommand::Show => TokenAction::Show,
            TokenCommand::Clear => TokenAction::Clear,
            TokenCommand::Refresh => TokenAction::Refresh,
        }
    }
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(token) = &cli.token {
        loader = loader.with_token_override(token.clone());
    }

    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }

    if let Some(per_page) = cli.per_page {
        loader = loader.with_per_page_override(per_page);
    }

    if let Some(debounce_ms) = cli.debounce_ms {
        loader = loader.with_debounce_override(debounce_ms);
    }

    if let Some(code_only) = cli.code_only {
        loader = loader.with_exclude_override(code_only);
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for results
    let filter = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    // Build configuration loader
    let config_loader = build_config_loader(&cli);
    let store_path = resolve_store_path(cli.store.as_deref());

    match (cli.query, cli.command) {
        // If a query is provided, run a single search
        (Some(query), None) => {
            search_command(query, config_loader, &store_path, cli.pages, cli.json).await
        }
        // If a query is provided with a subcommand, that's an error
        (Some(_), Some(_)) => {
            tracing::error!("Error: Cannot specify both a query and a subcommand");
            std::process::exit(1);
        }
        // Handle subcommands
        (None, Some(Commands::Token { action })) => {
            token_command(action.into(), config_loader, &store_path).await
        }
        (
            None,
            Some(Commands::History {
                popular,
                clear,
                remove,
            }),
        ) => {
            let action = match (popular, clear, remove) {
                (_, true, _) => HistoryAction::Clear,
                (_, _, Some(query)) => HistoryAction::Remove(query),
                (true, _, _) => HistoryAction::Popular,
                _ => HistoryAction::List,
            };
            history_command(action, config_loader, &store_path).await
        }
        (
            None,
            Some(Commands::Settings {
                exclude_non_programming,
                theme,
            }),
        ) => settings_command(exclude_non_programming, theme, config_loader, &store_path).await,
        // Default to interactive mode
        (None, None) => interactive_command(config_loader, &store_path).await,
    }
}
