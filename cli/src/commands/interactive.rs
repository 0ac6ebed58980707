//! Interactive mode command
//!
//! Every line read from stdin is submitted as the query typed so far, so
//! the debounce and superseded-request handling of the orchestrator apply
//! exactly as they would to keystrokes. Lines starting with `:` are
//! commands.

use crate::config::CliConfigLoader;
use crate::context::AppContext;
use crate::output::formatter::{
    apply_color, format_failure, format_history, format_popular, format_snapshot, success,
    AnsiColor,
};
use crate::output::terminal_width;
use anyhow::Result;
use ghsearch_core::github::ItemKey;
use ghsearch_core::{SearchPhase, SearchSnapshot};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// A parsed line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    Search(String),
    More,
    Clear,
    Cancel,
    History,
    Popular,
    /// `None` toggles the current setting
    Filter(Option<bool>),
    Help,
    Quit,
    Unknown(String),
}

impl InteractiveCommand {
    /// Parse one line; blank lines yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some(command) = line.strip_prefix(':') else {
            return Some(Self::Search(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let argument = parts.next();

        let parsed = match name {
            "more" | "m" => Self::More,
            "clear" => Self::Clear,
            "cancel" => Self::Cancel,
            "history" | "h" => Self::History,
            "popular" | "p" => Self::Popular,
            "filter" | "f" => match argument {
                None => Self::Filter(None),
                Some("on") => Self::Filter(Some(true)),
                Some("off") => Self::Filter(Some(false)),
                Some(_) => Self::Unknown(line.to_string()),
            },
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        };
        Some(parsed)
    }
}

/// Turns successive snapshots into the lines not printed yet
#[derive(Debug, Default)]
struct ResultRenderer {
    query: String,
    /// Last result printed for `query`
    last_key: Option<ItemKey>,
    /// Last summary or error line printed
    last_status: Option<String>,
    announced_fetch: bool,
}

impl ResultRenderer {
    /// Forget what was printed so the next snapshot is shown in full
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn render(&mut self, snapshot: &SearchSnapshot, width: usize) -> Vec<String> {
        if !snapshot.query.is_empty() && snapshot.query != self.query {
            self.query = snapshot.query.clone();
            self.last_key = None;
            self.last_status = None;
        }

        match snapshot.phase {
            SearchPhase::Debouncing => return Vec::new(),
            SearchPhase::Fetching => {
                if self.announced_fetch {
                    return Vec::new();
                }
                self.announced_fetch = true;
                let line = format!("⏳ Searching for \"{}\"...", snapshot.query);
                return vec![apply_color(&line, AnsiColor::Gray)];
            }
            SearchPhase::Idle | SearchPhase::Error => {}
        }
        self.announced_fetch = false;

        if let Some(failure) = &snapshot.error {
            let lines = format_failure(failure);
            let status = lines.first().cloned();
            if status == self.last_status {
                return Vec::new();
            }
            self.last_status = status;
            return lines;
        }

        if snapshot.query.is_empty() {
            self.reset();
            return Vec::new();
        }

        let from = self
            .last_key
            .as_ref()
            .and_then(|key| snapshot.results.iter().position(|item| &item.key() == key))
            .map_or(0, |position| position + 1);

        let lines = format_snapshot(snapshot, from, width);
        let status = lines.last().cloned();
        if from == snapshot.results.len() && status == self.last_status {
            return Vec::new();
        }

        self.last_key = snapshot.results.last().map(|item| item.key());
        self.last_status = status;
        lines
    }
}

fn print_help() {
    println!("🔎 Type a query to search GitHub code. Commands:");
    println!("   :more       load the next page");
    println!("   :filter     toggle hiding non-programming files (or :filter on|off)");
    println!("   :history    show recent searches");
    println!("   :popular    show popular searches");
    println!("   :cancel     stop the current search");
    println!("   :clear      clear the results");
    println!("   :quit       exit");
}

/// Start interactive mode
pub async fn interactive_command(config_loader: CliConfigLoader, store_path: &Path) -> Result<()> {
    let mut context = AppContext::load(&config_loader, store_path).await?;
    let orchestrator = context.orchestrator(None);
    let mut rx = orchestrator.subscribe();

    if context.token().is_none() {
        println!("💡 No GitHub token set. Run `ghsearch token set <TOKEN>` first.");
    }
    print_help();

    let mut renderer = ResultRenderer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                let Some(command) = InteractiveCommand::parse(&line) else {
                    continue;
                };

                match command {
                    InteractiveCommand::Search(query) => orchestrator.search_code(&query),
                    InteractiveCommand::More => {
                        if !orchestrator.load_more() {
                            let snapshot = orchestrator.snapshot();
                            if snapshot.is_settled() {
                                println!("💡 No more results to load");
                            } else {
                                println!("⏳ Still searching, try again shortly");
                            }
                        }
                    }
                    InteractiveCommand::Clear => {
                        orchestrator.clear();
                        renderer.reset();
                        println!("🧹 Results cleared");
                    }
                    InteractiveCommand::Cancel => {
                        orchestrator.cancel();
                        println!("🛑 Search cancelled");
                    }
                    InteractiveCommand::History => {
                        for line in format_history(&context.history.entries()) {
                            println!("{}", line);
                        }
                    }
                    InteractiveCommand::Popular => {
                        for line in format_popular(&context.history.popular_queries()) {
                            println!("{}", line);
                        }
                    }
                    InteractiveCommand::Filter(value) => {
                        let exclude = value.unwrap_or(!orchestrator.exclude_non_programming());
                        context.set_exclude_non_programming(exclude)?;
                        renderer.reset();
                        orchestrator.set_exclude_non_programming(exclude);
                        let state = if exclude { "hidden" } else { "shown" };
                        println!("{}", success(&format!("Non-programming files are now {}", state)));
                    }
                    InteractiveCommand::Help => print_help(),
                    InteractiveCommand::Quit => break,
                    InteractiveCommand::Unknown(input) => {
                        println!("❓ Unknown command: {} (type :help)", input);
                    }
                }
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                for line in renderer.render(&snapshot, terminal_width()) {
                    println!("{}", line);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    orchestrator.cancel();
    if let Err(e) = context.persist().await {
        warn!("Failed to save state: {}", e);
    }
    println!("👋 Goodbye!");
    Ok(())
}
