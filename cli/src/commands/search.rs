//! One-shot search command

use crate::config::CliConfigLoader;
use crate::context::AppContext;
use crate::output::formatter::format_snapshot;
use crate::output::terminal_width;
use anyhow::{Context, Result};
use ghsearch_core::SearchSnapshot;
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Run a single query, print the results and exit
pub async fn search_command(
    query: String,
    config_loader: CliConfigLoader,
    store_path: &Path,
    pages: u32,
    json: bool,
) -> Result<()> {
    debug!("Searching for: {}", query);

    let mut context = AppContext::load(&config_loader, store_path).await?;

    let trimmed = query.trim();
    if trimmed.chars().count() < context.config.min_query_length {
        println!(
            "⚠️  Queries need at least {} characters",
            context.config.min_query_length
        );
        return Ok(());
    }

    // Nothing is typed ahead in one-shot mode, so skip the debounce
    let orchestrator = context.orchestrator(Some(Duration::ZERO));
    let mut rx = orchestrator.subscribe();

    orchestrator.search_code(trimmed);
    let mut snapshot = wait_until_settled(&mut rx).await?;

    let mut loaded = 1;
    while loaded < pages && snapshot.has_more && snapshot.error.is_none() {
        if !orchestrator.load_more() {
            break;
        }
        snapshot = wait_until_settled(&mut rx).await?;
        loaded += 1;
    }
    debug!("Loaded {} page(s), {} results", loaded, snapshot.results.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&json_output(&snapshot))?);
    } else {
        for line in format_snapshot(&snapshot, 0, terminal_width()) {
            println!("{}", line);
        }
        if snapshot.has_more && snapshot.error.is_none() {
            println!("💡 Use --pages to load more results");
        }
    }

    context.persist().await?;

    if snapshot.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

/// Wait for the orchestrator to finish the current debounce and fetch
async fn wait_until_settled(rx: &mut watch::Receiver<SearchSnapshot>) -> Result<SearchSnapshot> {
    let snapshot = rx
        .wait_for(SearchSnapshot::is_settled)
        .await
        .context("Search stopped unexpectedly")?;
    Ok(snapshot.clone())
}

fn json_output(snapshot: &SearchSnapshot) -> serde_json::Value {
    serde_json::json!({
        "query": snapshot.query,
        "total_count": snapshot.total_results,
        "filtered_out_count": snapshot.filtered_out_count,
        "has_more": snapshot.has_more,
        "error": snapshot.error.as_ref().map(|e| e.message.clone()),
        "items": snapshot.results.as_slice(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghsearch_core::{SearchError, SearchFailure};

    #[test]
    fn test_json_output_shape() {
        let snapshot = SearchSnapshot {
            query: "tokio".to_string(),
            total_results: 7,
            error: Some(SearchFailure::from(SearchError::InvalidToken)),
            ..Default::default()
        };

        let value = json_output(&snapshot);
        assert_eq!(value["query"], "tokio");
        assert_eq!(value["total_count"], 7);
        assert_eq!(value["items"], serde_json::json!([]));
        assert!(value["error"].as_str().unwrap().contains("Invalid GitHub token"));
    }
}
