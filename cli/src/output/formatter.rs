//! Formatting of search state for the terminal
//!
//! Every function here returns plain lines so callers decide where they go.

use super::text_utils::{truncate_to_width, wrap_text};
use chrono::{DateTime, Local};
use ghsearch_core::github::{MatchSpan, SearchResultItem};
use ghsearch_core::highlight::highlight_fragment;
use ghsearch_core::history::SearchHistoryItem;
use ghsearch_core::{SearchFailure, SearchSnapshot};

/// Number of text-match fragments shown per result
const MAX_FRAGMENTS: usize = 2;

/// Number of lines shown per fragment
const MAX_FRAGMENT_LINES: usize = 4;

/// ANSI color codes for terminal output
#[derive(Debug, Clone, Copy)]
pub enum AnsiColor {
    Gray,
    Green,
    Yellow,
    Red,
    Cyan,
    Bold,
}

/// Apply ANSI color to text
pub fn apply_color(text: &str, color: AnsiColor) -> String {
    match color {
        AnsiColor::Gray => format!("\x1b[90m{}\x1b[0m", text),
        AnsiColor::Green => format!("\x1b[32m{}\x1b[0m", text),
        AnsiColor::Yellow => format!("\x1b[33m{}\x1b[0m", text),
        AnsiColor::Red => format!("\x1b[31m{}\x1b[0m", text),
        AnsiColor::Cyan => format!("\x1b[36m{}\x1b[0m", text),
        AnsiColor::Bold => format!("\x1b[1m{}\x1b[0m", text),
    }
}

/// Render one line of a fragment with its matches highlighted
pub fn highlight_line(fragment: &str, matches: &[MatchSpan]) -> String {
    highlight_fragment(fragment, matches)
        .into_iter()
        .map(|segment| {
            if segment.highlighted {
                apply_color(&segment.text, AnsiColor::Yellow)
            } else {
                segment.text
            }
        })
        .collect()
}

/// Lines describing a single result, numbered from 1
pub fn format_item(number: usize, item: &SearchResultItem, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    let repository = item.repository_name().unwrap_or("unknown");
    lines.push(format!(
        "{:>3}. 📄 {} {}",
        number,
        apply_color(repository, AnsiColor::Cyan),
        apply_color(&truncate_to_width(&item.path, width), AnsiColor::Bold)
    ));
    lines.push(format!("     {}", apply_color(&item.html_url, AnsiColor::Gray)));

    if let Some(repo) = &item.repository {
        let mut details = format!("⭐ {}", repo.stargazers_count);
        if let Some(language) = &repo.language {
            details.push_str(&format!(" · {}", language));
        }
        lines.push(format!("     {}", details));

        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            for line in wrap_text(description, width.saturating_sub(5)) {
                lines.push(format!("     {}", apply_color(&line, AnsiColor::Gray)));
            }
        }
    }

    for text_match in item.text_matches.iter().flatten().take(MAX_FRAGMENTS) {
        let highlighted = highlight_line(&text_match.fragment, &text_match.matches);
        for line in highlighted.lines().take(MAX_FRAGMENT_LINES) {
            lines.push(format!("     │ {}", line));
        }
    }

    lines
}

/// Lines for an error, with a hint when the token needs attention
pub fn format_failure(failure: &SearchFailure) -> Vec<String> {
    let mut lines = vec![apply_color(&format!("❌ {}", failure.message), AnsiColor::Red)];
    if failure.suggests_settings {
        lines.push("💡 Set a token with `ghsearch token set <TOKEN>`".to_string());
    }
    lines
}

/// One-line summary of the current results
pub fn format_summary(snapshot: &SearchSnapshot) -> String {
    if snapshot.results.is_empty() {
        return format!("🔍 No results for \"{}\"", snapshot.query);
    }

    let mut summary = format!(
        "🔎 Showing {} of {} results for \"{}\"",
        snapshot.results.len(),
        snapshot.total_results,
        snapshot.query
    );
    if snapshot.filtered_out_count > 0 {
        summary.push_str(&format!(
            " ({} non-code files hidden)",
            snapshot.filtered_out_count
        ));
    }
    summary
}

/// Full rendering of a settled snapshot, starting at result `from`
pub fn format_snapshot(snapshot: &SearchSnapshot, from: usize, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for (index, item) in snapshot.results.iter().enumerate().skip(from) {
        lines.push(String::new());
        lines.extend(format_item(index + 1, item, width));
    }

    lines.push(String::new());
    if let Some(failure) = &snapshot.error {
        lines.extend(format_failure(failure));
    } else if !snapshot.query.is_empty() {
        lines.push(format_summary(snapshot));
    }

    lines
}

/// History entries, newest first
pub fn format_history(entries: &[SearchHistoryItem]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["📭 No search history yet".to_string()];
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let when = DateTime::from_timestamp_millis(entry.timestamp)
                .map(|time| {
                    time.with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                })
                .unwrap_or_default();
            format!(
                "{:>3}. {}  {}",
                index + 1,
                entry.query,
                apply_color(&when, AnsiColor::Gray)
            )
        })
        .collect()
}

/// Popular queries as a numbered list
pub fn format_popular(queries: &[String]) -> Vec<String> {
    if queries.is_empty() {
        return vec!["📭 No popular queries yet".to_string()];
    }

    let mut lines = vec!["🔥 Popular queries".to_string()];
    lines.extend(
        queries
            .iter()
            .enumerate()
            .map(|(index, query)| format!("{:>3}. {}", index + 1, query)),
    );
    lines
}

/// Success line in green
pub fn success(message: &str) -> String {
    apply_color(&format!("✅ {}", message), AnsiColor::Green)
}
