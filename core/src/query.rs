//! GitHub search query syntax: `key:value` qualifiers mixed with free text

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Key used for bare words that are not qualifiers
pub const TEXT_KEY: &str = "text";

/// Whitespace separated tokens, keeping quoted runs together
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:[^\s"]+|"[^"]*")+"#).expect("token pattern is valid"));

/// One term of a search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub key: String,
    pub value: String,
}

impl SearchFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A free-text term
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(TEXT_KEY, value)
    }

    pub fn is_text(&self) -> bool {
        self.key == TEXT_KEY
    }
}

/// Split a query into qualifiers and free-text terms
pub fn parse_search_query(query: &str) -> Vec<SearchFilter> {
    TOKEN_PATTERN
        .find_iter(query)
        .map(|token| {
            let part = token.as_str();
            match part.find(':') {
                Some(colon) if colon > 0 => {
                    let key = &part[..colon];
                    let mut value = &part[colon + 1..];
                    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                        value = &value[1..value.len() - 1];
                    }
                    SearchFilter::new(key, value)
                }
                _ => SearchFilter::text(part),
            }
        })
        .collect()
}

/// Render filters back into query syntax, quoting values with spaces
pub fn stringify_search_query(filters: &[SearchFilter]) -> String {
    filters
        .iter()
        .map(|filter| {
            if filter.is_text() {
                return filter.value.clone();
            }
            if filter.value.contains(' ') {
                format!("{}:\"{}\"", filter.key, filter.value)
            } else {
                format!("{}:{}", filter.key, filter.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value of the first qualifier with the given key
pub fn qualifier<'a>(filters: &'a [SearchFilter], key: &str) -> Option<&'a str> {
    filters
        .iter()
        .find(|f| f.key == key)
        .map(|f| f.value.as_str())
}
