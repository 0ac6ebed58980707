//! Splitting text-match fragments into highlighted segments

use crate::github::MatchSpan;

/// A run of fragment text, highlighted or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSegment {
    pub text: String,
    pub highlighted: bool,
}

impl HighlightSegment {
    fn plain(text: String) -> Self {
        Self {
            text,
            highlighted: false,
        }
    }

    fn marked(text: String) -> Self {
        Self {
            text,
            highlighted: true,
        }
    }
}

/// Split `fragment` around the given match spans.
///
/// Offsets count characters. Spans are applied in order of their start;
/// a span overlapping an earlier one or reaching past the fragment is
/// clipped.
pub fn highlight_fragment(fragment: &str, matches: &[MatchSpan]) -> Vec<HighlightSegment> {
    let chars: Vec<char> = fragment.chars().collect();
    let mut spans: Vec<[usize; 2]> = matches.iter().map(|m| m.indices).collect();
    spans.sort_by_key(|span| span[0]);

    let mut segments = Vec::new();
    let mut cursor = 0;

    for [start, end] in spans {
        let start = start.max(cursor).min(chars.len());
        let end = end.min(chars.len());
        if start >= end {
            continue;
        }

        if start > cursor {
            segments.push(HighlightSegment::plain(chars[cursor..start].iter().collect()));
        }
        segments.push(HighlightSegment::marked(chars[start..end].iter().collect()));
        cursor = end;
    }

    if cursor < chars.len() {
        segments.push(HighlightSegment::plain(chars[cursor..].iter().collect()));
    }

    segments
}
