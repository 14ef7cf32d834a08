//! Rewrites text with canonical tokens in place of recognized facts.

use crate::catalog::PatternCatalog;
use crate::models::ExtractionResult;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Span {
    start: usize,
    end: usize,
    rank: usize,
    token: &'static str,
}

/// Replaces each accepted fact span with its catalog token, then lowercases
/// and collapses whitespace.
///
/// Spans are accepted in catalog order, so a temperature wins over the
/// generic number inside it. A later span overlapping accepted ones is folded
/// into them: the merged span keeps the token of the earliest-declared type
/// and covers the union, so no digits are left behind next to a token.
/// Accepted spans are spliced back to front, which keeps the offsets of the
/// remaining spans valid.
pub fn substitute(catalog: &PatternCatalog, text: &str, extracted: &ExtractionResult) -> String {
    let mut candidates: Vec<Span> = extracted
        .iter()
        .filter_map(|(fact_type, facts)| {
            let entry = catalog.entry(fact_type)?;
            let rank = catalog.declaration_index(fact_type);
            Some(facts.iter().map(move |f| Span {
                start: f.start,
                end: f.end(),
                rank,
                token: entry.token,
            }))
        })
        .flatten()
        .filter(|s| text.get(s.start..s.end).is_some())
        .collect();
    candidates.sort_by_key(|s| (s.rank, s.start));

    // start -> accepted span; accepted spans never overlap each other.
    let mut taken: BTreeMap<usize, Span> = BTreeMap::new();
    for span in candidates {
        let overlapping: Vec<usize> = taken
            .range(..span.end)
            .rev()
            .take_while(|(_, t)| t.end > span.start)
            .map(|(start, _)| *start)
            .collect();

        let mut merged = span;
        for start in overlapping {
            if let Some(t) = taken.remove(&start) {
                merged = Span {
                    start: merged.start.min(t.start),
                    end: merged.end.max(t.end),
                    rank: merged.rank.min(t.rank),
                    token: if t.rank <= merged.rank { t.token } else { merged.token },
                };
            }
        }
        taken.insert(merged.start, merged);
    }
    let accepted: Vec<Span> = taken.into_values().rev().collect();

    let mut pieces: Vec<&str> = Vec::with_capacity(accepted.len() * 2 + 1);
    let mut cursor = text.len();
    for span in &accepted {
        pieces.push(&text[span.end..cursor]);
        pieces.push(span.token);
        cursor = span.start;
    }
    pieces.push(&text[..cursor]);
    pieces.reverse();
    let processed = pieces.concat();

    normalize_whitespace(&processed.to_lowercase())
}

/// Collapses every whitespace run to one space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
