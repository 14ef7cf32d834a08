//! Scans text against the pattern catalog and collects typed facts.

use crate::catalog::{CatalogEntry, PatternCatalog, Shape};
use crate::models::{ExtractedFact, ExtractionResult, FactExtra, FactValue};
use regex::Captures;
use tracing::{debug, warn};

/// Finds every non-overlapping match of every catalog entry.
///
/// Entries are scanned independently, so a typed quantity and the generic
/// number pattern may both record the same span. A match whose number does
/// not parse is dropped on its own; the rest of the scan is unaffected.
pub fn extract(catalog: &PatternCatalog, text: &str) -> ExtractionResult {
    let mut result = ExtractionResult::default();

    for entry in catalog.entries() {
        let mut facts = Vec::new();
        for caps in entry.regex().captures_iter(text) {
            match build_fact(entry, &caps) {
                Some(fact) => facts.push(fact),
                None => {
                    let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                    warn!(fact_type = %entry.fact_type, matched = whole, "discarding unparsable match");
                }
            }
        }
        result.insert_group(entry.fact_type, facts);
    }

    debug!(
        types = result.fact_types().count(),
        facts = result.total_facts(),
        "extraction complete"
    );
    result
}

fn build_fact(entry: &CatalogEntry, caps: &Captures<'_>) -> Option<ExtractedFact> {
    let whole = caps.get(0)?;
    let group = |i: usize| caps.get(i).map(|m| m.as_str());

    let (value, extra) = match entry.shape {
        Shape::Code => (FactValue::Text(whole.as_str().to_string()), None),
        Shape::DayFirstDate => date_fact(group(1)?, group(2)?, group(3)?)?,
        Shape::YearFirstDate => date_fact(group(3)?, group(2)?, group(1)?)?,
        Shape::StandardReference => {
            let number = group(2)?.parse::<u32>().ok()?;
            (
                FactValue::Text(group(1)?.to_string()),
                Some(FactExtra::Standard { number }),
            )
        }
        Shape::Quantity => (FactValue::Number(group(1)?.parse::<f64>().ok()?), None),
    };

    Some(ExtractedFact {
        fact_type: entry.fact_type,
        value,
        raw_text: whole.as_str().to_string(),
        start: whole.start(),
        extra,
    })
}

/// Canonical `YYYY-MM-DD` value. Calendar validity is not checked.
fn date_fact(day: &str, month: &str, year: &str) -> Option<(FactValue, Option<FactExtra>)> {
    let d = day.parse::<u32>().ok()?;
    let m = month.parse::<u32>().ok()?;
    let y = year.parse::<i32>().ok()?;
    Some((
        FactValue::Text(format!("{year}-{month}-{day}")),
        Some(FactExtra::Date {
            day: d,
            month: m,
            year: y,
        }),
    ))
}
