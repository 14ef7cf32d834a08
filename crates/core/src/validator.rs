use crate::catalog::PatternCatalog;
use crate::models::{ExtractionResult, ValidationEntry, ValidationOutcome};

pub const BELOW_MINIMUM: &str = "below minimum expected value";
pub const ABOVE_MAXIMUM: &str = "above maximum expected value";

/// Checks every fact whose type declares a range. Violations are reported, not raised.
pub fn validate(catalog: &PatternCatalog, extracted: &ExtractionResult) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for (fact_type, facts) in extracted.iter() {
        let Some(range) = catalog.entry(fact_type).and_then(|e| e.range) else {
            continue;
        };

        for value in facts.iter().filter_map(|f| f.value.as_number()) {
            let violation = if value < range.min {
                Some(BELOW_MINIMUM)
            } else if value > range.max {
                Some(ABOVE_MAXIMUM)
            } else {
                None
            };

            match violation {
                Some(reason) => outcome.errors.push(ValidationEntry {
                    fact_type,
                    value,
                    unit: Some(range.unit),
                    reason: Some(reason.to_string()),
                }),
                None => outcome.valid.push(ValidationEntry {
                    fact_type,
                    value,
                    unit: Some(range.unit),
                    reason: None,
                }),
            }
        }
    }

    outcome
}
