//! Synchronous validation walk over a compiled rule table.

use serde::Serialize;

use crate::evaluator::RuleEvaluator;
use crate::field::{FormConfig, FormValues};
use crate::rule_table::RuleTable;

/// One user-visible validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Aggregate decision for one submit attempt. Empty errors ⇒ allow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub errors: Vec<FieldError>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Walk the table in field order and report the first failing rule per
/// field.
///
/// Rules within a field run in declared order; a field contributes at
/// most one error, so a later failure never replaces an earlier one.
/// Suspended fields have no table entry and are skipped entirely. A
/// field present in the table but absent from the value snapshot is
/// validated as empty.
pub fn validate(
    config: &FormConfig,
    table: &RuleTable,
    evaluator: &dyn RuleEvaluator,
    values: &FormValues,
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for field in &config.fields {
        let Some(entry) = table.get(&field.name) else {
            continue;
        };
        let value = values.get(&field.name).map(String::as_str).unwrap_or("");

        for rule in &field.rules {
            let Some(param) = entry.rules.get(&rule.name) else {
                continue;
            };
            if !evaluator.evaluate(&rule.name, value, param) {
                let message = entry
                    .messages
                    .get(&rule.name)
                    .cloned()
                    .unwrap_or_else(|| rule.message.clone());
                outcome.errors.push(FieldError::new(&field.name, message));
                break;
            }
        }
    }

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
