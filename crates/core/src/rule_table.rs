//! Compiled validation-rule table.
//!
//! Maps each active field to a pair of parallel maps keyed by rule name —
//! `rules[rule] = param` and `messages[rule] = message` — the exact shape
//! handed to the rule-evaluator boundary. Suspended fields have no entry
//! at all, so a previously-invalid suspended field can never block
//! submission.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::dependency;
use crate::field::{FieldSpec, FormConfig, FormValues};

/// Rules and messages for one field, keyed by rule name.
///
/// The two maps always share the same key set; lookup is by rule name,
/// not position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldRules {
    pub rules: BTreeMap<String, Value>,
    pub messages: BTreeMap<String, String>,
}

impl FieldRules {
    fn from_spec(spec: &FieldSpec) -> Self {
        let mut entry = FieldRules::default();
        for rule in &spec.rules {
            entry.rules.insert(rule.name.clone(), rule.param.clone());
            entry
                .messages
                .insert(rule.name.clone(), rule.message.clone());
        }
        entry
    }
}

/// The compiled mapping of field name → active ruleset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    entries: HashMap<String, FieldRules>,
}

impl RuleTable {
    /// Build the table for every field whose dependency condition holds
    /// under the given value snapshot.
    pub fn compile(config: &FormConfig, values: &FormValues) -> Self {
        let mut table = RuleTable::default();
        for field in &config.fields {
            table.apply_active_state(field, dependency::resolve(field, values));
        }
        table
    }

    /// Insert or remove a single field's entry according to `active`.
    ///
    /// Suspension removes the entry entirely rather than marking it
    /// skipped, so downstream consumers see "no validation for this
    /// field".
    pub fn apply_active_state(&mut self, spec: &FieldSpec, active: bool) {
        if active {
            self.entries
                .insert(spec.name.clone(), FieldRules::from_spec(spec));
        } else {
            self.entries.remove(&spec.name);
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldRules> {
        self.entries.get(field)
    }

    pub fn is_active(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
