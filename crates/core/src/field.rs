//! Declarative form configuration types.
//!
//! Built once by the host at form initialization (typically deserialized
//! from the output of a markup parser) and immutable afterwards. Live
//! state — which fields are currently active, what the user has typed —
//! is derived elsewhere and never stored here.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Live value snapshot for a form, keyed by field name.
///
/// Fields absent from the map are treated as absent from the form
/// entirely, not as empty.
pub type FormValues = HashMap<String, String>;

/// One validation rule attached to a field.
///
/// `param` is rule-specific: `true` for `required`, a number for length
/// rules, and so on. It is handed to the evaluator untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub param: Value,
    pub message: String,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, param: Value, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param,
            message: message.into(),
        }
    }
}

/// A single validated field: its rules in declared order, plus an
/// optional dependency condition controlling whether the rules apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub rules: Vec<RuleSpec>,
    /// Other field name → the value it must hold for this field's rules
    /// to be active. Empty map means unconditionally active.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependency: BTreeMap<String, String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, rules: Vec<RuleSpec>) -> Self {
        Self {
            name: name.into(),
            rules,
            dependency: BTreeMap::new(),
        }
    }

    /// Attach a dependency entry: this field is active only while
    /// `other` holds `required_value`.
    pub fn depends_on(
        mut self,
        other: impl Into<String>,
        required_value: impl Into<String>,
    ) -> Self {
        self.dependency.insert(other.into(), required_value.into());
        self
    }
}

/// A field that must pass a remote uniqueness check before submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoubleCheckSpec {
    pub field: String,
    /// Tag identifying the value domain for the remote service
    /// (e.g. `"email"`, `"cpf"`).
    pub kind: String,
    /// Value present at load time. An unchanged value is exempt from the
    /// remote check: it was already accepted when the record was saved.
    pub initial_value: String,
    /// Error message rendered when the remote service reports the value
    /// as already taken.
    pub message: String,
    /// Strip mask punctuation before the remote call, for masked inputs
    /// like `999.999.999-99`.
    #[serde(default)]
    pub strip_formatting: bool,
}

impl DoubleCheckSpec {
    /// The value as sent to the remote service.
    pub fn normalized(&self, value: &str) -> String {
        if self.strip_formatting {
            value.chars().filter(char::is_ascii_alphanumeric).collect()
        } else {
            value.to_string()
        }
    }
}

/// The complete declarative configuration for one form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub double_checks: Vec<DoubleCheckSpec>,
}

impl FormConfig {
    /// Build a configuration, rejecting duplicate field names.
    pub fn new(
        fields: Vec<FieldSpec>,
        double_checks: Vec<DoubleCheckSpec>,
    ) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::Config(format!(
                    "Duplicate field name '{}'",
                    field.name
                )));
            }
        }
        Ok(Self {
            fields,
            double_checks,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
