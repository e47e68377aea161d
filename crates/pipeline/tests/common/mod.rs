//! Shared fixtures for submission-flow tests: a call-counting stub for
//! the remote uniqueness service and a sink that records what was
//! rendered.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use formgate_core::field::{DoubleCheckSpec, FieldSpec, FormConfig, FormValues, RuleSpec};
use formgate_core::validate::FieldError;
use formgate_pipeline::checker::{CheckError, UniquenessChecker};
use formgate_pipeline::gate::ErrorSink;

/// Remote-service stub: a fixed set of taken values plus a call counter.
pub struct CountingChecker {
    taken: HashSet<String>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingChecker {
    pub fn new(taken: &[&str]) -> Self {
        Self {
            taken: taken.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UniquenessChecker for CountingChecker {
    async fn check_unique(&self, _kind: &str, value: &str) -> Result<bool, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.taken.contains(value))
    }
}

/// Sink that records the currently rendered error set.
#[derive(Default)]
pub struct CollectingSink {
    rendered: Mutex<Vec<FieldError>>,
}

impl CollectingSink {
    pub fn rendered(&self) -> Vec<FieldError> {
        self.rendered.lock().expect("sink lock").clone()
    }
}

impl ErrorSink for CollectingSink {
    fn render_errors(&self, errors: &[FieldError]) {
        *self.rendered.lock().expect("sink lock") = errors.to_vec();
    }

    fn clear_errors(&self) {
        self.rendered.lock().expect("sink lock").clear();
    }
}

/// Forwarding wrapper so a test can keep a handle on the sink it gave
/// to the gate.
pub struct SharedSink(pub Arc<CollectingSink>);

impl ErrorSink for SharedSink {
    fn render_errors(&self, errors: &[FieldError]) {
        self.0.render_errors(errors);
    }

    fn clear_errors(&self) {
        self.0.clear_errors();
    }
}

/// A registration form: required/valid email with a uniqueness check,
/// a masked CPF with a uniqueness check, and a spouse-name field that
/// only applies to married users.
pub fn registration_form(email_initial: &str, cpf_initial: &str) -> FormConfig {
    FormConfig::new(
        vec![
            FieldSpec::new(
                "email",
                vec![
                    RuleSpec::new("required", json!(true), "Email is required"),
                    RuleSpec::new("expression", json!(true), "Invalid email"),
                ],
            ),
            FieldSpec::new(
                "cpf",
                vec![RuleSpec::new("cpf", json!(true), "Invalid CPF")],
            ),
            FieldSpec::new(
                "spouse_name",
                vec![RuleSpec::new("required", json!(true), "Spouse name is required")],
            )
            .depends_on("marital_status", "married"),
        ],
        vec![
            DoubleCheckSpec {
                field: "email".to_string(),
                kind: "email".to_string(),
                initial_value: email_initial.to_string(),
                message: "Email already registered".to_string(),
                strip_formatting: false,
            },
            DoubleCheckSpec {
                field: "cpf".to_string(),
                kind: "cpf".to_string(),
                initial_value: cpf_initial.to_string(),
                message: "CPF already registered".to_string(),
                strip_formatting: true,
            },
        ],
    )
    .expect("valid config")
}

pub fn values(pairs: &[(&str, &str)]) -> FormValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
