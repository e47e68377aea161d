//! Concurrent double-check coordination.
//!
//! Fires one uniqueness check per configured field, runs them all
//! concurrently, and joins with wait-for-all semantics: an error or
//! timeout in one check never masks the others' results, and the join
//! always settles. Failures surface as per-field values, not errors.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;

use formgate_core::field::{DoubleCheckSpec, FormValues};

use crate::checker::{CheckError, UniquenessChecker};

/// Default deadline for a single remote check.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one double-check field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    NotDuplicate,
    Duplicate { message: String },
    /// The check itself failed; the gate's failure policy decides
    /// whether this blocks submission.
    Failed { reason: String },
}

/// Result of one field's check, attributable by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub field: String,
    pub outcome: CheckOutcome,
}

impl CheckResult {
    pub fn is_duplicate(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Duplicate { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Failed { .. })
    }
}

/// Fans uniqueness checks out to the remote service and joins them.
pub struct AsyncCheckCoordinator {
    checker: Arc<dyn UniquenessChecker>,
    timeout: Duration,
}

impl AsyncCheckCoordinator {
    pub fn new(checker: Arc<dyn UniquenessChecker>) -> Self {
        Self {
            checker,
            timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run every applicable check concurrently and wait for all of them.
    ///
    /// Specs whose field is absent from `values` are excluded — an empty
    /// selection is not an error and resolves immediately. A field whose
    /// live value equals its load-time snapshot resolves as non-duplicate
    /// without touching the remote service. Result order follows the
    /// order of `specs`.
    pub async fn run_checks(
        &self,
        specs: &[DoubleCheckSpec],
        values: &FormValues,
    ) -> Vec<CheckResult> {
        let checks: Vec<_> = specs
            .iter()
            .filter_map(|spec| {
                values
                    .get(&spec.field)
                    .map(|value| self.check_field(spec, value))
            })
            .collect();

        join_all(checks).await
    }

    async fn check_field(&self, spec: &DoubleCheckSpec, value: &str) -> CheckResult {
        if value == spec.initial_value {
            // Unchanged since load: the value was already accepted when
            // the record was saved, so the remote call is skipped.
            return CheckResult {
                field: spec.field.clone(),
                outcome: CheckOutcome::NotDuplicate,
            };
        }

        let normalized = spec.normalized(value);
        let start = Instant::now();

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.checker.check_unique(&spec.kind, &normalized),
        )
        .await
        {
            Ok(Ok(true)) => CheckOutcome::Duplicate {
                message: spec.message.clone(),
            },
            Ok(Ok(false)) => CheckOutcome::NotDuplicate,
            Ok(Err(e)) => {
                tracing::warn!(
                    field = %spec.field,
                    kind = %spec.kind,
                    error = %e,
                    "Uniqueness check failed",
                );
                CheckOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_elapsed) => {
                let err = CheckError::Timeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                };
                tracing::warn!(
                    field = %spec.field,
                    kind = %spec.kind,
                    "Uniqueness check timed out",
                );
                CheckOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        CheckResult {
            field: spec.field.clone(),
            outcome,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
