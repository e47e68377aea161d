//! Submission gate state machine.
//!
//! Intercepts submit intent, refreshes dependency state, runs the
//! synchronous walk, then awaits the double-check coordinator before
//! allowing the real submission. Thread-safe via interior `RwLock`;
//! designed to be wrapped in `Arc` and driven from the host's event
//! loop. An attempt counter makes completions from superseded submit
//! attempts inert.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use formgate_core::dependency;
use formgate_core::evaluator::RuleEvaluator;
use formgate_core::field::{FormConfig, FormValues};
use formgate_core::rule_table::RuleTable;
use formgate_core::validate::{self, FieldError, ValidationOutcome};

use crate::checker::UniquenessChecker;
use crate::coordinator::{AsyncCheckCoordinator, CheckOutcome, DEFAULT_CHECK_TIMEOUT};

/// Where rejected-attempt errors are rendered.
///
/// `render_errors` replaces the whole visible set; `clear_errors`
/// removes everything. The rendering primitives themselves are the
/// host's concern.
pub trait ErrorSink: Send + Sync {
    fn render_errors(&self, errors: &[FieldError]);
    fn clear_errors(&self);
}

/// Gate states. `Submitting` is absorbing: once reached, further submit
/// intents pass straight through so the real submission is never
/// re-intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    SyncValidating,
    AsyncValidating,
    Rejected,
    Submitting,
}

/// What to do when a uniqueness check's transport fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckFailurePolicy {
    /// Fail-open: the failure does not block submission.
    #[default]
    Allow,
    /// Fail-closed: each failed check blocks with this message.
    Block { message: String },
}

/// Gate tuning knobs.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Deadline for each individual remote check.
    pub check_timeout: Duration,
    /// Policy applied to checks that fail or time out.
    pub failure_policy: CheckFailurePolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            check_timeout: DEFAULT_CHECK_TIMEOUT,
            failure_policy: CheckFailurePolicy::Allow,
        }
    }
}

/// Decision returned to the host for one submit intent.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDecision {
    /// All validation passed: trigger the real submission exactly once.
    Allow,
    /// Validation failed; errors have been rendered to the sink.
    Reject(ValidationOutcome),
    /// A newer submit intent superseded this attempt; ignore it.
    Superseded,
}

struct Inner {
    state: GateState,
    table: RuleTable,
    rendered: Vec<FieldError>,
}

/// The top-level submission gate.
pub struct SubmissionGate {
    config: FormConfig,
    evaluator: Box<dyn RuleEvaluator>,
    coordinator: AsyncCheckCoordinator,
    sink: Box<dyn ErrorSink>,
    failure_policy: CheckFailurePolicy,
    inner: RwLock<Inner>,
    attempt: AtomicU64,
}

impl SubmissionGate {
    /// Build a gate for one form.
    ///
    /// The rule table starts from an empty value snapshot; call
    /// [`update_values`](Self::update_values) with the load-time values
    /// so dependency state is current before the first user event. Every
    /// submit attempt refreshes it again regardless.
    pub fn new(
        config: FormConfig,
        evaluator: Box<dyn RuleEvaluator>,
        checker: Arc<dyn UniquenessChecker>,
        sink: Box<dyn ErrorSink>,
        gate_config: GateConfig,
    ) -> Self {
        let coordinator =
            AsyncCheckCoordinator::new(checker).with_timeout(gate_config.check_timeout);
        let table = RuleTable::compile(&config, &FormValues::default());
        Self {
            config,
            evaluator,
            coordinator,
            sink,
            failure_policy: gate_config.failure_policy,
            inner: RwLock::new(Inner {
                state: GateState::Idle,
                table,
                rendered: Vec::new(),
            }),
            attempt: AtomicU64::new(0),
        }
    }

    pub async fn state(&self) -> GateState {
        self.inner.read().await.state
    }

    /// Value-change event: re-resolve dependencies and recompile the
    /// affected table entries. A field flipping active→suspended has its
    /// rendered error removed immediately rather than left stale.
    pub async fn update_values(&self, values: &FormValues) {
        let mut inner = self.inner.write().await;
        let mut dropped = false;

        for field in &self.config.fields {
            let active = dependency::resolve(field, values);
            if inner.table.is_active(&field.name) && !active {
                tracing::debug!(field = %field.name, "Field suspended by dependency change");
                if inner.rendered.iter().any(|e| e.field == field.name) {
                    inner.rendered.retain(|e| e.field != field.name);
                    dropped = true;
                }
            }
            inner.table.apply_active_state(field, active);
        }

        if dropped {
            self.sink.clear_errors();
            self.sink.render_errors(&inner.rendered);
        }
    }

    /// Handle one submit intent against the given value snapshot.
    ///
    /// Dependency state is refreshed before any rule runs, so the
    /// attempt never validates against stale activation. If a newer
    /// attempt starts while this one's remote checks are in flight, this
    /// attempt's results are discarded and `Superseded` is returned.
    pub async fn submit(&self, values: &FormValues) -> SubmitDecision {
        let token = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut inner = self.inner.write().await;

            if inner.state == GateState::Submitting {
                // The real submission passing back through the handler.
                return SubmitDecision::Allow;
            }

            inner.state = GateState::SyncValidating;
            inner.rendered.clear();
            self.sink.clear_errors();
            tracing::debug!(attempt = token, "Submit intent intercepted");

            inner.table = RuleTable::compile(&self.config, values);
            let outcome =
                validate::validate(&self.config, &inner.table, self.evaluator.as_ref(), values);

            if !outcome.is_valid() {
                inner.state = GateState::Rejected;
                inner.rendered = outcome.errors.clone();
                self.sink.render_errors(&outcome.errors);
                tracing::info!(
                    attempt = token,
                    errors = outcome.errors.len(),
                    "Submission rejected by synchronous validation",
                );
                return SubmitDecision::Reject(outcome);
            }

            let has_checks = self
                .config
                .double_checks
                .iter()
                .any(|spec| values.contains_key(&spec.field));
            if !has_checks {
                inner.state = GateState::Submitting;
                tracing::info!(attempt = token, "Submission allowed");
                return SubmitDecision::Allow;
            }

            inner.state = GateState::AsyncValidating;
        }

        // Lock released while the checks are in flight; a newer submit
        // intent may run to completion in the meantime.
        let results = self
            .coordinator
            .run_checks(&self.config.double_checks, values)
            .await;

        if self.attempt.load(Ordering::SeqCst) != token {
            tracing::debug!(attempt = token, "Discarding stale check results");
            return SubmitDecision::Superseded;
        }

        let mut errors = Vec::new();
        for result in &results {
            match &result.outcome {
                CheckOutcome::Duplicate { message } => {
                    errors.push(FieldError::new(&result.field, message));
                }
                CheckOutcome::Failed { .. } => {
                    if let CheckFailurePolicy::Block { message } = &self.failure_policy {
                        errors.push(FieldError::new(&result.field, message));
                    }
                }
                CheckOutcome::NotDuplicate => {}
            }
        }

        let mut inner = self.inner.write().await;
        // Re-check under the lock: a newer attempt may have started
        // between the token read and acquiring the write lock.
        if self.attempt.load(Ordering::SeqCst) != token {
            tracing::debug!(attempt = token, "Discarding stale check results");
            return SubmitDecision::Superseded;
        }

        if errors.is_empty() {
            inner.state = GateState::Submitting;
            tracing::info!(attempt = token, "Submission allowed");
            SubmitDecision::Allow
        } else {
            inner.state = GateState::Rejected;
            inner.rendered = errors.clone();
            self.sink.render_errors(&errors);
            tracing::info!(
                attempt = token,
                errors = errors.len(),
                "Submission rejected by uniqueness checks",
            );
            SubmitDecision::Reject(ValidationOutcome { errors })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
