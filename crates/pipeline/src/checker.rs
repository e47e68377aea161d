//! Remote uniqueness-check boundary.

use async_trait::async_trait;

/// Errors from the remote uniqueness service.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The transport itself failed (network error, bad response, ...).
    #[error("Uniqueness check transport failed: {0}")]
    Transport(String),

    /// The check did not settle within the configured deadline.
    #[error("Uniqueness check timed out after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed wall-clock time before the check was abandoned.
        elapsed_ms: u64,
    },
}

/// Remote service answering "does this value already exist?".
///
/// `kind` tags the value domain (e.g. `"email"`, `"cpf"`); `value`
/// arrives already normalized. `Ok(true)` means the value is taken.
#[async_trait]
pub trait UniquenessChecker: Send + Sync {
    async fn check_unique(&self, kind: &str, value: &str) -> Result<bool, CheckError>;
}
