#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid form configuration: {0}")]
    Config(String),
}
