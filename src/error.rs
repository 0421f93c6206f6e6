use thiserror::Error;

/// Rejections raised at the configuration boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),
}

/// Failures of the desktop backend (focus queries, window switching, key injection).
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("{capability} is not available on this platform")]
    Unsupported { capability: &'static str },

    #[error("display connection failed: {0}")]
    Connection(String),

    #[error("window query failed: {0}")]
    Query(String),

    #[error("input injection failed: {0}")]
    Input(String),
}

impl PlatformError {
    /// True when the capability can never work in this session, as opposed to
    /// a transient failure worth retrying on the next tick.
    pub fn is_capability_missing(&self) -> bool {
        matches!(
            self,
            PlatformError::Unsupported { .. } | PlatformError::Connection(_)
        )
    }
}
