use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("external open failed: {0}")]
    ExternalOpen(String),

    #[error("not supported: {0}")]
    NotSupported(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Public operation called in a state that forbids it (double-init,
    /// use after destroy).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A key outside the claimable hardware set was passed to the
    /// key-claim API. Caller defect, fails fast.
    #[error("unsupported key: {0}")]
    UnsupportedKey(String),

    /// Script evaluation in the embedded engine failed.
    #[error("script evaluation failed: {0}")]
    Eval(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}
