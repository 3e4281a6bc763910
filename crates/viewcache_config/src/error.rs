//! Error types for configuration loading and host resolution.

/// Errors that can occur when loading `viewcache.toml` or resolving the host
/// decision. All of them are raised before any scanning begins.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The host renders with a different template engine.
    #[error("view engine was \"{found}\" and needs to be set to \"{expected}\"")]
    EngineMismatch {
        /// Engine this cache compiles for.
        expected: String,
        /// Engine the host is configured with.
        found: String,
    },
}
