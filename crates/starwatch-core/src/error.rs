use std::path::PathBuf;

/// Errors that can occur while loading or analyzing star data.
///
/// Weak or malformed *analysis* input is not an error: the analyzers report
/// it as insufficient data. These variants cover the plumbing around the
/// analysis (files, config, git).
///
/// # Examples
///
/// ```
/// use starwatch_core::StarwatchError;
///
/// let err = StarwatchError::Config("max_clusters must be positive".into());
/// assert!(err.to_string().contains("max_clusters"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum StarwatchError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("Run 'starwatch init' to generate a commented .starwatch.toml"))]
    Config(String),

    /// Git operation failure while mining a local clone.
    #[error("git error: {0}")]
    Git(String),

    /// The snapshot file is structurally valid JSON but unusable.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
