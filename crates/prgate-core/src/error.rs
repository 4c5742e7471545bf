use std::path::PathBuf;

/// Errors that can occur while linting a pull request.
///
/// Library crates use this type directly; the binary converts to
/// `miette::Report` at the boundary.
///
/// # Examples
///
/// ```
/// use prgate_core::PrGateError;
///
/// let err = PrGateError::Config("missing github-token".into());
/// assert!(err.to_string().contains("missing github-token"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PrGateError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("set the input in .prgate.toml, as a CLI flag, or as an INPUT_* env var"))]
    Config(String),

    /// A configured pattern is not a valid regular expression.
    #[error("invalid regex for `{input}`: {source}")]
    #[diagnostic(help("patterns use Rust regex syntax: https://docs.rs/regex"))]
    Regex {
        /// Name of the input that held the pattern.
        input: &'static str,
        #[source]
        source: regex::Error,
    },

    /// The pull request being linted could not be determined.
    #[error("pull request context unavailable: {0}")]
    #[diagnostic(help(
        "run inside a pull_request workflow, or pass --pr owner/repo#123 with --title and --body"
    ))]
    Context(String),

    /// GitHub API call failure.
    #[error("GitHub API error: {0}")]
    GitHub(String),

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
