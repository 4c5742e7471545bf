use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The event submitted with a new pull request review.
///
/// # Examples
///
/// ```
/// use prgate_core::ReviewEvent;
///
/// assert_eq!(ReviewEvent::RequestChanges.as_str(), "REQUEST_CHANGES");
/// assert_eq!(ReviewEvent::Approve.to_string(), "APPROVE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    /// Approve the pull request.
    Approve,
    /// Block the pull request until changes are made.
    RequestChanges,
}

impl ReviewEvent {
    /// Wire name used by the GitHub reviews API.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewEvent::Approve => "APPROVE",
            ReviewEvent::RequestChanges => "REQUEST_CHANGES",
        }
    }
}

impl fmt::Display for ReviewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a review that already exists on the pull request.
///
/// Only the two states the linter acts on are named; everything else is kept
/// verbatim in [`ReviewState::Other`].
///
/// # Examples
///
/// ```
/// use prgate_core::ReviewState;
///
/// let state: ReviewState = serde_json::from_str("\"PENDING\"").unwrap();
/// assert_eq!(state, ReviewState::Pending);
///
/// let state: ReviewState = serde_json::from_str("\"COMMENTED\"").unwrap();
/// assert_eq!(state, ReviewState::Other("COMMENTED".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewState {
    ChangesRequested,
    Pending,
    Other(String),
}

impl From<String> for ReviewState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
            "PENDING" => ReviewState::Pending,
            _ => ReviewState::Other(s),
        }
    }
}

impl From<ReviewState> for String {
    fn from(state: ReviewState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewState::ChangesRequested => write!(f, "CHANGES_REQUESTED"),
            ReviewState::Pending => write!(f, "PENDING"),
            ReviewState::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A review already present on the pull request, as returned by the list call.
///
/// # Examples
///
/// ```
/// use prgate_core::{ExistingReview, ReviewState};
///
/// let review = ExistingReview {
///     id: 80,
///     author: Some("github-actions[bot]".into()),
///     state: ReviewState::ChangesRequested,
/// };
/// assert!(review.is_authored_by("github-actions[bot]"));
/// assert!(!review.is_authored_by("octocat"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingReview {
    /// Review id, unique per repository.
    pub id: u64,
    /// Login of the review author. `None` for deleted accounts.
    pub author: Option<String>,
    /// Current state of the review.
    pub state: ReviewState,
}

impl ExistingReview {
    /// Whether the review was written by `login`.
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author.as_deref() == Some(login)
    }
}

/// Output format for command results.
///
/// # Examples
///
/// ```
/// use prgate_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
