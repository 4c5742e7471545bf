use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PrGateError;

/// The pull request under review, passed explicitly through the run.
///
/// # Examples
///
/// ```
/// use prgate_core::PullRequestContext;
///
/// let pr = PullRequestContext {
///     owner: "octocat".into(),
///     repo: "hello-world".into(),
///     number: 42,
///     title: "feat: add greeting".into(),
///     body: "Closes #3".into(),
/// };
/// assert_eq!(pr.to_string(), "octocat/hello-world#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestContext {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Pull request body. Empty when the author left it blank.
    pub body: String,
}

impl std::fmt::Display for PullRequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    number: Option<u64>,
    pull_request: Option<EventPullRequest>,
    repository: Option<EventRepository>,
}

#[derive(Debug, Deserialize)]
struct EventPullRequest {
    number: Option<u64>,
    title: Option<String>,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventRepository {
    name: String,
    owner: EventOwner,
}

#[derive(Debug, Deserialize)]
struct EventOwner {
    login: String,
}

impl PullRequestContext {
    /// Build the context from a GitHub Actions event payload.
    ///
    /// `repository` is the `owner/repo` value of `GITHUB_REPOSITORY`, used when
    /// the payload carries no repository object. A missing title or body is
    /// read as the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Serialization`] for malformed JSON, or
    /// [`PrGateError::Context`] if the payload is not a pull request event.
    ///
    /// # Examples
    ///
    /// ```
    /// use prgate_core::PullRequestContext;
    ///
    /// let payload = r#"{
    ///     "pull_request": {"number": 7, "title": "WIP: add feature", "body": null},
    ///     "repository": {"name": "demo", "owner": {"login": "acme"}}
    /// }"#;
    /// let pr = PullRequestContext::from_event_payload(payload, None).unwrap();
    /// assert_eq!(pr.to_string(), "acme/demo#7");
    /// assert_eq!(pr.body, "");
    /// ```
    pub fn from_event_payload(
        payload: &str,
        repository: Option<&str>,
    ) -> Result<Self, PrGateError> {
        let event: EventPayload = serde_json::from_str(payload)?;

        let Some(pull_request) = event.pull_request else {
            return Err(PrGateError::Context(
                "event payload has no pull_request object".into(),
            ));
        };

        let (owner, repo) = match (event.repository, repository) {
            (Some(r), _) => (r.owner.login, r.name),
            (None, Some(full_name)) => split_repository(full_name)?,
            (None, None) => {
                return Err(PrGateError::Context(
                    "event payload has no repository and GITHUB_REPOSITORY is not set".into(),
                ));
            }
        };

        let number = pull_request.number.or(event.number).ok_or_else(|| {
            PrGateError::Context("event payload has no pull request number".into())
        })?;

        Ok(Self {
            owner,
            repo,
            number,
            title: pull_request.title.unwrap_or_default(),
            body: pull_request.body.unwrap_or_default(),
        })
    }

    /// Read and parse the event payload file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::FileNotFound`] if `path` does not exist, plus the
    /// errors of [`PullRequestContext::from_event_payload`].
    pub fn from_event_file(path: &Path, repository: Option<&str>) -> Result<Self, PrGateError> {
        if !path.exists() {
            return Err(PrGateError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_event_payload(&content, repository)
    }

    /// Build the context from the `GITHUB_EVENT_PATH` and `GITHUB_REPOSITORY`
    /// variables the Actions runner sets.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Context`] when not running inside a workflow.
    pub fn from_actions_env() -> Result<Self, PrGateError> {
        let path = std::env::var("GITHUB_EVENT_PATH").map_err(|_| {
            PrGateError::Context("GITHUB_EVENT_PATH is not set".into())
        })?;
        let repository = std::env::var("GITHUB_REPOSITORY").ok();
        Self::from_event_file(Path::new(&path), repository.as_deref())
    }
}

fn split_repository(full_name: &str) -> Result<(String, String), PrGateError> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(PrGateError::Context(format!(
            "invalid repository '{full_name}', expected owner/repo"
        ))),
    }
}
