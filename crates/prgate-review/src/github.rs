use async_trait::async_trait;
use prgate_core::{ExistingReview, PrGateError, PullRequestContext, ReviewEvent, ReviewState};
use serde::{Deserialize, Serialize};
use tracing::debug;

const REVIEWS_PER_PAGE: u8 = 100;

/// The slice of the GitHub pull request reviews API the linter uses.
///
/// [`GitHubClient`] talks to GitHub; tests substitute an in-memory fake.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Submit a review with `event` and `body` on the pull request.
    async fn create_review(
        &self,
        pr: &PullRequestContext,
        body: &str,
        event: ReviewEvent,
    ) -> Result<(), PrGateError>;

    /// List every review on the pull request, oldest first.
    async fn list_reviews(&self, pr: &PullRequestContext)
        -> Result<Vec<ExistingReview>, PrGateError>;

    /// Dismiss a submitted review, leaving `message` as the reason.
    async fn dismiss_review(
        &self,
        pr: &PullRequestContext,
        review_id: u64,
        message: &str,
    ) -> Result<(), PrGateError>;

    /// Delete a review that was never submitted.
    async fn delete_pending_review(
        &self,
        pr: &PullRequestContext,
        review_id: u64,
    ) -> Result<(), PrGateError>;
}

/// GitHub REST client for pull request reviews.
///
/// # Examples
///
/// ```
/// use prgate_review::github::parse_pr_reference;
///
/// let (owner, repo, number) = parse_pr_reference("rust-lang/rust#12345").unwrap();
/// assert_eq!(owner, "rust-lang");
/// assert_eq!(repo, "rust");
/// assert_eq!(number, 12345);
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
}

impl GitHubClient {
    /// Create a client authenticated with `token`.
    ///
    /// `api_url` overrides the API base for GitHub Enterprise Server.
    ///
    /// # Errors
    ///
    /// Returns [`PrGateError::Config`] if `api_url` is not a valid URI, or
    /// [`PrGateError::GitHub`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use prgate_review::github::GitHubClient;
    ///
    /// let client = GitHubClient::new("ghp_xxxx", None).unwrap();
    /// ```
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self, PrGateError> {
        let mut builder = octocrab::Octocrab::builder().personal_token(token.to_string());
        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| PrGateError::Config(format!("invalid api-url '{url}': {e}")))?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| PrGateError::GitHub(format!("failed to create GitHub client: {e}")))?;

        Ok(Self { octocrab })
    }
}

fn reviews_route(pr: &PullRequestContext) -> String {
    format!("/repos/{}/{}/pulls/{}/reviews", pr.owner, pr.repo, pr.number)
}

fn review_route(pr: &PullRequestContext, review_id: u64) -> String {
    format!("{}/{review_id}", reviews_route(pr))
}

fn dismissal_route(pr: &PullRequestContext, review_id: u64) -> String {
    format!("{}/dismissals", review_route(pr, review_id))
}

#[derive(Debug, Serialize)]
struct CreateReviewRequest<'a> {
    body: &'a str,
    event: ReviewEvent,
}

#[derive(Debug, Serialize)]
struct DismissReviewRequest<'a> {
    message: &'a str,
    event: &'static str,
}

impl<'a> DismissReviewRequest<'a> {
    fn new(message: &'a str) -> Self {
        Self {
            message,
            event: "DISMISS",
        }
    }
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct ReviewResponse {
    id: u64,
    user: Option<ReviewUser>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewUser {
    login: String,
}

impl From<ReviewResponse> for ExistingReview {
    fn from(r: ReviewResponse) -> Self {
        ExistingReview {
            id: r.id,
            author: r.user.map(|u| u.login),
            state: ReviewState::from(r.state.unwrap_or_default()),
        }
    }
}

#[async_trait]
impl ReviewApi for GitHubClient {
    async fn create_review(
        &self,
        pr: &PullRequestContext,
        body: &str,
        event: ReviewEvent,
    ) -> Result<(), PrGateError> {
        debug!(%event, body, "creating review");
        let request = CreateReviewRequest { body, event };
        let _response: serde_json::Value = self
            .octocrab
            .post(reviews_route(pr), Some(&request))
            .await
            .map_err(|e| PrGateError::GitHub(format!("failed to create review: {e}")))?;
        Ok(())
    }

    async fn list_reviews(
        &self,
        pr: &PullRequestContext,
    ) -> Result<Vec<ExistingReview>, PrGateError> {
        debug!(pr = %pr, "listing reviews");
        let route = reviews_route(pr);
        let mut reviews = Vec::new();
        let mut page = 1;
        loop {
            let params = PageParams {
                per_page: REVIEWS_PER_PAGE,
                page,
            };
            let batch: Vec<ReviewResponse> = self
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| PrGateError::GitHub(format!("failed to list reviews: {e}")))?;
            let done = batch.len() < usize::from(REVIEWS_PER_PAGE);
            reviews.extend(batch.into_iter().map(ExistingReview::from));
            if done {
                break;
            }
            page += 1;
        }
        Ok(reviews)
    }

    async fn dismiss_review(
        &self,
        pr: &PullRequestContext,
        review_id: u64,
        message: &str,
    ) -> Result<(), PrGateError> {
        let request = DismissReviewRequest::new(message);
        let _response: serde_json::Value = self
            .octocrab
            .put(dismissal_route(pr, review_id), Some(&request))
            .await
            .map_err(|e| {
                PrGateError::GitHub(format!("failed to dismiss review {review_id}: {e}"))
            })?;
        Ok(())
    }

    async fn delete_pending_review(
        &self,
        pr: &PullRequestContext,
        review_id: u64,
    ) -> Result<(), PrGateError> {
        let _response: serde_json::Value = self
            .octocrab
            .delete(review_route(pr, review_id), None::<&()>)
            .await
            .map_err(|e| {
                PrGateError::GitHub(format!("failed to delete pending review {review_id}: {e}"))
            })?;
        Ok(())
    }
}

/// Parse a PR reference string (`owner/repo#number`) into its components.
///
/// # Errors
///
/// Returns [`PrGateError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use prgate_review::github::parse_pr_reference;
///
/// let (owner, repo, num) = parse_pr_reference("octocat/hello-world#42").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// assert_eq!(num, 42);
/// ```
pub fn parse_pr_reference(pr_ref: &str) -> Result<(String, String, u64), PrGateError> {
    let Some((owner_repo, number_str)) = pr_ref.split_once('#') else {
        return Err(PrGateError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        )));
    };
    let Some((owner, repo)) = owner_repo.split_once('/') else {
        return Err(PrGateError::Config(format!(
            "invalid PR reference '{pr_ref}', expected owner/repo#number"
        )));
    };
    let number: u64 = number_str
        .parse()
        .map_err(|_| PrGateError::Config(format!("invalid PR number: {number_str}")))?;
    Ok((owner.to_string(), repo.to_string(), number))
}
