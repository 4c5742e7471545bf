use prgate_core::{PullRequestContext, ReviewState};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::github::ReviewApi;

/// Message left on a blocking review when a later run approves the PR.
pub const PASSED_MESSAGE: &str = "👍 Pull Request looks good to me! 💯";

/// What happened to the bot's earlier reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Reviews that requested changes and were dismissed.
    pub dismissed: Vec<u64>,
    /// Pending reviews that were deleted.
    pub deleted: Vec<u64>,
    /// Reviews whose dismissal or deletion failed.
    pub failed: Vec<u64>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.dismissed.is_empty() && self.deleted.is_empty() && self.failed.is_empty()
    }
}

/// Clear the reviews `bot_login` left on the pull request.
///
/// Reviews requesting changes are dismissed with `message`; pending reviews
/// are deleted. Everything else, and every review by another author, is left
/// alone. Reviews are handled in listing order and each call is awaited
/// before the next. A failure is logged and recorded, and never stops the
/// remaining reviews from being processed. A failed listing yields an empty
/// report.
pub async fn cleanup_prior_reviews<A>(
    api: &A,
    pr: &PullRequestContext,
    bot_login: &str,
    message: &str,
) -> CleanupReport
where
    A: ReviewApi + ?Sized,
{
    let mut report = CleanupReport::default();

    debug!("getting all reviews in the pull request");
    let reviews = match api.list_reviews(pr).await {
        Ok(reviews) => reviews,
        Err(e) => {
            warn!(error = %e, "could not list reviews, skipping cleanup");
            return report;
        }
    };

    for review in reviews {
        debug!(review_id = review.id, author = ?review.author, "pull request review");
        if !review.is_authored_by(bot_login) {
            continue;
        }
        debug!(review_id = review.id, state = %review.state, "bot review");

        match review.state {
            ReviewState::ChangesRequested => {
                info!(review_id = review.id, "dismissing 'changes requested' review");
                match api.dismiss_review(pr, review.id, message).await {
                    Ok(()) => report.dismissed.push(review.id),
                    Err(e) => {
                        warn!(review_id = review.id, error = %e, "dismissal failed");
                        report.failed.push(review.id);
                    }
                }
            }
            ReviewState::Pending => {
                info!(review_id = review.id, "deleting 'pending' review");
                match api.delete_pending_review(pr, review.id).await {
                    Ok(()) => report.deleted.push(review.id),
                    Err(e) => {
                        warn!(review_id = review.id, error = %e, "deletion failed");
                        report.failed.push(review.id);
                    }
                }
            }
            ReviewState::Other(_) => {}
        }
    }

    report
}
