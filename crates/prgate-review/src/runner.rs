use prgate_core::rules::pattern_source;
use prgate_core::{CommentTemplates, PrGateError, PullRequestContext, RuleSet};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::cleanup::{cleanup_prior_reviews, CleanupReport, PASSED_MESSAGE};
use crate::decision::{Decision, Outcome};
use crate::github::ReviewApi;

/// Knobs for a single lint run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Author whose earlier reviews are cleared before approving.
    pub bot_login: String,
    /// Message left on dismissed reviews.
    pub dismiss_message: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            bot_login: prgate_core::config::DEFAULT_BOT_LOGIN.into(),
            dismiss_message: PASSED_MESSAGE.into(),
        }
    }
}

/// Result of a lint run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// `owner/repo#number` of the linted pull request.
    pub pull_request: String,
    pub decision: Decision,
    /// Present when the outcome approved and cleanup ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupReport>,
    /// Whether a review was submitted.
    pub submitted: bool,
}

/// Evaluate a pull request without calling GitHub.
///
/// The returned report has `submitted == false` and no cleanup.
pub fn plan(pr: &PullRequestContext, rules: &RuleSet, templates: &CommentTemplates) -> RunReport {
    debug!(body = %pr.body, "pull request body");
    debug!(title = %pr.title, "pull request title");
    debug!(
        trigger = pattern_source(rules.trigger()),
        body = pattern_source(rules.body()),
        title = pattern_source(rules.title()),
        "patterns"
    );

    let decision = Decision::evaluate(rules, templates, &pr.title, &pr.body);
    log_outcome(&decision, rules);

    RunReport {
        pull_request: pr.to_string(),
        decision,
        cleanup: None,
        submitted: false,
    }
}

/// Lint a pull request and submit the resulting review.
///
/// Approvals first clear the bot's earlier reviews; cleanup finishes before
/// the approval is posted. Nothing is retried.
///
/// # Errors
///
/// Returns [`PrGateError::GitHub`] if the review could not be submitted.
/// Cleanup failures are logged and reported in [`RunReport::cleanup`].
pub async fn run<A>(
    api: &A,
    pr: &PullRequestContext,
    rules: &RuleSet,
    templates: &CommentTemplates,
    options: &RunOptions,
) -> Result<RunReport, PrGateError>
where
    A: ReviewApi + ?Sized,
{
    let mut report = plan(pr, rules, templates);

    if report.decision.outcome.dismisses_prior_reviews() {
        report.cleanup = Some(
            cleanup_prior_reviews(api, pr, &options.bot_login, &options.dismiss_message).await,
        );
        info!("approving the pull request");
    } else {
        info!("requesting changes to the pull request");
    }

    api.create_review(pr, &report.decision.comment, report.decision.event)
        .await?;
    report.submitted = true;
    Ok(report)
}

fn log_outcome(decision: &Decision, rules: &RuleSet) {
    let trigger = pattern_source(rules.trigger());
    let body = pattern_source(rules.body());
    let title = pattern_source(rules.title());
    match decision.outcome {
        Outcome::RequestChangesCombined => {
            error!("the PR title matches the regex {trigger}, and the body does NOT match the regex {body}");
            error!("the PR title does NOT match the regex {title}");
        }
        Outcome::RequestChangesBody => {
            error!("the PR title matches the regex {trigger}, and the body does NOT match the regex {body}");
        }
        Outcome::RequestChangesTitle => {
            error!("the PR title does NOT match the regex {title}");
        }
        Outcome::ApproveCombined => {
            info!("the PR title matches the regex {trigger}, the body matches the regex {body}, and the title matches the regex {title}");
        }
        Outcome::ApproveTitle => {
            info!("the PR title matches the regex {title}");
        }
    }
}
