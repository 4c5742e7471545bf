use std::sync::Mutex;

use async_trait::async_trait;
use prgate_core::{ExistingReview, PrGateError, PullRequestContext, ReviewEvent};

use crate::github::ReviewApi;

/// A recorded call against [`FakeReviewApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Create { event: ReviewEvent, body: String },
    List,
    Dismiss { review_id: u64, message: String },
    Delete { review_id: u64 },
}

/// In-memory review API that records every call in order.
#[derive(Default)]
pub(crate) struct FakeReviewApi {
    reviews: Vec<ExistingReview>,
    fail_list: bool,
    fail_create: bool,
    failing_reviews: Vec<u64>,
    calls: Mutex<Vec<Call>>,
}

impl FakeReviewApi {
    pub(crate) fn with_reviews(reviews: Vec<ExistingReview>) -> Self {
        Self {
            reviews,
            ..Self::default()
        }
    }

    pub(crate) fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub(crate) fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub(crate) fn failing_review(mut self, review_id: u64) -> Self {
        self.failing_reviews.push(review_id);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn pr() -> PullRequestContext {
        PullRequestContext {
            owner: "acme".into(),
            repo: "site".into(),
            number: 7,
            title: String::new(),
            body: String::new(),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn outcome(&self, review_id: u64) -> Result<(), PrGateError> {
        if self.failing_reviews.contains(&review_id) {
            Err(PrGateError::GitHub(format!("review {review_id} rejected")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReviewApi for FakeReviewApi {
    async fn create_review(
        &self,
        _pr: &PullRequestContext,
        body: &str,
        event: ReviewEvent,
    ) -> Result<(), PrGateError> {
        self.record(Call::Create {
            event,
            body: body.to_string(),
        });
        if self.fail_create {
            return Err(PrGateError::GitHub("422 Unprocessable Entity".into()));
        }
        Ok(())
    }

    async fn list_reviews(
        &self,
        _pr: &PullRequestContext,
    ) -> Result<Vec<ExistingReview>, PrGateError> {
        self.record(Call::List);
        if self.fail_list {
            return Err(PrGateError::GitHub("403 rate limited".into()));
        }
        Ok(self.reviews.clone())
    }

    async fn dismiss_review(
        &self,
        _pr: &PullRequestContext,
        review_id: u64,
        message: &str,
    ) -> Result<(), PrGateError> {
        self.record(Call::Dismiss {
            review_id,
            message: message.to_string(),
        });
        self.outcome(review_id)
    }

    async fn delete_pending_review(
        &self,
        _pr: &PullRequestContext,
        review_id: u64,
    ) -> Result<(), PrGateError> {
        self.record(Call::Delete { review_id });
        self.outcome(review_id)
    }
}
