//! The review-host capability, and its GitHub implementation.

use crate::errors::GgResult;
use chrono::{DateTime, Utc};
use std::future::Future;

pub mod client;
pub use client::GitHubHost;

mod verdict;
pub use verdict::{review_summary, user_review_status, ReviewVerdict};

/// Core metadata of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PullRequest {
    pub number: u64,
    pub state: String,
    pub title: String,
    pub body: String,
    pub url: String,
    pub head_ref: String,
    pub base_ref: String,
    pub author: String,
}

impl PullRequest {
    /// Returns the squash commit title GitHub should record for this pull request.
    pub fn squash_title(&self) -> String {
        format!("{} (#{})", self.title, self.number)
    }
}

/// Aggregate status of every check reported against a ref.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildStatus {
    /// `success`, `pending`, `failure` or `error`.
    pub state: String,
    /// The number of individual statuses that were combined.
    pub total_count: u64,
}

/// The state a review was submitted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other(String),
}

impl From<&str> for ReviewState {
    fn from(state: &str) -> Self {
        match state {
            "APPROVED" => Self::Approved,
            "CHANGES_REQUESTED" => Self::ChangesRequested,
            "COMMENTED" => Self::Commented,
            "DISMISSED" => Self::Dismissed,
            "PENDING" => Self::Pending,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A single review of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub state: ReviewState,
    /// Login of the reviewer.
    pub author: String,
    /// Submission time. Pending reviews have none.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A pull request to be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
    pub draft: bool,
}

/// The review-host operations `gg` needs.
///
/// "No pull request" is an expected answer and comes back as [None], never as an error.
pub trait ReviewHost {
    /// Returns the open pull request whose head is `branch`, if any.
    fn find_pull_request(
        &self,
        branch: &str,
    ) -> impl Future<Output = GgResult<Option<PullRequest>>> + Send;

    /// Returns every open pull request of the repository.
    fn list_open_pull_requests(&self) -> impl Future<Output = GgResult<Vec<PullRequest>>> + Send;

    /// Returns the combined status of the checks on `reference`.
    fn build_status(&self, reference: &str) -> impl Future<Output = GgResult<BuildStatus>> + Send;

    /// Returns the reviews of pull request `number`.
    fn reviews(&self, number: u64) -> impl Future<Output = GgResult<Vec<Review>>> + Send;

    /// Retargets pull request `number` onto `base`. Returns whether the host confirmed it.
    fn update_base(&self, number: u64, base: &str) -> impl Future<Output = GgResult<bool>> + Send;

    /// Squash-merges pull request `number`, guarded by the expected head `sha`. Returns
    /// whether the merge completed.
    fn merge_squash(
        &self,
        number: u64,
        sha: &str,
        title: &str,
        body: &str,
    ) -> impl Future<Output = GgResult<bool>> + Send;

    /// Opens a new pull request.
    fn create_pull_request(
        &self,
        request: NewPullRequest,
    ) -> impl Future<Output = GgResult<PullRequest>> + Send;

    /// Returns the login of the authenticated user.
    fn current_user_login(&self) -> impl Future<Output = GgResult<String>> + Send;
}

/// A pull request together with its build and reviews, fetched for one operation.
#[derive(Debug, Clone)]
pub struct PullRequestSnapshot {
    pub pull_request: PullRequest,
    pub build: BuildStatus,
    pub reviews: Vec<Review>,
}

impl PullRequestSnapshot {
    /// Fetches the snapshot of the pull request for `branch`, or [None] without one.
    pub async fn fetch<H: ReviewHost>(host: &H, branch: &str) -> GgResult<Option<Self>> {
        let Some(pull_request) = host.find_pull_request(branch).await? else {
            return Ok(None);
        };
        let build = host.build_status(branch).await?;
        let reviews = host.reviews(pull_request.number).await?;

        Ok(Some(Self {
            pull_request,
            build,
            reviews,
        }))
    }

    /// Returns the landing verdict of the reviews.
    pub fn verdict(&self) -> ReviewVerdict {
        ReviewVerdict::of(&self.reviews)
    }
}
