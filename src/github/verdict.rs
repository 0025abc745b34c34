//! Folding a pull request's reviews into a verdict.

use super::{Review, ReviewState};
use itertools::Itertools;

/// Whether a pull request's reviews allow it to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewVerdict {
    Approved,
    Rejected,
}

impl ReviewVerdict {
    /// Computes the verdict of `reviews`.
    ///
    /// Each reviewer's latest approval or change request counts. Any outstanding change
    /// request rejects; otherwise at least one approval is required.
    pub fn of(reviews: &[Review]) -> Self {
        if review_summary(reviews) == "APPROVED" {
            Self::Approved
        } else {
            Self::Rejected
        }
    }
}

/// Returns `APPROVED`, `CHANGES_REQUESTED` or `IN_REVIEW` for `reviews`.
pub fn review_summary(reviews: &[Review]) -> &'static str {
    let latest = latest_decisions(reviews);
    if latest
        .iter()
        .any(|(_, state)| *state == ReviewState::ChangesRequested)
    {
        "CHANGES_REQUESTED"
    } else if latest.is_empty() {
        "IN_REVIEW"
    } else {
        "APPROVED"
    }
}

/// Returns the latest decision `user` submitted on `reviews`, or `TO_REVIEW`.
pub fn user_review_status(user: &str, reviews: &[Review]) -> &'static str {
    latest_decisions(reviews)
        .into_iter()
        .find(|(author, _)| *author == user)
        .map_or("TO_REVIEW", |(_, state)| match state {
            ReviewState::ChangesRequested => "CHANGES_REQUESTED",
            _ => "APPROVED",
        })
}

/// Per reviewer, in first-seen order, the latest approval or change request.
fn latest_decisions(reviews: &[Review]) -> Vec<(&str, ReviewState)> {
    let mut latest: Vec<(&str, ReviewState)> = Vec::new();

    let decisions = reviews
        .iter()
        .filter(|review| {
            matches!(
                review.state,
                ReviewState::Approved | ReviewState::ChangesRequested
            )
        })
        .sorted_by_key(|review| review.submitted_at);

    for review in decisions {
        match latest
            .iter_mut()
            .find(|(author, _)| *author == review.author)
        {
            Some((_, state)) => *state = review.state.clone(),
            None => latest.push((review.author.as_str(), review.state.clone())),
        }
    }
    latest
}
