//! Formatting for stack elements in `gg log` and branch prompts.

use crate::constants::{EMPTY_CIRCLE, FILLED_CIRCLE};
use nu_ansi_term::Color;
use std::fmt::{self, Display};

/// One row of `gg log`: a stack element with what the review host knows about it.
#[derive(Debug, Clone, Default)]
pub struct LogLine {
    /// The element's branch name.
    pub branch: String,
    /// Whether the element is checked out.
    pub checked_out: bool,
    /// The pull request URL, if one exists.
    pub url: Option<String>,
    /// The aggregate build state of the branch.
    pub build: Option<String>,
    /// The review summary of the pull request.
    pub review: Option<String>,
    /// The pull request title, or the newest commit title without one.
    pub title: Option<String>,
}

impl Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = if self.checked_out {
            FILLED_CIRCLE
        } else {
            EMPTY_CIRCLE
        };

        write!(
            f,
            "{} {}\t{}\t{}\t{}\t{}",
            icon,
            or_placeholder(self.url.as_deref(), Color::White, "<no url>"),
            or_placeholder(self.build.as_deref(), Color::Red, "<no build>"),
            or_placeholder(self.review.as_deref(), Color::LightBlue, "<no reviews>"),
            Color::Green.paint(&self.branch),
            self.title.as_deref().unwrap_or("<no commits>"),
        )
    }
}

/// One row of `gg review`: an open pull request authored by someone else.
#[derive(Debug, Clone, Default)]
pub struct ReviewLine {
    pub url: String,
    pub build: String,
    /// The review summary across all reviewers.
    pub review: String,
    /// The current user's own latest decision, or `TO_REVIEW`.
    pub own_review: String,
    pub author: String,
    pub title: String,
}

impl Display for ReviewLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}({})\t{}\t{}",
            or_placeholder(Some(self.url.as_str()), Color::White, "<no url>"),
            or_placeholder(Some(self.build.as_str()), Color::Red, "<no build>"),
            Color::LightBlue.paint(&self.review),
            Color::Green.paint(&self.own_review),
            or_placeholder(Some(self.author.as_str()), Color::Green, "<no author>"),
            self.title,
        )
    }
}

fn or_placeholder(value: Option<&str>, color: Color, placeholder: &str) -> String {
    match value {
        Some(value) if !value.is_empty() => color.paint(value).to_string(),
        _ => placeholder.to_string(),
    }
}

/// A pair of a log-line and a branch name, which implements [Display].
#[derive(Debug)]
pub struct DisplayBranch {
    /// The log-line to display.
    pub(crate) display_value: String,
    /// The branch name corresponding to the log-line.
    pub(crate) branch_name: String,
}

impl Display for DisplayBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_value)
    }
}
