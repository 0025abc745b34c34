//! Contains the formatting logic for the [GgContext] struct.

use super::GgContext;
use crate::{
    constants::{EMPTY_CIRCLE, FILLED_CIRCLE},
    errors::GgResult,
    git::GitOps,
    github::{review_summary, user_review_status, PullRequestSnapshot, ReviewHost},
    stack::{identifier, DisplayBranch, LogLine, ReviewLine},
};
use nu_ansi_term::Color;

impl<G: GitOps> GgContext<G> {
    /// Gathers the [DisplayBranch]es of `feature`, newest first, without asking the review
    /// host.
    ///
    /// This function is particularly useful when creating prompts with [inquire::Select].
    pub fn display_branches(&self, feature: &str) -> GgResult<Vec<DisplayBranch>> {
        let checked_out = self.git.current_branch()?;

        self.git
            .stack_index()?
            .all_for_feature(feature)
            .into_iter()
            .map(|branch| -> GgResult<DisplayBranch> {
                let icon = if checked_out.as_deref() == Some(branch.as_str()) {
                    FILLED_CIRCLE
                } else {
                    EMPTY_CIRCLE
                };
                let title = self
                    .git
                    .commits_between(&identifier::marker_for(&branch), &branch)?
                    .into_iter()
                    .next()
                    .map(|c| c.title)
                    .unwrap_or_else(|| "<no commits>".to_string());

                Ok(DisplayBranch {
                    display_value: format!("{} {}\t{}", icon, Color::Green.paint(&branch), title),
                    branch_name: branch,
                })
            })
            .collect()
    }

    /// Builds the `gg log` line of `branch`.
    pub async fn log_line<H: ReviewHost>(&self, host: &H, branch: &str) -> GgResult<LogLine> {
        let newest_commit = self
            .git
            .commits_between(&identifier::marker_for(branch), branch)?
            .into_iter()
            .next()
            .map(|c| c.title);

        let mut line = LogLine {
            branch: branch.to_string(),
            checked_out: self.git.current_branch()?.as_deref() == Some(branch),
            title: newest_commit,
            ..Default::default()
        };

        if let Some(snapshot) = PullRequestSnapshot::fetch(host, branch).await? {
            line.url = Some(snapshot.pull_request.url.clone());
            line.build = Some(snapshot.build.state.clone());
            line.review = Some(review_summary(&snapshot.reviews).to_string());
            if !snapshot.pull_request.title.is_empty() {
                line.title = Some(snapshot.pull_request.title);
            }
        }

        Ok(line)
    }

    /// Builds the `gg log` lines of every element of `feature`, newest first.
    pub async fn log_feature<H: ReviewHost>(
        &self,
        host: &H,
        feature: &str,
    ) -> GgResult<Vec<LogLine>> {
        let mut lines = Vec::new();
        for branch in self.git.stack_index()?.all_for_feature(feature) {
            lines.push(self.log_line(host, &branch).await?);
        }
        Ok(lines)
    }

    /// Builds the `gg review` lines: open pull requests authored by someone else.
    pub async fn review_lines<H: ReviewHost>(&self, host: &H) -> GgResult<Vec<ReviewLine>> {
        let login = host.current_user_login().await?;

        let mut lines = Vec::new();
        for pull in host.list_open_pull_requests().await? {
            if pull.author == login {
                continue;
            }

            let build = host.build_status(&pull.head_ref).await?;
            let reviews = host.reviews(pull.number).await?;
            lines.push(ReviewLine {
                url: pull.url,
                build: build.state,
                review: review_summary(&reviews).to_string(),
                own_review: user_review_status(&login, &reviews).to_string(),
                author: pull.author,
                title: pull.title,
            });
        }
        Ok(lines)
    }
}
