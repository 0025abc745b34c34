//! `pr` subcommand.

use crate::{ctx::GgContext, git::{Commit, GitCli}, github::ReviewHost, stack::identifier};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `pr` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct SubmitCmd;

impl SubmitCmd {
    /// Run the `pr` subcommand.
    pub async fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let branch = ctx.current_element()?;
        let host = ctx.review_host()?;

        // Push the start branch and the branch itself, the pull request is based on the former.
        ctx.publish(&branch)?;

        if let Some(pull) = host.find_pull_request(&branch).await? {
            println!(
                "Pushed branch `{}`, pull request #{} is already {} @ `{}`",
                Color::Green.paint(&branch),
                pull.number,
                pull.state,
                Color::Blue.paint(pull.url)
            );
            return Ok(());
        }

        // Prompt the user for PR metadata.
        let metadata = Self::prompt_pr_metadata(&branch, ctx.first_commit(&branch)?)?;

        // Submit PR.
        let pull = ctx
            .create_pull_request(&host, &branch, metadata.title, metadata.body, metadata.is_draft)
            .await?;

        println!(
            "Submitted new pull request for branch `{}` @ `{}`",
            Color::Green.paint(&branch),
            Color::Blue.paint(pull.url)
        );
        Ok(())
    }

    /// Prompts the user for metadata about the PR, seeded from the element's first commit.
    fn prompt_pr_metadata(
        branch: &str,
        first_commit: Option<Commit>,
    ) -> Result<PRCreationMetadata> {
        let (title, body) = first_commit
            .map(|c| (c.title, c.body))
            .unwrap_or_default();

        let title = inquire::Text::new(
            format!(
                "Title of pull request (`{}` -> `{}`):",
                Color::Green.paint(branch),
                Color::Yellow.paint(identifier::marker_for(branch))
            )
            .as_str(),
        )
        .with_initial_value(&title)
        .prompt()?;
        let body = inquire::Editor::new("Pull request description")
            .with_predefined_text(&body)
            .prompt()?;
        let is_draft = inquire::Confirm::new("Is this PR a draft?")
            .with_default(false)
            .prompt()?;

        Ok(PRCreationMetadata {
            title,
            body,
            is_draft,
        })
    }
}

/// Metadata about pull request creation.
struct PRCreationMetadata {
    /// Title of the pull request.
    title: String,
    /// Body of the pull request.
    body: String,
    /// Whether or not the pull request is a draft.
    is_draft: bool,
}
