//! `updatebase` subcommand.

use crate::{ctx::GgContext, git::GitCli};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `updatebase` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct UpdateBaseCmd {
    /// Remote branch the pull request should target.
    #[arg(short, long)]
    onto: String,
}

impl UpdateBaseCmd {
    /// Run the `updatebase` subcommand.
    pub async fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let host = ctx.review_host()?;
        let pull = ctx.update_base(&host, &self.onto).await?;

        println!(
            "Pull request #{} retargeted from `{}` onto `{}`.",
            pull.number,
            pull.base_ref,
            Blue.paint(&self.onto)
        );
        Ok(())
    }
}
