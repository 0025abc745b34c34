//! `review` subcommand.

use crate::{ctx::GgContext, git::GitCli};
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `review` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ReviewCmd;

impl ReviewCmd {
    /// Run the `review` subcommand: open pull requests awaiting someone else's review.
    pub async fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let host = ctx.review_host()?;
        let lines = ctx.review_lines(&host).await?;

        if lines.is_empty() {
            println!("Nothing to review.");
        }
        for line in lines {
            println!("{}", line);
        }
        Ok(())
    }
}
