//! `push` subcommand.

use crate::{ctx::GgContext, git::GitCli};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::{Blue, Yellow};

/// CLI arguments for the `push` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct PushCmd {
    /// Push the start branch as well.
    #[arg(short, long)]
    start: bool,
}

impl PushCmd {
    /// Run the `push` subcommand. Only branches with a pull request are pushed.
    pub async fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let branch = ctx.current_element()?;
        let host = ctx.review_host()?;

        if ctx.push_if_reviewed(&host, &branch, self.start).await? {
            println!("Pushed `{}`.", Blue.paint(&branch));
        } else {
            println!(
                "`{}` has no pull request, run `{}` first.",
                Blue.paint(&branch),
                Yellow.paint("gg pr")
            );
        }
        Ok(())
    }
}
