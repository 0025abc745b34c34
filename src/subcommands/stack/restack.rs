//! `rebase` and `rebaseall` subcommands.

use crate::{ctx::GgContext, git::GitCli};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `rebase` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct RebaseCmd {
    /// Git ref to rebase onto. Defaults to the previous element of the stack.
    #[arg(short, long)]
    onto: Option<String>,
    /// Strategy option for cherry-pick, e.g. `theirs`.
    #[arg(short, long)]
    strategy: Option<String>,
    /// Abort the rebase in progress.
    #[arg(short, long, conflicts_with = "resume")]
    abort: bool,
    /// Continue the rebase in progress once conflicts are resolved.
    #[arg(short = 'c', long = "continue")]
    resume: bool,
}

impl RebaseCmd {
    /// Run the `rebase` subcommand.
    pub fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        if self.abort {
            let target = ctx.rebase_abort()?;
            println!("Aborted rebase of `{}`.", Blue.paint(target));
            return Ok(());
        }
        if self.resume {
            let target = ctx.rebase_continue()?;
            println!("Rebased `{}`.", Blue.paint(target));
            return Ok(());
        }

        let onto = ctx.rebase_current(self.onto.as_deref(), self.strategy)?;
        println!(
            "Rebased `{}` onto `{}`.",
            Blue.paint(ctx.current_element()?),
            Blue.paint(onto)
        );
        Ok(())
    }
}

/// CLI arguments for the `rebaseall` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct RebaseAllCmd {
    /// Git ref to rebase the first element onto, when it has no previous element.
    #[arg(short, long)]
    onto: Option<String>,
    /// Strategy option for cherry-pick, e.g. `theirs`.
    #[arg(short, long)]
    strategy: Option<String>,
    /// Force-push every rebased element that has a pull request.
    #[arg(short, long)]
    push: bool,
    /// Abort the rebase in progress.
    #[arg(short, long, conflicts_with = "resume")]
    abort: bool,
    /// Continue the rebase in progress, then rebase the rest of the stack.
    #[arg(short = 'c', long = "continue")]
    resume: bool,
}

impl RebaseAllCmd {
    /// Run the `rebaseall` subcommand.
    pub async fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        if self.abort {
            let target = ctx.rebase_abort()?;
            println!("Aborted rebase of `{}`.", Blue.paint(target));
            return Ok(());
        }

        let host = if self.push {
            Some(ctx.review_host()?)
        } else {
            None
        };

        let rebased = if self.resume {
            ctx.rebase_all_continue(self.strategy, host.as_ref())
                .await?
        } else {
            ctx.rebase_all(self.onto.as_deref(), self.strategy, host.as_ref())
                .await?
        };

        for branch in rebased {
            println!("Rebased `{}`.", Blue.paint(branch));
        }
        Ok(())
    }
}
