//! `del` subcommand.

use crate::{ctx::GgContext, git::GitCli};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `del` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct DeleteCmd {
    /// Delete the remote branches as well.
    #[arg(short, long)]
    remote: bool,
    /// Full name of the branch to delete. Defaults to the checked out branch.
    #[arg(short, long)]
    branch: Option<String>,
    /// Branch to check out when deleting the checked out branch. Defaults to the previous
    /// element of the stack.
    #[arg(short, long)]
    checkout: Option<String>,
    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
}

impl DeleteCmd {
    /// Run the `del` subcommand.
    pub fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let target = ctx.deletion_target(self.branch.as_deref())?;

        // Ask for confirmation to prevent accidental deletion of local refs.
        if !self.yes {
            let confirm = inquire::Confirm::new(
                format!(
                    "Are you sure you want to delete branch `{}`{}?",
                    Blue.paint(&target),
                    if self.remote { " (and its remote)" } else { "" }
                )
                .as_str(),
            )
            .with_default(false)
            .prompt()?;

            // Exit early if the user doesn't confirm.
            if !confirm {
                return Ok(());
            }
        }

        let outcome =
            ctx.delete_element(Some(target.as_str()), self.checkout.as_deref(), self.remote)?;

        if let Some(checked_out) = outcome.checked_out {
            println!("Checked out `{}`.", Blue.paint(checked_out));
        }
        println!(
            "Successfully deleted branch `{}`.",
            Blue.paint(outcome.deleted)
        );
        Ok(())
    }
}
