//! `renum` subcommand.

use crate::{ctx::GgContext, git::GitCli};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `renum` subcommand.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct RenumberCmd {
    /// The new position of the checked out element.
    #[arg(short, long)]
    part: f64,
}

impl RenumberCmd {
    /// Run the `renum` subcommand.
    pub fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let current = ctx.current_element()?;
        let renamed = ctx.renumber_element(self.part)?;

        println!(
            "Renumbered `{}` to `{}`.",
            Blue.paint(current),
            Blue.paint(renamed)
        );
        Ok(())
    }
}
