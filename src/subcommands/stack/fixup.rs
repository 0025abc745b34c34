//! `fixup` subcommand.

use crate::{ctx::GgContext, git::{GitCli, GitOps}, stack::identifier};
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `fixup` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct FixupCmd;

impl FixupCmd {
    /// Run the `fixup` subcommand: an interactive rebase of the element's own commits.
    pub fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let current = ctx.current_element()?;
        ctx.git
            .interactive_rebase(&identifier::marker_for(&current))?;
        Ok(())
    }
}
