//! `diff` subcommand.

use crate::{ctx::GgContext, git::{GitCli, GitOps}, stack::identifier};
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `diff` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct DiffCmd;

impl DiffCmd {
    /// Run the `diff` subcommand: the working copy against the element's start branch.
    pub fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let current = ctx.current_element()?;
        ctx.git.diff(&identifier::marker_for(&current))?;
        Ok(())
    }
}
