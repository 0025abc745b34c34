//! `new` subcommand.

use crate::{ctx::GgContext, git::GitCli};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `new` subcommand.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct NewCmd {
    /// Feature name (collection of changes). Defaults to the checked out feature.
    #[arg(short, long)]
    feature: Option<String>,
    /// Change name of the new element.
    #[arg(short, long)]
    change: Option<String>,
    /// Position of the new element in the stack. Defaults to `1.0` for a new feature, or the
    /// checked out part plus one.
    #[arg(short, long)]
    part: Option<f64>,
}

impl NewCmd {
    /// Run the `new` subcommand.
    pub fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let element =
            ctx.create_element(self.feature.as_deref(), self.change.as_deref(), self.part)?;

        println!(
            "Created branch `{}` with start branch `{}`.",
            Blue.paint(element.identifier()),
            Blue.paint(element.marker_identifier())
        );
        Ok(())
    }
}
