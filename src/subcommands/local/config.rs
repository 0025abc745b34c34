//! `config` subcommand.

use crate::{ctx::GgContext, git::GitCli};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `config` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ConfigCmd;

impl ConfigCmd {
    /// Run the `config` subcommand.
    pub fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        ctx.config.require_token(&ctx.config_path)?;

        println!(
            "Configuration successfully initialized at: {:?}",
            ctx.config_path
        );
        println!("remote: `{}`", Blue.paint(&ctx.config.remote));
        println!("trunk:  `{}`", Blue.paint(&ctx.config.trunk));
        if let Ok(slug) = ctx.slug() {
            println!(
                "repository: `{}`",
                Blue.paint(format!("{}/{}/{}", slug.host, slug.owner, slug.name))
            );
        }
        Ok(())
    }
}
