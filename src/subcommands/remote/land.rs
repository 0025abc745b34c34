//! `land` subcommand.

use crate::{
    ctx::GgContext,
    git::GitCli,
    land::{LandOptions, Lander},
};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::{Blue, Green};

/// CLI arguments for the `land` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct LandCmd {
    /// Remote branch to land onto. Defaults to the configured trunk.
    #[arg(short, long)]
    onto: Option<String>,
    /// Land even if the build has not succeeded.
    #[arg(long)]
    ignore_tests: bool,
    /// Rebase the rest of the stack onto the landed change.
    #[arg(long)]
    cascade: bool,
    /// Strategy option for cherry-pick while cascading.
    #[arg(short, long)]
    strategy: Option<String>,
}

impl LandCmd {
    /// Run the `land` subcommand on the checked out element.
    pub async fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let branch = ctx.current_element()?;
        let host = ctx.review_host()?;
        let options = LandOptions {
            onto: self.onto.unwrap_or_else(|| ctx.config.trunk.clone()),
            ignore_build: self.ignore_tests,
            cascade: self.cascade,
            strategy: self.strategy,
        };

        let report = Lander::new(&ctx.git, &host).land(&branch, &options).await?;

        println!(
            "Landed `{}` onto `{}` @ `{}`",
            Green.paint(&branch),
            Blue.paint(&options.onto),
            Blue.paint(report.url)
        );
        for rebased in &report.restacked {
            println!("Rebased `{}`.", Blue.paint(rebased));
        }
        println!("Checked out `{}`.", Blue.paint(report.checked_out));
        Ok(())
    }
}
