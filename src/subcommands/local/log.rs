//! `log` subcommand.

use crate::{
    constants::COLORS,
    ctx::GgContext,
    git::{GitCli, GitOps},
    stack::identifier,
};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `log` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct LogCmd {
    /// Log every feature, not just the checked out one.
    #[arg(short, long)]
    all: bool,
}

impl LogCmd {
    /// Run the `log` subcommand.
    pub async fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let host = ctx.review_host()?;

        if !self.all {
            let feature = identifier::parse(&ctx.current_element()?)?.feature;
            for line in ctx.log_feature(&host, &feature).await? {
                println!("{}", line);
            }
            return Ok(());
        }

        let features = ctx.git.stack_index()?.all_features();
        for (i, feature) in features.iter().enumerate() {
            let lines = ctx.log_feature(&host, feature).await?;
            println!(
                "{} {}",
                COLORS[i % COLORS.len()].paint(feature),
                Color::Red.paint(format!("<{} branches>", lines.len()))
            );
            for line in lines {
                println!("{}", line);
            }
            println!();
        }
        Ok(())
    }
}
