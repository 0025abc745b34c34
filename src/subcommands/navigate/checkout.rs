//! `co` subcommand.

use crate::{
    ctx::{CheckoutTarget, GgContext},
    errors::GgError,
    git::{GitCli, GitOps},
    stack::identifier,
};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color::Blue;

/// CLI arguments for the `co` subcommand.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct CheckoutCmd {
    /// Check out the next element of the stack.
    #[arg(short, long, conflicts_with_all = ["prev", "part"])]
    next: bool,
    /// Check out the previous element of the stack.
    #[arg(short, long, conflicts_with = "part")]
    prev: bool,
    /// Part number to check out, in the checked out feature unless `--feature` is given.
    #[arg(short = 'a', long)]
    part: Option<f64>,
    /// Feature to check out. Its first element unless `--part` is given.
    #[arg(short, long)]
    feature: Option<String>,
}

impl CheckoutCmd {
    /// Run the `co` subcommand.
    ///
    /// Without any flag, prompts for an element of the checked out feature.
    pub fn run(self, ctx: GgContext<GitCli>) -> Result<()> {
        let branch = match self.target() {
            Some(target) => ctx.checkout_element(&target)?,
            None => {
                let feature = identifier::parse(&ctx.current_element()?)?.feature;
                let branches = ctx.display_branches(&feature)?;
                if branches.is_empty() {
                    return Err(GgError::CannotDetermineTarget(format!(
                        "feature `{}` has no elements",
                        feature
                    ))
                    .into());
                }

                let branch = inquire::Select::new("Select a branch to checkout", branches)
                    .with_formatter(&|f| f.value.branch_name.clone())
                    .prompt()?
                    .branch_name;
                ctx.git.checkout(&branch)?;
                branch
            }
        };

        println!("Checked out `{}`.", Blue.paint(branch));
        Ok(())
    }

    /// Maps the flags to a [CheckoutTarget], or [None] when none was given.
    fn target(&self) -> Option<CheckoutTarget> {
        if self.next {
            Some(CheckoutTarget::Next)
        } else if self.prev {
            Some(CheckoutTarget::Previous)
        } else if let Some(part) = self.part {
            Some(CheckoutTarget::Part {
                feature: self.feature.clone(),
                part,
            })
        } else {
            self.feature.clone().map(CheckoutTarget::Feature)
        }
    }
}
