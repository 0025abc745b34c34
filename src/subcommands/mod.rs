//! The subcommands for the `gg` application.

use crate::{ctx::GgContext, git::GitCli};
use clap::Subcommand;

mod local;
use local::{ConfigCmd, DiffCmd, LogCmd};

mod navigate;
use navigate::CheckoutCmd;

mod remote;
use remote::{LandCmd, PushCmd, ReviewCmd, SubmitCmd, UpdateBaseCmd};

mod stack;
use stack::{DeleteCmd, FixupCmd, NewCmd, RebaseAllCmd, RebaseCmd, RenumberCmd};

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Create a new stack element on top of HEAD. Feature, change and part are inferred from the
    /// checked out branch when not given.
    New(NewCmd),
    /// Check out an element of a stack, relative to the checked out one or by feature and part.
    #[clap(name = "co", alias = "checkout")]
    Checkout(CheckoutCmd),
    /// Delete a branch and its start branch, by default the checked out one.
    #[clap(name = "del", alias = "delete")]
    Delete(DeleteCmd),
    /// Change the part number of the checked out element.
    #[clap(name = "renum", alias = "renumber")]
    Renumber(RenumberCmd),
    /// Rebase the checked out element onto the previous one (or `--onto`).
    Rebase(RebaseCmd),
    /// Rebase the checked out element and every element after it.
    #[clap(name = "rebaseall")]
    RebaseAll(RebaseAllCmd),
    /// Show the diff of the working copy against the element's start branch.
    Diff(DiffCmd),
    /// Interactively rebase the commits of the checked out element.
    Fixup(FixupCmd),
    /// Log the elements of the checked out feature with their pull request state.
    #[clap(aliases = ["l", "ls"])]
    Log(LogCmd),
    /// Push the checked out element and open a pull request for it.
    #[clap(name = "pr", alias = "submit")]
    Submit(SubmitCmd),
    /// Force-push the checked out element, if it has a pull request.
    Push(PushCmd),
    /// Point the pull request of the checked out element at another base.
    #[clap(name = "updatebase")]
    UpdateBase(UpdateBaseCmd),
    /// List open pull requests by others, with your own review status.
    Review(ReviewCmd),
    /// Squash-merge the pull request of the checked out element and clean up after it.
    Land(LandCmd),
    /// Print the configuration.
    Config(ConfigCmd),
}

impl Subcommands {
    /// Run the subcommand with the given context.
    pub async fn run(self, ctx: GgContext<GitCli>) -> anyhow::Result<()> {
        match self {
            Self::New(args) => args.run(ctx),
            Self::Checkout(args) => args.run(ctx),
            Self::Delete(args) => args.run(ctx),
            Self::Renumber(args) => args.run(ctx),
            Self::Rebase(args) => args.run(ctx),
            Self::RebaseAll(args) => args.run(ctx).await,
            Self::Diff(args) => args.run(ctx),
            Self::Fixup(args) => args.run(ctx),
            Self::Log(args) => args.run(ctx).await,
            Self::Submit(args) => args.run(ctx).await,
            Self::Push(args) => args.run(ctx).await,
            Self::UpdateBase(args) => args.run(ctx).await,
            Self::Review(args) => args.run(ctx).await,
            Self::Land(args) => args.run(ctx).await,
            Self::Config(args) => args.run(ctx),
        }
    }
}
