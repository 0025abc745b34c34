//! Utilities for interacting with `git` repositories for the `gg` application.

use crate::{
    errors::{GgError, GgResult},
    stack::StackIndex,
};
use git2::{
    build::CheckoutBuilder, BranchType, ErrorCode, Object, ObjectType, Repository, ResetType, Sort,
};
use std::{env, path::PathBuf, process::Command};

/// Returns the repository for the current working directory, and [None] if
/// the current working directory is not within a git repository or an error
/// occurs.
pub fn active_repository() -> Option<Repository> {
    Repository::discover(env::current_dir().ok()?).ok()
}

/// Summary of a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The full commit hash.
    pub hash: String,
    /// The first line of the commit message.
    pub title: String,
    /// The author's name.
    pub author: String,
    /// The commit message after the title.
    pub body: String,
}

impl Commit {
    /// Returns the abbreviated hash of the commit.
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }
}

/// The version-control operations `gg` needs from git.
///
/// Every method is a single blocking call. Failures surface as [GgError::ExternalCallFailure].
pub trait GitOps {
    /// Returns the name of the checked out branch, or [None] on a detached HEAD.
    fn current_branch(&self) -> GgResult<Option<String>>;

    /// Returns the names of all local branches.
    fn all_branches(&self) -> GgResult<Vec<String>>;

    /// Checks out `reference`. Non-branch references detach HEAD.
    fn checkout(&self, reference: &str) -> GgResult<()>;

    /// Creates `branch` at `from` and checks it out.
    fn checkout_new(&self, branch: &str, from: &str) -> GgResult<()>;

    /// Deletes the local `branch`, regardless of merge status.
    fn delete_branch(&self, branch: &str) -> GgResult<()>;

    /// Deletes `branch` on `remote`.
    fn delete_remote_branch(&self, remote: &str, branch: &str) -> GgResult<()>;

    /// Pushes `branches` to the configured remote.
    fn push(&self, branches: &[&str], force: bool) -> GgResult<()>;

    /// Fetches `branch` from the configured remote, pruning deleted refs.
    fn fetch(&self, branch: &str) -> GgResult<()>;

    /// Hard-resets the checked out branch (or detached HEAD) to `reference`.
    fn reset_hard(&self, reference: &str) -> GgResult<()>;

    /// Cherry-picks the commits in `start..end` onto HEAD.
    ///
    /// ## Takes
    /// - `start` - The exclusive start of the range.
    /// - `end` - The inclusive end of the range.
    /// - `strategy` - An optional `--strategy-option` for the merge machinery.
    fn cherry_pick_range(&self, start: &str, end: &str, strategy: Option<&str>) -> GgResult<()>;

    /// Resumes a cherry-pick stopped on a conflict.
    fn cherry_pick_continue(&self) -> GgResult<()>;

    /// Cancels an in-progress cherry-pick.
    fn cherry_pick_abort(&self) -> GgResult<()>;

    /// Returns the commit `reference` points at.
    fn commit_at(&self, reference: &str) -> GgResult<Commit>;

    /// Returns the commits in `start..end`, newest first.
    fn commits_between(&self, start: &str, end: &str) -> GgResult<Vec<Commit>>;

    /// Shows the diff of the working copy against `reference`.
    fn diff(&self, reference: &str) -> GgResult<()>;

    /// Starts an interactive rebase of HEAD onto `reference`.
    fn interactive_rebase(&self, reference: &str) -> GgResult<()>;

    /// Returns the name of the remote `gg` pushes to and fetches from.
    fn remote_name(&self) -> &str;

    /// Takes a snapshot of the local branches as a [StackIndex].
    fn stack_index(&self) -> GgResult<StackIndex> {
        Ok(StackIndex::new(self.all_branches()?))
    }

    /// Deletes a local branch, logging instead of failing.
    fn delete_branch_best_effort(&self, branch: &str) {
        if let Err(e) = self.delete_branch(branch) {
            tracing::warn!(branch, error = %e, "Could not delete branch");
        }
    }

    /// Deletes a remote branch, logging instead of failing.
    fn delete_remote_branch_best_effort(&self, branch: &str) {
        if let Err(e) = self.delete_remote_branch(self.remote_name(), branch) {
            tracing::warn!(branch, error = %e, "Could not delete remote branch");
        }
    }
}

/// [GitOps] backed by libgit2, shelling out to the `git` binary for the operations
/// libgit2 does not support (cherry-pick ranges, transport, diff, interactive rebase).
pub struct GitCli {
    /// The repository being operated on.
    repository: Repository,
    /// The remote to push to and fetch from.
    remote: String,
}

impl GitCli {
    /// Creates a new [GitCli] for `repository`, talking to `remote`.
    pub fn new(repository: Repository, remote: impl Into<String>) -> Self {
        Self {
            repository,
            remote: remote.into(),
        }
    }

    /// Returns the URL of the configured remote.
    pub fn remote_url(&self) -> GgResult<String> {
        let remote = self.repository.find_remote(&self.remote)?;
        remote
            .url()
            .map(ToOwned::to_owned)
            .ok_or_else(|| {
                GgError::external(
                    "git remote",
                    format!("remote `{}` has no URL", self.remote),
                )
            })
    }

    /// Resolves `reference` to a commit object.
    fn resolve(&self, reference: &str) -> GgResult<Object<'_>> {
        Ok(self.repository.revparse_single(reference)?.peel(ObjectType::Commit)?)
    }

    fn workdir(&self) -> GgResult<PathBuf> {
        self.repository
            .workdir()
            .map(ToOwned::to_owned)
            .ok_or_else(|| GgError::external("git", "repository has no working directory"))
    }

    /// Runs the `git` binary in the working directory with inherited stdio.
    fn run(&self, args: &[&str]) -> GgResult<()> {
        tracing::debug!(?args, "Running git");
        let status = Command::new("git")
            .args(args)
            .current_dir(self.workdir()?)
            .status()
            .map_err(|e| GgError::external(format!("git {}", args.join(" ")), e))?;

        if !status.success() {
            return Err(GgError::external(
                format!("git {}", args.join(" ")),
                format!("exited with {}", status),
            ));
        }
        Ok(())
    }
}

impl GitOps for GitCli {
    fn current_branch(&self) -> GgResult<Option<String>> {
        let head = match self.repository.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(ToOwned::to_owned))
    }

    fn all_branches(&self) -> GgResult<Vec<String>> {
        let mut names = Vec::new();
        for branch in self.repository.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn checkout(&self, reference: &str) -> GgResult<()> {
        tracing::debug!(reference, "Checking out");
        let mut opts = CheckoutBuilder::new();
        opts.safe();

        match self.repository.find_branch(reference, BranchType::Local) {
            Ok(branch) => {
                let target = branch.get().peel(ObjectType::Commit)?;
                self.repository.checkout_tree(&target, Some(&mut opts))?;
                self.repository
                    .set_head(format!("refs/heads/{}", reference).as_str())?;
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                let target = self.resolve(reference)?;
                self.repository.checkout_tree(&target, Some(&mut opts))?;
                self.repository.set_head_detached(target.id())?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn checkout_new(&self, branch: &str, from: &str) -> GgResult<()> {
        tracing::debug!(branch, from, "Creating branch");
        let commit = self.resolve(from)?.peel_to_commit()?;
        self.repository.branch(branch, &commit, false)?;
        self.checkout(branch)
    }

    fn delete_branch(&self, branch: &str) -> GgResult<()> {
        tracing::debug!(branch, "Deleting branch");
        self.repository
            .find_branch(branch, BranchType::Local)?
            .delete()?;
        Ok(())
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> GgResult<()> {
        self.run(&["push", remote, "--delete", branch])
    }

    fn push(&self, branches: &[&str], force: bool) -> GgResult<()> {
        let mut args = vec!["push"];
        if force {
            args.push("-f");
        }
        args.push(&self.remote);
        args.extend_from_slice(branches);
        self.run(&args)
    }

    fn fetch(&self, branch: &str) -> GgResult<()> {
        self.run(&["fetch", "-p", &self.remote, branch])
    }

    fn reset_hard(&self, reference: &str) -> GgResult<()> {
        tracing::debug!(reference, "Resetting");
        let target = self.resolve(reference)?;
        self.repository.reset(&target, ResetType::Hard, None)?;
        Ok(())
    }

    fn cherry_pick_range(&self, start: &str, end: &str, strategy: Option<&str>) -> GgResult<()> {
        let range = format!("{}..{}", start, end);
        match strategy {
            Some(strategy) => {
                let option = format!("--strategy-option={}", strategy);
                self.run(&["cherry-pick", &option, &range])
            }
            None => self.run(&["cherry-pick", &range]),
        }
    }

    fn cherry_pick_continue(&self) -> GgResult<()> {
        self.run(&["cherry-pick", "--continue"])
    }

    fn cherry_pick_abort(&self) -> GgResult<()> {
        self.run(&["cherry-pick", "--abort"])
    }

    fn commit_at(&self, reference: &str) -> GgResult<Commit> {
        let commit = self.resolve(reference)?.peel_to_commit()?;
        Ok(summarize(&commit))
    }

    fn commits_between(&self, start: &str, end: &str) -> GgResult<Vec<Commit>> {
        let mut walk = self.repository.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL)?;
        walk.push(self.resolve(end)?.id())?;
        walk.hide(self.resolve(start)?.id())?;

        walk.map(|oid| -> GgResult<Commit> {
            let commit = self.repository.find_commit(oid?)?;
            Ok(summarize(&commit))
        })
        .collect()
    }

    fn diff(&self, reference: &str) -> GgResult<()> {
        self.run(&["diff", reference])
    }

    fn interactive_rebase(&self, reference: &str) -> GgResult<()> {
        self.run(&["rebase", "-i", reference])
    }

    fn remote_name(&self) -> &str {
        &self.remote
    }
}

fn summarize(commit: &git2::Commit<'_>) -> Commit {
    Commit {
        hash: commit.id().to_string(),
        title: commit.summary().unwrap_or_default().to_string(),
        author: commit.author().name().unwrap_or_default().to_string(),
        body: commit.body().unwrap_or_default().trim().to_string(),
    }
}
