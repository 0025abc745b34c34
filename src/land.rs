//! Landing a stack element: gate on review and build, squash-merge, clean up, and restack
//! whatever was stacked on top of it.

use crate::{
    constants::BUILD_SUCCESS,
    errors::{GgError, GgResult},
    git::GitOps,
    github::{review_summary, PullRequestSnapshot, ReviewHost, ReviewVerdict},
    restack::Restacker,
    stack::identifier,
};

/// Options for [Lander::land].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandOptions {
    /// The branch to land onto, e.g. `main`.
    pub onto: String,
    /// Land even if the build did not succeed.
    pub ignore_build: bool,
    /// Restack the rest of the stack onto the landed change.
    pub cascade: bool,
    /// The `--strategy-option` used when restacking.
    pub strategy: Option<String>,
}

/// What a successful land did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandReport {
    /// The number of the merged pull request.
    pub number: u64,
    /// The URL of the merged pull request.
    pub url: String,
    /// The ref checked out after the landed branch was removed.
    pub checked_out: String,
    /// The elements restacked onto the landed change, in order.
    pub restacked: Vec<String>,
}

/// Lands stack elements through a [ReviewHost].
pub struct Lander<'a, G: GitOps, H: ReviewHost> {
    git: &'a G,
    host: &'a H,
}

impl<'a, G: GitOps, H: ReviewHost> Lander<'a, G, H> {
    /// Creates a new [Lander].
    pub fn new(git: &'a G, host: &'a H) -> Self {
        Self { git, host }
    }

    /// Checks that `branch` may land.
    ///
    /// ## Returns
    /// - `Ok(PullRequestSnapshot)` - The pull request exists, is approved, and its build
    ///   succeeded (or `ignore_build` is set).
    /// - `Err(GgError::PreconditionFailed)` - One of the gates failed.
    pub async fn check_preconditions(
        &self,
        branch: &str,
        ignore_build: bool,
    ) -> GgResult<PullRequestSnapshot> {
        let snapshot = PullRequestSnapshot::fetch(self.host, branch)
            .await?
            .ok_or_else(|| {
                GgError::PreconditionFailed(format!("no pull request exists for `{}`", branch))
            })?;

        if snapshot.verdict() != ReviewVerdict::Approved {
            return Err(GgError::PreconditionFailed(format!(
                "pull request #{} has not been accepted ({})",
                snapshot.pull_request.number,
                review_summary(&snapshot.reviews)
            )));
        }

        tracing::debug!(
            branch,
            build = %snapshot.build.state,
            checks = snapshot.build.total_count,
            "Pull request accepted"
        );
        if !ignore_build && snapshot.build.state != BUILD_SUCCESS {
            return Err(GgError::PreconditionFailed(format!(
                "build for `{}` is `{}`, not `{}`",
                branch, snapshot.build.state, BUILD_SUCCESS
            )));
        }

        Ok(snapshot)
    }

    /// Lands `branch` onto `options.onto`.
    ///
    /// Nothing is mutated until every precondition passed. The merge on the review host is
    /// not undone if a later step fails.
    pub async fn land(&self, branch: &str, options: &LandOptions) -> GgResult<LandReport> {
        let remaining = self.git.stack_index()?.after(branch)?;
        let snapshot = self.check_preconditions(branch, options.ignore_build).await?;
        let pull = &snapshot.pull_request;

        if !self.host.update_base(pull.number, &options.onto).await? {
            return Err(GgError::external(
                "update pull request base",
                format!("#{} was not retargeted onto `{}`", pull.number, options.onto),
            ));
        }

        let head = self.git.commit_at(branch)?;
        if !self
            .host
            .merge_squash(pull.number, &head.hash, &pull.squash_title(), &pull.body)
            .await?
        {
            return Err(GgError::MergeRejected(pull.number));
        }
        tracing::info!(
            branch,
            number = pull.number,
            sha = head.short_hash(),
            "Merged pull request"
        );

        self.git.fetch(&options.onto)?;

        let landing_ref = format!("{}/{}", self.git.remote_name(), options.onto);
        let checked_out = remaining
            .first()
            .cloned()
            .unwrap_or_else(|| landing_ref.clone());
        self.git.checkout(&checked_out)?;

        let marker = identifier::marker_for(branch);
        self.git.delete_branch_best_effort(branch);
        self.git.delete_branch_best_effort(&marker);
        self.git.delete_remote_branch_best_effort(branch);
        self.git.delete_remote_branch_best_effort(&marker);

        let restacked = if options.cascade {
            self.cascade(&remaining, &landing_ref, options).await?
        } else {
            Vec::new()
        };

        Ok(LandReport {
            number: pull.number,
            url: pull.url.clone(),
            checked_out,
            restacked,
        })
    }

    /// Restacks `remaining` in order, the first onto `landing_ref` and each following element
    /// onto its predecessor. Elements with a pull request are retargeted and force-pushed.
    async fn cascade(
        &self,
        remaining: &[String],
        landing_ref: &str,
        options: &LandOptions,
    ) -> GgResult<Vec<String>> {
        let restacker = Restacker::new(self.git).with_strategy(options.strategy.clone());
        let mut restacked = Vec::with_capacity(remaining.len());
        let mut onto = landing_ref.to_string();

        for element in remaining {
            let pull = self.host.find_pull_request(element).await?;
            if let Some(pull) = &pull {
                tracing::info!(
                    element = %element,
                    number = pull.number,
                    base = %options.onto,
                    "Updating base"
                );
                if !self.host.update_base(pull.number, &options.onto).await? {
                    return Err(GgError::external(
                        "update pull request base",
                        format!("#{} was not retargeted onto `{}`", pull.number, options.onto),
                    ));
                }
            }

            restacker.restack(element, &onto)?;
            if pull.is_some() {
                self.git.push(&[element.as_str()], true)?;
            }

            restacked.push(element.clone());
            onto = element.clone();
        }

        Ok(restacked)
    }
}
