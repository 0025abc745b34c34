//! Actions that can be dispatched by the user.

use super::GgContext;
use crate::{
    constants::DEFAULT_POSITION,
    errors::{GgError, GgResult},
    git::{Commit, GitOps},
    github::{NewPullRequest, PullRequest, ReviewHost},
    restack::Restacker,
    stack::{identifier, StackElement},
};

/// Where `gg co` should go.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutTarget {
    /// The element after the checked out one.
    Next,
    /// The element before the checked out one.
    Previous,
    /// The element at `part` in `feature`, or in the checked out feature.
    Part { feature: Option<String>, part: f64 },
    /// The first element of a feature.
    Feature(String),
}

/// The result of deleting an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The deleted element.
    pub deleted: String,
    /// The branch checked out in its place, if it was checked out.
    pub checked_out: Option<String>,
}

impl<G: GitOps> GgContext<G> {
    /// Returns the checked out branch, or [GgError::NoCurrentBranch] on a detached HEAD.
    pub fn current_element(&self) -> GgResult<String> {
        self.git.current_branch()?.ok_or(GgError::NoCurrentBranch)
    }

    /// Creates a new stack element at HEAD, along with its marker, and checks it out.
    ///
    /// ## Takes
    /// - `feature` - The feature of the element. Defaults to the checked out feature.
    /// - `change` - An optional change label.
    /// - `part` - The position of the element. Defaults to `1.0` for an explicit feature, and
    ///   to the checked out position plus one otherwise.
    pub fn create_element(
        &self,
        feature: Option<&str>,
        change: Option<&str>,
        part: Option<f64>,
    ) -> GgResult<StackElement> {
        let element = match feature {
            Some(feature) => {
                StackElement::new(feature, Some(part.unwrap_or(DEFAULT_POSITION)), change)?
            }
            None => {
                let current = identifier::parse(&self.current_element()?)?;
                let position = part.unwrap_or(current.position + 1.0);
                StackElement::new(&current.feature, Some(position), change)?
            }
        };

        self.git
            .stack_index()?
            .check_insertable(&element.feature, element.position, None)?;

        let branch = element.identifier();
        tracing::info!(element = %branch, "Creating element");
        self.git.checkout_new(&element.marker_identifier(), "HEAD")?;
        self.git.checkout_new(&branch, "HEAD")?;

        Ok(element)
    }

    /// Resolves `target` to a branch name.
    pub fn resolve_checkout(&self, target: &CheckoutTarget) -> GgResult<String> {
        let index = self.git.stack_index()?;

        let resolved = match target {
            CheckoutTarget::Next => index.next(&self.current_element()?)?,
            CheckoutTarget::Previous => index.previous(&self.current_element()?)?,
            CheckoutTarget::Part {
                feature: Some(feature),
                part,
            } => index.find_by_position(feature, *part),
            CheckoutTarget::Part {
                feature: None,
                part,
            } => {
                let current = identifier::parse(&self.current_element()?)?;
                index.find_by_position(&current.feature, *part)
            }
            CheckoutTarget::Feature(feature) => index.first(feature),
        };

        resolved.ok_or_else(|| {
            GgError::CannotDetermineTarget(format!("nothing matches {:?}", target))
        })
    }

    /// Checks out the element `target` resolves to, returning its name.
    pub fn checkout_element(&self, target: &CheckoutTarget) -> GgResult<String> {
        let branch = self.resolve_checkout(target)?;
        self.git.checkout(&branch)?;
        Ok(branch)
    }

    /// Returns the branch [GgContext::delete_element] would delete.
    pub fn deletion_target(&self, branch: Option<&str>) -> GgResult<String> {
        match branch {
            Some(branch) => Ok(branch.to_string()),
            None => self.current_element(),
        }
    }

    /// Deletes an element and its marker.
    ///
    /// ## Takes
    /// - `branch` - The element to delete. Defaults to the checked out one.
    /// - `checkout` - What to check out if the element is checked out. Defaults to its previous
    ///   element.
    /// - `remote` - Whether to delete the remote branches as well.
    pub fn delete_element(
        &self,
        branch: Option<&str>,
        checkout: Option<&str>,
        remote: bool,
    ) -> GgResult<DeleteOutcome> {
        let target = self.deletion_target(branch)?;
        let current = self.git.current_branch()?;

        let mut checked_out = None;
        if current.as_deref() == Some(target.as_str()) {
            let replacement = match checkout {
                Some(checkout) => checkout.to_string(),
                None => self.git.stack_index()?.previous(&target)?.ok_or_else(|| {
                    GgError::CannotDetermineTarget(format!(
                        "`{}` is checked out and has no previous element to check out instead",
                        target
                    ))
                })?,
            };
            self.git.checkout(&replacement)?;
            checked_out = Some(replacement);
        }

        let marker = identifier::marker_for(&target);
        if remote {
            self.git.delete_remote_branch_best_effort(&target);
            self.git.delete_remote_branch_best_effort(&marker);
        }
        self.git.delete_branch(&target)?;
        self.git.delete_branch_best_effort(&marker);

        tracing::info!(element = %target, remote, "Deleted element");
        Ok(DeleteOutcome {
            deleted: target,
            checked_out,
        })
    }

    /// Moves the checked out element to `part`, returning its new name.
    ///
    /// The new marker and branch are created from the old ones before the old pair is removed.
    pub fn renumber_element(&self, part: f64) -> GgResult<String> {
        let current = self.current_element()?;
        let element = identifier::parse(&current)?;
        if element.position_key() == 0 {
            return Err(GgError::CannotDetermineTarget(format!(
                "`{}` is not a stack element",
                current
            )));
        }

        let renumbered = element.with_position(part)?;
        let renamed = renumbered.identifier();
        if renamed == current {
            return Ok(current);
        }

        self.git
            .stack_index()?
            .check_insertable(&renumbered.feature, part, Some(&current))?;

        let old_marker = identifier::marker_for(&current);
        self.git
            .checkout_new(&renumbered.marker_identifier(), &old_marker)?;
        self.git.checkout_new(&renamed, &current)?;

        self.git.delete_branch_best_effort(&old_marker);
        self.git.delete_branch_best_effort(&current);

        tracing::info!(from = %current, to = %renamed, "Renumbered element");
        Ok(renamed)
    }

    /// Restacks the checked out element onto `onto`, or onto its previous element.
    ///
    /// ## Returns
    /// - `Ok(String)` - The ref the element now sits on.
    pub fn rebase_current(&self, onto: Option<&str>, strategy: Option<String>) -> GgResult<String> {
        let restacker = Restacker::new(&self.git).with_strategy(strategy);
        if let Some(in_progress) = restacker.in_progress()? {
            return Err(GgError::RestackInProgress(in_progress.target));
        }

        let current = self.current_element()?;
        let onto = match onto {
            Some(onto) => onto.to_string(),
            None => self.previous_or(&current, None)?,
        };

        restacker.restack(&current, &onto)?;
        Ok(onto)
    }

    /// Resumes the restack left behind by a conflict.
    pub fn rebase_continue(&self) -> GgResult<String> {
        Restacker::new(&self.git).continue_after_conflict()?;
        self.current_element()
    }

    /// Abandons the restack left behind by a conflict.
    pub fn rebase_abort(&self) -> GgResult<String> {
        Restacker::new(&self.git).abort()?;
        self.current_element()
    }

    /// Restacks the checked out element and every element after it, each onto its
    /// predecessor. The first element goes onto its previous element, or `onto` without one.
    ///
    /// With `push_with`, every restacked element that has a pull request is force-pushed.
    pub async fn rebase_all<H: ReviewHost>(
        &self,
        onto: Option<&str>,
        strategy: Option<String>,
        push_with: Option<&H>,
    ) -> GgResult<Vec<String>> {
        if let Some(in_progress) = Restacker::new(&self.git).in_progress()? {
            return Err(GgError::RestackInProgress(in_progress.target));
        }

        let current = self.current_element()?;
        let onto = self.previous_or(&current, onto)?;
        self.restack_chain(current, onto, strategy, push_with).await
    }

    /// Finishes the conflicted restack of a [GgContext::rebase_all], then restacks the rest of
    /// the chain.
    pub async fn rebase_all_continue<H: ReviewHost>(
        &self,
        strategy: Option<String>,
        push_with: Option<&H>,
    ) -> GgResult<Vec<String>> {
        let continued = self.rebase_continue()?;
        if let Some(host) = push_with {
            self.push_if_reviewed(host, &continued, false).await?;
        }

        let mut restacked = vec![continued.clone()];
        if let Some(next) = self.git.stack_index()?.next(&continued)? {
            restacked.extend(
                self.restack_chain(next, continued, strategy, push_with)
                    .await?,
            );
        }
        Ok(restacked)
    }

    /// Force-pushes `branch` (and its marker, with `with_marker`) if it has a pull request.
    ///
    /// ## Returns
    /// - `Ok(true)` - The branch was pushed.
    /// - `Ok(false)` - The branch has no pull request and was left alone.
    pub async fn push_if_reviewed<H: ReviewHost>(
        &self,
        host: &H,
        branch: &str,
        with_marker: bool,
    ) -> GgResult<bool> {
        if host.find_pull_request(branch).await?.is_none() {
            tracing::info!(branch, "No pull request, not pushing");
            return Ok(false);
        }

        let marker = identifier::marker_for(branch);
        let mut branches = vec![branch];
        if with_marker {
            branches.push(&marker);
        }
        self.git.push(&branches, true)?;
        Ok(true)
    }

    /// Force-pushes `branch` and its marker, so a pull request can be based on the marker.
    pub fn publish(&self, branch: &str) -> GgResult<()> {
        let marker = identifier::marker_for(branch);
        self.git.push(&[marker.as_str(), branch], true)
    }

    /// Returns the oldest commit of `branch`, which seeds the pull request title and body.
    pub fn first_commit(&self, branch: &str) -> GgResult<Option<Commit>> {
        Ok(self
            .git
            .commits_between(&identifier::marker_for(branch), branch)?
            .pop())
    }

    /// Opens a pull request for `branch` based on its marker.
    pub async fn create_pull_request<H: ReviewHost>(
        &self,
        host: &H,
        branch: &str,
        title: String,
        body: String,
        draft: bool,
    ) -> GgResult<PullRequest> {
        host.create_pull_request(NewPullRequest {
            title,
            head: branch.to_string(),
            base: identifier::marker_for(branch),
            body,
            draft,
        })
        .await
    }

    /// Points the pull request of the checked out element at `onto`.
    pub async fn update_base<H: ReviewHost>(&self, host: &H, onto: &str) -> GgResult<PullRequest> {
        let current = self.current_element()?;
        let pull = host
            .find_pull_request(&current)
            .await?
            .ok_or_else(|| GgError::NoPullRequest(current.clone()))?;

        if !host.update_base(pull.number, onto).await? {
            return Err(GgError::external(
                "update pull request base",
                format!("#{} was not retargeted onto `{}`", pull.number, onto),
            ));
        }
        Ok(pull)
    }

    /// Returns the previous element of `branch`, falling back to `fallback`.
    fn previous_or(&self, branch: &str, fallback: Option<&str>) -> GgResult<String> {
        match self.git.stack_index()?.previous(branch)? {
            Some(previous) => Ok(previous),
            None => fallback.map(ToOwned::to_owned).ok_or_else(|| {
                GgError::CannotDetermineTarget(format!(
                    "`{}` has no previous element; pass --onto",
                    branch
                ))
            }),
        }
    }

    /// Restacks `first` onto `onto`, then every following element onto its predecessor.
    async fn restack_chain<H: ReviewHost>(
        &self,
        first: String,
        onto: String,
        strategy: Option<String>,
        push_with: Option<&H>,
    ) -> GgResult<Vec<String>> {
        let mut chain = vec![first.clone()];
        chain.extend(self.git.stack_index()?.after(&first)?);

        let restacker = Restacker::new(&self.git).with_strategy(strategy);
        let mut onto = onto;
        let mut restacked = Vec::with_capacity(chain.len());

        for element in chain {
            tracing::info!(element = %element, onto = %onto, "Rebasing");
            restacker.restack(&element, &onto)?;
            if let Some(host) = push_with {
                self.push_if_reviewed(host, &element, false).await?;
            }

            restacked.push(element.clone());
            onto = element;
        }

        Ok(restacked)
    }
}
