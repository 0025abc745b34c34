//! Replaying a stack element's unique commits onto a new base.
//!
//! A restack copies the element's commits (`marker..target`) onto `_tmp_-` branches rooted at
//! the new base, and only moves the real marker and target once the copy succeeded. The
//! checked out `_tmp_-` branch is the only record of a restack in flight, which is how
//! `--continue` and `--abort` find their way back after a conflict.

use crate::{
    errors::{GgError, GgResult},
    git::GitOps,
    stack::identifier,
};

/// The temporary branches of a restack in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryRestackState {
    /// The element being restacked.
    pub target: String,
    /// Holds the replayed commits of the element.
    pub temp_branch: String,
    /// Holds the new base of the element.
    pub temp_marker_branch: String,
}

impl TemporaryRestackState {
    /// Creates the temporary state for restacking `target`.
    pub fn for_target(target: &str) -> Self {
        Self {
            target: target.to_string(),
            temp_branch: identifier::temp_for(target),
            temp_marker_branch: identifier::temp_for(&identifier::marker_for(target)),
        }
    }

    /// Recovers the temporary state from the checked out branch, or [None] if `branch` is not
    /// a temporary branch.
    pub fn recover(branch: &str) -> Option<Self> {
        let target = identifier::target_from_temp(branch)?;
        let target = identifier::target_from_marker(&target).unwrap_or(target);
        Some(Self::for_target(&target))
    }

    /// Returns the marker branch of the target.
    pub fn marker_branch(&self) -> String {
        identifier::marker_for(&self.target)
    }
}

/// A restack whose commits have been replayed, with the commits the marker and target must
/// be moved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedRestack {
    pub state: TemporaryRestackState,
    /// The new base of the element.
    pub marker_tip: String,
    /// The replayed head of the element.
    pub target_tip: String,
}

/// Drives restacks against a [GitOps] implementation.
#[derive(Debug)]
pub struct Restacker<'a, G: GitOps> {
    git: &'a G,
    strategy: Option<String>,
}

impl<'a, G: GitOps> Restacker<'a, G> {
    /// Creates a new [Restacker].
    pub fn new(git: &'a G) -> Self {
        Self {
            git,
            strategy: None,
        }
    }

    /// Sets the `--strategy-option` passed to cherry-pick.
    pub fn with_strategy(mut self, strategy: Option<String>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Restacks `target` onto `onto`, moving its marker and branch on success.
    ///
    /// ## Returns
    /// - `Ok(())` - The element now sits on `onto` and is checked out.
    /// - `Err(GgError::RestackConflict)` - Replay stopped on a conflict. The temporary branch
    ///   is checked out, awaiting [Restacker::continue_after_conflict] or [Restacker::abort].
    pub fn restack(&self, target: &str, onto: &str) -> GgResult<()> {
        let replayed = self.start(target, onto)?;
        self.finish(&replayed)
    }

    /// Replays `target` onto `onto` on temporary branches.
    pub fn start(&self, target: &str, onto: &str) -> GgResult<ReplayedRestack> {
        if let Some(in_progress) = self.in_progress()? {
            return Err(GgError::RestackInProgress(in_progress.target));
        }

        let state = TemporaryRestackState::for_target(target);
        let marker = state.marker_branch();
        let fast_forward = self.git.commit_at(&marker)?.hash == self.git.commit_at(target)?.hash;

        tracing::info!(element = target, onto, fast_forward, "Starting restack");
        self.git.checkout_new(&state.temp_marker_branch, onto)?;
        self.git.checkout_new(&state.temp_branch, onto)?;

        if fast_forward {
            // Nothing to replay: move both pointers straight to the new base.
            self.git.checkout(&marker)?;
            self.git.reset_hard(&state.temp_branch)?;
            self.git.checkout(target)?;
            self.git.reset_hard(&state.temp_branch)?;
            self.git.checkout(&state.temp_branch)?;
        } else if let Err(e) = self
            .git
            .cherry_pick_range(&marker, target, self.strategy.as_deref())
        {
            return Err(GgError::RestackConflict {
                target: target.to_string(),
                source: Box::new(e),
            });
        }

        self.replayed(state)
    }

    /// Resumes the restack of the checked out temporary branch after a conflict was resolved.
    pub fn continue_after_conflict(&self) -> GgResult<()> {
        let state = self.require_in_progress()?;

        tracing::info!(element = %state.target, "Continuing restack");
        self.git.cherry_pick_continue()?;

        let replayed = self.replayed(state)?;
        self.finish(&replayed)
    }

    /// Abandons the restack of the checked out temporary branch, leaving the element untouched.
    pub fn abort(&self) -> GgResult<()> {
        let state = self.require_in_progress()?;

        tracing::info!(element = %state.target, "Aborting restack");
        if let Err(e) = self.git.cherry_pick_abort() {
            tracing::warn!(error = %e, "No cherry-pick to abort");
        }

        self.git.checkout(&state.target)?;
        self.git.delete_branch_best_effort(&state.temp_branch);
        self.git.delete_branch_best_effort(&state.temp_marker_branch);
        Ok(())
    }

    /// Moves the marker and target to the replayed commits and removes the temporary branches.
    ///
    /// Finishing the same [ReplayedRestack] twice yields the same pointers.
    pub fn finish(&self, replayed: &ReplayedRestack) -> GgResult<()> {
        let state = &replayed.state;

        self.git.checkout(&state.marker_branch())?;
        self.git.reset_hard(&replayed.marker_tip)?;
        self.git.checkout(&state.target)?;
        self.git.reset_hard(&replayed.target_tip)?;

        self.git.delete_branch_best_effort(&state.temp_branch);
        self.git.delete_branch_best_effort(&state.temp_marker_branch);

        tracing::info!(element = %state.target, "Finished restack");
        Ok(())
    }

    /// Returns the restack in flight in the working copy, if any.
    pub fn in_progress(&self) -> GgResult<Option<TemporaryRestackState>> {
        Ok(self
            .git
            .current_branch()?
            .as_deref()
            .and_then(TemporaryRestackState::recover))
    }

    fn require_in_progress(&self) -> GgResult<TemporaryRestackState> {
        let current = self.git.current_branch()?;
        current
            .as_deref()
            .and_then(TemporaryRestackState::recover)
            .ok_or_else(|| GgError::NotInRestack(current.unwrap_or_else(|| "HEAD".to_string())))
    }

    fn replayed(&self, state: TemporaryRestackState) -> GgResult<ReplayedRestack> {
        Ok(ReplayedRestack {
            marker_tip: self.git.commit_at(&state.temp_marker_branch)?.hash,
            target_tip: self.git.commit_at(&state.temp_branch)?.hash,
            state,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::FakeGit;

    /// `main` gained an upstream commit; `f-part_1.0` holds two commits on top of the root.
    fn stacked_repo() -> FakeGit {
        let git = FakeGit::new();
        git.branch("_start_-f-part_1.0", "main");
        git.checkout_new("f-part_1.0", "main").unwrap();
        git.commit("first");
        git.commit("second");
        git.checkout("main").unwrap();
        git.commit("upstream");
        git.checkout("f-part_1.0").unwrap();
        git
    }

    #[test]
    fn temporary_names() {
        let state = TemporaryRestackState::for_target("f-part_1.0");
        assert_eq!(state.temp_branch, "_tmp_-f-part_1.0");
        assert_eq!(state.temp_marker_branch, "_tmp_-_start_-f-part_1.0");
        assert_eq!(state.marker_branch(), "_start_-f-part_1.0");

        assert_eq!(TemporaryRestackState::recover("_tmp_-f-part_1.0"), Some(state.clone()));
        assert_eq!(
            TemporaryRestackState::recover("_tmp_-_start_-f-part_1.0"),
            Some(state)
        );
        assert_eq!(TemporaryRestackState::recover("f-part_1.0"), None);
    }

    #[test]
    fn fast_forward_skips_cherry_pick() {
        let git = FakeGit::new();
        git.branch("_start_-f-part_1.0", "main");
        git.branch("f-part_1.0", "main");
        git.commit("upstream");
        let onto = git.head_of("main").unwrap();

        Restacker::new(&git).restack("f-part_1.0", "main").unwrap();

        assert!(!git.called("cherry-pick"));
        assert_eq!(git.head_of("_start_-f-part_1.0").unwrap(), onto);
        assert_eq!(git.head_of("f-part_1.0").unwrap(), onto);
        assert_eq!(git.head(), "f-part_1.0");
        assert_eq!(git.head_of("_tmp_-f-part_1.0"), None);
        assert_eq!(git.head_of("_tmp_-_start_-f-part_1.0"), None);
    }

    #[test]
    fn replay_moves_marker_and_target() {
        let git = stacked_repo();
        let onto = git.head_of("main").unwrap();

        Restacker::new(&git).restack("f-part_1.0", "main").unwrap();

        assert!(git.called("cherry-pick _start_-f-part_1.0..f-part_1.0"));
        assert_eq!(git.head_of("_start_-f-part_1.0").unwrap(), onto);
        assert_eq!(
            git.history("f-part_1.0"),
            vec!["second", "first", "upstream", "root"]
        );
        assert_eq!(git.head(), "f-part_1.0");
    }

    #[test]
    fn finish_is_idempotent() {
        let git = stacked_repo();
        let restacker = Restacker::new(&git);

        let replayed = restacker.start("f-part_1.0", "main").unwrap();
        restacker.finish(&replayed).unwrap();
        let first = (
            git.head_of("_start_-f-part_1.0"),
            git.head_of("f-part_1.0"),
        );

        restacker.finish(&replayed).unwrap();
        let second = (
            git.head_of("_start_-f-part_1.0"),
            git.head_of("f-part_1.0"),
        );

        assert_eq!(first, second);
        assert_eq!(first.1.unwrap(), replayed.target_tip);
    }

    #[test]
    fn strategy_is_forwarded() {
        let git = stacked_repo();
        Restacker::new(&git)
            .with_strategy(Some("theirs".to_string()))
            .restack("f-part_1.0", "main")
            .unwrap();
        assert!(git.called("cherry-pick --strategy-option=theirs"));
    }

    #[test]
    fn conflict_then_continue() {
        let git = stacked_repo();
        let original = git.head_of("f-part_1.0");
        git.conflict_on_next_pick();

        let restacker = Restacker::new(&git);
        let err = restacker.restack("f-part_1.0", "main").unwrap_err();
        assert!(matches!(
            err,
            GgError::RestackConflict { ref target, .. } if target == "f-part_1.0"
        ));
        assert_eq!(git.head(), "_tmp_-f-part_1.0");
        assert_eq!(git.head_of("f-part_1.0"), original);

        restacker.continue_after_conflict().unwrap();
        assert_eq!(
            git.history("f-part_1.0"),
            vec!["second", "first", "upstream", "root"]
        );
        assert_eq!(git.head(), "f-part_1.0");
        assert_eq!(git.head_of("_tmp_-f-part_1.0"), None);
    }

    #[test]
    fn conflict_then_abort() {
        let git = stacked_repo();
        let original = (git.head_of("_start_-f-part_1.0"), git.head_of("f-part_1.0"));
        git.conflict_on_next_pick();

        let restacker = Restacker::new(&git);
        assert!(restacker.restack("f-part_1.0", "main").is_err());
        restacker.abort().unwrap();

        assert_eq!(
            (git.head_of("_start_-f-part_1.0"), git.head_of("f-part_1.0")),
            original
        );
        assert_eq!(git.head(), "f-part_1.0");
        assert_eq!(git.head_of("_tmp_-f-part_1.0"), None);
        assert_eq!(git.head_of("_tmp_-_start_-f-part_1.0"), None);
    }

    #[test]
    fn abort_without_cherry_pick_still_cleans_up() {
        let git = stacked_repo();
        git.checkout_new("_tmp_-_start_-f-part_1.0", "main").unwrap();
        git.checkout_new("_tmp_-f-part_1.0", "main").unwrap();

        Restacker::new(&git).abort().unwrap();
        assert_eq!(git.head(), "f-part_1.0");
        assert_eq!(git.head_of("_tmp_-f-part_1.0"), None);
    }

    #[test]
    fn continue_and_abort_require_a_restack() {
        let git = stacked_repo();
        let restacker = Restacker::new(&git);

        assert!(matches!(
            restacker.continue_after_conflict(),
            Err(GgError::NotInRestack(ref branch)) if branch == "f-part_1.0"
        ));
        assert!(matches!(restacker.abort(), Err(GgError::NotInRestack(_))));
    }

    #[test]
    fn refuses_to_start_during_a_restack() {
        let git = stacked_repo();
        git.conflict_on_next_pick();
        let restacker = Restacker::new(&git);
        assert!(restacker.restack("f-part_1.0", "main").is_err());

        assert!(matches!(
            restacker.restack("f-part_1.0", "main"),
            Err(GgError::RestackInProgress(ref target)) if target == "f-part_1.0"
        ));
    }
}
