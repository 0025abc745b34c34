//! Ordering queries over the stack elements present in a repository.

use super::identifier::{self, position_key, StackElement};
use crate::{
    constants::{NEXT_OFFSET, UNBOUNDED_POSITION},
    errors::{GgError, GgResult},
};
use itertools::Itertools;

/// A snapshot of the repository's local branch names, queried as ordered stacks.
///
/// The index never talks to git itself. Callers build a fresh one from
/// [GitOps::all_branches] whenever branches may have been created or deleted.
///
/// [GitOps::all_branches]: crate::git::GitOps::all_branches
#[derive(Debug, Clone, Default)]
pub struct StackIndex {
    branches: Vec<String>,
}

impl StackIndex {
    /// Creates a new [StackIndex] over the given branch names.
    pub fn new<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            branches: branches.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the branches of `feature` whose rounded position lies in `[lo, hi)`, sorted by
    /// position.
    ///
    /// ## Takes
    /// - `feature` - The feature to filter on. Must match exactly.
    /// - `lo` - The inclusive lower bound.
    /// - `hi` - The exclusive upper bound.
    /// - `descending` - Whether to sort newest-first.
    pub fn branches_in_range(
        &self,
        feature: &str,
        lo: f64,
        hi: f64,
        descending: bool,
    ) -> Vec<String> {
        let (lo, hi) = (position_key(lo), position_key(hi));

        self.elements(feature)
            .filter(|(_, element)| (lo..hi).contains(&element.position_key()))
            .sorted_by(|(_, a), (_, b)| {
                let ordering = a.position.total_cmp(&b.position);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .map(|(branch, _)| branch.clone())
            .collect()
    }

    /// Returns the element that follows `identifier` in its feature.
    ///
    /// Anything within [NEXT_OFFSET] of the current position is not considered "after" it.
    /// This is what allows `1.5` to be inserted between `1.0` and `2.0`.
    pub fn next(&self, identifier: &str) -> GgResult<Option<String>> {
        Ok(self.after(identifier)?.into_iter().next())
    }

    /// Returns the element that precedes `identifier` in its feature.
    pub fn previous(&self, identifier: &str) -> GgResult<Option<String>> {
        let element = identifier::parse(identifier)?;
        if element.position == 0.0 {
            return Ok(None);
        }

        Ok(self
            .branches_in_range(&element.feature, 0.0, element.position, false)
            .pop())
    }

    /// Returns every element after `identifier`, in stack order.
    pub fn after(&self, identifier: &str) -> GgResult<Vec<String>> {
        let element = identifier::parse(identifier)?;
        Ok(self.branches_in_range(
            &element.feature,
            element.position + NEXT_OFFSET,
            UNBOUNDED_POSITION,
            false,
        ))
    }

    /// Returns the bottom element of `feature`.
    pub fn first(&self, feature: &str) -> Option<String> {
        self.branches_in_range(feature, 0.0, UNBOUNDED_POSITION, false)
            .into_iter()
            .next()
    }

    /// Returns every element of `feature`, newest first.
    pub fn all_for_feature(&self, feature: &str) -> Vec<String> {
        self.branches_in_range(feature, 0.0, UNBOUNDED_POSITION, true)
    }

    /// Returns the features that still have at least one live marker branch.
    pub fn all_features(&self) -> Vec<String> {
        self.branches
            .iter()
            .filter_map(|branch| identifier::target_from_marker(branch))
            .filter_map(|target| identifier::parse(&target).ok())
            .map(|element| element.feature)
            .unique()
            .collect()
    }

    /// Returns the element of `feature` at `position`, compared at rounded precision.
    pub fn find_by_position(&self, feature: &str, position: f64) -> Option<String> {
        let key = position_key(position);
        self.elements(feature)
            .find(|(_, element)| element.position_key() == key)
            .map(|(branch, _)| branch.clone())
    }

    /// Checks that a new element may be placed at `position` within `feature`.
    ///
    /// ## Takes
    /// - `feature` - The feature to insert into.
    /// - `position` - The requested position.
    /// - `exclude` - A branch to ignore, e.g. the element being renumbered.
    ///
    /// ## Returns
    /// - `Ok(())` - The position is free.
    /// - `Err(GgError::InvalidPosition)` - The position is not a positive number.
    /// - `Err(GgError::AmbiguousTarget)` - An element already exists at that position.
    /// - `Err(GgError::PositionTooClose)` - An element sits within [NEXT_OFFSET].
    pub fn check_insertable(
        &self,
        feature: &str,
        position: f64,
        exclude: Option<&str>,
    ) -> GgResult<()> {
        identifier::validate_position(position)?;

        let key = position_key(position);
        let min_spacing = position_key(NEXT_OFFSET);
        for (branch, element) in self.elements(feature) {
            if Some(branch.as_str()) == exclude {
                continue;
            }

            let distance = (element.position_key() - key).abs();
            if distance == 0 {
                return Err(GgError::AmbiguousTarget(format!(
                    "branch `{}` already exists at position {}",
                    branch, position
                )));
            }
            if distance < min_spacing {
                return Err(GgError::PositionTooClose {
                    position,
                    neighbor: branch.clone(),
                });
            }
        }

        Ok(())
    }

    /// Iterates the parsed elements of `feature`. Branches that do not parse are skipped.
    fn elements<'a>(
        &'a self,
        feature: &'a str,
    ) -> impl Iterator<Item = (&'a String, StackElement)> + 'a {
        self.branches
            .iter()
            .filter(move |branch| branch.starts_with(feature))
            .filter_map(|branch| match identifier::parse(branch) {
                Ok(element) => Some((branch, element)),
                Err(e) => {
                    tracing::debug!(branch = %branch, error = %e, "Skipping unparseable branch");
                    None
                }
            })
            .filter(move |(_, element)| element.feature == feature)
    }
}
