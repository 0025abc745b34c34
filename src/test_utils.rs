//! In-memory fakes of the git and review-host capabilities for tests.

use crate::{
    errors::{GgError, GgResult},
    git::{Commit, GitOps},
    github::{BuildStatus, NewPullRequest, PullRequest, Review, ReviewHost, ReviewState},
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, HashSet},
    future::Future,
    sync::Mutex,
};

#[derive(Debug, Clone)]
struct FakeCommit {
    parent: Option<String>,
    title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Head {
    Branch(String),
    Detached(String),
}

#[derive(Debug)]
struct GitState {
    commits: HashMap<String, FakeCommit>,
    branches: BTreeMap<String, String>,
    remote_branches: BTreeMap<String, String>,
    head: Head,
    calls: Vec<String>,
    conflict_on_pick: bool,
    pending_pick: Vec<String>,
    next_id: usize,
}

/// A linear-history git with branches, a remote, and a cherry-pick that can be made to
/// conflict.
///
/// Starts with a root commit `c0` on `main`, pushed to `origin/main`.
#[derive(Debug)]
pub struct FakeGit {
    state: RefCell<GitState>,
}

impl Default for FakeGit {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGit {
    pub fn new() -> Self {
        let root = "c0".to_string();
        Self {
            state: RefCell::new(GitState {
                commits: HashMap::from([(
                    root.clone(),
                    FakeCommit {
                        parent: None,
                        title: "root".to_string(),
                    },
                )]),
                branches: BTreeMap::from([("main".to_string(), root.clone())]),
                remote_branches: BTreeMap::from([("main".to_string(), root)]),
                head: Head::Branch("main".to_string()),
                calls: Vec::new(),
                conflict_on_pick: false,
                pending_pick: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Commits `title` on top of HEAD, advancing the checked out branch.
    pub fn commit(&self, title: &str) -> String {
        let mut state = self.state.borrow_mut();
        let parent = head_commit(&state);
        advance(&mut state, parent, title)
    }

    /// Creates `branch` at `reference` without checking it out.
    pub fn branch(&self, branch: &str, reference: &str) {
        let mut state = self.state.borrow_mut();
        let hash = resolve(&state, reference).unwrap();
        state.branches.insert(branch.to_string(), hash);
    }

    /// Returns the commit `branch` points at.
    pub fn head_of(&self, branch: &str) -> Option<String> {
        self.state.borrow().branches.get(branch).cloned()
    }

    /// Returns the commit `branch` points at on the remote.
    pub fn remote_head_of(&self, branch: &str) -> Option<String> {
        self.state.borrow().remote_branches.get(branch).cloned()
    }

    /// Returns the titles of the commits reachable from `reference`, newest first.
    pub fn history(&self, reference: &str) -> Vec<String> {
        let state = self.state.borrow();
        let hash = resolve(&state, reference).unwrap();
        ancestry(&state, &hash)
            .into_iter()
            .map(|h| state.commits[&h].title.clone())
            .collect()
    }

    /// Returns what HEAD points at: a branch name or a detached commit.
    pub fn head(&self) -> String {
        match &self.state.borrow().head {
            Head::Branch(branch) => branch.clone(),
            Head::Detached(hash) => hash.clone(),
        }
    }

    /// Makes the next cherry-pick stop on a conflict.
    pub fn conflict_on_next_pick(&self) {
        self.state.borrow_mut().conflict_on_pick = true;
    }

    /// Returns every mutating or external call made so far.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Returns whether any call starting with `prefix` was made.
    pub fn called(&self, prefix: &str) -> bool {
        self.state.borrow().calls.iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn head_commit(state: &GitState) -> String {
    match &state.head {
        Head::Branch(branch) => state.branches[branch].clone(),
        Head::Detached(hash) => hash.clone(),
    }
}

fn advance(state: &mut GitState, parent: String, title: &str) -> String {
    let hash = format!("c{}", state.next_id);
    state.next_id += 1;
    state.commits.insert(
        hash.clone(),
        FakeCommit {
            parent: Some(parent),
            title: title.to_string(),
        },
    );
    match state.head.clone() {
        Head::Branch(branch) => {
            state.branches.insert(branch, hash.clone());
        }
        Head::Detached(_) => state.head = Head::Detached(hash.clone()),
    }
    hash
}

fn resolve(state: &GitState, reference: &str) -> GgResult<String> {
    if reference == "HEAD" {
        return Ok(head_commit(state));
    }
    if let Some(hash) = state.branches.get(reference) {
        return Ok(hash.clone());
    }
    if let Some(hash) = reference
        .strip_prefix("origin/")
        .and_then(|b| state.remote_branches.get(b))
    {
        return Ok(hash.clone());
    }
    if state.commits.contains_key(reference) {
        return Ok(reference.to_string());
    }
    Err(GgError::external("git rev-parse", format!("unknown revision `{}`", reference)))
}

fn ancestry(state: &GitState, hash: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut cursor = Some(hash.to_string());
    while let Some(hash) = cursor {
        cursor = state.commits[&hash].parent.clone();
        chain.push(hash);
    }
    chain
}

/// Commits reachable from `end` but not from `start`, oldest first.
fn range(state: &GitState, start: &str, end: &str) -> GgResult<Vec<String>> {
    let excluded = ancestry(state, &resolve(state, start)?)
        .into_iter()
        .collect::<HashSet<_>>();
    let mut picked = ancestry(state, &resolve(state, end)?)
        .into_iter()
        .take_while(|h| !excluded.contains(h))
        .collect::<Vec<_>>();
    picked.reverse();
    Ok(picked)
}

fn to_commit(state: &GitState, hash: &str) -> Commit {
    Commit {
        hash: hash.to_string(),
        title: state.commits[hash].title.clone(),
        author: "tester".to_string(),
        body: String::new(),
    }
}

impl GitOps for FakeGit {
    fn current_branch(&self) -> GgResult<Option<String>> {
        Ok(match &self.state.borrow().head {
            Head::Branch(branch) => Some(branch.clone()),
            Head::Detached(_) => None,
        })
    }

    fn all_branches(&self) -> GgResult<Vec<String>> {
        Ok(self.state.borrow().branches.keys().cloned().collect())
    }

    fn checkout(&self, reference: &str) -> GgResult<()> {
        self.record(format!("checkout {}", reference));
        let mut state = self.state.borrow_mut();
        state.head = if state.branches.contains_key(reference) {
            Head::Branch(reference.to_string())
        } else {
            Head::Detached(resolve(&state, reference)?)
        };
        Ok(())
    }

    fn checkout_new(&self, branch: &str, from: &str) -> GgResult<()> {
        self.record(format!("checkout -b {} {}", branch, from));
        let mut state = self.state.borrow_mut();
        if state.branches.contains_key(branch) {
            return Err(GgError::external(
                "git branch",
                format!("a branch named `{}` already exists", branch),
            ));
        }
        let hash = resolve(&state, from)?;
        state.branches.insert(branch.to_string(), hash);
        state.head = Head::Branch(branch.to_string());
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> GgResult<()> {
        self.record(format!("branch -D {}", branch));
        let mut state = self.state.borrow_mut();
        if state.head == Head::Branch(branch.to_string()) {
            return Err(GgError::external(
                "git branch",
                format!("cannot delete checked out branch `{}`", branch),
            ));
        }
        state
            .branches
            .remove(branch)
            .map(|_| ())
            .ok_or_else(|| {
                GgError::external("git branch", format!("branch `{}` not found", branch))
            })
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> GgResult<()> {
        self.record(format!("push {} --delete {}", remote, branch));
        self.state
            .borrow_mut()
            .remote_branches
            .remove(branch)
            .map(|_| ())
            .ok_or_else(|| {
                GgError::external(
                    "git push",
                    format!("remote ref `{}` does not exist", branch),
                )
            })
    }

    fn push(&self, branches: &[&str], force: bool) -> GgResult<()> {
        self.record(format!(
            "push{} origin {}",
            if force { " -f" } else { "" },
            branches.join(" ")
        ));
        let mut state = self.state.borrow_mut();
        for branch in branches {
            let hash = resolve(&state, branch)?;
            state.remote_branches.insert(branch.to_string(), hash);
        }
        Ok(())
    }

    fn fetch(&self, branch: &str) -> GgResult<()> {
        self.record(format!("fetch -p origin {}", branch));
        Ok(())
    }

    fn reset_hard(&self, reference: &str) -> GgResult<()> {
        self.record(format!("reset --hard {}", reference));
        let mut state = self.state.borrow_mut();
        let hash = resolve(&state, reference)?;
        match state.head.clone() {
            Head::Branch(branch) => {
                state.branches.insert(branch, hash);
            }
            Head::Detached(_) => state.head = Head::Detached(hash),
        }
        Ok(())
    }

    fn cherry_pick_range(&self, start: &str, end: &str, strategy: Option<&str>) -> GgResult<()> {
        self.record(match strategy {
            Some(strategy) => format!(
                "cherry-pick --strategy-option={} {}..{}",
                strategy, start, end
            ),
            None => format!("cherry-pick {}..{}", start, end),
        });
        let mut state = self.state.borrow_mut();
        let picked = range(&state, start, end)?;

        if state.conflict_on_pick {
            state.conflict_on_pick = false;
            state.pending_pick = picked;
            return Err(GgError::external("git cherry-pick", "conflict"));
        }

        for hash in picked {
            let title = state.commits[&hash].title.clone();
            let parent = head_commit(&state);
            advance(&mut state, parent, &title);
        }
        Ok(())
    }

    fn cherry_pick_continue(&self) -> GgResult<()> {
        self.record("cherry-pick --continue".to_string());
        let mut state = self.state.borrow_mut();
        if state.pending_pick.is_empty() {
            return Err(GgError::external("git cherry-pick", "no cherry-pick in progress"));
        }

        for hash in std::mem::take(&mut state.pending_pick) {
            let title = state.commits[&hash].title.clone();
            let parent = head_commit(&state);
            advance(&mut state, parent, &title);
        }
        Ok(())
    }

    fn cherry_pick_abort(&self) -> GgResult<()> {
        self.record("cherry-pick --abort".to_string());
        let mut state = self.state.borrow_mut();
        if state.pending_pick.is_empty() {
            return Err(GgError::external("git cherry-pick", "no cherry-pick in progress"));
        }
        state.pending_pick.clear();
        Ok(())
    }

    fn commit_at(&self, reference: &str) -> GgResult<Commit> {
        let state = self.state.borrow();
        let hash = resolve(&state, reference)?;
        Ok(to_commit(&state, &hash))
    }

    fn commits_between(&self, start: &str, end: &str) -> GgResult<Vec<Commit>> {
        let state = self.state.borrow();
        Ok(range(&state, start, end)?
            .iter()
            .rev()
            .map(|h| to_commit(&state, h))
            .collect())
    }

    fn diff(&self, reference: &str) -> GgResult<()> {
        self.record(format!("diff {}", reference));
        Ok(())
    }

    fn interactive_rebase(&self, reference: &str) -> GgResult<()> {
        self.record(format!("rebase -i {}", reference));
        Ok(())
    }

    fn remote_name(&self) -> &str {
        "origin"
    }
}

#[derive(Debug, Default)]
struct HostState {
    pulls: BTreeMap<String, PullRequest>,
    builds: HashMap<String, String>,
    reviews: HashMap<u64, Vec<Review>>,
    refuse_base_update: bool,
    refuse_merge: bool,
    calls: Vec<String>,
    next_number: u64,
}

/// A review host holding open pull requests keyed by head branch.
#[derive(Debug, Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a pull request for `branch` onto `base`, returning its number.
    pub fn open(&self, branch: &str, base: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_number += 1;
        let number = state.next_number;
        state.pulls.insert(
            branch.to_string(),
            PullRequest {
                number,
                state: "open".to_string(),
                title: format!("Change {}", branch),
                body: "Body".to_string(),
                url: format!("https://github.com/o/r/pull/{}", number),
                head_ref: branch.to_string(),
                base_ref: base.to_string(),
                author: "me".to_string(),
            },
        );
        number
    }

    /// Opens a pull request for `branch` onto `main` authored by `author`.
    pub fn create_pull_request_by(&self, branch: &str, author: &str) -> u64 {
        let number = self.open(branch, "main");
        if let Some(pull) = self.state.lock().unwrap().pulls.get_mut(branch) {
            pull.author = author.to_string();
        }
        number
    }

    /// Sets the combined build state of `branch`.
    pub fn set_build(&self, branch: &str, build: &str) {
        let mut state = self.state.lock().unwrap();
        state.builds.insert(branch.to_string(), build.to_string());
    }

    /// Adds an approval by `reviewer` to pull request `number`.
    pub fn approve(&self, number: u64, reviewer: &str) {
        self.review(number, reviewer, ReviewState::Approved);
    }

    /// Adds a review by `reviewer` to pull request `number`, submitted after all others.
    pub fn review(&self, number: u64, reviewer: &str, review_state: ReviewState) {
        let mut state = self.state.lock().unwrap();
        let reviews = state.reviews.entry(number).or_default();
        let submitted_at =
            chrono::DateTime::from_timestamp(1_700_000_000 + reviews.len() as i64, 0);
        reviews.push(Review {
            state: review_state,
            author: reviewer.to_string(),
            submitted_at,
        });
    }

    /// Makes every base update unconfirmed.
    pub fn refuse_base_updates(&self) {
        self.state.lock().unwrap().refuse_base_update = true;
    }

    /// Makes every merge report `merged: false`.
    pub fn refuse_merges(&self) {
        self.state.lock().unwrap().refuse_merge = true;
    }

    /// Returns the pull request whose head is `branch`.
    pub fn pull(&self, branch: &str) -> Option<PullRequest> {
        self.state.lock().unwrap().pulls.get(branch).cloned()
    }

    /// Returns every mutating call made so far.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Returns whether any call starting with `prefix` was made.
    pub fn called(&self, prefix: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .any(|c| c.starts_with(prefix))
    }
}

impl ReviewHost for FakeHost {
    fn find_pull_request(
        &self,
        branch: &str,
    ) -> impl Future<Output = GgResult<Option<PullRequest>>> + Send {
        let pull = self.pull(branch);
        async move { Ok(pull) }
    }

    fn list_open_pull_requests(&self) -> impl Future<Output = GgResult<Vec<PullRequest>>> + Send {
        let pulls = self.state.lock().unwrap().pulls.values().cloned().collect();
        async move { Ok(pulls) }
    }

    fn build_status(&self, reference: &str) -> impl Future<Output = GgResult<BuildStatus>> + Send {
        let state = self
            .state
            .lock()
            .unwrap()
            .builds
            .get(reference)
            .cloned()
            .unwrap_or_else(|| "pending".to_string());
        async move {
            Ok(BuildStatus {
                state,
                total_count: 1,
            })
        }
    }

    fn reviews(&self, number: u64) -> impl Future<Output = GgResult<Vec<Review>>> + Send {
        let reviews = self
            .state
            .lock()
            .unwrap()
            .reviews
            .get(&number)
            .cloned()
            .unwrap_or_default();
        async move { Ok(reviews) }
    }

    fn update_base(&self, number: u64, base: &str) -> impl Future<Output = GgResult<bool>> + Send {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("update_base #{} {}", number, base));
        let confirmed = !state.refuse_base_update;
        if confirmed {
            if let Some(pull) = state.pulls.values_mut().find(|p| p.number == number) {
                pull.base_ref = base.to_string();
            }
        }
        async move { Ok(confirmed) }
    }

    fn merge_squash(
        &self,
        number: u64,
        sha: &str,
        title: &str,
        _body: &str,
    ) -> impl Future<Output = GgResult<bool>> + Send {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("merge #{} {} \"{}\"", number, sha, title));
        let merged = !state.refuse_merge;
        if merged {
            state.pulls.retain(|_, p| p.number != number);
        }
        async move { Ok(merged) }
    }

    fn create_pull_request(
        &self,
        request: NewPullRequest,
    ) -> impl Future<Output = GgResult<PullRequest>> + Send {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(format!("create {} -> {}", request.head, request.base));
        let number = self.open(&request.head, &request.base);
        let mut state = self.state.lock().unwrap();
        let pull = state.pulls.get_mut(&request.head).map(|pull| {
            pull.title = request.title.clone();
            pull.body = request.body.clone();
            pull.clone()
        });
        drop(state);
        async move {
            pull.ok_or_else(|| {
                GgError::external("create", format!("pull request #{} vanished", number))
            })
        }
    }

    fn current_user_login(&self) -> impl Future<Output = GgResult<String>> + Send {
        async { Ok("me".to_string()) }
    }
}
