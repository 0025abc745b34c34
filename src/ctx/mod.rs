//! The in-memory context of the `gg` application.

use crate::{
    config::{GgConfig, RepoSlug},
    errors::{GgError, GgResult},
    git::{active_repository, GitCli, GitOps},
    github::GitHubHost,
};
use std::path::PathBuf;

mod actions;
pub use actions::{CheckoutTarget, DeleteOutcome};

mod fmt;

/// The in-memory context of the `gg` application, built once at startup and handed to every
/// subcommand.
pub struct GgContext<G: GitOps> {
    /// The version-control capability.
    pub git: G,
    /// The resolved configuration.
    pub config: GgConfig,
    /// Where the configuration was loaded from.
    pub config_path: PathBuf,
}

impl GgContext<GitCli> {
    /// Loads the configuration and opens the repository of the current working directory.
    ///
    /// ## Takes
    /// - `token` - A token overriding the configured one, e.g. from `$GITHUB_TOKEN`.
    pub fn load(token: Option<String>) -> GgResult<Self> {
        let config_path = GgConfig::default_path()?;
        let config = GgConfig::load_or_initialize(&config_path)?.with_token(token);
        let repository = active_repository()
            .ok_or_else(|| GgError::external("git", "not in a git repository"))?;

        Ok(Self {
            git: GitCli::new(repository, config.remote.clone()),
            config,
            config_path,
        })
    }

    /// Returns the host, owner and name of the repository behind the configured remote.
    pub fn slug(&self) -> GgResult<RepoSlug> {
        RepoSlug::from_remote_url(&self.git.remote_url()?)
    }

    /// Creates the [GitHubHost] for the repository.
    ///
    /// ## Returns
    /// - `Err(GgError::ConfigNotInitialized)` - No token is configured.
    pub fn review_host(&self) -> GgResult<GitHubHost> {
        let token = self.config.require_token(&self.config_path)?;
        GitHubHost::from_token(token, self.slug()?)
    }
}

#[cfg(test)]
impl GgContext<crate::test_utils::FakeGit> {
    /// A context over a fresh [crate::test_utils::FakeGit] with the default configuration.
    pub(crate) fn fake() -> Self {
        Self {
            git: crate::test_utils::FakeGit::new(),
            config: GgConfig::default(),
            config_path: PathBuf::from(crate::constants::GG_CFG_FILE_NAME),
        }
    }
}
