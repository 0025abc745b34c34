//! User configuration and the repository coordinates derived from the remote.

use crate::{
    constants::GG_CFG_FILE_NAME,
    errors::{GgError, GgResult},
};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// The `gg` configuration, stored as TOML in the user's home directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GgConfig {
    /// Personal access token for the review host.
    pub github_token: String,
    /// The remote that stacks are pushed to.
    pub remote: String,
    /// The branch features land onto when no `--onto` is given.
    pub trunk: String,
}

impl Default for GgConfig {
    fn default() -> Self {
        Self {
            github_token: String::new(),
            remote: "origin".to_string(),
            trunk: "main".to_string(),
        }
    }
}

impl GgConfig {
    /// Returns the path of the configuration file, `$HOME/.gg_config.toml`.
    pub fn default_path() -> GgResult<PathBuf> {
        env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(GG_CFG_FILE_NAME))
            .ok_or_else(|| GgError::ConfigNotInitialized(format!("$HOME/{}", GG_CFG_FILE_NAME)))
    }

    /// Loads the configuration at `path`, writing the defaults there first if it does not
    /// exist yet.
    pub fn load_or_initialize(path: &Path) -> GgResult<Self> {
        if path.exists() {
            return Ok(toml::from_str(&fs::read_to_string(path)?)?);
        }

        let config = Self::default();
        fs::write(path, toml::to_string_pretty(&config)?)?;
        tracing::info!(path = %path.display(), "Initialized configuration");
        Ok(config)
    }

    /// Overrides the stored token, e.g. with `$GITHUB_TOKEN`.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.github_token = token;
        }
        self
    }

    /// Returns the token, or [GgError::ConfigNotInitialized] pointing at `path`.
    pub fn require_token(&self, path: &Path) -> GgResult<&str> {
        if self.github_token.is_empty() {
            return Err(GgError::ConfigNotInitialized(path.display().to_string()));
        }
        Ok(&self.github_token)
    }
}

/// The host, owner and name of the repository behind a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parses a remote URL in scp-style (`git@host:owner/name.git`), `https://` or `ssh://`
    /// form.
    pub fn from_remote_url(url: &str) -> GgResult<Self> {
        let invalid =
            || GgError::external("git remote", format!("cannot parse remote URL `{}`", url));
        let url = url.trim();

        let (authority, path) = match url.split_once("://") {
            Some((_, rest)) => rest.split_once('/').ok_or_else(invalid)?,
            None => url.split_once(':').ok_or_else(invalid)?,
        };

        let host = authority.rsplit('@').next().unwrap_or(authority);
        let host = host.split(':').next().unwrap_or(host);

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let mut segments = path.rsplit('/');
        let name = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let owner = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

        if host.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Returns the web URL of pull request `number`.
    pub fn pull_request_url(&self, number: u64) -> String {
        format!("https://{}/{}/{}/pull/{}", self.host, self.owner, self.name, number)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn initializes_missing_config_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GG_CFG_FILE_NAME);

        let config = GgConfig::load_or_initialize(&path).unwrap();
        assert_eq!(config, GgConfig::default());
        assert!(path.exists());
        assert!(matches!(
            config.require_token(&path),
            Err(GgError::ConfigNotInitialized(_))
        ));

        let reloaded = GgConfig::load_or_initialize(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GG_CFG_FILE_NAME);
        fs::write(&path, "github-token = \"abc\"\ntrunk = \"master\"\n").unwrap();

        let config = GgConfig::load_or_initialize(&path).unwrap();
        assert_eq!(config.github_token, "abc");
        assert_eq!(config.trunk, "master");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.require_token(&path).unwrap(), "abc");
    }

    #[test]
    fn token_override() {
        let config = GgConfig::default().with_token(Some("env".to_string()));
        assert_eq!(config.github_token, "env");

        let config = config.with_token(Some(String::new()));
        assert_eq!(config.github_token, "env");
    }

    #[test]
    fn parses_remote_urls() {
        let expected = RepoSlug {
            host: "github.com".to_string(),
            owner: "willhug".to_string(),
            name: "gg".to_string(),
        };

        for url in [
            "git@github.com:willhug/gg.git",
            "git@github.com:willhug/gg",
            "https://github.com/willhug/gg.git",
            "https://github.com/willhug/gg/",
            "ssh://git@github.com:22/willhug/gg.git",
        ] {
            assert_eq!(RepoSlug::from_remote_url(url).unwrap(), expected, "{}", url);
        }

        assert!(RepoSlug::from_remote_url("not a url").is_err());
        assert!(RepoSlug::from_remote_url("https://github.com/only").is_err());
    }

    #[test]
    fn pull_request_url() {
        let slug = RepoSlug::from_remote_url("git@github.example.com:team/app.git").unwrap();
        assert_eq!(slug.host, "github.example.com");
        assert_eq!(
            slug.pull_request_url(7),
            "https://github.example.com/team/app/pull/7"
        );
    }
}
