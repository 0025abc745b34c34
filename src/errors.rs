//! Errors for the `gg` application.

use crate::constants::FIELD_SEPARATOR;
use nu_ansi_term::Color;
use thiserror::Error;

/// An error that can occur while operating on a stack.
#[derive(Error, Debug)]
pub enum GgError {
    /// A branch name could not be parsed as a stack element.
    #[error("Malformed branch identifier `{}`: {reason}", Color::Blue.paint(.identifier))]
    MalformedIdentifier { identifier: String, reason: String },
    /// A feature or change name contains the field separator, or is empty.
    #[error("Invalid {field} name `{value}`: must be non-empty and must not contain `{}`", FIELD_SEPARATOR)]
    InvalidField { field: &'static str, value: String },
    /// HEAD is detached, but the operation needs a branch.
    #[error("No branch is currently checked out.")]
    NoCurrentBranch,
    /// `--abort` / `--continue` was requested without a restack in progress.
    #[error("Not in a restack: `{}` is not a temporary branch.", Color::Blue.paint(.0))]
    NotInRestack(String),
    /// A restack was requested while another one is still in progress.
    #[error("A restack of `{}` is already in progress. Run `gg rebase --continue` or `gg rebase --abort` first.", Color::Blue.paint(.0))]
    RestackInProgress(String),
    /// Replaying commits hit a conflict. The working copy is left on the temporary branch.
    #[error("Conflict while restacking `{}`. Resolve it, then run `gg rebase --continue` (or `gg rebase --abort`).", Color::Blue.paint(.target))]
    RestackConflict {
        target: String,
        #[source]
        source: Box<GgError>,
    },
    /// Zero or more than one element matched where exactly one was required.
    #[error("Ambiguous target: {0}")]
    AmbiguousTarget(String),
    /// A requested position is not a positive, finite number.
    #[error("Invalid position {0}: must be a positive number.")]
    InvalidPosition(f64),
    /// A new position sits too close to an existing element to be ordered reliably.
    #[error("Position {position} is too close to existing branch `{}`.", Color::Blue.paint(.neighbor))]
    PositionTooClose { position: f64, neighbor: String },
    /// Nothing in the stack resolved for the requested navigation.
    #[error("Cannot determine branch: {0}")]
    CannotDetermineTarget(String),
    /// A call to git or to the review host failed.
    #[error("{operation} failed: {message}")]
    ExternalCallFailure { operation: String, message: String },
    /// The branch has no open pull request.
    #[error("No pull request exists for `{}`.", Color::Blue.paint(.0))]
    NoPullRequest(String),
    /// The review host did not complete the merge.
    #[error("Pull request #{0} was not merged.")]
    MergeRejected(u64),
    /// Review or build gating did not pass.
    #[error("Cannot land: {0}")]
    PreconditionFailed(String),
    /// The configuration is missing a required value.
    #[error("Configuration not initialized. Set it up at `{0}`.")]
    ConfigNotInitialized(String),
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    TomlDe(#[from] toml::de::Error),
    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl GgError {
    /// Creates an [GgError::ExternalCallFailure] for the named operation.
    pub fn external(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::ExternalCallFailure {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

impl From<git2::Error> for GgError {
    fn from(e: git2::Error) -> Self {
        Self::external("libgit2", e.message())
    }
}

impl From<octocrab::Error> for GgError {
    fn from(e: octocrab::Error) -> Self {
        Self::external("GitHub API", e)
    }
}

pub type GgResult<T> = Result<T, GgError>;
