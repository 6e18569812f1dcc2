//! Gateway error taxonomy

use thiserror::Error;

/// Errors returned by `IssueTracker` operations
///
/// No operation retries internally; every variant is final for the call that
/// produced it.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Network or authentication failure reported by the HTTP layer
    #[error("GitHub request failed: {0}")]
    Transport(#[from] octocrab::Error),

    /// The GraphQL endpoint answered with an `errors` array
    #[error("GitHub GraphQL error: {0}")]
    GraphQl(String),

    /// The response did not have the expected shape
    #[error("Unexpected GitHub response: {0}")]
    Decode(String),

    /// An expected single entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Label lookup by name did not match exactly one label
    #[error("expected exactly one label named '{name}', found {found}")]
    AmbiguousOrMissingLabel { name: String, found: usize },
}

impl TrackerError {
    /// Whether this error is a transport-level failure (network, auth, schema)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TrackerError::Transport(_) | TrackerError::GraphQl(_) | TrackerError::Decode(_)
        )
    }

    /// Whether this error reports a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound(_))
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
