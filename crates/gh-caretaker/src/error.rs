//! Caretaker error type

use gh_client::TrackerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// A slash command with no registered handler
    #[error("command handler not registered for command {0}")]
    UnsupportedCommand(String),

    #[error("invalid format for argument, wanted k=v but was: {0}")]
    InvalidArgument(String),

    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    #[error("issue #{issue} is not attached to project board #{project}")]
    ProjectNotAttached { issue: u64, project: u64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
