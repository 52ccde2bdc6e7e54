//! Result types and errors related to command stuff.

use crate::command::Lifecycle;
use std::any::Any;

/// Result represents a custom result where error is of the [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome is what a [`CompletionHandler`](crate::handler::CompletionHandler) receives once the
/// unit of work of a command has finished.
pub type Outcome<T> = std::result::Result<T, Failure>;

impl<T> From<Error> for Result<T> {
    fn from(value: Error) -> Self {
        Self::Err(value)
    }
}

/// Usage errors, reported synchronously to the caller.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("command {id} is {found}")]
    InvalidState { id: u64, found: Lifecycle },
    #[error("command {id} has been cancelled")]
    Cancelled { id: u64 },
}

impl Error {
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState { .. })
    }
}

/// The reason why the unit of work of a command did not produce a value.
#[derive(thiserror::Error, Debug)]
pub enum Failure {
    #[error("{0}")]
    Work(Box<dyn std::error::Error + Send + Sync>),
    #[error("command panicked: {0}")]
    Panicked(String),
    #[error("command abandoned by its executor")]
    Abandoned,
}

impl Failure {
    /// Builds a failure out of whatever the work panicked with.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => payload
                .downcast_ref::<&str>()
                .map(|message| message.to_string())
                .unwrap_or_else(|| "unknown panic payload".to_string()),
        };

        Self::Panicked(message)
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Failure::Panicked(_))
    }
}

impl From<String> for Failure {
    fn from(reason: String) -> Self {
        Self::Work(reason.into())
    }
}

impl From<&str> for Failure {
    fn from(reason: &str) -> Self {
        Self::Work(reason.into())
    }
}

impl From<std::io::Error> for Failure {
    fn from(error: std::io::Error) -> Self {
        Self::Work(Box::new(error))
    }
}
