//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover invalid configuration, definition decoding, worker task failures,
//! pool shutdown, IO, and generic errors.
//!
//! Rejected placements and registry shape mismatches are not errors: they are reported
//! through `bool` returns and [`crate::registry::PatchOutcome`] respectively.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error("unknown definition '{id}'")]
    UnknownDefinition { id: String },

    #[error("worker task failed: {0}")]
    TaskFailed(String),

    #[error("worker task panicked: {0}")]
    TaskPanicked(String),

    #[error("worker task was cancelled during pool shutdown")]
    TaskCancelled,

    #[error("worker pool is shut down")]
    PoolShutdown,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn decode(what: &'static str, message: impl ToString) -> Self {
        Error::Decode {
            what,
            message: message.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn decode_error_names_the_payload() {
        let err = Error::decode("tree definition", "missing field `trunk`");
        assert_eq!(
            err.to_string(),
            "failed to decode tree definition: missing field `trunk`"
        );
    }
}
