//! Error handling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the instance store and the launcher.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error at {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {path:?}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("an instance named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("instance \"{0}\" not found")]
    NotFound(String),

    #[error("invalid name \"{name}\": {reason}")]
    InvalidName { name: String, reason: String },

    #[error("failed to launch \"{name}\": {reason}")]
    Launch { name: String, reason: String },
}

impl Error {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn launch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Launch {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_instance() {
        let err = Error::DuplicateName("Survival".to_string());
        assert_eq!(
            err.to_string(),
            "an instance named \"Survival\" already exists"
        );

        let err = Error::launch("Survival", "client jar missing");
        assert_eq!(
            err.to_string(),
            "failed to launch \"Survival\": client jar missing"
        );
    }

    #[test]
    fn storage_keeps_io_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::storage("/tmp/instances", io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("denied"));
    }
}
