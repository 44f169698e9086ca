//! Error types for profile store and settings operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the profile store, settings sync, backups and the onboarding patch
#[derive(Debug, Error)]
pub enum Error {
    /// Profile name is unknown
    #[error("profile '{name}' not found")]
    NotFound { name: String },

    /// Bad profile name or empty profile
    #[error("{0}")]
    Validation(String),

    /// A profile with this name already exists
    #[error("profile '{name}' already exists")]
    AlreadyExists { name: String },

    /// Read, write or rename failure
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON where discarding the content is not allowed
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
        }
    }

    /// Stable error code for scripting and log fields
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Io { .. } => "IO_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_profile() {
        let err = Error::not_found("work");
        assert_eq!(err.to_string(), "profile 'work' not found");
        assert_eq!(err.code(), "NOT_FOUND");

        let err = Error::AlreadyExists {
            name: "work".to_string(),
        };
        assert_eq!(err.to_string(), "profile 'work' already exists");
        assert_eq!(err.code(), "ALREADY_EXISTS");
    }

    #[test]
    fn io_error_includes_path() {
        let err = Error::io(
            Path::new("/tmp/profiles.json"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/profiles.json"));
        assert!(msg.contains("denied"));
        assert_eq!(err.code(), "IO_ERROR");
    }
}
