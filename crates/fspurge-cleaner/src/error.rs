//! Purge engine error types.

use std::path::PathBuf;

use fspurge_types::Status;

use crate::classify::ClassifyError;

/// Failures that end a purge run.
///
/// Removal failures are deliberately absent: they are reported per entry
/// through [`crate::RemoveOutcome`] and never stop the walk.
#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error("cannot resolve {path}: {status}")]
    Resolve {
        path: String,
        #[source]
        status: Status,
    },

    #[error("lookup of {path} failed: {status}")]
    Lookup {
        path: String,
        #[source]
        status: Status,
    },

    #[error("listing {path} failed: {status}")]
    List {
        path: String,
        #[source]
        status: Status,
    },

    #[error("cannot classify {path}: {source}")]
    Classify {
        path: String,
        source: ClassifyError,
    },

    #[error("invalid target {path}: {reason}")]
    InvalidTarget { path: String, reason: String },
}

impl PurgeError {
    /// Path of the object the failing operation was applied to.
    pub fn path(&self) -> &str {
        match self {
            PurgeError::Resolve { path, .. }
            | PurgeError::Lookup { path, .. }
            | PurgeError::List { path, .. }
            | PurgeError::Classify { path, .. }
            | PurgeError::InvalidTarget { path, .. } => path,
        }
    }

    /// Store status behind the failure, if the store reported one.
    pub fn status(&self) -> Option<&Status> {
        match self {
            PurgeError::Resolve { status, .. }
            | PurgeError::Lookup { status, .. }
            | PurgeError::List { status, .. } => Some(status),
            _ => None,
        }
    }
}

/// Failures loading [`crate::PurgeOptions`] from a file.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use fspurge_types::{StatusCode, StoreCode};

    #[test]
    fn test_display_names_operation_and_path() {
        let err = PurgeError::List {
            path: "/scratch/a".into(),
            status: Status::with_message(StatusCode::OS_ERROR, "timeout"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("listing /scratch/a failed"));
        assert!(msg.contains("timeout"));
        assert_eq!(err.path(), "/scratch/a");
        assert_eq!(err.status().map(|s| s.code()), Some(StatusCode::OS_ERROR));
    }

    #[test]
    fn test_classify_has_no_status() {
        let err = PurgeError::Classify {
            path: "/x/y".into(),
            source: ClassifyError::NullHandle,
        };
        assert!(err.status().is_none());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_resolve_source_is_status() {
        let err = PurgeError::Resolve {
            path: "/nowhere".into(),
            status: Status::new(StoreCode::NO_FILE_SYSTEM),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("3011"));
    }
}
