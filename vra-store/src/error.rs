//! Error types for vra-store.

use std::path::PathBuf;

use thiserror::Error;
use vra_core::StorageError;

/// All errors that can arise from the file-backed store.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// I/O failure, with the path it happened at.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load.
    #[error("failed to parse record at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A record file holds something other than a mapping.
    #[error("record at {path} is not a document")]
    NotADocument { path: PathBuf },

    /// Collection names share the identifier alphabet.
    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The blocking filesystem task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<FileStoreError> for StorageError {
    fn from(err: FileStoreError) -> Self {
        StorageError::Backend(Box::new(err))
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FileStoreError {
    FileStoreError::Io {
        path: path.into(),
        source,
    }
}
