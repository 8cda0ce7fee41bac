//! Error types for the dispatch pipeline.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Which backing file a fatal path error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// The recipient database a campaign is run against.
    RecipientSource,
    /// The campaign template document.
    Template,
    /// The file-backed retry queue.
    RetryStore,
    /// The run-level stats ledger.
    Ledger,
}

impl std::fmt::Display for PathKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecipientSource => write!(f, "recipient source"),
            Self::Template => write!(f, "template"),
            Self::RetryStore => write!(f, "retry store"),
            Self::Ledger => write!(f, "ledger"),
        }
    }
}

/// Errors that can occur in the dispatch pipeline.
///
/// Every variant here is fatal to the campaign. Per-recipient problems
/// (an invalid email address, a refused delivery) are handled where they
/// occur and never surface as an `Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A backing file could not be opened or written.
    #[error("{kind} path is invalid: {path}: {source}")]
    NotFound {
        /// Which backing file failed.
        kind: PathKind,
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },

    /// The template document exists but has no content.
    #[error("template file is empty: {0}")]
    EmptyTemplate(PathBuf),

    /// A delimited record could not be written.
    #[error("record write failed: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure outside the typed path errors above.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Wraps an I/O failure with the backing file it refers to.
    pub(crate) fn not_found(kind: PathKind, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::NotFound {
            kind,
            path: path.into(),
            source,
        }
    }
}
