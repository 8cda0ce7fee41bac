//! File-backed retry queue.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::{Error, PathKind, Result};
use crate::recipient::{Recipient, RecipientStore};

/// Append sink for recipients whose delivery attempt failed.
///
/// The store is consumed (and truncated) by the next retry pass, so at
/// any point it holds either fresh failures or nothing. A failed send is
/// never lost silently.
#[derive(Debug, Clone)]
pub struct RetrySink {
    path: PathBuf,
}

impl RetrySink {
    /// Creates a sink over the given store path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably queues a failed recipient for a later pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the store path cannot be opened
    /// for append. Fatal: a failure that cannot be recorded must not be
    /// silently dropped.
    pub fn record(&self, recipient: &Recipient) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| Error::not_found(PathKind::RetryStore, &self.path, e))?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record([recipient.name.as_str(), recipient.email.as_str()])?;
        writer.flush()?;
        Ok(())
    }

    /// Exposes the store as a recipient source for the next retry pass.
    ///
    /// Parsing it with `consume` set truncates the store, draining the
    /// queue exactly once.
    #[must_use]
    pub fn as_store(&self) -> RecipientStore {
        RecipientStore::new(&self.path)
    }
}
