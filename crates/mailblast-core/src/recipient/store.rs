//! File-backed recipient source.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::model::Recipient;
use crate::error::{Error, PathKind, Result};

/// Reads recipients from a delimited record source.
///
/// Field 0 is the display name (optional), field 1 the email address. No
/// header row is assumed.
#[derive(Debug, Clone)]
pub struct RecipientStore {
    path: PathBuf,
}

impl RecipientStore {
    /// Creates a store over the given source path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses every record in the source, preserving source order.
    ///
    /// Records with a missing or malformed email address are dropped with
    /// a diagnostic naming the record index; dropped records never fail
    /// the parse. When `consume` is set the source is truncated to empty
    /// after reading, so a retry queue is drained exactly once per pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the source path cannot be opened.
    /// Fatal to the whole campaign.
    pub fn parse(&self, consume: bool) -> Result<Vec<Recipient>> {
        let file = File::open(&self.path)
            .map_err(|e| Error::not_found(PathKind::RecipientSource, &self.path, e))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut recipients = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(error) => {
                    warn!(line = index, %error, "unreadable record dropped");
                    continue;
                }
            };

            let name = record.get(0).unwrap_or_default();
            let email = record.get(1).unwrap_or_default();
            match Recipient::new(name, email) {
                Some(recipient) => recipients.push(recipient),
                None => warn!(line = index, email, "recipient email missing or invalid"),
            }
        }

        if consume {
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .open(&self.path)
                .map_err(|e| Error::not_found(PathKind::RecipientSource, &self.path, e))?;
        }

        Ok(recipients)
    }
}
