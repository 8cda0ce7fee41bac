//! Run-level accounting ledger.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, PathKind, Result};

/// Keys of the run ledger.
///
/// Entries are matched by their full label, so distinct keys can never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKey {
    /// Number of recipients the run started with.
    TotalRecipients,
    /// Wall-clock time the run started.
    StartTime,
    /// Most recently delivered recipient, the resumption hint after a
    /// mid-run crash.
    LastRecipient,
    /// Running count of failed deliveries.
    FailedRecipients,
    /// Recipient database the campaign was run against.
    CsvUsed,
    /// Wall-clock time the run completed.
    EndTime,
}

impl LedgerKey {
    /// The label written to the ledger file.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TotalRecipients => "TOTAL RECIPIENTS",
            Self::StartTime => "START TIME",
            Self::LastRecipient => "LAST RECIPIENT",
            Self::FailedRecipients => "FAILED RECIPIENTS",
            Self::CsvUsed => "CSV USED",
            Self::EndTime => "END TIME",
        }
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Idempotent key-value stats log for one run.
///
/// Each call reads the existing entries, overwrites the matching label in
/// place or appends a new one, and rewrites the file, so an interrupted
/// run's progress stays inspectable at any point. Entry order is the
/// order of first insertion.
#[derive(Debug, Clone)]
pub struct RunLedger {
    path: PathBuf,
}

impl RunLedger {
    /// Creates a ledger over the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upserts one entry and rewrites the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the ledger path cannot be read or
    /// rewritten. Fatal: losing run accounting defeats the ledger's
    /// crash-recovery purpose.
    pub fn record(&self, key: LedgerKey, value: impl fmt::Display) -> Result<()> {
        let mut entries = self.entries()?;
        let value = value.to_string();

        match entries.iter_mut().find(|(label, _)| label == key.label()) {
            Some(entry) => entry.1 = value,
            None => entries.push((key.label().to_string(), value)),
        }

        let mut output = String::new();
        for (label, value) in &entries {
            output.push_str(label);
            output.push_str(": ");
            output.push_str(value);
            output.push('\n');
        }
        fs::write(&self.path, output)
            .map_err(|e| Error::not_found(PathKind::Ledger, &self.path, e))?;
        Ok(())
    }

    /// Reads the current entries in file order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the ledger path cannot be read.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let existing = fs::read_to_string(&self.path)
            .map_err(|e| Error::not_found(PathKind::Ledger, &self.path, e))?;

        Ok(existing
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(": ") {
                Some((label, value)) => (label.to_string(), value.to_string()),
                None => (line.to_string(), String::new()),
            })
            .collect())
    }
}

/// Wall-clock timestamp in the format the ledger uses.
#[must_use]
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
