//! Driver configuration.
//!
//! Everything the core consumes as plain values: store paths, the SMTP
//! endpoint, sender identity, pacing, and the test recipient list. The
//! file is TOML; a missing file yields a usable local-relay setup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use mailblast_core::{Sender, SmtpSettings};

/// Driver configuration, loaded from TOML.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Log file path; logs go to stderr when unset.
    pub log_file: Option<PathBuf>,
    /// Retry store path.
    pub retry_store: PathBuf,
    /// Run ledger path.
    pub ledger: PathBuf,
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// Optional SMTP AUTH username.
    pub smtp_username: Option<String>,
    /// Optional SMTP AUTH password.
    pub smtp_password: Option<String>,
    /// Sender display name.
    pub from_name: String,
    /// Sender address.
    pub from_email: String,
    /// Pause between successful sends, in milliseconds.
    pub send_delay_ms: u64,
    /// Additional passes over the retry store after the initial pass.
    pub retry_passes: u32,
    /// Recipients for test campaigns.
    pub test_recipients: Vec<TestRecipient>,
}

/// One configured test recipient.
#[derive(Debug, Clone, Deserialize)]
pub struct TestRecipient {
    /// Display name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: None,
            retry_store: PathBuf::from("retry.csv"),
            ledger: PathBuf::from("stats.log"),
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            smtp_username: None,
            smtp_password: None,
            from_name: String::new(),
            from_email: "mailer@localhost".to_string(),
            send_delay_ms: 250,
            retry_passes: 2,
            test_recipients: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the configuration file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or is not
    /// valid TOML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Sender identity from the configured name and address.
    #[must_use]
    pub fn sender(&self) -> Sender {
        Sender::new(&self.from_name, &self.from_email)
    }

    /// SMTP endpoint settings.
    #[must_use]
    pub fn smtp(&self) -> SmtpSettings {
        let credentials = match (&self.smtp_username, &self.smtp_password) {
            (Some(username), Some(password)) => Some((username.clone(), password.clone())),
            _ => None,
        };
        SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            credentials,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults_when_file_absent() {
        let config = Config::load(Path::new("/nonexistent/mailblast.toml")).unwrap();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 25);
        assert_eq!(config.retry_passes, 2);
        assert!(config.smtp().credentials.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
smtp_host = "mail.example.com"
smtp_port = 587
from_name = "The Team"
from_email = "team@example.com"
retry_passes = 1

[[test_recipients]]
name = "QA"
email = "qa@example.com"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.smtp_host, "mail.example.com");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.sender().mailbox(), "The Team <team@example.com>");
        assert_eq!(config.retry_passes, 1);
        assert_eq!(config.test_recipients.len(), 1);
        // untouched fields keep their defaults
        assert_eq!(config.send_delay_ms, 250);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "smpt_host = \"typo.example.com\"").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
