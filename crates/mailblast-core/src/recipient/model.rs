//! Recipient model and address validation.

/// A single entry from the recipient database.
///
/// Identity is the email address; the display name may be empty. Records
/// are immutable once yielded by the store, and duplicates pass through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Display name; may be empty.
    pub name: String,
    /// Validated email address.
    pub email: String,
}

impl Recipient {
    /// Creates a recipient, validating the email address.
    ///
    /// Returns `None` when the address fails the conservative syntax
    /// check; the caller decides whether that drops a record or skips a
    /// configured entry.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Option<Self> {
        let email = email.into();
        if !is_valid_email(&email) {
            return None;
        }
        Some(Self {
            name: name.into(),
            email,
        })
    }

    /// Mailbox form: `Name <email>` when a name is present, the bare
    /// address otherwise.
    #[must_use]
    pub fn mailbox(&self) -> String {
        if self.name.is_empty() {
            self.email.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }

    /// Substitutable template fields for this recipient.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 2] {
        [("name", &self.name), ("email", &self.email)]
    }
}

/// Conservative syntactic email check.
///
/// Accepts a non-empty local part without whitespace, exactly one `@`,
/// and a dot-separated domain of alphanumeric labels (inner hyphens
/// allowed) ending in a 2-6 letter top-level label. Anything else is
/// rejected; the mail server remains the final authority.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    for label in &labels {
        if label.is_empty()
            || label.starts_with('-')
            || label.ends_with('-')
            || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return false;
        }
    }

    let tld = labels[labels.len() - 1];
    (2..=6).contains(&tld.len()) && tld.chars().all(|c| c.is_ascii_alphabetic())
}
