//! Campaign template loading and placeholder rendering.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, PathKind, Result};
use crate::recipient::Recipient;

const OPEN: &str = "<!--";
const CLOSE: &str = "-->";

/// A campaign template document.
///
/// Loaded once per campaign and treated as read-only afterwards.
/// Placeholders take the literal form `<!--key-->` and are substituted
/// per recipient at render time.
#[derive(Debug, Clone)]
pub struct Template {
    content: String,
}

impl Template {
    /// Loads the template document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the path cannot be read and
    /// [`Error::EmptyTemplate`] when the document has no content. Both
    /// are fatal and surface before any send attempt.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| Error::not_found(PathKind::Template, path, e))?;
        if content.is_empty() {
            return Err(Error::EmptyTemplate(path.to_path_buf()));
        }
        Ok(Self { content })
    }

    /// Builds a template from already-loaded content.
    #[must_use]
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Renders the template against one recipient.
    ///
    /// Every `<!--key-->` whose key names a recipient field is replaced
    /// by that field's value; placeholders with no matching key pass
    /// through verbatim, so templates with optional fields render
    /// cleanly. The scan is a single pass over the document, and
    /// substituted values are never rescanned.
    #[must_use]
    pub fn render(&self, recipient: &Recipient) -> String {
        let fields = recipient.fields();
        let mut output = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        while let Some(start) = rest.find(OPEN) {
            output.push_str(&rest[..start]);
            let after = &rest[start + OPEN.len()..];

            let substituted = after.find(CLOSE).and_then(|end| {
                let key = &after[..end];
                fields
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| (end, *value))
            });

            match substituted {
                Some((end, value)) => {
                    output.push_str(value);
                    rest = &after[end + CLOSE.len()..];
                }
                None => {
                    // not a placeholder (unknown key, ordinary comment, or
                    // unterminated marker): keep the opener and rescan
                    // right after it
                    output.push_str(OPEN);
                    rest = after;
                }
            }
        }

        output.push_str(rest);
        output
    }
}
