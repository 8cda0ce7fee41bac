//! Outbound message composition.

use std::fmt::Write;

use crate::recipient::Recipient;

/// Sender identity for a campaign.
#[derive(Debug, Clone)]
pub struct Sender {
    /// Display name; may be empty.
    pub name: String,
    /// Sender address.
    pub email: String,
}

impl Sender {
    /// Creates a sender identity.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
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
}

/// A transmissible message: rendered body plus header fields.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// `From` header value.
    pub from: String,
    /// `To` header value.
    pub to: String,
    /// `Subject` header value.
    pub subject: String,
    /// Rendered HTML body.
    pub body: String,
}

impl OutboundMessage {
    /// Composes a message for one recipient.
    ///
    /// Header values have ASCII control characters stripped, so a display
    /// name or subject cannot smuggle additional header lines into the
    /// wire form.
    #[must_use]
    pub fn compose(
        recipient: &Recipient,
        sender: &Sender,
        subject: &str,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: sanitize_header(&sender.mailbox()),
            to: sanitize_header(&recipient.mailbox()),
            subject: sanitize_header(subject),
            body: body.into(),
        }
    }

    /// Serializes to the transport wire form: an RFC 2822 style header
    /// block, a blank line, then the HTML body.
    #[must_use]
    pub fn to_wire(&self) -> String {
        let mut message = String::new();

        let _ = writeln!(message, "From: {}\r", self.from);
        let _ = writeln!(message, "To: {}\r", self.to);
        let _ = writeln!(message, "Subject: {}\r", self.subject);
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/html\r\n");

        // Empty line between headers and body
        message.push_str("\r\n");
        message.push_str(&self.body);

        message
    }
}

/// Strips ASCII control characters from a header value.
fn sanitize_header(value: &str) -> String {
    value.chars().filter(|c| !c.is_ascii_control()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ann() -> Recipient {
        Recipient::new("Ann", "ann@example.com").unwrap()
    }

    fn sender() -> Sender {
        Sender::new("The Team", "team@example.com")
    }

    #[test]
    fn test_wire_form() {
        let message = OutboundMessage::compose(&ann(), &sender(), "Hi there", "<p>Hello</p>");
        let wire = message.to_wire();
        assert_eq!(
            wire,
            "From: The Team <team@example.com>\r\n\
             To: Ann <ann@example.com>\r\n\
             Subject: Hi there\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/html\r\n\
             \r\n\
             <p>Hello</p>"
        );
    }

    #[test]
    fn test_bare_address_when_unnamed() {
        let recipient = Recipient::new("", "ann@example.com").unwrap();
        let message = OutboundMessage::compose(&recipient, &sender(), "Hi", "body");
        assert_eq!(message.to, "ann@example.com");
    }

    #[test]
    fn test_header_injection_is_defanged() {
        let recipient = Recipient {
            name: "Ann\r\nBcc: evil@example.com".to_string(),
            email: "ann@example.com".to_string(),
        };
        let message = OutboundMessage::compose(&recipient, &sender(), "Hi\r\nX-Bad: 1", "body");
        assert_eq!(message.to, "AnnBcc: evil@example.com <ann@example.com>");
        assert_eq!(message.subject, "HiX-Bad: 1");
        // the header block still has exactly five lines
        let headers = message.to_wire();
        let header_block = headers.split("\r\n\r\n").next().unwrap();
        assert_eq!(header_block.lines().count(), 5);
    }
}
