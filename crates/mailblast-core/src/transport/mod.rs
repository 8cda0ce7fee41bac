//! The seam to the external SMTP client.

mod smtp;

pub use smtp::{Smtp, SmtpSettings};

use async_trait::async_trait;

/// Structured transmission failure classes.
///
/// Delivery failures are isolated per recipient; the class is surfaced to
/// the log sink so an operator can tell a refused mailbox from a dead
/// server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached or the connection dropped.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The attempt timed out.
    #[error("timed out: {0}")]
    Timeout(String),

    /// The server rejected the envelope or message.
    #[error("rejected by server: {message}")]
    Rejected {
        /// SMTP reply code, when the server sent one.
        code: Option<u16>,
        /// Server message text.
        message: String,
    },

    /// Sender or recipient address was not accepted for the envelope.
    #[error("invalid envelope address: {0}")]
    InvalidEnvelope(String),
}

/// Transport capability used by the delivery engine.
///
/// Implementations submit one already-serialized message per call. The
/// engine treats any error as a per-recipient failure and continues with
/// the rest of the list.
#[async_trait]
pub trait Transport {
    /// Submits `wire` with the given envelope sender and recipient.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] naming the failure class.
    async fn send(&self, from: &str, to: &str, wire: &str) -> Result<(), TransportError>;
}
