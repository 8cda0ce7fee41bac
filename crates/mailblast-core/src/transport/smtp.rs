//! SMTP submission via `lettre`.

use async_trait::async_trait;
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use super::{Transport, TransportError};

/// SMTP endpoint settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Optional AUTH credentials (username, password).
    pub credentials: Option<(String, String)>,
}

/// The `lettre`-backed SMTP transport.
///
/// Submits over a plaintext connection to the configured host and port,
/// the usual setup for a trusted local smarthost. The serialized message
/// is passed through as-is; only the envelope addresses are parsed.
pub struct Smtp {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Smtp {
    /// Builds a transport for the given endpoint.
    #[must_use]
    pub fn new(settings: &SmtpSettings) -> Self {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .port(settings.port);
        if let Some((username, password)) = &settings.credentials {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Self {
            transport: builder.build(),
        }
    }
}

#[async_trait]
impl Transport for Smtp {
    async fn send(&self, from: &str, to: &str, wire: &str) -> Result<(), TransportError> {
        let from = from
            .parse::<Address>()
            .map_err(|e| TransportError::InvalidEnvelope(e.to_string()))?;
        let to = to
            .parse::<Address>()
            .map_err(|e| TransportError::InvalidEnvelope(e.to_string()))?;
        let envelope = Envelope::new(Some(from), vec![to])
            .map_err(|e| TransportError::InvalidEnvelope(e.to_string()))?;

        self.transport
            .send_raw(&envelope, wire.as_bytes())
            .await
            .map_err(classify)?;
        Ok(())
    }
}

/// Maps a `lettre` SMTP error onto the structured failure classes.
fn classify(error: lettre::transport::smtp::Error) -> TransportError {
    if error.is_timeout() {
        return TransportError::Timeout(error.to_string());
    }
    match error.status() {
        Some(code) => TransportError::Rejected {
            code: code.to_string().parse().ok(),
            message: error.to_string(),
        },
        None => TransportError::Connection(error.to_string()),
    }
}
