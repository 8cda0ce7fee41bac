//! # mailblast-core
//!
//! Dispatch, retry, and accounting pipeline for the `mailblast` bulk mailer.
//!
//! This crate provides:
//! - Recipient ingestion with validation ([`RecipientStore`])
//! - Per-recipient template rendering ([`Template`])
//! - Outbound message composition ([`OutboundMessage`])
//! - The sequential send loop with failure isolation ([`DeliveryEngine`])
//! - The file-backed retry queue ([`RetrySink`])
//! - The run-level stats ledger ([`RunLedger`])
//!
//! Delivery is strictly sequential: one recipient reaches a terminal
//! outcome (sent, or failed and queued for retry) before the next is
//! attempted. SMTP itself is delegated to the [`transport::Transport`]
//! seam; the bundled [`Smtp`] implementation submits through `lettre`.
//!
//! The retry store and ledger are opened, rewritten in full, and closed on
//! every call. This is safe only under a single-process, single-threaded
//! campaign; concurrent runs sharing the same paths would corrupt state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod engine;
mod error;
pub mod ledger;
pub mod message;
pub mod recipient;
pub mod retry;
pub mod template;
pub mod transport;

pub use engine::{Campaign, DeliveryEngine, Pass, PassOutcome};
pub use error::{Error, PathKind, Result};
pub use ledger::{LedgerKey, RunLedger};
pub use message::{OutboundMessage, Sender};
pub use recipient::{Recipient, RecipientStore};
pub use retry::RetrySink;
pub use template::Template;
pub use transport::{Smtp, SmtpSettings, Transport, TransportError};
