//! The delivery engine: the sequential send loop.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error};

use crate::error::Result;
use crate::ledger::{self, LedgerKey, RunLedger};
use crate::message::{OutboundMessage, Sender};
use crate::recipient::Recipient;
use crate::retry::RetrySink;
use crate::template::Template;
use crate::transport::Transport;

/// Which kind of pass the engine is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// First pass over the primary recipient list.
    Initial,
    /// Subsequent pass over the drained retry store.
    Retry,
}

/// One campaign: the loaded template, subject line, and sender identity.
#[derive(Debug, Clone)]
pub struct Campaign {
    /// Loaded template document.
    pub template: Template,
    /// Subject line applied to every message.
    pub subject: String,
    /// Sender identity.
    pub sender: Sender,
}

/// Aggregate result of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Recipients delivered successfully.
    pub succeeded: usize,
    /// Recipients that failed and were queued for retry.
    pub failed: usize,
}

/// Sequential delivery loop over a recipient list.
///
/// Each recipient reaches a terminal outcome (sent, or failed and queued
/// for retry) before the next is attempted. A transmission failure never
/// aborts the loop; only an unwritable retry store or ledger does.
pub struct DeliveryEngine<T> {
    transport: T,
    retry: RetrySink,
    ledger: RunLedger,
    delay: Duration,
}

impl<T: Transport> DeliveryEngine<T> {
    /// Creates an engine from its collaborators.
    ///
    /// `delay` is the pause after each successful transmission, bounding
    /// the outbound rate against the mail server.
    #[must_use]
    pub fn new(transport: T, retry: RetrySink, ledger: RunLedger, delay: Duration) -> Self {
        Self {
            transport,
            retry,
            ledger,
            delay,
        }
    }

    /// Runs one pass over `recipients`, in order.
    ///
    /// An initial pass records the recipient total and start time before
    /// the first attempt. On each success the ledger's last-recipient
    /// entry is updated so a mid-run crash leaves a resumption hint. On
    /// each failure the recipient is queued to the retry store, the
    /// failure class is logged, and the running failure count is
    /// recorded; the loop then continues with the next recipient.
    ///
    /// # Errors
    ///
    /// Propagates only the fatal conditions: a retry store or ledger path
    /// that cannot be written.
    pub async fn run(
        &self,
        campaign: &Campaign,
        recipients: &[Recipient],
        pass: Pass,
    ) -> Result<PassOutcome> {
        if pass == Pass::Initial {
            self.ledger
                .record(LedgerKey::TotalRecipients, recipients.len())?;
            self.ledger.record(LedgerKey::StartTime, ledger::timestamp())?;
        }

        let mut outcome = PassOutcome::default();
        for recipient in recipients {
            let body = campaign.template.render(recipient);
            let message =
                OutboundMessage::compose(recipient, &campaign.sender, &campaign.subject, body);

            match self
                .transport
                .send(&campaign.sender.email, &recipient.email, &message.to_wire())
                .await
            {
                Ok(()) => {
                    outcome.succeeded += 1;
                    debug!(recipient = %recipient.email, "delivered");
                    self.ledger
                        .record(LedgerKey::LastRecipient, recipient.mailbox())?;
                    sleep(self.delay).await;
                }
                Err(reason) => {
                    error!(recipient = %recipient.email, %reason, "delivery failed, queued for retry");
                    self.retry.record(recipient)?;
                    outcome.failed += 1;
                    self.ledger
                        .record(LedgerKey::FailedRecipients, outcome.failed)?;
                }
            }
        }

        Ok(outcome)
    }
}
