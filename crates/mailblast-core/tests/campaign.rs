//! End-to-end campaign scenarios over real files and a scripted transport.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use mailblast_core::{
    Campaign, DeliveryEngine, Pass, RecipientStore, RetrySink, RunLedger, Sender, Template,
    Transport, TransportError,
};

/// In-process transport whose failure set can be changed between passes.
#[derive(Clone, Default)]
struct ScriptedTransport {
    fail_for: Arc<Mutex<HashSet<String>>>,
    wires: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    fn fail(&self, address: &str) {
        self.fail_for.lock().unwrap().insert(address.to_string());
    }

    fn recover(&self, address: &str) {
        self.fail_for.lock().unwrap().remove(address);
    }

    fn wires(&self) -> Vec<String> {
        self.wires.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _from: &str, to: &str, wire: &str) -> Result<(), TransportError> {
        if self.fail_for.lock().unwrap().contains(to) {
            return Err(TransportError::Connection("connection refused".to_string()));
        }
        self.wires.lock().unwrap().push(wire.to_string());
        Ok(())
    }
}

struct Harness {
    _dir: TempDir,
    store: RecipientStore,
    retry: RetrySink,
    ledger: RunLedger,
    transport: ScriptedTransport,
    engine: DeliveryEngine<ScriptedTransport>,
    campaign: Campaign,
}

fn harness(csv_content: &str) -> Harness {
    let dir = TempDir::new().unwrap();

    let template_path = dir.path().join("campaign.html");
    let csv_path = dir.path().join("recipients.csv");
    let retry_path = dir.path().join("retry.csv");
    let ledger_path = dir.path().join("stats.log");
    fs::write(&template_path, "Hello <!--name-->!").unwrap();
    fs::write(&csv_path, csv_content).unwrap();
    fs::write(&retry_path, "").unwrap();
    fs::write(&ledger_path, "").unwrap();

    let retry = RetrySink::new(&retry_path);
    let ledger = RunLedger::new(&ledger_path);
    let transport = ScriptedTransport::default();
    let engine = DeliveryEngine::new(
        transport.clone(),
        retry.clone(),
        ledger.clone(),
        Duration::ZERO,
    );

    Harness {
        store: RecipientStore::new(&csv_path),
        retry,
        ledger,
        transport,
        engine,
        campaign: Campaign {
            template: Template::load(&template_path).unwrap(),
            subject: "Greetings".to_string(),
            sender: Sender::new("The Team", "team@example.com"),
        },
        _dir: dir,
    }
}

#[tokio::test]
async fn full_campaign_with_one_failure() {
    let h = harness("Ann,ann@example.com\n,bad-email\nBob,bob@example.com\n");
    h.transport.fail("bob@example.com");

    // the malformed record is dropped during parsing
    let recipients = h.store.parse(false).unwrap();
    assert_eq!(recipients.len(), 2);
    assert_eq!(recipients[0].name, "Ann");
    assert_eq!(recipients[1].name, "Bob");

    let bodies: Vec<String> = recipients
        .iter()
        .map(|r| h.campaign.template.render(r))
        .collect();
    assert_eq!(bodies, ["Hello Ann!", "Hello Bob!"]);

    let outcome = h
        .engine
        .run(&h.campaign, &recipients, Pass::Initial)
        .await
        .unwrap();
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.failed, 1);

    // only Ann's message went out, body intact on the wire
    let wires = h.transport.wires();
    assert_eq!(wires.len(), 1);
    assert!(wires[0].ends_with("\r\n\r\nHello Ann!"));
    assert!(wires[0].contains("To: Ann <ann@example.com>\r\n"));

    // Bob is durably queued
    let queued = h.retry.as_store().parse(false).unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].email, "bob@example.com");

    // ledger reflects the run
    let entries = h.ledger.entries().unwrap();
    let get = |label: &str| {
        entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.clone())
            .unwrap()
    };
    assert_eq!(get("TOTAL RECIPIENTS"), "2");
    assert_eq!(get("FAILED RECIPIENTS"), "1");
    assert_eq!(get("LAST RECIPIENT"), "Ann <ann@example.com>");
}

#[tokio::test]
async fn retry_pass_drains_the_store() {
    let h = harness("Ann,ann@example.com\nBob,bob@example.com\n");
    h.transport.fail("bob@example.com");

    let recipients = h.store.parse(false).unwrap();
    h.engine
        .run(&h.campaign, &recipients, Pass::Initial)
        .await
        .unwrap();

    // the server comes back before the retry pass
    h.transport.recover("bob@example.com");

    let queued = h.retry.as_store().parse(true).unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(
        fs::read_to_string(h.retry.path()).unwrap(),
        "",
        "consuming parse truncates the store"
    );

    let outcome = h
        .engine
        .run(&h.campaign, &queued, Pass::Retry)
        .await
        .unwrap();
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.succeeded, 1);

    // no fresh failures were queued
    assert_eq!(fs::read_to_string(h.retry.path()).unwrap(), "");
}

#[tokio::test]
async fn repeated_failure_requeues_for_the_next_pass() {
    let h = harness("Bob,bob@example.com\n");
    h.transport.fail("bob@example.com");

    let recipients = h.store.parse(false).unwrap();
    h.engine
        .run(&h.campaign, &recipients, Pass::Initial)
        .await
        .unwrap();

    // first retry pass still fails; Bob must end up queued again
    let queued = h.retry.as_store().parse(true).unwrap();
    let outcome = h
        .engine
        .run(&h.campaign, &queued, Pass::Retry)
        .await
        .unwrap();
    assert_eq!(outcome.failed, 1);

    let requeued = h.retry.as_store().parse(false).unwrap();
    assert_eq!(requeued.len(), 1);
    assert_eq!(requeued[0].email, "bob@example.com");
}
