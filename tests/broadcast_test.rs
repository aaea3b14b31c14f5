use async_trait::async_trait;
use clubdesk::adapters::InMemoryMessageStore;
use clubdesk::core::broadcast::Broadcaster;
use clubdesk::core::snapshot::SnapshotStore;
use clubdesk::domain::model::{Boards, SheetRow, TargetSelector};
use clubdesk::domain::ports::{Mailer, MessageStore, OutgoingMail, SheetSource};
use clubdesk::utils::error::{DashboardError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct StaticSheets {
    responses: Vec<SheetRow>,
}

impl SheetSource for StaticSheets {
    async fn fetch_responses(&self) -> Result<Vec<SheetRow>> {
        Ok(self.responses.clone())
    }

    async fn fetch_roster(&self) -> Result<Vec<SheetRow>> {
        Ok(Vec::new())
    }
}

/// Records every delivery attempt; addresses in `failing` are refused.
#[derive(Clone, Default)]
struct MockMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
    failing: Arc<HashSet<String>>,
}

impl MockMailer {
    fn failing(addresses: &[&str]) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(addresses.iter().map(|a| a.to_string()).collect()),
        }
    }

    fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        self.sent.lock().unwrap().push(mail.clone());
        if self.failing.contains(&mail.to) {
            return Err(DashboardError::DeliveryError {
                reason: format!("refused {}", mail.to),
            });
        }
        Ok(())
    }
}

fn response_row(name: &str, reg: &str, club1: &str, club2: &str, email: &str) -> SheetRow {
    let mut row = HashMap::new();
    row.insert("Name".to_string(), name.to_string());
    row.insert("Registration Number".to_string(), reg.to_string());
    row.insert("Department".to_string(), "CSE".to_string());
    row.insert("Club 1".to_string(), club1.to_string());
    row.insert("Club 2".to_string(), club2.to_string());
    row.insert("Email address".to_string(), email.to_string());
    row
}

fn boards() -> Boards {
    let mut table = HashMap::new();
    table.insert(
        "Technical".to_string(),
        vec![
            "Coding Club ( Codessey)".to_string(),
            "Esports Arena".to_string(),
        ],
    );
    table.insert(
        "Cultural".to_string(),
        vec!["Music Club".to_string(), "Chroma Club".to_string()],
    );
    Boards::new(table)
}

fn broadcaster(
    responses: Vec<SheetRow>,
    mailer: MockMailer,
    store: InMemoryMessageStore,
) -> Broadcaster<StaticSheets, MockMailer, InMemoryMessageStore> {
    let snapshots = Arc::new(SnapshotStore::new(
        StaticSheets { responses },
        chrono::Duration::seconds(300),
    ));
    Broadcaster::new(
        snapshots,
        mailer,
        store,
        boards(),
        "club-admin@example.edu".to_string(),
        Duration::from_secs(2),
    )
}

fn sample_responses() -> Vec<SheetRow> {
    vec![
        response_row("Alice", "R001", "Music Club", "", "alice@example.edu"),
        // Duplicate submission, same address: must be delivered only once.
        response_row("Alice", "R001", "Music Club", "Chroma Club", "alice@example.edu"),
        response_row("Bob", "R002", "Chroma Club", "", "bob@example.edu"),
        response_row("Carol", "R003", "Music Club", "", ""),
        response_row("Dan", "R004", "Coding Club ( Codessey)", "", "dan@example.edu"),
    ]
}

#[tokio::test]
async fn board_broadcast_sends_once_per_unique_address() {
    let mailer = MockMailer::default();
    let store = InMemoryMessageStore::new();
    let broadcaster = broadcaster(sample_responses(), mailer.clone(), store.clone());

    let report = broadcaster
        .send(
            "Practice at 5pm",
            &TargetSelector::Board("Cultural".to_string()),
            "Cultural Secretary",
        )
        .await
        .unwrap();

    // Alice, Bob; Carol has no email, Dan is Technical only.
    assert_eq!(report.recipient_count, 2);
    assert_eq!(report.delivered, 2);
    assert!(report.failures.is_empty());

    // Dispatch is concurrent, so compare addresses order-independently.
    let sent = mailer.sent();
    let mut addresses: Vec<&str> = sent.iter().map(|m| m.to.as_str()).collect();
    addresses.sort();
    assert_eq!(addresses, vec!["alice@example.edu", "bob@example.edu"]);
    for mail in &sent {
        assert_eq!(mail.from, "club-admin@example.edu");
        assert_eq!(mail.subject, "Message from Cultural Secretary (Cultural Board)");
        assert_eq!(mail.body, "Practice at 5pm");
    }

    let messages = store.list().await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].recipient_count, 2);
    assert_eq!(messages[0].target, TargetSelector::Board("Cultural".to_string()));
}

#[tokio::test]
async fn one_failed_delivery_does_not_abort_the_batch() {
    let mailer = MockMailer::failing(&["bob@example.edu"]);
    let store = InMemoryMessageStore::new();
    let broadcaster = broadcaster(sample_responses(), mailer.clone(), store.clone());

    let report = broadcaster
        .send(
            "Hello",
            &TargetSelector::AllStudents,
            "General Secretary",
        )
        .await
        .unwrap();

    assert_eq!(report.recipient_count, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].email, "bob@example.edu");
    assert_eq!(mailer.sent().len(), 3);
}

#[tokio::test]
async fn message_is_recorded_even_when_every_delivery_fails() {
    let mailer = MockMailer::failing(&["alice@example.edu", "bob@example.edu", "dan@example.edu"]);
    let store = InMemoryMessageStore::new();
    let broadcaster = broadcaster(sample_responses(), mailer.clone(), store.clone());

    let report = broadcaster
        .send("Hello", &TargetSelector::AllStudents, "General Secretary")
        .await
        .unwrap();

    assert_eq!(report.delivered, 0);
    assert_eq!(report.failures.len(), 3);
    // Persisted before dispatch: the record survives total delivery failure.
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn zero_recipients_is_rejected_before_persisting() {
    let mailer = MockMailer::default();
    let store = InMemoryMessageStore::new();
    let broadcaster = broadcaster(sample_responses(), mailer.clone(), store.clone());

    let err = broadcaster
        .send(
            "Anyone there?",
            &TargetSelector::Club("Cosplay Club".to_string()),
            "General Secretary",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DashboardError::NoRecipients { .. }));
    assert!(store.is_empty().await);
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn club_with_members_but_no_emails_is_rejected() {
    let responses = vec![response_row("Carol", "R003", "Music Club", "", "")];
    let mailer = MockMailer::default();
    let store = InMemoryMessageStore::new();
    let broadcaster = broadcaster(responses, mailer.clone(), store.clone());

    let err = broadcaster
        .send(
            "Hello",
            &TargetSelector::Club("Music Club".to_string()),
            "Music Club Secretary",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DashboardError::NoRecipients { .. }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn blank_text_or_sender_is_rejected_without_side_effects() {
    let mailer = MockMailer::default();
    let store = InMemoryMessageStore::new();
    let broadcaster = broadcaster(sample_responses(), mailer.clone(), store.clone());

    let err = broadcaster
        .send("   ", &TargetSelector::AllStudents, "General Secretary")
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::ValidationError { .. }));

    let err = broadcaster
        .send("Hello", &TargetSelector::AllStudents, "")
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::ValidationError { .. }));

    assert!(store.is_empty().await);
    assert!(mailer.sent().is_empty());
}
