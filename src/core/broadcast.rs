use crate::core::resolve;
use crate::core::snapshot::SnapshotStore;
use crate::domain::model::{Boards, Message, TargetSelector};
use crate::domain::ports::{Mailer, MessageStore, OutgoingMail, SheetSource};
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::validate_non_empty_string;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryFailure {
    pub email: String,
    pub reason: String,
}

/// Outcome of one broadcast. Per-recipient failures are recorded here, not
/// escalated: the contract is "message recorded and attempted".
#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    pub recipient_count: usize,
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

/// Orchestrates one send: validate, resolve recipients against the current
/// snapshot, persist the message, then fan out delivery attempts.
pub struct Broadcaster<S: SheetSource, M: Mailer, P: MessageStore> {
    snapshots: Arc<SnapshotStore<S>>,
    mailer: M,
    messages: P,
    boards: Boards,
    from: String,
    send_timeout: Duration,
}

impl<S, M, P> Broadcaster<S, M, P>
where
    S: SheetSource,
    M: Mailer + 'static,
    P: MessageStore,
{
    pub fn new(
        snapshots: Arc<SnapshotStore<S>>,
        mailer: M,
        messages: P,
        boards: Boards,
        from: String,
        send_timeout: Duration,
    ) -> Self {
        Self {
            snapshots,
            mailer,
            messages,
            boards,
            from,
            send_timeout,
        }
    }

    /// The message is persisted before any delivery attempt, so it is
    /// recorded even if every delivery later fails. One recipient's
    /// failure never prevents attempts to the rest.
    pub async fn send(
        &self,
        text: &str,
        selector: &TargetSelector,
        sent_by: &str,
    ) -> Result<SendReport> {
        validate_non_empty_string("text", text)?;
        validate_non_empty_string("sent_by", sent_by)?;

        let snapshot = self.snapshots.get().await?;
        let records = resolve::resolve(selector, &snapshot, &self.boards);
        let emails = resolve::recipient_emails(&records);
        if emails.is_empty() {
            return Err(DashboardError::NoRecipients {
                selector: selector.to_string(),
            });
        }

        let message = Message {
            text: text.to_string(),
            target: selector.clone(),
            sent_by: sent_by.to_string(),
            created_at: Utc::now(),
            recipient_count: emails.len(),
        };
        self.messages.insert(&message).await?;

        let subject = format!("Message from {} ({})", sent_by, selector);
        let mut attempts = Vec::with_capacity(emails.len());
        for email in emails {
            let mailer = self.mailer.clone();
            let timeout = self.send_timeout;
            let mail = OutgoingMail {
                from: self.from.clone(),
                to: email,
                subject: subject.clone(),
                body: text.to_string(),
            };
            attempts.push(tokio::spawn(async move {
                let outcome = match tokio::time::timeout(timeout, mailer.send(&mail)).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(_) => Err(format!("delivery timed out after {}s", timeout.as_secs())),
                };
                (mail.to, outcome)
            }));
        }

        let mut delivered = 0;
        let mut failures = Vec::new();
        for attempt in attempts {
            match attempt.await {
                Ok((_, Ok(()))) => delivered += 1,
                Ok((email, Err(reason))) => {
                    tracing::warn!(email = %email, reason = %reason, "delivery attempt failed");
                    failures.push(DeliveryFailure { email, reason });
                }
                Err(err) => {
                    tracing::error!(error = %err, "delivery task failed");
                }
            }
        }

        tracing::info!(
            selector = %selector,
            recipients = message.recipient_count,
            delivered,
            failed = failures.len(),
            "broadcast dispatched"
        );

        Ok(SendReport {
            recipient_count: message.recipient_count,
            delivered,
            failures,
        })
    }
}
