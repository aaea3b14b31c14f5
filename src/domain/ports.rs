use crate::domain::model::{Message, SheetRow};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where the two spreadsheet exports come from.
pub trait SheetSource: Send + Sync {
    fn fetch_responses(&self) -> impl std::future::Future<Output = Result<Vec<SheetRow>>> + Send;
    fn fetch_roster(&self) -> impl std::future::Future<Output = Result<Vec<SheetRow>>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers one message to one address; no retries at this layer.
#[async_trait]
pub trait Mailer: Send + Sync + Clone {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// Append-only broadcast history.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: &Message) -> Result<()>;

    /// All recorded messages, newest first.
    async fn list(&self) -> Result<Vec<Message>>;
}
