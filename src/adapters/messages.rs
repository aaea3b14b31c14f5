use crate::domain::model::Message;
use crate::domain::ports::MessageStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Message history in a local JSON file. Concurrent sends may interleave,
/// so writes are serialized to keep the file whole.
#[derive(Debug, Clone)]
pub struct JsonFileMessageStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileMessageStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn read_all(&self) -> Result<Vec<Message>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[async_trait]
impl MessageStore for JsonFileMessageStore {
    async fn insert(&self, message: &Message) -> Result<()> {
        let _write = self.write_lock.lock().await;
        let mut messages = self.read_all()?;
        messages.push(message.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&messages)?)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>> {
        let mut messages = self.read_all()?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }
}

/// In-memory history for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert(&self, message: &Message) -> Result<()> {
        self.messages.lock().await.push(message.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>> {
        let mut messages = self.messages.lock().await.clone();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }
}
