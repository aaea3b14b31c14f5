use crate::domain::model::{ResponseRecord, RosterRecord, Snapshot};
use crate::domain::ports::SheetSource;
use crate::utils::error::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Serves the freshest affordable snapshot to all callers while bounding
/// the external fetch rate.
///
/// The current snapshot slot is the only mutable shared state; the refresh
/// mutex is the only mutual-exclusion point. A refresh publishes a whole
/// new `Snapshot`, never mutates the old one.
pub struct SnapshotStore<S: SheetSource> {
    source: S,
    ttl: Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
    refresh: Mutex<()>,
}

impl<S: SheetSource> SnapshotStore<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Returns the cached snapshot while it is within its TTL; otherwise
    /// refreshes, single-flight. When a refresh fails and a previous
    /// snapshot exists, the stale snapshot is served instead of the error.
    pub async fn get(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.fresh().await {
            return Ok(snapshot);
        }

        let _refresh = self.refresh.lock().await;

        // Another caller may have completed the refresh while we waited.
        if let Some(snapshot) = self.fresh().await {
            return Ok(snapshot);
        }

        match self.fetch().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.current.write().await = Some(Arc::clone(&snapshot));
                tracing::info!(
                    responses = snapshot.responses.len(),
                    roster = snapshot.roster.len(),
                    clubs = snapshot.clubs.len(),
                    "snapshot refreshed"
                );
                Ok(snapshot)
            }
            Err(err) => {
                let stale = self.current.read().await.clone();
                match stale {
                    Some(snapshot) => {
                        tracing::warn!(
                            error = %err,
                            age_seconds = snapshot.age().num_seconds(),
                            "snapshot refresh failed, serving stale data"
                        );
                        Ok(snapshot)
                    }
                    None => Err(err),
                }
            }
        }
    }

    async fn fresh(&self) -> Option<Arc<Snapshot>> {
        let current = self.current.read().await;
        current
            .as_ref()
            .filter(|snapshot| snapshot.age() < self.ttl)
            .cloned()
    }

    /// Fetches both sheets concurrently; fails atomically if either
    /// sub-fetch fails, so a partial snapshot is never published.
    async fn fetch(&self) -> Result<Snapshot> {
        let (response_rows, roster_rows) =
            tokio::try_join!(self.source.fetch_responses(), self.source.fetch_roster())?;

        let responses = response_rows.iter().map(ResponseRecord::from_row).collect();
        let roster = roster_rows.iter().map(RosterRecord::from_row).collect();

        Ok(Snapshot::new(responses, roster, Utc::now()))
    }
}
