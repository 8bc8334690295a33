use std::sync::Arc;

use anyhow::{Context, Result};
use shared::domain::{MemoRecord, HISTORY_STORAGE_KEY};
use tracing::{debug, warn};

use crate::KeyValueStore;

/// Newest-first history of sent memos, mirrored to a single store entry.
///
/// The cache is the only writer of [`HISTORY_STORAGE_KEY`]. Records are never
/// deduplicated: appending the same signature twice keeps both rows.
pub struct MemoLedgerCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    records: Vec<MemoRecord>,
}

impl MemoLedgerCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, HISTORY_STORAGE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            records: Vec::new(),
        }
    }

    /// Reloads the view from the store. A missing, unreadable, or corrupt entry
    /// yields an empty history; the problem is only logged.
    pub async fn load(&mut self) -> Vec<MemoRecord> {
        self.records = match self.store.get(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<MemoRecord>>(&raw) {
                Ok(records) => records,
                Err(error) => {
                    warn!(key = %self.key, %error, "stored memo history is malformed; treating as empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(key = %self.key, error = %format!("{error:#}"), "failed to read memo history; treating as empty");
                Vec::new()
            }
        };
        debug!(count = self.records.len(), "memo history loaded");
        self.records.clone()
    }

    /// Puts `record` at the head and writes the whole sequence back.
    ///
    /// The in-memory view keeps the new record even if the write fails, so the
    /// caller still sees what was sent; the write error is returned.
    pub async fn append(&mut self, record: MemoRecord) -> Result<Vec<MemoRecord>> {
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record);
        next.extend(self.records.iter().cloned());
        self.records = next;

        let encoded =
            serde_json::to_string(&self.records).context("failed to encode memo history")?;
        self.store
            .set(&self.key, &encoded)
            .await
            .context("failed to persist memo history")?;
        Ok(self.records.clone())
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.store
            .remove(&self.key)
            .await
            .context("failed to remove memo history")
    }

    pub fn records(&self) -> &[MemoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
