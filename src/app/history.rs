use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::db::KvStore;

pub(crate) const HISTORY_KEY: &str = "dramabox_history";
pub(crate) const HISTORY_LIMIT: usize = 20;

/// Most recent episode watched for one drama. Serialized with the same
/// camelCase keys the web player stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryEntry {
    pub(crate) drama_id: String,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) poster: String,
    pub(crate) episode: usize,
    pub(crate) updated_at: i64,
}

/// Newest-first, capped list of [`HistoryEntry`] under a single key.
///
/// A store without a backend behaves like a browser without local storage:
/// reads are empty and writes are silently dropped.
pub(crate) struct HistoryStore {
    kv: Option<Box<dyn KvStore>>,
}

impl HistoryStore {
    pub(crate) fn new(kv: Box<dyn KvStore>) -> Self {
        Self { kv: Some(kv) }
    }

    pub(crate) fn unavailable() -> Self {
        Self { kv: None }
    }

    pub(crate) fn is_available(&self) -> bool {
        self.kv.is_some()
    }

    pub(crate) fn get(&self) -> Vec<HistoryEntry> {
        let Some(kv) = self.kv.as_deref() else {
            return Vec::new();
        };
        let raw = match kv.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "history read failed; treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(error = %err, "history contents malformed; treating as empty");
                Vec::new()
            }
        }
    }

    pub(crate) fn save(&self, entry: HistoryEntry) -> Result<()> {
        let Some(kv) = self.kv.as_deref() else {
            return Ok(());
        };
        let mut list = self.get();
        list.retain(|existing| existing.drama_id != entry.drama_id);
        list.insert(0, entry);
        list.truncate(HISTORY_LIMIT);

        let raw = serde_json::to_string(&list).context("failed to encode history")?;
        kv.set(HISTORY_KEY, &raw)
            .context("failed to persist watch history")
    }

    pub(crate) fn clear(&self) -> Result<()> {
        let Some(kv) = self.kv.as_deref() else {
            return Ok(());
        };
        kv.delete(HISTORY_KEY).context("failed to clear watch history")
    }
}

/// Snapshot of the history taken when a screen mounts.
#[derive(Debug, Clone, Default)]
pub(crate) struct HistoryView {
    entries: Vec<HistoryEntry>,
}

impl HistoryView {
    pub(crate) fn load(store: &HistoryStore) -> Self {
        Self {
            entries: store.get(),
        }
    }

    pub(crate) fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&HistoryEntry> {
        self.entries.get(idx)
    }

    pub(crate) fn refresh(&mut self, store: &HistoryStore) {
        self.entries = store.get();
    }

    pub(crate) fn clear(&mut self, store: &HistoryStore) -> Result<()> {
        store.clear()?;
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryKv, SqliteKv};

    fn entry(id: &str, episode: usize, updated_at: i64) -> HistoryEntry {
        HistoryEntry {
            drama_id: id.to_string(),
            slug: id.to_string(),
            title: format!("Drama {id}"),
            poster: format!("https://img.test/{id}.jpg"),
            episode,
            updated_at,
        }
    }

    fn memory_store() -> HistoryStore {
        HistoryStore::new(Box::new(MemoryKv::default()))
    }

    #[test]
    fn save_then_get_returns_entry_first() {
        let store = memory_store();
        store.save(entry("a", 0, 1)).expect("save a");
        store.save(entry("b", 3, 2)).expect("save b");

        let list = store.get();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], entry("b", 3, 2));
        assert_eq!(list[1].drama_id, "a");
    }

    #[test]
    fn save_replaces_existing_entry_for_same_drama() {
        let store = memory_store();
        store.save(entry("a", 0, 1)).expect("save");
        store.save(entry("b", 0, 2)).expect("save");
        store.save(entry("a", 5, 3)).expect("save");

        let list = store.get();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], entry("a", 5, 3));
        assert_eq!(list[1].drama_id, "b");
    }

    #[test]
    fn history_never_exceeds_limit_and_keeps_unique_ids() {
        let store = memory_store();
        for round in 0..3 {
            for id in 0..(HISTORY_LIMIT + 7) {
                store
                    .save(entry(&format!("d{id}"), round, (round * 100 + id) as i64))
                    .expect("save");
                let list = store.get();
                assert!(list.len() <= HISTORY_LIMIT);
                let mut ids: Vec<&str> = list.iter().map(|e| e.drama_id.as_str()).collect();
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), list.len());
            }
        }
        let list = store.get();
        assert_eq!(list.len(), HISTORY_LIMIT);
        assert_eq!(list[0].drama_id, format!("d{}", HISTORY_LIMIT + 6));
    }

    #[test]
    fn clear_then_get_is_empty() {
        let store = memory_store();
        store.save(entry("a", 0, 1)).expect("save");
        store.clear().expect("clear");
        assert!(store.get().is_empty());
    }

    #[test]
    fn malformed_contents_read_as_empty_and_are_overwritten_on_save() {
        let kv = MemoryKv::default();
        kv.set(HISTORY_KEY, "{not json").expect("seed");
        let store = HistoryStore::new(Box::new(kv));
        assert!(store.get().is_empty());

        store.save(entry("a", 1, 1)).expect("save over corrupt data");
        assert_eq!(store.get(), vec![entry("a", 1, 1)]);
    }

    #[test]
    fn unavailable_store_is_a_silent_no_op() {
        let store = HistoryStore::unavailable();
        assert!(!store.is_available());
        store.save(entry("a", 0, 1)).expect("save is a no-op");
        store.clear().expect("clear is a no-op");
        assert!(store.get().is_empty());
    }

    #[test]
    fn persisted_json_uses_web_field_names() {
        let kv = SqliteKv::open_in_memory().expect("open db");
        let store = HistoryStore::new(Box::new(kv));
        store.save(entry("77", 2, 1_700_000_000_000)).expect("save");

        let raw = serde_json::to_value(store.get()).expect("encode");
        assert_eq!(raw[0]["dramaId"], "77");
        assert_eq!(raw[0]["updatedAt"], 1_700_000_000_000_i64);
        assert_eq!(raw[0]["episode"], 2);
    }

    #[test]
    fn view_snapshots_on_load_and_clears_store() {
        let store = memory_store();
        store.save(entry("a", 0, 1)).expect("save");

        let mut view = HistoryView::load(&store);
        assert_eq!(view.len(), 1);

        store.save(entry("b", 0, 2)).expect("save");
        assert_eq!(view.len(), 1, "snapshot does not follow later writes");
        view.refresh(&store);
        assert_eq!(view.get(0).map(|e| e.drama_id.as_str()), Some("b"));

        view.clear(&store).expect("clear");
        assert!(view.is_empty());
        assert!(store.get().is_empty());
    }
}
