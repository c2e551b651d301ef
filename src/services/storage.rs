//! Persistent key-value storage for the usage counter

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::Mutex,
};

use tracing::{debug, warn};

/// Key under which the usage counter is persisted
pub const USAGE_COUNT_KEY: &str = "usage_count";

/// Minimal string key-value store interface
///
/// Write failures are the implementation's problem: persistence is
/// best-effort and callers never see an error.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Key-value store backed by a single JSON file
///
/// The whole map is rewritten on every `set`; fine for a store that holds
/// one counter.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store, loading existing entries if the file is present
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Ignoring unreadable data file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let json = match serde_json::to_string_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize data file: {}", e);
                return;
            }
        };

        if let Err(e) = fs::write(&self.path, json) {
            warn!("Failed to write data file {}: {}", self.path.display(), e);
        }
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!("Failed to lock data store: {}", e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("Failed to lock data store, dropping write for {}", key);
            return;
        };

        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
        debug!("Persisted {}={}", key, value);
    }
}

/// In-memory store for environments without a writable filesystem
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

/// Read the persisted usage count, defaulting to 0 when the key is absent
/// or holds a non-numeric value
pub fn load_usage_count(store: &dyn KvStore) -> u64 {
    store
        .get(USAGE_COUNT_KEY)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0)
}

/// Write the usage count through to the store
pub fn save_usage_count(store: &dyn KvStore, count: u64) {
    store.set(USAGE_COUNT_KEY, &count.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "focus-timer-test-{}-{}.json",
            tag,
            std::process::id()
        ))
    }

    #[test]
    fn counter_defaults_to_zero_when_absent() {
        let store = MemoryStore::new();
        assert_eq!(load_usage_count(&store), 0);
    }

    #[test]
    fn counter_defaults_to_zero_when_non_numeric() {
        let store = MemoryStore::new();
        store.set(USAGE_COUNT_KEY, "not-a-number");
        assert_eq!(load_usage_count(&store), 0);
    }

    #[test]
    fn counter_round_trips() {
        let store = MemoryStore::new();
        save_usage_count(&store, 42);
        assert_eq!(load_usage_count(&store), 42);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let path = temp_store_path("reopen");
        let _ = fs::remove_file(&path);

        {
            let store = JsonFileStore::open(path.clone());
            save_usage_count(&store, 7);
        }

        let store = JsonFileStore::open(path.clone());
        assert_eq!(load_usage_count(&store), 7);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn file_store_tolerates_corrupt_file() {
        let path = temp_store_path("corrupt");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(path.clone());
        assert_eq!(load_usage_count(&store), 0);

        let _ = fs::remove_file(&path);
    }
}
