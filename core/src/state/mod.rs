//! Typed key/value store with selective durability.
//!
//! Keys are identified at runtime by `(TypeId, name)`, so two keys sharing a
//! name but not a type never collide in memory; in the persisted file each
//! entry is keyed by name and decoded with the matching key's own codec, so
//! a type mismatch shows up as a skipped entry rather than a corrupt store.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Typed, named handle into the store. Declare these as statics; the store
/// compares keys by type identity plus name, never by value.
pub struct StateKey<T> {
    name: &'static str,
    persistent: bool,
    default: fn() -> T,
}

impl<T> StateKey<T> {
    /// A transient key: never written to the state file.
    pub const fn transient(name: &'static str, default: fn() -> T) -> Self {
        Self {
            name,
            persistent: false,
            default,
        }
    }

    /// A durable key: included when the store is flushed to disk.
    pub const fn persistent(name: &'static str, default: fn() -> T) -> Self {
        Self {
            name,
            persistent: true,
            default,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }
}

/// Type-erased view of a persistent [`StateKey`], used to match file entries
/// by name at load time.
pub trait PersistentKey: Send + Sync {
    fn name(&self) -> &'static str;

    fn load_into(&self, store: &mut StateStore, raw: &str) -> Result<()>;
}

impl<T> PersistentKey for StateKey<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn load_into(&self, store: &mut StateStore, raw: &str) -> Result<()> {
        let value: T = serde_json::from_str(raw)
            .with_context(|| format!("failed to decode state entry '{}'", self.name))?;
        store.set(self, value);
        Ok(())
    }
}

struct Entry {
    value: Box<dyn Any + Send>,
    persistent: bool,
    encode: fn(&(dyn Any + Send)) -> Result<String>,
}

fn encode_value<T: Serialize + Send + 'static>(value: &(dyn Any + Send)) -> Result<String> {
    let value = value
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("state entry type mismatch"))?;
    Ok(serde_json::to_string(value)?)
}

/// In-memory store owned by exactly one agent session.
#[derive(Default)]
pub struct StateStore {
    entries: HashMap<(TypeId, &'static str), Entry>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value, materializing and storing the key's default
    /// on first access.
    pub fn get<T>(&mut self, key: &StateKey<T>) -> T
    where
        T: Clone + Serialize + DeserializeOwned + Send + 'static,
    {
        let id = (TypeId::of::<T>(), key.name);
        if !self.entries.contains_key(&id) {
            self.set(key, (key.default)());
        }
        match self.entries.get(&id).and_then(|e| e.value.downcast_ref::<T>()) {
            Some(value) => value.clone(),
            None => (key.default)(),
        }
    }

    /// Unconditional overwrite.
    pub fn set<T>(&mut self, key: &StateKey<T>, value: T)
    where
        T: Clone + Serialize + DeserializeOwned + Send + 'static,
    {
        self.entries.insert(
            (TypeId::of::<T>(), key.name),
            Entry {
                value: Box::new(value),
                persistent: key.persistent,
                encode: encode_value::<T>,
            },
        );
    }

    pub fn contains<T: 'static>(&self, key: &StateKey<T>) -> bool {
        self.entries
            .contains_key(&(TypeId::of::<T>(), key.name))
    }

    /// Serializes the persistent subset as a flat name -> JSON-string map,
    /// creating parent directories as needed.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut map = BTreeMap::new();
        for ((_, name), entry) in &self.entries {
            if !entry.persistent {
                continue;
            }
            let encoded = (entry.encode)(entry.value.as_ref())
                .with_context(|| format!("failed to encode state entry '{name}'"))?;
            map.insert(name.to_string(), encoded);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&map)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write state to {}", path.display()))?;
        Ok(())
    }

    /// Loads entries matching the supplied persistent keys by name. A missing
    /// file is not an error; a bad entry is logged and skipped without
    /// aborting the rest.
    pub fn load_from_file(&mut self, path: &Path, keys: &[&dyn PersistentKey]) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state from {}", path.display()))?;
        let map: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse state file {}", path.display()))?;

        for (name, raw) in &map {
            let Some(key) = keys.iter().find(|k| k.name() == name) else {
                continue;
            };
            if let Err(e) = key.load_into(self, raw) {
                tracing::warn!("skipping state entry '{}': {:#}", name, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    static COUNTER: StateKey<u64> = StateKey::persistent("counter", || 0);
    static SCRATCH: StateKey<String> = StateKey::transient("scratch", String::new);
    static NOTES: StateKey<BTreeMap<String, String>> =
        StateKey::persistent("notes", BTreeMap::new);
    // Same name as COUNTER, different type.
    static COUNTER_LABEL: StateKey<String> = StateKey::transient("counter", String::new);

    #[test]
    fn get_materializes_default_once() {
        let mut store = StateStore::new();
        assert!(!store.contains(&COUNTER));
        assert_eq!(store.get(&COUNTER), 0);
        assert!(store.contains(&COUNTER));
        assert_eq!(store.get(&COUNTER), 0);
    }

    #[test]
    fn set_overwrites() {
        let mut store = StateStore::new();
        store.set(&COUNTER, 7);
        assert_eq!(store.get(&COUNTER), 7);
        store.set(&COUNTER, 9);
        assert_eq!(store.get(&COUNTER), 9);
    }

    #[test]
    fn same_name_different_type_do_not_collide() {
        let mut store = StateStore::new();
        store.set(&COUNTER, 5);
        store.set(&COUNTER_LABEL, "five".to_string());
        assert_eq!(store.get(&COUNTER), 5);
        assert_eq!(store.get(&COUNTER_LABEL), "five");
    }

    #[test]
    fn save_then_load_round_trips_persistent_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("state.json");

        let mut store = StateStore::new();
        store.set(&COUNTER, 42);
        store.set(&SCRATCH, "ephemeral".to_string());
        let mut notes = BTreeMap::new();
        notes.insert("a".to_string(), "b".to_string());
        store.set(&NOTES, notes.clone());
        store.save_to_file(&path).unwrap();

        let mut fresh = StateStore::new();
        fresh
            .load_from_file(&path, &[&COUNTER, &NOTES])
            .unwrap();
        assert_eq!(fresh.get(&COUNTER), 42);
        assert_eq!(fresh.get(&NOTES), notes);
        // Transient keys are never written.
        assert!(!fresh.contains(&SCRATCH));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("scratch"));
    }

    #[test]
    fn missing_file_is_first_run() {
        let tmp = TempDir::new().unwrap();
        let mut store = StateStore::new();
        store
            .load_from_file(&tmp.path().join("absent.json"), &[&COUNTER])
            .unwrap();
        assert_eq!(store.get(&COUNTER), 0);
    }

    #[test]
    fn bad_entry_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"counter": "not a number", "notes": "{\"a\":\"b\"}", "stranger": "1"}"#,
        )
        .unwrap();

        let mut store = StateStore::new();
        store.load_from_file(&path, &[&COUNTER, &NOTES]).unwrap();
        // counter failed to decode, notes loaded, stranger ignored.
        assert_eq!(store.get(&COUNTER), 0);
        assert_eq!(store.get(&NOTES).get("a").map(String::as_str), Some("b"));
    }
}
