//! Local key-value persistence.
//!
//! Every collection is stored as one whole JSON document per key; each
//! mutation rewrites the full value, so the last write wins.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const WEB_TOOLS_KEY: &str = "web_tools";
pub const AI_CONFIG_KEY: &str = "ai_config";
pub const TRANSLATE_HISTORY_KEY: &str = "translate_history";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
    fn keys(&self) -> anyhow::Result<Vec<String>>;

    /// Remove every stored key.
    fn clear(&self) -> anyhow::Result<()> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }
}

/// Load `key`, returning `default` when the key is missing, empty or corrupt.
pub fn load_or<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return default,
        Err(e) => {
            tracing::warn!(key, "failed to read stored value: {e}");
            return default;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, "stored value is not valid JSON, using default: {e}");
            default
        }
    }
}

pub fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    store.set(key, &json)
}

/// One `<key>.json` file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        values.remove(key);
        Ok(())
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(values.keys().cloned().collect())
    }
}

type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// A value bound to a store key that is saved whole after every update.
pub struct Persisted<T> {
    key: &'static str,
    value: T,
    listeners: Vec<Listener<T>>,
}

impl<T: Serialize + DeserializeOwned + Clone> Persisted<T> {
    pub fn load(store: &dyn KeyValueStore, key: &'static str, default: T) -> Self {
        Self::new(key, load_or(store, key, default))
    }

    /// Bind an already loaded value to `key` without touching the store.
    pub fn new(key: &'static str, value: T) -> Self {
        Self {
            key,
            value,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Register a callback run after each committed update.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Apply `f` to a copy, persist it, then commit and notify subscribers.
    /// A failed save leaves the current value untouched.
    pub fn update<R>(
        &mut self,
        store: &dyn KeyValueStore,
        f: impl FnOnce(&mut T) -> R,
    ) -> anyhow::Result<R> {
        let mut next = self.value.clone();
        let out = f(&mut next);
        save(store, self.key, &next)?;
        self.value = next;
        for listener in &mut self.listeners {
            listener(&self.value);
        }
        Ok(out)
    }

    /// Overwrite the value wholesale and persist it.
    pub fn replace(&mut self, store: &dyn KeyValueStore, value: T) -> anyhow::Result<()> {
        self.update(store, |v| *v = value)
    }
}
