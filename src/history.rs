use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default capacity shared by the calculator and translator histories.
pub const HISTORY_LIMIT: usize = 10;

/// A newest-first list that never grows past its limit.
///
/// Serialises as a plain JSON array so persisted documents stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    HISTORY_LIMIT
}

impl<T> Default for BoundedHistory<T> {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl<T> BoundedHistory<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Rebuild a history from a stored list, truncating anything past `limit`.
    pub fn from_vec(list: Vec<T>, limit: usize) -> Self {
        let mut entries: VecDeque<T> = list.into();
        entries.truncate(limit);
        Self { entries, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.entries.truncate(limit);
    }

    pub fn push_front(&mut self, entry: T) {
        self.entries.push_front(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_back();
        }
    }

    /// Insert at the front and drop any older entry sharing the same key.
    pub fn push_front_unique_by<K, F>(&mut self, entry: T, key: F)
    where
        K: PartialEq,
        F: Fn(&T) -> K,
    {
        let new_key = key(&entry);
        self.entries.retain(|e| key(e) != new_key);
        self.push_front(entry);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}
