use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The Store is the single source of truth for key-value pairs. It is shared
/// by every connection task and is designed to be cloned cheaply using
/// reference counting; callers never lock it directly.
///
/// Each operation takes the lock for one map access, so concurrent writers
/// from different connections serialize at the operation boundary. There is
/// no multi-key transaction.
#[derive(Clone, Default)]
pub struct Store {
    entries: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).cloned()
    }

    /// Insert or overwrite `key`, returning the previous value if any.
    pub fn put(&self, key: String, value: Bytes) -> Option<Bytes> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key, value)
    }

    /// Remove `key`, reporting whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key).is_some()
    }
}
