use super::{RecipeStorage, StorageError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl RecipeStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
