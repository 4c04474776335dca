use crate::cache::{CacheError, CacheResult, DocumentCache};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process cache that lives for a single run
#[derive(Debug, Default)]
pub struct MemoryCache {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached documents
    pub fn len(&self) -> CacheResult<usize> {
        let documents = self.documents.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(documents.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl DocumentCache for MemoryCache {
    fn get(&self, url: &str) -> CacheResult<Option<String>> {
        let documents = self.documents.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(documents.get(url).cloned())
    }

    fn put(&self, url: &str, document: &str) -> CacheResult<()> {
        let mut documents = self.documents.lock().map_err(|_| CacheError::Poisoned)?;
        documents.insert(url.to_string(), document.to_string());
        Ok(())
    }

    fn invalidate(&self, url: &str) -> CacheResult<()> {
        let mut documents = self.documents.lock().map_err(|_| CacheError::Poisoned)?;
        documents.remove(url);
        Ok(())
    }
}
