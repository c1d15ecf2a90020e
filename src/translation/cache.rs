/*!
 * Model handle cache.
 *
 * Process-wide keyed store from resolved model to loaded handle. Population
 * is lazy and idempotent: two callers racing on the same key may both load,
 * the first insert wins and the second handle is dropped.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use parking_lot::RwLock;

use super::pipeline::ModelRef;

/// Cache of loaded model handles keyed by resolved model
pub struct ModelCache<H> {
    /// Internal cache storage
    handles: Arc<RwLock<HashMap<ModelRef, Arc<H>>>>,

    /// Cache hit counter
    hits: Arc<AtomicUsize>,

    /// Load counter
    loads: Arc<AtomicUsize>,
}

impl<H> ModelCache<H> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            handles: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(AtomicUsize::new(0)),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Return the cached handle for `model`, loading it on first use
    pub fn get_or_load<E, F>(&self, model: &ModelRef, load: F) -> Result<Arc<H>, E>
    where
        F: FnOnce(&ModelRef) -> Result<H, E>,
    {
        if let Some(handle) = self.handles.read().get(model) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(handle.clone());
        }

        // Loading happens outside the lock.
        let loaded = Arc::new(load(model)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        debug!("Loaded model handle for {}", model);

        let mut handles = self.handles.write();
        Ok(handles.entry(model.clone()).or_insert(loaded).clone())
    }

    /// Get cache statistics as (hits, loads)
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.loads.load(Ordering::Relaxed))
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }
}

impl<H> Default for ModelCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for ModelCache<H> {
    fn clone(&self) -> Self {
        Self {
            handles: self.handles.clone(),
            hits: self.hits.clone(),
            loads: self.loads.clone(),
        }
    }
}

impl<H> std::fmt::Debug for ModelCache<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hits, loads) = self.stats();
        f.debug_struct("ModelCache")
            .field("entries", &self.len())
            .field("hits", &hits)
            .field("loads", &loads)
            .finish()
    }
}
