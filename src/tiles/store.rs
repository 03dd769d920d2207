use crate::core::geo::TileKey;
use fxhash::FxHashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Thread-safe set of tiles whose content is ready to draw.
///
/// Keys are only ever inserted: once a tile is ready it stays ready for the
/// lifetime of the store. Each call is atomic on its own, but nothing is held
/// between a `contains` and a later `insert` made by someone else.
#[derive(Debug, Default)]
pub struct TileStore {
    ready: Arc<Mutex<FxHashSet<TileKey>>>,
}

impl TileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a tile is ready
    pub fn contains(&self, key: &TileKey) -> bool {
        self.lock().contains(key)
    }

    /// Mark a tile as ready; returns `false` if it already was
    pub fn insert(&self, key: TileKey) -> bool {
        self.lock().insert(key)
    }

    /// Get the number of ready tiles
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no tile is ready yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The set holds plain keys, so a panic elsewhere cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, FxHashSet<TileKey>> {
        self.ready.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for TileStore {
    fn clone(&self) -> Self {
        Self {
            ready: Arc::clone(&self.ready),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_tile_store_basic_operations() {
        let store = TileStore::new();
        let key1 = TileKey::new(1, 2, 0);
        let key2 = TileKey::new(1, 2, 1);

        // Initially empty
        assert!(store.is_empty());
        assert!(!store.contains(&key1));

        assert!(store.insert(key1));
        assert!(store.contains(&key1));
        assert!(!store.contains(&key2));
        assert_eq!(store.len(), 1);

        // Idempotent insert
        assert!(!store.insert(key1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let store = TileStore::new();
        let shared = store.clone();
        shared.insert(TileKey::new(0, 0, 0));
        assert!(store.contains(&TileKey::new(0, 0, 0)));
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = TileStore::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        // Every thread inserts the same 100 keys plus its own marker
                        store.insert(TileKey::new(i, 0, 0));
                        let _ = store.contains(&TileKey::new(i, 0, 0));
                    }
                    store.insert(TileKey::new(t, 1, 0));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 108);
    }
}
