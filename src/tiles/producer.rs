//! On-demand tile production
//!
//! A tile moves through `Unrequested -> Pending -> Ready`. The first request
//! for a tile schedules exactly one production job and returns nothing; when
//! the job completes the tile is recorded in the [`TileStore`] and a single
//! ready notification is queued for the drawing context. From then on every
//! request returns content synchronously.

use super::scheduler::default_scheduler;
use super::source::{SolidColorSource, TileImage, TileSource};
use super::store::TileStore;
use crate::core::config::ProductionConfig;
use crate::core::geo::TileKey;
use crate::traits::{ProductionScheduler, TileReadyListener};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use futures::channel::oneshot;
use fxhash::FxHashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Production state of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Unrequested,
    Pending,
    Ready,
}

/// Tiles with a production job in flight, and the futures waiting on them
type PendingTiles = FxHashMap<TileKey, Vec<oneshot::Sender<()>>>;

/// State shared between the producer and its in-flight jobs
struct ProducerShared {
    store: TileStore,
    pending: Mutex<PendingTiles>,
    ready_tx: Sender<TileKey>,
    scheduled: AtomicU64,
    completed: AtomicU64,
}

impl ProducerShared {
    fn pending(&self) -> MutexGuard<'_, PendingTiles> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Completion of the production job for `key`
    fn complete(&self, key: TileKey) {
        // Store insert and pending removal happen together under the pending lock,
        // so a concurrent request sees the tile as either pending or ready.
        let waiters = {
            let mut pending = self.pending();
            self.store.insert(key);
            pending.remove(&key).unwrap_or_default()
        };

        self.completed.fetch_add(1, Ordering::Relaxed);
        log::debug!("tile ready {}", key);

        for waiter in waiters {
            let _ = waiter.send(());
        }

        if self.ready_tx.send(key).is_err() {
            log::warn!("ready notification for {} dropped, producer is gone", key);
        }
    }
}

/// Produces tile content asynchronously and reports readiness.
pub struct TileProducer {
    shared: Arc<ProducerShared>,
    ready_rx: Receiver<TileKey>,
    source: Arc<dyn TileSource>,
    scheduler: Arc<dyn ProductionScheduler>,
    config: ProductionConfig,
}

impl TileProducer {
    /// Create a producer from its collaborators
    pub fn new(
        source: Arc<dyn TileSource>,
        scheduler: Arc<dyn ProductionScheduler>,
        config: ProductionConfig,
    ) -> Self {
        let (ready_tx, ready_rx) = unbounded();

        Self {
            shared: Arc::new(ProducerShared {
                store: TileStore::new(),
                pending: Mutex::new(FxHashMap::default()),
                ready_tx,
                scheduled: AtomicU64::new(0),
                completed: AtomicU64::new(0),
            }),
            ready_rx,
            source,
            scheduler,
            config,
        }
    }

    /// Solid-colour tiles on the default scheduler
    pub fn with_config(config: ProductionConfig) -> Self {
        Self::new(Arc::new(SolidColorSource::new()), default_scheduler(), config)
    }

    /// Solid-colour tiles on the given scheduler
    pub fn with_scheduler(
        scheduler: Arc<dyn ProductionScheduler>,
        config: ProductionConfig,
    ) -> Self {
        Self::new(Arc::new(SolidColorSource::new()), scheduler, config)
    }

    /// Content of `key` if it is ready; otherwise schedules production (at most
    /// once per tile) and returns `None` without blocking.
    pub fn request_tile(&self, key: TileKey) -> Option<TileImage> {
        if self.schedule_if_needed(key, None) {
            Some(self.source.render(key))
        } else {
            None
        }
    }

    /// Resolves to the content of `key` once it is ready.
    ///
    /// Schedules production like [`request_tile`](Self::request_tile) when the
    /// tile has not been requested yet.
    pub fn produce(
        &self,
        key: TileKey,
    ) -> impl Future<Output = TileImage> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let ready_now = self.schedule_if_needed(key, Some(tx));
        let source = Arc::clone(&self.source);

        async move {
            if !ready_now {
                // Jobs always complete, so the sender is never dropped unsent
                let _ = rx.await;
            }
            source.render(key)
        }
    }

    /// Returns `true` when `key` is ready. Otherwise makes sure a job is in
    /// flight and registers `waiter` for its completion.
    fn schedule_if_needed(&self, key: TileKey, waiter: Option<oneshot::Sender<()>>) -> bool {
        let newly_pending = {
            let mut pending = self.shared.pending();

            if self.shared.store.contains(&key) {
                return true;
            }

            let newly_pending = !pending.contains_key(&key);
            let waiters = pending.entry(key).or_default();
            if let Some(waiter) = waiter {
                waiters.push(waiter);
            }
            newly_pending
        };

        // Scheduled with the lock released: a scheduler may run the job inline.
        if newly_pending {
            let delay = self.config.sample_delay();
            let shared = Arc::clone(&self.shared);
            self.shared.scheduled.fetch_add(1, Ordering::Relaxed);
            log::debug!("scheduling tile {} in {:?}", key, delay);
            self.scheduler.schedule(delay, Box::new(move || shared.complete(key)));
        }

        false
    }

    pub fn state(&self, key: &TileKey) -> TileState {
        let pending = self.shared.pending();
        if self.shared.store.contains(key) {
            TileState::Ready
        } else if pending.contains_key(key) {
            TileState::Pending
        } else {
            TileState::Unrequested
        }
    }

    pub fn is_ready(&self, key: &TileKey) -> bool {
        self.shared.store.contains(key)
    }

    /// Take every ready notification queued so far (non-blocking)
    pub fn drain_ready(&self) -> Vec<TileKey> {
        self.ready_rx.try_iter().collect()
    }

    /// Deliver queued ready notifications to `listener`; returns how many
    pub fn dispatch_ready(&self, listener: &mut dyn TileReadyListener) -> usize {
        let mut delivered = 0;
        for key in self.ready_rx.try_iter() {
            listener.on_tile_ready(key);
            delivered += 1;
        }
        delivered
    }

    /// Block up to `timeout` for the next ready notification
    pub fn wait_ready(&self, timeout: Duration) -> Option<TileKey> {
        match self.ready_rx.recv_timeout(timeout) {
            Ok(key) => Some(key),
            Err(RecvTimeoutError::Timeout) => None,
            // Unreachable while `self` holds the sender through `shared`
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Receiver of ready notifications, for hosts that select over several sources
    pub fn ready_receiver(&self) -> &Receiver<TileKey> {
        &self.ready_rx
    }

    /// Tiles with a production job in flight
    pub fn pending_count(&self) -> usize {
        self.shared.pending().len()
    }

    /// Tiles whose content is ready
    pub fn ready_count(&self) -> usize {
        self.shared.store.len()
    }

    /// Production jobs scheduled so far
    pub fn scheduled_count(&self) -> u64 {
        self.shared.scheduled.load(Ordering::Relaxed)
    }

    /// Production jobs completed so far
    pub fn completed_count(&self) -> u64 {
        self.shared.completed.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &ProductionConfig {
        &self.config
    }
}

impl std::fmt::Debug for TileProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileProducer")
            .field("config", &self.config)
            .field("pending", &self.pending_count())
            .field("ready", &self.ready_count())
            .finish()
    }
}
