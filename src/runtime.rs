//! Runtime abstraction layer for async operations
//!
//! Tile production runs on whatever async runtime the host provides. The
//! library only needs to spawn fire-and-forget futures and sleep inside them.

use crate::prelude::{Future, Pin};

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Box<dyn AsyncHandle>;

    /// Whether futures can be spawned from the calling thread right now
    fn is_available(&self) -> bool {
        true
    }
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;
}

/// Convenience function for spawning with type safety
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime().spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::runtime::Handle;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner; spawns on the runtime of the calling thread
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let handle = ::tokio::spawn(future);
                Box::new(TokioHandle(handle))
            }

            fn is_available(&self) -> bool {
                Handle::try_current().is_ok()
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }
        }
    }
}

/// Async sleep on the active runtime
pub async fn async_delay(duration: std::time::Duration) {
    #[cfg(feature = "tokio-runtime")]
    {
        ::tokio::time::sleep(duration).await;
    }

    #[cfg(not(feature = "tokio-runtime"))]
    {
        // No runtime timer: a sleeping thread completes a oneshot
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        std::thread::spawn(move || {
            std::thread::sleep(duration);
            let _ = tx.send(());
        });
        let _ = rx.await;
    }
}

/// Global runtime instance
#[cfg(feature = "tokio-runtime")]
static RUNTIME: std::sync::OnceLock<Box<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Get the global runtime spawner, if one is compiled in
pub fn try_runtime() -> Option<&'static dyn AsyncSpawner> {
    #[cfg(feature = "tokio-runtime")]
    {
        Some(
            RUNTIME
                .get_or_init(|| Box::new(spawners::tokio_impl::TokioSpawner))
                .as_ref(),
        )
    }

    #[cfg(not(feature = "tokio-runtime"))]
    {
        None
    }
}

/// Whether [`spawn`] can be called from this thread
pub fn is_available() -> bool {
    try_runtime().map(|spawner| spawner.is_available()).unwrap_or(false)
}

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    match try_runtime() {
        Some(spawner) => spawner,
        None => panic!("No async runtime available. Enable the 'tokio-runtime' feature."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_spawner() {
        assert!(is_available());

        let handle = spawn(async {
            async_delay(std::time::Duration::from_millis(10)).await;
        });

        // Should not be finished immediately
        assert!(!handle.is_finished());

        // Wait a bit and check again
        ::tokio::time::sleep(::tokio::time::Duration::from_millis(100)).await;
        assert!(handle.is_finished());
    }

    #[cfg(feature = "tokio-runtime")]
    #[test]
    fn test_unavailable_outside_runtime() {
        assert!(!is_available());
    }
}
