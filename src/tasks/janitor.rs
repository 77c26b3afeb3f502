//! Expiration Janitor Task
//!
//! Background task that periodically sweeps expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::Cache;
use crate::error::{CacheError, Result};

impl Cache {
    // == Start Janitor ==
    /// Spawns a background task that calls
    /// [`delete_expired`](Cache::delete_expired) every `interval`.
    ///
    /// At most one janitor runs per cache; a second start fails with
    /// [`CacheError::JanitorAlreadyRunning`]. The task holds a clone of
    /// the `Arc`, so the cache stays alive until
    /// [`stop_janitor`](Cache::stop_janitor) is called.
    ///
    /// Requires a tokio runtime.
    ///
    /// # Example
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use snapcache::Cache;
    ///
    /// # #[tokio::main(flavor = "current_thread")] async fn main() {
    /// let cache = Arc::new(Cache::new());
    /// cache.start_janitor(Duration::from_secs(30)).unwrap();
    /// // ... later, during shutdown:
    /// cache.stop_janitor();
    /// # }
    /// ```
    pub fn start_janitor(self: &Arc<Self>, interval: Duration) -> Result<()> {
        let mut shutdown = self.janitor_shutdown.lock();
        if shutdown.is_some() {
            return Err(CacheError::JanitorAlreadyRunning);
        }
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        *shutdown = Some(shutdown_tx);

        let cache = Arc::clone(self);
        tokio::spawn(async move {
            info!(?interval, "janitor started");
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; wait a full interval
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.delete_expired();
                        if removed > 0 {
                            info!(removed, "janitor removed expired entries");
                        } else {
                            debug!("janitor found no expired entries");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("janitor stopped");
        });
        Ok(())
    }

    // == Stop Janitor ==
    /// Signals the janitor to stop. No-op if none is running; a new
    /// janitor may be started afterwards.
    pub fn stop_janitor(&self) {
        if let Some(shutdown_tx) = self.janitor_shutdown.lock().take() {
            let _ = shutdown_tx.send(true);
        }
    }
}
