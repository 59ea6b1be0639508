//! In-memory response cache with a background sweeper
//!
//! Provides a `Cache` keyed by request URL that holds raw response bodies. One
//! interval governs the whole cache: it is both how often the sweeper runs and
//! how old an entry may get before the sweeper removes it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval};
use tracing::{debug, trace, warn};

/// Errors that can occur when constructing a cache
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The sweep interval was zero
    #[error("Cache interval must be greater than zero")]
    ZeroInterval,
}

/// A cached value and the instant it was stored
#[derive(Debug, Clone)]
struct Entry {
    value: Bytes,
    created_at: Instant,
}

type Table = HashMap<String, Entry>;

/// Concurrent key/value store whose entries expire after a fixed interval
///
/// Construction spawns exactly one sweeper task on the current Tokio runtime.
/// The sweeper stops when the cache is shut down or dropped.
///
/// `get` does not look at an entry's age. Expiry is enforced only by the sweeper,
/// so a read between an entry going stale and the next sweep still returns it.
#[derive(Debug)]
pub struct Cache {
    table: Arc<Mutex<Table>>,
    interval: Duration,
    shutdown_tx: mpsc::Sender<()>,
    sweeper: JoinHandle<()>,
}

impl Cache {
    /// Creates an empty cache and starts its sweeper
    ///
    /// The first sweep runs one `interval` after construction. Must be called
    /// from within a Tokio runtime.
    ///
    /// # Returns
    /// * `Ok(Cache)` with the sweeper running
    /// * `Err(CacheError::ZeroInterval)` if `interval` is zero
    pub fn new(interval: Duration) -> Result<Self, CacheError> {
        if interval.is_zero() {
            return Err(CacheError::ZeroInterval);
        }

        let table = Arc::new(Mutex::new(Table::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let ticker = time::interval_at(Instant::now() + interval, interval);
        let sweeper = tokio::spawn(sweep_loop(
            Arc::clone(&table),
            interval,
            ticker,
            shutdown_rx,
        ));

        debug!(?interval, "Cache created");

        Ok(Self {
            table,
            interval,
            shutdown_tx,
            sweeper,
        })
    }

    /// Stores `value` under `key`, replacing any previous entry and its timestamp
    pub fn add(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        let entry = Entry {
            value: value.into(),
            created_at: Instant::now(),
        };
        self.table.lock().insert(key.into(), entry);
    }

    /// Returns the value stored under `key`, if the sweeper has not removed it
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.table.lock().get(key).map(|entry| entry.value.clone())
    }

    /// Returns the number of entries currently held
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Returns true if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    /// Returns the interval used for both sweeping and entry age
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the sweeper and waits for its task to finish
    pub async fn shutdown(self) {
        let Self {
            shutdown_tx,
            sweeper,
            ..
        } = self;

        // Send only fails if the sweeper already exited; the join below reports a panic
        let _ = shutdown_tx.send(()).await;
        drop(shutdown_tx);

        if let Err(e) = sweeper.await {
            warn!(error = %e, "Cache sweeper ended abnormally");
        }
    }
}

/// Runs until a shutdown message arrives or the sending half is dropped
async fn sweep_loop(
    table: Arc<Mutex<Table>>,
    max_age: Duration,
    mut ticker: Interval,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (removed, remaining) = sweep(&table, max_age);
                if removed > 0 {
                    debug!(removed, remaining, "Swept expired cache entries");
                } else {
                    trace!(remaining, "Cache sweep found nothing to remove");
                }
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    debug!("Cache sweeper stopped");
}

/// Removes every entry strictly older than `max_age`
///
/// Holds the lock for the whole scan. Returns (removed, remaining).
fn sweep(table: &Mutex<Table>, max_age: Duration) -> (usize, usize) {
    let mut table = table.lock();
    let now = Instant::now();
    let before = table.len();

    table.retain(|_, entry| now.saturating_duration_since(entry.created_at) <= max_age);

    (before - table.len(), table.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use tokio::time::sleep;

    #[test]
    fn test_new_rejects_zero_interval() {
        let result = Cache::new(Duration::ZERO);
        assert!(matches!(result, Err(CacheError::ZeroInterval)));
    }

    #[tokio::test]
    async fn test_new_cache_is_empty() {
        let cache = Cache::new(Duration::from_secs(5)).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.interval(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_add_then_get_returns_value() {
        let cases = [
            ("https://example.com", &b"testdata"[..]),
            ("https://example.com/path", &b"moretestdata"[..]),
        ];

        for (key, value) in cases {
            let cache = Cache::new(Duration::from_secs(5)).unwrap();
            cache.add(key, value.to_vec());

            let got = cache.get(key).expect("Key should be present right after add");
            assert_eq!(&got[..], value);
        }
    }

    #[tokio::test]
    async fn test_get_missing_key_returns_none() {
        let cache = Cache::new(Duration::from_secs(5)).unwrap();
        cache.add("https://example.com", "testdata");

        assert!(cache.get("https://example.com/other").is_none());
        assert!(cache.get("").is_none());
    }

    #[tokio::test]
    async fn test_keys_are_not_canonicalized() {
        let cache = Cache::new(Duration::from_secs(5)).unwrap();
        cache.add("https://example.com/a", "lower");

        assert!(cache.get("https://example.com/A").is_none());
        assert!(cache.get("https://example.com/a/").is_none());
    }

    #[tokio::test]
    async fn test_reinsert_same_value_is_single_entry() {
        let cache = Cache::new(Duration::from_secs(5)).unwrap();
        cache.add("k", "same");
        cache.add("k", "same");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap(), Bytes::from_static(b"same"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_replaces_value_and_resets_clock() {
        let cache = Cache::new(Duration::from_secs(10)).unwrap();

        sleep(Duration::from_secs(1)).await;
        cache.add("k", "first");

        // t=11: the sweep at t=10 saw age 9 and kept it
        sleep(Duration::from_secs(10)).await;
        cache.add("k", "second");
        assert_eq!(cache.get("k").unwrap(), Bytes::from_static(b"second"));

        // t=21: the first write would be 20s old, the second is 9s old at the t=20 sweep
        sleep(Duration::from_secs(10)).await;
        assert_eq!(cache.get("k").unwrap(), Bytes::from_static(b"second"));

        // t=31: 19s old at the t=30 sweep
        sleep(Duration::from_secs(10)).await;
        assert!(cache.get("k").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_sweep_cycle() {
        let cache = Cache::new(Duration::from_millis(5)).unwrap();
        cache.add("x", "data");

        assert!(cache.get("x").is_some(), "Expected to find key immediately");

        // At exactly 10ms this task and the second sweep wake together and this
        // task is polled first, so step just past it
        sleep(Duration::from_millis(11)).await;

        assert!(cache.get("x").is_none(), "Expected key to be removed after expiry");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_entry_expires_after_two_intervals_in_real_time() {
        let cache = Cache::new(Duration::from_millis(5)).unwrap();
        cache.add("https://example.com", "testdata");
        assert!(cache.get("https://example.com").is_some());

        sleep(Duration::from_millis(10)).await;
        // Let a sweep that fired on the same timer tick run first
        tokio::task::yield_now().await;

        assert!(cache.get("https://example.com").is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_in_real_time() {
        let cache = Cache::new(Duration::from_millis(5)).unwrap();
        cache.add("https://example.com", "testdata");
        assert!(cache.get("https://example.com").is_some());

        sleep(Duration::from_millis(30)).await;

        assert!(cache.get("https://example.com").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_alive_before_interval_elapses() {
        let cache = Cache::new(Duration::from_secs(10)).unwrap();
        cache.add("k", "v");

        sleep(Duration::from_secs(9)).await;

        assert!(cache.get("k").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_returns_stale_entry_until_next_sweep() {
        let cache = Cache::new(Duration::from_secs(10)).unwrap();
        cache.add("k", "v");

        // The t=10 sweep sees an age of exactly 10s, which is not past the interval
        sleep(Duration::from_secs(15)).await;
        assert!(
            cache.get("k").is_some(),
            "Stale entry should stay readable until a sweep removes it"
        );

        sleep(Duration::from_secs(6)).await;
        assert!(cache.get("k").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_exactly_entries_past_interval() {
        let interval = Duration::from_secs(10);
        let cache = Cache::new(interval).unwrap();

        for i in 0..10u64 {
            if i > 0 {
                sleep(Duration::from_secs(2)).await;
            }
            cache.add(format!("k{i}"), format!("v{i}"));
        }

        // t=25, last sweep at t=20 removed everything inserted before t=10
        sleep(Duration::from_secs(7)).await;

        for i in 0..10u64 {
            let inserted_at = i * 2;
            let present = cache.get(&format!("k{i}")).is_some();
            assert_eq!(present, inserted_at >= 10, "k{i} inserted at t={inserted_at}");

            let age = 25 - inserted_at;
            if age <= interval.as_secs() {
                assert!(present, "k{i} is younger than the interval");
            }
            if age > 2 * interval.as_secs() {
                assert!(!present, "k{i} is older than a full sweep period past the interval");
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_clears_large_table() {
        let cache = Cache::new(Duration::from_secs(1)).unwrap();
        for i in 0..50_000 {
            cache.add(format!("https://example.com/{i}"), vec![0u8; 16]);
        }
        assert_eq!(cache.len(), 50_000);

        sleep(Duration::from_millis(2_100)).await;

        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_get_never_sees_torn_value() {
        let cache = Arc::new(Cache::new(Duration::from_secs(60)).unwrap());

        let tasks = (0..16u8).map(|task| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                for j in 0..200usize {
                    let key = format!("key-{}", (task as usize + j) % 8);
                    cache.add(key.clone(), vec![task; 64]);
                    if let Some(value) = cache.get(&key) {
                        assert_eq!(value.len(), 64);
                        assert!(value.iter().all(|b| *b == value[0]), "Torn value for {key}");
                    }
                    tokio::task::yield_now().await;
                }
            })
        });

        for result in join_all(tasks).await {
            result.expect("Task should not panic");
        }
        assert_eq!(cache.len(), 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access_while_sweeping() {
        let cache = Arc::new(Cache::new(Duration::from_millis(1)).unwrap());

        std::thread::scope(|scope| {
            for t in 0..4u8 {
                let cache = &cache;
                scope.spawn(move || {
                    for j in 0..2_000usize {
                        let key = format!("key-{}", j % 32);
                        cache.add(key.clone(), vec![t; 32]);
                        if let Some(value) = cache.get(&key) {
                            assert!(value.iter().all(|b| *b == value[0]));
                        }
                    }
                });
            }
        });

        sleep(Duration::from_millis(50)).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_stops_sweeper() {
        let cache = Cache::new(Duration::from_millis(5)).unwrap();
        let table = Arc::downgrade(&cache.table);

        time::timeout(Duration::from_secs(1), cache.shutdown())
            .await
            .expect("Shutdown should not hang");

        assert!(table.upgrade().is_none(), "Sweeper should release the table");
    }

    #[tokio::test]
    async fn test_drop_stops_sweeper() {
        let cache = Cache::new(Duration::from_secs(60)).unwrap();
        let table = Arc::downgrade(&cache.table);
        drop(cache);

        time::timeout(Duration::from_secs(1), async {
            while table.upgrade().is_some() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("Sweeper should exit once the cache is dropped");
    }

    #[tokio::test]
    async fn test_many_caches_created_and_dropped() {
        for _ in 0..100 {
            let cache = Cache::new(Duration::from_millis(1)).unwrap();
            cache.add("k", "v");
            cache.shutdown().await;
        }
    }
}
