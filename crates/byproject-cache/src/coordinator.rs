//! Per-key coordination of upstream fetches.
//!
//! Each key is either idle or has exactly one fetch in flight. The first
//! caller for an idle key becomes the leader: its fetch is spawned as a task
//! and published as a shared handle. Callers arriving while it runs join
//! that handle instead of starting their own fetch, and all of them observe
//! the same result. The key goes back to idle when the task settles,
//! whatever the outcome.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::CacheError;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, CacheError>>>;
type InFlightMap<V> = Arc<Mutex<HashMap<String, InFlight<V>>>>;

struct InFlight<V> {
    id: u64,
    fetch: SharedFetch<V>,
}

/// How a caller took part in a coordinated fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRole {
    /// Started the fetch.
    Leader,
    /// Joined a fetch already in flight.
    Follower,
}

/// Guarantees at most one in-flight fetch per key within the process.
pub struct FetchCoordinator<V> {
    in_flight: InFlightMap<V>,
    next_id: AtomicU64,
}

/// Removes the key, unless a newer fetch has already replaced it.
fn release<V>(in_flight: &InFlightMap<V>, key: &str, id: u64) {
    let mut map = in_flight.lock();
    if map.get(key).is_some_and(|f| f.id == id) {
        map.remove(key);
    }
}

impl<V> FetchCoordinator<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Runs `fetch` for `key` unless a fetch for that key is already in
    /// flight, in which case the caller waits for that one instead.
    ///
    /// The fetch runs on its own task, so it completes (and the key is
    /// released) even if every waiting caller is cancelled.
    pub async fn run<F>(&self, key: &str, fetch: F) -> (Result<V, CacheError>, FetchRole)
    where
        F: Future<Output = Result<V, CacheError>> + Send + 'static,
    {
        let (shared, role) = {
            let mut map = self.in_flight.lock();
            match map.get(key) {
                Some(existing) => (existing.fetch.clone(), FetchRole::Follower),
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let shared = self.spawn_fetch(key, id, fetch);
                    map.insert(
                        key.to_string(),
                        InFlight {
                            id,
                            fetch: shared.clone(),
                        },
                    );
                    (shared, FetchRole::Leader)
                },
            }
        };

        if role == FetchRole::Follower {
            debug!(key = %key, "Joining in-flight fetch");
        }

        (shared.await, role)
    }

    fn spawn_fetch<F>(&self, key: &str, id: u64, fetch: F) -> SharedFetch<V>
    where
        F: Future<Output = Result<V, CacheError>> + Send + 'static,
    {
        // The map lock is held by the caller until the handle is published,
        // so the task cannot release the key before it was inserted.
        let task_map = Arc::clone(&self.in_flight);
        let task_key = key.to_string();
        let task = tokio::spawn(async move {
            let result = fetch.await;
            release(&task_map, &task_key, id);
            result
        });

        let join_map = Arc::clone(&self.in_flight);
        let join_key = key.to_string();
        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    error!(key = %join_key, error = %e, "Fetch task aborted");
                    release(&join_map, &join_key, id);
                    Err(CacheError::unavailable(
                        join_key,
                        format!("fetch task aborted: {}", e),
                    ))
                },
            }
        }
        .boxed()
        .shared()
    }

    /// Returns true if a fetch for `key` is currently running.
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.lock().contains_key(key)
    }

    /// Number of keys with a fetch in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

impl<V> Default for FetchCoordinator<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let coordinator = Arc::new(FetchCoordinator::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let coordinator = Arc::clone(&coordinator);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                coordinator
                    .run("k", async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(7)
                    })
                    .await
            }));
        }

        let mut leaders = 0;
        for handle in handles {
            let (result, role) = handle.await.unwrap();
            assert_eq!(result, Ok(7));
            if role == FetchRole::Leader {
                leaders += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(leaders, 1);
        assert!(!coordinator.is_in_flight("k"));
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_key_released() {
        let coordinator = Arc::new(FetchCoordinator::<u32>::new());

        let a = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .run("k", async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Err(CacheError::unavailable("k", "boom"))
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let (b, role) = coordinator.run("k", async { Ok(1) }).await;

        assert_eq!(role, FetchRole::Follower);
        assert_eq!(b, Err(CacheError::unavailable("k", "boom")));
        assert_eq!(a.await.unwrap().0, b);
        assert_eq!(coordinator.in_flight_count(), 0);

        // Idle again: the next caller leads a fresh fetch.
        let (c, role) = coordinator.run("k", async { Ok(2) }).await;
        assert_eq!((c, role), (Ok(2), FetchRole::Leader));
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let coordinator = FetchCoordinator::<&'static str>::new();

        let (a, b) = tokio::join!(
            coordinator.run("a", async { Ok("a") }),
            coordinator.run("b", async { Ok("b") }),
        );

        assert_eq!(a, (Ok("a"), FetchRole::Leader));
        assert_eq!(b, (Ok("b"), FetchRole::Leader));
    }

    #[tokio::test]
    async fn test_cancelled_caller_does_not_leak_key() {
        let coordinator = Arc::new(FetchCoordinator::<u32>::new());

        let caller = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .run("k", async {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Ok(3)
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        caller.abort();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!coordinator.is_in_flight("k"));
    }
}
