//! Per-key single-flight tables.
//!
//! Each store guards its fetches with one of these: the first caller for a
//! key installs the fetch as a shared future, later callers join it, and
//! every waiter observes the same settled outcome. The entry is removed
//! exactly once, when the flight settles, so a key's loading flag is true
//! for at most the duration of one fetch. There is no polling and no
//! arbitrary wait cap; waiters suspend directly on the shared future.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;

use super::lock::mutex_lock;
use crate::rpc::ApiError;

const SOURCE: &str = "cache::flight";

type SharedFlight = Shared<BoxFuture<'static, Result<(), ApiError>>>;

struct Entry {
    generation: u64,
    flight: SharedFlight,
}

pub(crate) struct FlightTable<K> {
    flights: Arc<Mutex<HashMap<K, Entry>>>,
    next_generation: AtomicU64,
}

impl<K> FlightTable<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            flights: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// True while a fetch for `key` is in flight.
    pub fn contains(&self, key: &K) -> bool {
        mutex_lock(&self.flights, SOURCE, "contains").contains_key(key)
    }

    /// Join the in-flight operation for `key`, or install `fetch` as the
    /// new flight. `fetch` is only polled if it becomes the flight; a
    /// joining caller's copy is dropped unpolled.
    pub async fn run<F>(&self, key: K, fetch: F) -> Result<(), ApiError>
    where
        F: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let flight = {
            let mut flights = mutex_lock(&self.flights, SOURCE, "run");
            if let Some(entry) = flights.get(&key) {
                counter!("larder_store_fetch_joined_total").increment(1);
                entry.flight.clone()
            } else {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let table = Arc::clone(&self.flights);
                let settle_key = key.clone();
                let flight = async move {
                    let result = fetch.await;
                    // Settle-time cleanup; the generation check keeps a
                    // detached flight from evicting its replacement.
                    let mut flights = mutex_lock(&table, SOURCE, "settle");
                    if flights
                        .get(&settle_key)
                        .is_some_and(|entry| entry.generation == generation)
                    {
                        flights.remove(&settle_key);
                    }
                    result
                }
                .boxed()
                .shared();
                flights.insert(
                    key,
                    Entry {
                        generation,
                        flight: flight.clone(),
                    },
                );
                counter!("larder_store_fetch_total").increment(1);
                flight
            }
        };
        flight.await
    }

    /// Detach the current flight for `key` so the next [`run`](Self::run)
    /// starts fresh. Waiters already attached to the detached flight still
    /// settle on its outcome.
    pub fn forget(&self, key: &K) {
        mutex_lock(&self.flights, SOURCE, "forget").remove(key);
    }

    pub fn clear(&self) {
        mutex_lock(&self.flights, SOURCE, "clear").clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use futures::future::join_all;

    use super::*;
    use crate::rpc::ApiError;

    #[tokio::test]
    async fn concurrent_runs_share_one_execution() {
        let table: FlightTable<&'static str> = FlightTable::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let runs = (0..5).map(|_| {
            let calls = Arc::clone(&calls);
            table.run("key", async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(())
            })
        });
        let results = join_all(runs).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!table.contains(&"key"));
    }

    #[tokio::test]
    async fn waiters_observe_the_shared_failure() {
        let table: FlightTable<&'static str> = FlightTable::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let runs = (0..3).map(|_| {
            let calls = Arc::clone(&calls);
            table.run("key", async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Err(ApiError::transport("connection refused"))
            })
        });
        let results = join_all(runs).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result, Err(ApiError::transport("connection refused")));
        }
    }

    #[tokio::test]
    async fn distinct_keys_do_not_share() {
        let table: FlightTable<u8> = FlightTable::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let runs = (0u8..3).map(|key| {
            let calls = Arc::clone(&calls);
            table.run(key, async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });
        join_all(runs).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn forget_detaches_without_breaking_settlement() {
        let table: Arc<FlightTable<&'static str>> = Arc::new(FlightTable::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());

        let first = tokio::spawn({
            let table = Arc::clone(&table);
            let calls = Arc::clone(&calls);
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            async move {
                table
                    .run("key", async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        started.notify_one();
                        release.notified().await;
                        Ok(())
                    })
                    .await
            }
        });
        started.notified().await;

        // Detach the stalled flight; a new run must start a second fetch
        // immediately instead of joining the old one.
        table.forget(&"key");
        let calls_second = Arc::clone(&calls);
        table
            .run("key", async move {
                calls_second.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .expect("second flight");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The detached waiter still settles on its own outcome.
        release.notify_one();
        first
            .await
            .expect("join first waiter")
            .expect("first flight outcome");
        assert!(!table.contains(&"key"));
    }

    #[tokio::test]
    async fn sequential_runs_fetch_again() {
        let table: FlightTable<&'static str> = FlightTable::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            table
                .run("key", async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
                .expect("flight");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
