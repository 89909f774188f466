//! Lazily built, per-key index cache.
//!
//! The first query for a key becomes the leader of a build and publishes
//! its outcome on a `watch` channel. Queries arriving while it runs join
//! that channel and receive the same outcome, success or failure, so one
//! fetch sequence serves all of them. A failed build installs nothing and
//! the next query starts a fresh one. A finished index is installed as one
//! `Arc`, readers never see a half-filled mapping.
//!
//! Invalidating a key that is still building marks the build stale: its
//! current waiters get its outcome but nothing is installed, and queries
//! that joined after the invalidation wait for it to end before starting
//! the replacement build. Builds of one key therefore never overlap.

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::watch;
use tracing::debug;

use crate::index::DocIndex;

/// Lifecycle of one cached index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never built, invalidated, or last build failed.
    Absent,
    /// A build is in flight.
    Building,
    /// Index installed and served to queries.
    Ready,
}

type Outcome<E> = Result<Arc<DocIndex>, E>;
type OutcomeRx<E> = watch::Receiver<Option<Outcome<E>>>;

#[derive(Debug)]
enum Slot<E> {
    Building { rx: OutcomeRx<E>, stale: bool },
    Ready(Arc<DocIndex>),
}

/// Shared, read-mostly cache of [`DocIndex`] values keyed by `K`.
///
/// `E` is the build error handed to every caller waiting on a failed build.
#[derive(Debug)]
pub struct IndexCache<K, E> {
    slots: Mutex<HashMap<K, Slot<E>>>,
}

impl<K, E> Default for IndexCache<K, E> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, E> IndexCache<K, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    E: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    // Never held across an await.
    fn slots(&self) -> MutexGuard<'_, HashMap<K, Slot<E>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached index for `key`, running `build` if there is none.
    ///
    /// At most one `build` runs per key at a time; callers arriving during
    /// it share its outcome. On error nothing is installed.
    pub async fn get_or_build<B, Fut>(&self, key: &K, build: B) -> Result<Arc<DocIndex>, E>
    where
        B: FnOnce() -> Fut,
        Fut: Future<Output = Result<DocIndex, E>>,
    {
        let tx = loop {
            let (mut rx, joined_stale) = {
                let mut slots = self.slots();
                match slots.get(key) {
                    Some(Slot::Ready(index)) => return Ok(Arc::clone(index)),
                    Some(Slot::Building { rx, stale }) => (rx.clone(), *stale),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        slots.insert(key.clone(), Slot::Building { rx, stale: false });
                        break tx;
                    }
                }
            };

            let outcome = match rx.wait_for(Option::is_some).await {
                Ok(done) => (*done).clone(),
                Err(_) => None,
            };
            match outcome {
                Some(outcome) if !joined_stale => return outcome,
                _ => debug!(?key, "previous build ended without a usable result, retrying"),
            }
        };

        debug!(?key, "building index");
        let flight = Flight {
            cache: self,
            key,
            own: tx.subscribe(),
            settled: false,
        };
        let outcome = build().await.map(Arc::new);
        flight.settle(outcome.as_ref().ok().cloned());
        tx.send_replace(Some(outcome.clone()));
        outcome
    }

    /// Ready index for `key`, without building.
    pub fn get(&self, key: &K) -> Option<Arc<DocIndex>> {
        match self.slots().get(key) {
            Some(Slot::Ready(index)) => Some(Arc::clone(index)),
            _ => None,
        }
    }

    pub fn state(&self, key: &K) -> CacheState {
        match self.slots().get(key) {
            Some(Slot::Ready(_)) => CacheState::Ready,
            Some(Slot::Building { .. }) => CacheState::Building,
            None => CacheState::Absent,
        }
    }

    /// Drops the index for `key`; the next query rebuilds it.
    ///
    /// A build in flight is left running but its result is discarded.
    pub fn invalidate(&self, key: &K) {
        let mut slots = self.slots();
        let ready = match slots.get_mut(key) {
            Some(Slot::Building { stale, .. }) => {
                *stale = true;
                debug!(?key, "in-flight build marked stale");
                false
            }
            Some(Slot::Ready(_)) => true,
            None => false,
        };
        if ready {
            slots.remove(key);
            debug!(?key, "index invalidated");
        }
    }

    /// Ends the build owning `own`: installs `index` unless it is stale,
    /// otherwise frees the slot.
    fn finish(&self, key: &K, own: &OutcomeRx<E>, index: Option<Arc<DocIndex>>) {
        let mut slots = self.slots();
        let stale = match slots.get(key) {
            Some(Slot::Building { rx, stale }) if rx.same_channel(own) => *stale,
            _ => return,
        };
        match index {
            Some(index) if !stale => {
                slots.insert(key.clone(), Slot::Ready(index));
            }
            _ => {
                slots.remove(key);
            }
        }
    }
}

/// Leader side of a build. Frees the slot if the leader is dropped before
/// settling, so waiters retry instead of hanging.
struct Flight<'a, K, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    E: Clone,
{
    cache: &'a IndexCache<K, E>,
    key: &'a K,
    own: OutcomeRx<E>,
    settled: bool,
}

impl<K, E> Flight<'_, K, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    E: Clone,
{
    fn settle(mut self, index: Option<Arc<DocIndex>>) {
        self.settled = true;
        self.cache.finish(self.key, &self.own, index);
    }
}

impl<K, E> Drop for Flight<'_, K, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    E: Clone,
{
    fn drop(&mut self) {
        if !self.settled {
            self.cache.finish(self.key, &self.own, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn index_with(key: &str) -> DocIndex {
        let mut idx = DocIndex::new();
        idx.insert(key, format!("https://d/#{key}"));
        idx
    }

    /// Counts builds and the highest number running at once.
    #[derive(Default)]
    struct Builds {
        started: AtomicUsize,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Builds {
        async fn run(&self, label: &str, took: Duration) -> Result<DocIndex, ()> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(took).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(index_with(label))
        }
    }

    #[tokio::test]
    async fn builds_once_and_reuses() {
        let cache: IndexCache<String, ()> = IndexCache::new();
        let calls = AtomicUsize::new(0);
        let key = "latest".to_string();

        for _ in 0..3 {
            let idx = cache
                .get_or_build(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(index_with("Client"))
                })
                .await
                .unwrap();
            assert_eq!(idx.get("Client"), Some("https://d/#Client"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(&key), CacheState::Ready);
    }

    #[tokio::test]
    async fn failed_build_installs_nothing_and_is_retried() {
        let cache: IndexCache<String, &str> = IndexCache::new();
        let key = "rewrite".to_string();

        let err = cache
            .get_or_build(&key, || async { Err("boom") })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert_eq!(cache.state(&key), CacheState::Absent);
        assert!(cache.get(&key).is_none());

        let idx = cache
            .get_or_build(&key, || async { Ok(index_with("Bot")) })
            .await
            .unwrap();
        assert_eq!(idx.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_a_rebuild() {
        let cache: IndexCache<(), ()> = IndexCache::new();
        cache
            .get_or_build(&(), || async { Ok(index_with("old")) })
            .await
            .unwrap();

        cache.invalidate(&());
        assert_eq!(cache.state(&()), CacheState::Absent);

        let idx = cache
            .get_or_build(&(), || async { Ok(index_with("new")) })
            .await
            .unwrap();
        assert!(idx.get("new").is_some());
        assert!(idx.get("old").is_none());
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_build() {
        let cache: Arc<IndexCache<String, ()>> = Arc::new(IndexCache::new());
        let builds = Arc::new(Builds::default());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let builds = Arc::clone(&builds);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(&"latest".to_string(), || {
                        builds.run("Client", Duration::from_millis(20))
                    })
                    .await
                    .map(|idx| idx.len())
            }));
        }

        for h in handles {
            assert_eq!(h.await.unwrap(), Ok(1));
        }
        assert_eq!(builds.started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_failure() {
        let cache: Arc<IndexCache<String, String>> = Arc::new(IndexCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(&"latest".to_string(), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Err::<DocIndex, _>("503".to_string())
                    })
                    .await
                    .map(|idx| idx.len())
            }));
        }

        for h in handles {
            assert_eq!(h.await.unwrap(), Err("503".to_string()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(&"latest".to_string()), CacheState::Absent);
    }

    #[tokio::test]
    async fn invalidate_during_build_never_overlaps_builds() {
        let cache: Arc<IndexCache<(), ()>> = Arc::new(IndexCache::new());
        let builds = Arc::new(Builds::default());

        let first = {
            let (cache, builds) = (Arc::clone(&cache), Arc::clone(&builds));
            tokio::spawn(async move {
                cache
                    .get_or_build(&(), || builds.run("old", Duration::from_millis(40)))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        cache.invalidate(&());
        assert_eq!(cache.state(&()), CacheState::Building);

        let second = {
            let (cache, builds) = (Arc::clone(&cache), Arc::clone(&builds));
            tokio::spawn(async move {
                cache
                    .get_or_build(&(), || builds.run("new", Duration::from_millis(40)))
                    .await
            })
        };

        let old = first.await.unwrap().unwrap();
        let new = second.await.unwrap().unwrap();
        assert!(old.get("old").is_some());
        assert!(new.get("new").is_some());

        assert_eq!(builds.started.load(Ordering::SeqCst), 2);
        assert_eq!(builds.peak.load(Ordering::SeqCst), 1);
        assert!(cache.get(&()).is_some_and(|idx| idx.get("new").is_some()));
    }

    #[tokio::test]
    async fn abandoned_build_hands_over_to_a_waiter() {
        let cache: Arc<IndexCache<(), ()>> = Arc::new(IndexCache::new());

        let leader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_build(&(), || std::future::pending::<Result<DocIndex, ()>>())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        let waiter = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_build(&(), || async { Ok(index_with("Client")) })
                    .await
                    .map(|idx| idx.len())
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        leader.abort();
        assert_eq!(waiter.await.unwrap(), Ok(1));
        assert_eq!(cache.state(&()), CacheState::Ready);
    }
}
