//! Shared query cache
//!
//! A [`QueryClient`] is a cheap handle onto one process-wide store of
//! entries keyed by [`QueryKey`]. Reads are served from the store while the
//! entry is fresh; otherwise one fetch per key runs in the background and
//! every concurrent reader waits on its outcome.
//!
//! The store lock is a plain mutex and is never held across an `.await`.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use court_api::ApiError;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::keys::QueryKey;
use super::policy::{retry_delay, QueryPolicy, RetryPolicy};

type AnyData = Arc<dyn Any + Send + Sync>;
type FetchOutcome = Result<AnyData, ApiError>;
type BoxFetch = Pin<Box<dyn Future<Output = FetchOutcome> + Send>>;
type Fetcher = Arc<dyn Fn() -> BoxFetch + Send + Sync>;
type Pending = watch::Receiver<Option<FetchOutcome>>;

/// Point-in-time view of one cache entry
#[derive(Debug, Clone)]
pub struct QueryState {
    pub has_data: bool,
    /// Error of the most recent settled fetch, cleared by the next success
    pub error: Option<ApiError>,
    pub data_updated_at: Option<Instant>,
    pub is_stale: bool,
    pub is_fetching: bool,
    pub observers: usize,
}

struct CacheEntry {
    data: Option<AnyData>,
    error: Option<ApiError>,
    data_updated_at: Option<Instant>,
    invalidated: bool,
    observers: usize,
    last_accessed: Instant,
    policy: QueryPolicy,
    fetcher: Option<Fetcher>,
}

impl CacheEntry {
    fn new(policy: QueryPolicy, now: Instant) -> Self {
        Self {
            data: None,
            error: None,
            data_updated_at: None,
            invalidated: false,
            observers: 0,
            last_accessed: now,
            policy,
            fetcher: None,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        if self.data.is_none() || self.error.is_some() || self.invalidated {
            return false;
        }
        self.data_updated_at
            .is_some_and(|at| now.duration_since(at) < self.policy.stale_time)
    }
}

struct InFlight {
    id: u64,
    pending: Pending,
}

#[derive(Default)]
struct Store {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
    next_fetch_id: u64,
}

/// Handle onto the shared query cache
#[derive(Clone, Default)]
pub struct QueryClient {
    store: Arc<Mutex<Store>>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.len())
            .finish()
    }
}

/// Create the cache used by a dashboard process
///
/// Retry and staleness are configured per query through [`QueryPolicy`];
/// mutations bypass the cache entirely.
pub fn make_query_client() -> QueryClient {
    QueryClient::default()
}

impl QueryClient {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return cached data for `key` if fresh, otherwise fetch it
    ///
    /// Concurrent calls for the same key share one fetch. Failures are
    /// retried according to `policy.retry` before being returned.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        policy: QueryPolicy,
        fetcher: F,
    ) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let fetcher = erase(fetcher);
        let pending = {
            let mut store = self.lock();
            let now = Instant::now();
            let entry = store
                .entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(policy, now));
            entry.policy = policy;
            entry.fetcher = Some(fetcher.clone());
            entry.last_accessed = now;

            if entry.is_fresh(now) {
                if let Some(data) = entry.data.clone() {
                    debug!("Cache hit for {}", key);
                    return downcast(&key, data);
                }
            }
            self.start_fetch(&mut store, &key, fetcher, policy.retry)
        };
        downcast(&key, wait(pending).await?)
    }

    /// Refetch `key` with its registered fetcher, ignoring freshness
    ///
    /// Joins a fetch already in flight. Returns `None` if the key has never
    /// been fetched through [`fetch_query`](Self::fetch_query).
    pub async fn refetch_query(&self, key: &QueryKey) -> Option<Result<(), ApiError>> {
        let pending = {
            let mut store = self.lock();
            let entry = store.entries.get(key)?;
            let fetcher = entry.fetcher.clone()?;
            let retry = entry.policy.retry;
            self.start_fetch(&mut store, key, fetcher, retry)
        };
        Some(wait(pending).await.map(|_| ()))
    }

    fn start_fetch(
        &self,
        store: &mut Store,
        key: &QueryKey,
        fetcher: Fetcher,
        retry: RetryPolicy,
    ) -> Pending {
        if let Some(in_flight) = store.in_flight.get(key) {
            debug!("Joining in-flight fetch for {}", key);
            return in_flight.pending.clone();
        }

        let id = store.next_fetch_id;
        store.next_fetch_id += 1;
        let (tx, rx) = watch::channel(None);
        store.in_flight.insert(
            key.clone(),
            InFlight {
                id,
                pending: rx.clone(),
            },
        );

        debug!("Fetching {}", key);
        let client = self.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let outcome = fetch_with_retry(&key, &fetcher, retry).await;
            client.settle(&key, id, &outcome);
            let _ = tx.send(Some(outcome));
        });
        rx
    }

    /// Record the outcome of fetch `id` if it is still the current fetch
    /// for `key`
    ///
    /// Invalidation and eviction detach the running fetch. Its waiters still
    /// receive the outcome, but the cache does not.
    fn settle(&self, key: &QueryKey, id: u64, outcome: &FetchOutcome) {
        let mut store = self.lock();
        if !store.in_flight.get(key).is_some_and(|f| f.id == id) {
            debug!("Discarding detached fetch for {}", key);
            return;
        }
        store.in_flight.remove(key);
        let Some(entry) = store.entries.get_mut(key) else {
            return;
        };
        let now = Instant::now();
        entry.last_accessed = now;
        match outcome {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.error = None;
                entry.data_updated_at = Some(now);
                entry.invalidated = false;
            }
            Err(err) => {
                entry.error = Some(err.clone());
            }
        }
    }

    /// Cached data for `key`, fresh or not
    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let data = self.lock().entries.get(key)?.data.clone()?;
        data.downcast::<T>().ok()
    }

    /// Write `data` for `key` as freshly fetched, bypassing staleness checks
    pub fn set_query_data<T: Send + Sync + 'static>(
        &self,
        key: QueryKey,
        data: T,
        policy: QueryPolicy,
    ) -> Arc<T> {
        let data = Arc::new(data);
        let mut store = self.lock();
        let now = Instant::now();
        let entry = store
            .entries
            .entry(key)
            .or_insert_with(|| CacheEntry::new(policy, now));
        entry.policy = policy;
        entry.data = Some(data.clone());
        entry.error = None;
        entry.data_updated_at = Some(now);
        entry.invalidated = false;
        entry.last_accessed = now;
        data
    }

    pub fn query_state(&self, key: &QueryKey) -> Option<QueryState> {
        let store = self.lock();
        let entry = store.entries.get(key)?;
        Some(QueryState {
            has_data: entry.data.is_some(),
            error: entry.error.clone(),
            data_updated_at: entry.data_updated_at,
            is_stale: !entry.is_fresh(Instant::now()),
            is_fetching: store.in_flight.contains_key(key),
            observers: entry.observers,
        })
    }

    /// Mark every entry under `prefix` stale
    ///
    /// Fetches already running for those keys are detached. Observed entries
    /// are refetched in the background; the rest refetch on their next read.
    /// Returns the number of entries marked.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let mut store = self.lock();
        store.in_flight.retain(|key, _| !key.starts_with(prefix));
        let mut refetch = Vec::new();
        let mut marked = 0;
        for (key, entry) in store
            .entries
            .iter_mut()
            .filter(|(k, _)| k.starts_with(prefix))
        {
            entry.invalidated = true;
            marked += 1;
            if entry.observers > 0 {
                if let Some(fetcher) = entry.fetcher.clone() {
                    refetch.push((key.clone(), fetcher, entry.policy.retry));
                }
            }
        }
        for (key, fetcher, retry) in refetch {
            self.start_fetch(&mut store, &key, fetcher, retry);
        }
        debug!("Invalidated {} entries under {}", marked, prefix);
        marked
    }

    /// Drop every entry under `prefix` from the cache
    ///
    /// A fetch still running for a removed key settles for its waiters only;
    /// the next read starts a new one.
    pub fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let mut store = self.lock();
        store.in_flight.retain(|key, _| !key.starts_with(prefix));
        let before = store.entries.len();
        store.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - store.entries.len();
        debug!("Removed {} entries under {}", removed, prefix);
        removed
    }

    /// Register interest in `key` until the returned guard is dropped
    pub fn observe(&self, key: QueryKey) -> QueryObserver {
        {
            let mut store = self.lock();
            let now = Instant::now();
            let entry = store
                .entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(QueryPolicy::default(), now));
            entry.observers += 1;
            entry.last_accessed = now;
        }
        QueryObserver {
            client: self.clone(),
            key,
            cancel: CancellationToken::new(),
        }
    }

    fn unobserve(&self, key: &QueryKey) {
        let mut store = self.lock();
        if let Some(entry) = store.entries.get_mut(key) {
            entry.observers = entry.observers.saturating_sub(1);
            entry.last_accessed = Instant::now();
        }
    }

    /// Evict unobserved, idle entries whose gc time has elapsed
    pub fn collect_garbage(&self) -> usize {
        let mut store = self.lock();
        let now = Instant::now();
        let Store {
            entries, in_flight, ..
        } = &mut *store;
        let before = entries.len();
        entries.retain(|key, entry| {
            entry.observers > 0
                || in_flight.contains_key(key)
                || now.duration_since(entry.last_accessed) < entry.policy.gc_time
        });
        let collected = before - entries.len();
        if collected > 0 {
            debug!("Garbage collected {} cache entries", collected);
        }
        collected
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a key observed while alive
///
/// Dropping the observer cancels its token, which stops any refetch loop
/// started for it. A fetch already in flight still settles into the cache.
#[derive(Debug)]
pub struct QueryObserver {
    client: QueryClient,
    key: QueryKey,
    cancel: CancellationToken,
}

impl QueryObserver {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Token cancelled when this observer is dropped
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }
}

impl Drop for QueryObserver {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.client.unobserve(&self.key);
    }
}

fn erase<T, F, Fut>(fetcher: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        Box::pin(async move { fut.await.map(|data| Arc::new(data) as AnyData) }) as BoxFetch
    })
}

async fn fetch_with_retry(key: &QueryKey, fetcher: &Fetcher, retry: RetryPolicy) -> FetchOutcome {
    let mut failure_count = 0;
    loop {
        match fetcher().await {
            Ok(data) => return Ok(data),
            Err(err) if retry.should_retry(failure_count, &err) => {
                let delay = retry_delay(failure_count);
                debug!("Fetch of {} failed: {}; retrying in {:?}", key, err, delay);
                tokio::time::sleep(delay).await;
                failure_count += 1;
            }
            Err(err) => {
                warn!(
                    "Fetch of {} failed after {} retries: {}",
                    key, failure_count, err
                );
                return Err(err);
            }
        }
    }
}

async fn wait(mut pending: Pending) -> FetchOutcome {
    let outcome = match pending.wait_for(Option::is_some).await {
        Ok(settled) => (*settled).clone(),
        Err(_) => None,
    };
    outcome.unwrap_or_else(|| Err(ApiError::unavailable("Query fetch was abandoned")))
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, data: AnyData) -> Result<Arc<T>, ApiError> {
    data.downcast::<T>().map_err(|_| {
        ApiError::unavailable(format!("Cached value for {} has an unexpected type", key))
    })
}
