//! Per-user cache of the most recent recipe batch.
//!
//! Each successful generation replaces the user's entry. Pantry mutations
//! invalidate it so a later `GET /recipes` reflects the new ingredients.
//!
//! Invalidation is tracked on a monotonic clock. A batch remembers the clock
//! reading taken before its pantry was read, and any invalidation stamped
//! after that reading makes the batch stale, including one that lands while
//! the batch is still being generated.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use moka::notification::RemovalCause;

use pantry_core::{RecipeSuggestion, UserId};

const MAX_CACHED_USERS: u64 = 10_000;

/// Upper bound on remembered per-user invalidations.
const MAX_TRACKED_INVALIDATIONS: u64 = 4 * MAX_CACHED_USERS;

/// A generated batch shared between the cache and response handlers.
pub type RecipeBatch = Arc<Vec<RecipeSuggestion>>;

/// Clock reading taken before a batch's pantry was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Clone)]
struct Entry {
    started: Generation,
    recipes: RecipeBatch,
}

#[derive(Clone)]
pub struct RecipeCache {
    batches: Cache<UserId, Entry>,
    /// Clock reading of each user's latest invalidation.
    invalidated_at: Cache<UserId, u64>,
    clock: Arc<AtomicU64>,
    /// Batches started before this reading are stale for every user.
    floor: Arc<AtomicU64>,
}

impl RecipeCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let floor = Arc::new(AtomicU64::new(0));
        let evicted_floor = Arc::clone(&floor);

        Self {
            batches: Cache::builder()
                .max_capacity(MAX_CACHED_USERS)
                .time_to_live(ttl)
                .build(),
            // A forgotten invalidation could let a stale batch pass, so its
            // stamp is folded into the global floor on eviction.
            invalidated_at: Cache::builder()
                .max_capacity(MAX_TRACKED_INVALIDATIONS)
                .eviction_listener(move |_user, stamp: u64, cause: RemovalCause| {
                    if cause.was_evicted() {
                        evicted_floor.fetch_max(stamp, Ordering::SeqCst);
                    }
                })
                .build(),
            clock: Arc::new(AtomicU64::new(0)),
            floor,
        }
    }

    /// Read the clock before loading the pantry a new batch is built from.
    #[must_use]
    pub fn begin(&self) -> Generation {
        Generation(self.clock.load(Ordering::SeqCst))
    }

    /// The user's batch, unless a later invalidation made it stale.
    pub async fn get(&self, user_id: &UserId) -> Option<RecipeBatch> {
        let entry = self.batches.get(user_id).await?;
        if self.is_fresh(user_id, entry.started).await {
            return Some(entry.recipes);
        }
        self.batches.invalidate(user_id).await;
        None
    }

    /// Store a batch generated since `started`. A batch that went stale
    /// while it was built is returned but not cached.
    pub async fn insert(
        &self,
        user_id: UserId,
        started: Generation,
        recipes: Vec<RecipeSuggestion>,
    ) -> RecipeBatch {
        let recipes = Arc::new(recipes);
        if self.is_fresh(&user_id, started).await {
            let entry = Entry {
                started,
                recipes: Arc::clone(&recipes),
            };
            self.batches.insert(user_id, entry).await;
        }
        recipes
    }

    /// The user's fresh batch, or the result of `init`.
    ///
    /// Concurrent misses for the same user share one `init` run.
    ///
    /// # Errors
    ///
    /// Returns the error of the shared `init` run.
    pub async fn get_or_try_insert_with<F, E>(
        &self,
        user_id: &UserId,
        init: F,
    ) -> Result<RecipeBatch, Arc<E>>
    where
        F: Future<Output = Result<Vec<RecipeSuggestion>, E>>,
        E: Send + Sync + 'static,
    {
        if let Some(batch) = self.get(user_id).await {
            return Ok(batch);
        }

        let started = self.begin();
        let entry = self
            .batches
            .try_get_with_by_ref(user_id, async move {
                init.await.map(|recipes| Entry {
                    started,
                    recipes: Arc::new(recipes),
                })
            })
            .await?;
        Ok(entry.recipes)
    }

    pub async fn invalidate(&self, user_id: &UserId) {
        let stamp = self.tick();
        self.invalidated_at.insert(user_id.clone(), stamp).await;
        self.batches.invalidate(user_id).await;
    }

    pub fn invalidate_all(&self) {
        let stamp = self.tick();
        self.floor.fetch_max(stamp, Ordering::SeqCst);
        self.batches.invalidate_all();
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn is_fresh(&self, user_id: &UserId, started: Generation) -> bool {
        let invalidated = self.invalidated_at.get(user_id).await.unwrap_or(0);
        let floor = self.floor.load(Ordering::SeqCst);
        started.0 >= invalidated.max(floor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn batch(title: &str) -> Vec<RecipeSuggestion> {
        vec![RecipeSuggestion::new(
            0,
            title.to_string(),
            format!("# {title}"),
            None,
        )]
    }

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    async fn put(cache: &RecipeCache, id: &str, title: &str) {
        cache.insert(user(id), cache.begin(), batch(title)).await;
    }

    #[tokio::test]
    async fn test_insert_replaces_previous_batch() {
        let cache = RecipeCache::new(Duration::from_secs(60));
        put(&cache, "alice", "Soup").await;
        put(&cache, "alice", "Stew").await;

        let cached = cache.get(&user("alice")).await.unwrap();
        assert_eq!(cached[0].title, "Stew");
    }

    #[tokio::test]
    async fn test_invalidate_is_per_user() {
        let cache = RecipeCache::new(Duration::from_secs(60));
        put(&cache, "alice", "Soup").await;
        put(&cache, "bob", "Salad").await;

        cache.invalidate(&user("alice")).await;

        assert!(cache.get(&user("alice")).await.is_none());
        assert!(cache.get(&user("bob")).await.is_some());
    }

    #[tokio::test]
    async fn test_batch_started_before_invalidation_is_not_cached() {
        let cache = RecipeCache::new(Duration::from_secs(60));
        let started = cache.begin();

        cache.invalidate(&user("alice")).await;
        let returned = cache.insert(user("alice"), started, batch("Plain Rice")).await;

        assert_eq!(returned[0].title, "Plain Rice");
        assert!(cache.get(&user("alice")).await.is_none());

        // Other users are unaffected by alice's invalidation
        cache.insert(user("bob"), started, batch("Salad")).await;
        assert!(cache.get(&user("bob")).await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_all_rejects_in_flight_batches() {
        let cache = RecipeCache::new(Duration::from_secs(60));
        let started = cache.begin();

        cache.invalidate_all();
        cache.insert(user("bob"), started, batch("Salad")).await;
        assert!(cache.get(&user("bob")).await.is_none());

        put(&cache, "bob", "Salad").await;
        assert!(cache.get(&user("bob")).await.is_some());
    }

    #[tokio::test]
    async fn test_invalidation_during_init_makes_entry_stale() {
        let cache = RecipeCache::new(Duration::from_secs(60));
        let during = cache.clone();

        let first = cache
            .get_or_try_insert_with(&user("alice"), async move {
                during.invalidate(&user("alice")).await;
                Ok::<_, String>(batch("Plain Rice"))
            })
            .await
            .unwrap();
        assert_eq!(first[0].title, "Plain Rice");

        let second = cache
            .get_or_try_insert_with(&user("alice"), async {
                Ok::<_, String>(batch("Scallion Pancake"))
            })
            .await
            .unwrap();
        assert_eq!(second[0].title, "Scallion Pancake");
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_init() {
        let cache = RecipeCache::new(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));

        let load = || {
            let runs = Arc::clone(&runs);
            let cache = cache.clone();
            async move {
                cache
                    .get_or_try_insert_with(&user("alice"), async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, String>(batch("Soup"))
                    })
                    .await
                    .unwrap()
            }
        };

        let (a, b) = tokio::join!(load(), load());
        assert_eq!(a[0].title, "Soup");
        assert_eq!(b[0].title, "Soup");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_init_error_is_not_cached() {
        let cache = RecipeCache::new(Duration::from_secs(60));
        let err = cache
            .get_or_try_insert_with(&user("alice"), async {
                Err::<Vec<RecipeSuggestion>, _>("upstream down".to_string())
            })
            .await
            .unwrap_err();
        assert_eq!(err.as_str(), "upstream down");
        assert!(cache.get(&user("alice")).await.is_none());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = RecipeCache::new(Duration::from_millis(50));
        put(&cache, "alice", "Soup").await;

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get(&user("alice")).await.is_none());
    }
}
