//! Optional response cache. Wrapping a catalog in [`CachedCatalog`] lets
//! screens skip the network for records fetched recently; screens themselves
//! know nothing about it.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{MovieDetail, MovieSummary};
use crate::tmdb::CatalogApi;

/// Endpoint plus identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Popular,
    Movie(i32),
}

#[derive(Debug)]
struct Slot<V> {
    value: V,
    fetched_at: i64,
    last_used: u64,
}

#[derive(Debug)]
struct Slots<K, V> {
    map: HashMap<K, Slot<V>>,
    tick: u64,
}

/// TTL cache with least-recently-used eviction once `capacity` is reached.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl_ms: i64,
    capacity: usize,
    slots: Mutex<Slots<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            capacity: capacity.max(1),
            slots: Mutex::new(Slots {
                map: HashMap::new(),
                tick: 0,
            }),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Utc::now().timestamp_millis()).await
    }

    pub async fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Utc::now().timestamp_millis()).await
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn get_at(&self, key: &K, now_ms: i64) -> Option<V> {
        let mut guard = self.slots.lock().await;
        let slots = &mut *guard;
        let fresh = match slots.map.get(key) {
            Some(slot) => now_ms - slot.fetched_at < self.ttl_ms,
            None => return None,
        };
        if !fresh {
            slots.map.remove(key);
            return None;
        }
        slots.tick += 1;
        let tick = slots.tick;
        slots.map.get_mut(key).map(|slot| {
            slot.last_used = tick;
            slot.value.clone()
        })
    }

    async fn insert_at(&self, key: K, value: V, now_ms: i64) {
        let mut guard = self.slots.lock().await;
        let slots = &mut *guard;
        let ttl_ms = self.ttl_ms;
        slots.map.retain(|_, s| now_ms - s.fetched_at < ttl_ms);
        if !slots.map.contains_key(&key) && slots.map.len() >= self.capacity {
            let oldest = slots
                .map
                .iter()
                .min_by_key(|(_, s)| s.last_used)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                slots.map.remove(&k);
            }
        }
        slots.tick += 1;
        let tick = slots.tick;
        slots.map.insert(
            key,
            Slot {
                value,
                fetched_at: now_ms,
                last_used: tick,
            },
        );
    }
}

#[derive(Debug, Clone)]
pub enum CatalogEntry {
    Popular(Vec<MovieSummary>),
    Movie(MovieDetail),
}

/// Caching decorator over any [`CatalogApi`]. Only successful responses are stored.
#[derive(Debug)]
pub struct CachedCatalog<C> {
    inner: C,
    cache: TtlCache<CacheKey, CatalogEntry>,
}

impl<C: CatalogApi> CachedCatalog<C> {
    pub fn new(inner: C, ttl: Duration, capacity: usize) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl, capacity),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: CatalogApi + 'static> CatalogApi for CachedCatalog<C> {
    async fn fetch_popular(&self) -> Result<Vec<MovieSummary>> {
        if let Some(CatalogEntry::Popular(movies)) = self.cache.get(&CacheKey::Popular).await {
            debug!("Cache hit for popular movies");
            return Ok(movies);
        }
        let movies = self.inner.fetch_popular().await?;
        self.cache
            .insert(CacheKey::Popular, CatalogEntry::Popular(movies.clone()))
            .await;
        Ok(movies)
    }

    async fn fetch_movie(&self, id: i32) -> Result<MovieDetail> {
        if let Some(CatalogEntry::Movie(movie)) = self.cache.get(&CacheKey::Movie(id)).await {
            debug!(movie_id = id, "Cache hit for movie");
            return Ok(movie);
        }
        let movie = self.inner.fetch_movie(id).await?;
        self.cache
            .insert(CacheKey::Movie(id), CatalogEntry::Movie(movie.clone()))
            .await;
        Ok(movie)
    }
}
