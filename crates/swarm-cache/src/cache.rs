//! TTL-indexed spatial cache with grid-backed neighbor queries.
//!
//! Two maps share one lock: the primary per-agent snapshot cache and a
//! secondary memoized-query cache. A readers/writer discipline is enough —
//! `get`/`nearby` take a read lock, `put`/`invalidate`/`cleanup` take a
//! write lock — because both maps are cheap to scan at the sizes this
//! engine targets.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use swarm_types::{AgentId, AgentStateSnapshot, Point2};

use crate::grid::Grid;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: AgentStateSnapshot,
    expiry_ts: DateTime<Utc>,
    last_access_ts: DateTime<Utc>,
}

/// Fingerprint of a `(center, radius)` neighbor query, used to key the
/// secondary query-result cache. Exact bit-pattern equality is intentional:
/// a fingerprint is a memoization key, not a spatial match.
type Fingerprint = (u64, u64, u64);

fn fingerprint(center: Point2, radius: f64) -> Fingerprint {
    (center.x.to_bits(), center.y.to_bits(), radius.to_bits())
}

struct QueryEntry {
    ids: Vec<AgentId>,
    expiry_ts: DateTime<Utc>,
}

struct Inner {
    primary: HashMap<AgentId, CacheEntry>,
    queries: HashMap<Fingerprint, QueryEntry>,
    grid: Grid,
}

pub struct SpatialCache {
    inner: RwLock<Inner>,
    max_entries: usize,
    default_ttl: Duration,
}

impl SpatialCache {
    pub fn new(cell_size: f64, max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner {
                primary: HashMap::new(),
                queries: HashMap::new(),
                grid: Grid::new(cell_size),
            }),
            max_entries,
            default_ttl,
        }
    }

    fn query_cache_cap(&self) -> usize {
        (self.max_entries / 10).max(1)
    }

    /// Insert or refresh `id`'s snapshot. If the primary map is at capacity,
    /// evict the least-recently-accessed entry first (a linear scan — a
    /// deliberate simplicity/throughput tradeoff at this cache's expected
    /// size; see DESIGN.md).
    pub fn put(&self, id: AgentId, snapshot: AgentStateSnapshot, now: DateTime<Utc>) {
        let mut inner = self.inner.write();
        if !inner.primary.contains_key(&id) && inner.primary.len() >= self.max_entries {
            if let Some(lru_id) = inner
                .primary
                .iter()
                .min_by_key(|(_, e)| e.last_access_ts)
                .map(|(id, _)| *id)
            {
                inner.primary.remove(&lru_id);
                inner.grid.remove(lru_id);
            }
        }
        let expiry_ts = now + self.default_ttl;
        inner.grid.upsert(id, snapshot.position);
        inner.primary.insert(id, CacheEntry { snapshot, expiry_ts, last_access_ts: now });
    }

    /// Returns `None` if absent or expired. A hit bumps `last_access_ts`.
    pub fn get(&self, id: AgentId, now: DateTime<Utc>) -> Option<AgentStateSnapshot> {
        let mut inner = self.inner.write();
        let expired = match inner.primary.get(&id) {
            Some(entry) => entry.expiry_ts < now,
            None => return None,
        };
        if expired {
            return None;
        }
        let entry = inner.primary.get_mut(&id).unwrap();
        entry.last_access_ts = now;
        Some(entry.snapshot.clone())
    }

    /// Neighbor query served from the grid, memoized by `(center, radius)`.
    /// Never returns an expired id.
    pub fn nearby(&self, center: Point2, radius: f64, now: DateTime<Utc>) -> Vec<AgentId> {
        let fp = fingerprint(center, radius);
        {
            let inner = self.inner.read();
            if let Some(entry) = inner.queries.get(&fp) {
                if entry.expiry_ts >= now {
                    return entry.ids.clone();
                }
            }
        }

        let mut inner = self.inner.write();
        let candidates = inner.grid.ids_within(center, radius);
        let ids: Vec<AgentId> = candidates
            .into_iter()
            .filter(|id| inner.primary.get(id).is_some_and(|e| e.expiry_ts >= now))
            .collect();

        if inner.queries.len() >= self.query_cache_cap() {
            inner.queries.clear();
        }
        let query_ttl = self.default_ttl / 2;
        inner.queries.insert(fp, QueryEntry { ids: ids.clone(), expiry_ts: now + query_ttl });
        ids
    }

    /// Remove `id` from the primary map and grid, and clear the query cache
    /// (a removed agent may invalidate any memoized neighbor list).
    pub fn invalidate(&self, id: AgentId) {
        let mut inner = self.inner.write();
        inner.primary.remove(&id);
        inner.grid.remove(id);
        inner.queries.clear();
    }

    /// Sweep expired primary and query entries.
    pub fn cleanup(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.write();
        let expired_ids: Vec<AgentId> = inner
            .primary
            .iter()
            .filter(|(_, e)| e.expiry_ts < now)
            .map(|(id, _)| *id)
            .collect();
        for id in expired_ids {
            inner.primary.remove(&id);
            inner.grid.remove(id);
        }
        inner.queries.retain(|_, e| e.expiry_ts >= now);
    }

    pub fn len(&self) -> usize {
        self.inner.read().primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_types::{AgentStatus, Vec2};

    fn snapshot(id: AgentId, pos: Point2) -> AgentStateSnapshot {
        AgentStateSnapshot {
            id,
            position: pos,
            velocity: Vec2::ZERO,
            heading: 0.0,
            battery: 1.0,
            status: AgentStatus::Active,
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn put_then_get_round_trips_within_ttl() {
        let cache = SpatialCache::new(50.0, 100, Duration::from_secs(10));
        let id = AgentId::new(1);
        let snap = snapshot(id, Point2::new(1.0, 2.0));
        cache.put(id, snap.clone(), ts(0));
        assert_eq!(cache.get(id, ts(5)), Some(snap));
    }

    #[test]
    fn get_expired_entry_is_a_miss() {
        let cache = SpatialCache::new(50.0, 100, Duration::from_secs(10));
        let id = AgentId::new(1);
        cache.put(id, snapshot(id, Point2::new(1.0, 2.0)), ts(0));
        assert_eq!(cache.get(id, ts(11)), None);
    }

    #[test]
    fn nearby_respects_ttl_expiry() {
        let cache = SpatialCache::new(50.0, 100, Duration::from_secs(10));
        let a = AgentId::new(1);
        let b = AgentId::new(2);
        let c = AgentId::new(3);
        cache.put(a, snapshot(a, Point2::new(100.0, 100.0)), ts(0));
        cache.put(b, snapshot(b, Point2::new(110.0, 100.0)), ts(0));
        cache.put(c, snapshot(c, Point2::new(500.0, 500.0)), ts(0));

        let mut found = cache.nearby(Point2::new(100.0, 100.0), 50.0, ts(1));
        found.sort_by_key(|id| id.raw());
        assert_eq!(found, vec![a, b]);

        // After A expires (TTL 10s from put at t=0) only B remains.
        let mut found = cache.nearby(Point2::new(100.0, 100.1), 50.0, ts(12));
        found.sort_by_key(|id| id.raw());
        assert_eq!(found, vec![b]);
    }

    #[test]
    fn invalidate_removes_from_primary_and_clears_query_cache() {
        let cache = SpatialCache::new(50.0, 100, Duration::from_secs(10));
        let id = AgentId::new(1);
        cache.put(id, snapshot(id, Point2::new(1.0, 2.0)), ts(0));
        cache.nearby(Point2::new(1.0, 2.0), 10.0, ts(0));
        cache.invalidate(id);
        assert_eq!(cache.get(id, ts(0)), None);
    }

    #[test]
    fn cleanup_sweeps_expired_entries() {
        let cache = SpatialCache::new(50.0, 100, Duration::from_secs(10));
        let id = AgentId::new(1);
        cache.put(id, snapshot(id, Point2::new(1.0, 2.0)), ts(0));
        cache.cleanup(ts(20));
        assert!(cache.is_empty());
    }

    #[test]
    fn put_at_capacity_evicts_least_recently_accessed() {
        let cache = SpatialCache::new(50.0, 2, Duration::from_secs(100));
        let a = AgentId::new(1);
        let b = AgentId::new(2);
        let c = AgentId::new(3);
        cache.put(a, snapshot(a, Point2::new(0.0, 0.0)), ts(0));
        cache.put(b, snapshot(b, Point2::new(10.0, 10.0)), ts(1));
        // touch `a` so `b` becomes the LRU entry
        cache.get(a, ts(2));
        cache.put(c, snapshot(c, Point2::new(20.0, 20.0)), ts(3));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(b, ts(3)).is_none());
        assert!(cache.get(a, ts(3)).is_some());
    }
}
