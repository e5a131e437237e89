//! Single-slot TTL cache with an injected clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

/// Source of the current time for freshness checks.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.timestamp_millis())),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let millis = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// Result of a cache lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    /// Stored within the TTL.
    Fresh(Arc<T>),
    /// Stored, but older than the TTL. Still usable as a fallback.
    Expired(Arc<T>),
    /// Nothing stored yet.
    Empty,
}

struct CacheEntry<T> {
    value: Arc<T>,
    stored_at: DateTime<Utc>,
}

/// Holds one value and the time it was computed.
///
/// An entry is fresh while `now - stored_at < ttl`. Value and timestamp are
/// always replaced together.
pub struct TtlCache<T, C = SystemClock> {
    ttl: TimeDelta,
    clock: C,
    slot: RwLock<Option<CacheEntry<T>>>,
}

impl<T, C: Clock> TtlCache<T, C> {
    pub fn new(ttl: Duration, clock: C) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
            slot: RwLock::new(None),
        }
    }

    pub async fn lookup(&self) -> Lookup<T> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            None => Lookup::Empty,
            Some(entry) if self.clock.now() - entry.stored_at < self.ttl => {
                Lookup::Fresh(Arc::clone(&entry.value))
            }
            Some(entry) => Lookup::Expired(Arc::clone(&entry.value)),
        }
    }

    /// Replace the stored value, stamping it with the current time.
    pub async fn store(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            stored_at: self.clock.now(),
        };
        *self.slot.write().await = Some(entry);
        value
    }

    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}

impl<T, C> std::fmt::Debug for TtlCache<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
