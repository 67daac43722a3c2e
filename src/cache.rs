use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry {
    resolved: String,
    inserted_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    // Insertion order, oldest first.
    order: VecDeque<String>,
}

impl Inner {
    fn remove(&mut self, url: &str) -> bool {
        if self.entries.remove(url).is_none() {
            return false;
        }
        self.order.retain(|key| key != url);
        true
    }
}

/// Bounded cache of validated stream URLs.
///
/// Shared explicitly (usually behind an `Arc`) with the validators that use
/// it. Entries expire after `ttl` and the oldest entry is evicted when the
/// cache is full.
#[derive(Debug)]
pub struct ValidationCache {
    capacity: usize,
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl ValidationCache {
    /// A `capacity` of 0 creates a cache that never stores anything.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the resolved URL for `url` unless missing or expired.
    pub fn get(&self, url: &str) -> Option<String> {
        let mut inner = self.lock();
        let expired = match inner.entries.get(url) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.resolved.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.remove(url);
        }
        None
    }

    pub fn insert(&self, url: impl Into<String>, resolved: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }

        let url = url.into();
        let mut inner = self.lock();
        inner.remove(&url);

        while inner.entries.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.order.push_back(url.clone());
        inner.entries.insert(
            url,
            Entry {
                resolved: resolved.into(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drops the entry for `url`; returns whether one existed.
    pub fn invalidate(&self, url: &str) -> bool {
        self.lock().remove(url)
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
