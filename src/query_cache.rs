//! Keyed cache for remote query results.
//!
//! The cache never performs I/O itself. Callers ask it whether a fetch is
//! needed and receive a [`FetchTicket`]; the worker runs the fetch and the
//! result is handed back through [`QueryCache::resolve`]. At most one ticket
//! per key is outstanding, and only the outstanding ticket may write a result.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Leagues,
    LeagueSeasons(String),
}

impl QueryKey {
    /// A key with no usable identifier never fetches.
    pub fn is_enabled(&self) -> bool {
        match self {
            QueryKey::Leagues => true,
            QueryKey::LeagueSeasons(id) => !id.trim().is_empty(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Leagues => write!(f, "leagues"),
            QueryKey::LeagueSeasons(id) => write!(f, "league-seasons:{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Age after which data is refetched on next access.
    pub stale_time: Duration,
    /// Idle time without observers after which an entry is dropped.
    pub gc_time: Duration,
}

impl QueryOptions {
    pub const fn minutes(stale: u64, gc: u64) -> Self {
        Self {
            stale_time: Duration::from_secs(stale * 60),
            gc_time: Duration::from_secs(gc * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Nothing fetched and nothing in flight (also: disabled keys).
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: QueryKey,
    pub request: RequestId,
}

/// Proof that a view observes a key. Hand it back to
/// [`QueryCache::unsubscribe`] when the view goes away.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    key: QueryKey,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<FetchError>,
    pub is_fetching: bool,
    pub fetched_at: Option<Instant>,
}

impl<T> QueryState<T> {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            fetched_at: None,
        }
    }

    /// First load: nothing to show yet and a request is running.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }
}

#[derive(Debug)]
struct CacheEntry<T> {
    status: QueryStatus,
    data: Option<T>,
    error: Option<FetchError>,
    fetched_at: Option<Instant>,
    in_flight: Option<RequestId>,
    observers: usize,
    idle_since: Option<Instant>,
}

impl<T> CacheEntry<T> {
    fn new(now: Instant) -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            fetched_at: None,
            in_flight: None,
            observers: 0,
            idle_since: Some(now),
        }
    }

    fn is_stale(&self, now: Instant, stale_time: Duration) -> bool {
        self.fetched_at
            .map(|at| now.saturating_duration_since(at) >= stale_time)
            .unwrap_or(true)
    }
}

#[derive(Debug)]
pub struct QueryCache<T> {
    options: QueryOptions,
    entries: HashMap<QueryKey, CacheEntry<T>>,
    next_request: u64,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
            next_request: 0,
        }
    }

    /// Data of every cached entry, in no particular order.
    pub fn cached(&self) -> impl Iterator<Item = &T> {
        self.entries.values().filter_map(|entry| entry.data.as_ref())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Registers an observer for `key`. Returns a ticket when the key has no
    /// data, stale data, or a failed last fetch, and nothing is in flight.
    pub fn subscribe(
        &mut self,
        key: QueryKey,
        now: Instant,
    ) -> (Subscription, Option<FetchTicket>) {
        let stale_time = self.options.stale_time;
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(now));
        entry.observers += 1;
        entry.idle_since = None;

        let needs_fetch = entry.data.is_none()
            || entry.status == QueryStatus::Error
            || entry.is_stale(now, stale_time);
        let ticket = if key.is_enabled() && needs_fetch && entry.in_flight.is_none() {
            Some(self.issue(&key))
        } else {
            None
        };
        (Subscription { key }, ticket)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription, now: Instant) {
        if let Some(entry) = self.entries.get_mut(&subscription.key) {
            entry.observers = entry.observers.saturating_sub(1);
            if entry.observers == 0 {
                entry.idle_since = Some(now);
            }
        }
    }

    /// Background refetch for observed keys whose data has gone stale.
    pub fn refresh_if_stale(&mut self, key: &QueryKey, now: Instant) -> Option<FetchTicket> {
        let entry = self.entries.get(key)?;
        if !key.is_enabled()
            || entry.observers == 0
            || entry.in_flight.is_some()
            || entry.status != QueryStatus::Success
            || !entry.is_stale(now, self.options.stale_time)
        {
            return None;
        }
        debug!("query {key} is stale, refetching");
        Some(self.issue(key))
    }

    /// Forces a refetch unless one is already running for `key`.
    pub fn invalidate(&mut self, key: &QueryKey, now: Instant) -> Option<FetchTicket> {
        if !key.is_enabled() {
            return None;
        }
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(now));
        if entry.in_flight.is_some() {
            return None;
        }
        entry.fetched_at = None;
        Some(self.issue(key))
    }

    fn issue(&mut self, key: &QueryKey) -> FetchTicket {
        self.next_request += 1;
        let request = RequestId(self.next_request);
        if let Some(entry) = self.entries.get_mut(key) {
            entry.in_flight = Some(request);
            if entry.data.is_none() {
                entry.status = QueryStatus::Loading;
            }
        }
        FetchTicket {
            key: key.clone(),
            request,
        }
    }

    /// Applies a fetch result. Returns `false` when the ticket is no longer
    /// the outstanding one for its key (superseded or evicted).
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<T, FetchError>,
        now: Instant,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            debug!("dropping result for evicted query {}", ticket.key);
            return false;
        };
        if entry.in_flight != Some(ticket.request) {
            debug!("dropping superseded result for query {}", ticket.key);
            return false;
        }
        entry.in_flight = None;
        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.error = None;
                entry.status = QueryStatus::Success;
                entry.fetched_at = Some(now);
            }
            Err(err) => {
                entry.error = Some(err);
                entry.status = QueryStatus::Error;
            }
        }
        if entry.observers == 0 {
            entry.idle_since = Some(now);
        }
        true
    }

    /// Drops entries nobody has observed for longer than the eviction window.
    pub fn collect_garbage(&mut self, now: Instant) -> usize {
        let gc_time = self.options.gc_time;
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            let keep = entry.observers > 0
                || entry.in_flight.is_some()
                || entry
                    .idle_since
                    .map(|since| now.saturating_duration_since(since) < gc_time)
                    .unwrap_or(true);
            if !keep {
                debug!("evicting idle query {key}");
            }
            keep
        });
        before - self.entries.len()
    }

    pub fn state(&self, key: &QueryKey) -> QueryState<T> {
        let Some(entry) = self.entries.get(key) else {
            return QueryState::idle();
        };
        QueryState {
            status: entry.status,
            data: entry.data.clone(),
            error: entry.error.clone(),
            is_fetching: entry.in_flight.is_some(),
            fetched_at: entry.fetched_at,
        }
    }
}
