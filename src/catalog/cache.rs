//! Session-scoped cache of the full candidate set.
//!
//! The catalog has no spatial query, so the whole keyword result set is
//! fetched once and filtered locally per viewport while it stays fresh.
//! At most one catalog fetch is outstanding at a time; callers that
//! arrive while it runs are told to wait for it.

use super::client::CatalogClient;
use super::extract::{extract, MapCandidate};
use super::http::HttpFetch;
use super::Result;
use crate::geo::GeoBounds;
use std::time::Duration;
use web_time::Instant;

/// Answer to a cache lookup.
#[derive(Debug)]
pub enum CacheLookup {
    /// Fresh data, already filtered to the viewport.
    Hit(Vec<MapCandidate>),
    /// No fresh data: the caller must run this job and hand back its result.
    Fetch(FetchJob),
    /// A fetch is already running; its completion will answer this caller.
    InFlight,
}

/// One full catalog fetch plus extraction.
#[derive(Debug, Clone)]
pub struct FetchJob {
    generation: u64,
    client: CatalogClient,
    keyword: String,
    rows: u32,
}

impl FetchJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn run<F>(self, fetcher: &F) -> FetchDone
    where
        F: HttpFetch + ?Sized,
    {
        let result = self
            .client
            .search(fetcher, &self.keyword, self.rows)
            .await
            .map(|records| extract(&records));

        FetchDone {
            generation: self.generation,
            result,
        }
    }

    /// Completion for a job that could not be started.
    pub fn fail(self, error: super::Error) -> FetchDone {
        FetchDone {
            generation: self.generation,
            result: Err(error),
        }
    }
}

/// Completion of a [`FetchJob`].
#[derive(Debug)]
pub struct FetchDone {
    pub generation: u64,
    pub result: Result<Vec<MapCandidate>>,
}

/// Outcome of applying a [`FetchDone`].
#[derive(Debug, Clone, PartialEq)]
pub enum CacheUpdate {
    /// A fresh set of this many candidates is now stored.
    Stored(usize),
    /// The fetch failed; any previous set is left as it was.
    Failed(super::Error),
    /// Not the in-flight fetch; nothing changed.
    Ignored,
}

#[derive(Debug, Clone)]
struct CachedSet {
    candidates: Vec<MapCandidate>,
    fetched_at: Instant,
}

/// Holds the most recent full candidate set with a freshness deadline.
#[derive(Debug)]
pub struct ResultCache {
    client: CatalogClient,
    keyword: String,
    rows: u32,
    ttl: Duration,
    entry: Option<CachedSet>,
    in_flight: Option<u64>,
    next_generation: u64,
}

impl ResultCache {
    pub fn new(client: CatalogClient, keyword: impl Into<String>, rows: u32, ttl: Duration) -> Self {
        Self {
            client,
            keyword: keyword.into(),
            rows,
            ttl,
            entry: None,
            in_flight: None,
            next_generation: 0,
        }
    }

    /// Whether a stored set exists and is younger than the TTL.
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| now.saturating_duration_since(e.fetched_at) < self.ttl)
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of candidates in the stored set, fresh or not.
    pub fn len(&self) -> usize {
        self.entry.as_ref().map_or(0, |e| e.candidates.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serves the viewport from cache, or hands out the single fetch job.
    pub fn lookup(&mut self, viewport: &GeoBounds, now: Instant) -> CacheLookup {
        if self.is_fresh(now) {
            log::info!("Result cache hit");
            return CacheLookup::Hit(self.filter(viewport));
        }

        if self.in_flight.is_some() {
            log::debug!("Catalog fetch already in flight");
            return CacheLookup::InFlight;
        }

        self.next_generation += 1;
        self.in_flight = Some(self.next_generation);
        log::info!("Result cache miss, fetching generation {}", self.next_generation);

        CacheLookup::Fetch(FetchJob {
            generation: self.next_generation,
            client: self.client.clone(),
            keyword: self.keyword.clone(),
            rows: self.rows,
        })
    }

    /// Applies a finished fetch. Only the in-flight generation is accepted.
    pub fn complete(&mut self, done: FetchDone, now: Instant) -> CacheUpdate {
        if self.in_flight != Some(done.generation) {
            log::debug!("Ignoring catalog fetch generation {}", done.generation);
            return CacheUpdate::Ignored;
        }
        self.in_flight = None;

        match done.result {
            Ok(candidates) => {
                let count = candidates.len();
                log::info!("Result cache updated with {} candidates", count);
                self.entry = Some(CachedSet {
                    candidates,
                    fetched_at: now,
                });
                CacheUpdate::Stored(count)
            }
            Err(e) => {
                log::warn!("Catalog fetch failed: {}", e);
                CacheUpdate::Failed(e)
            }
        }
    }

    /// Stored candidates intersecting `viewport`, in catalog order.
    pub fn filter(&self, viewport: &GeoBounds) -> Vec<MapCandidate> {
        self.entry
            .iter()
            .flat_map(|e| e.candidates.iter())
            .filter(|c| c.bounds.intersects(viewport))
            .cloned()
            .collect()
    }

    /// Drops the stored set. A fetch already in flight keeps running and
    /// will still be accepted.
    pub fn invalidate(&mut self) {
        log::info!("Result cache invalidated");
        self.entry = None;
    }
}
