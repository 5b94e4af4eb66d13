//! Search sequencing and the last rendered result list.
//!
//! Every search gets a sequence number. Only the newest search that is
//! still waiting may be answered; anything else is a superseded response
//! and is dropped without touching the rendered results.

use crate::catalog::{Error, MapCandidate};
use crate::geo::GeoBounds;
use geo_types::Coord;

/// What the status line says about searching.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Searching,
    Found(usize),
    Empty,
    Failed(String),
}

impl SearchStatus {
    pub fn message(&self) -> String {
        match self {
            SearchStatus::Idle => "Pan the map and press Search".to_string(),
            SearchStatus::Searching => "Searching...".to_string(),
            SearchStatus::Found(n) => format!("{} maps found", n),
            SearchStatus::Empty => "No maps found in this area".to_string(),
            SearchStatus::Failed(msg) => format!("Error: {}", msg),
        }
    }
}

/// A search waiting for data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSearch {
    pub seq: u64,
    pub viewport: GeoBounds,
}

#[derive(Debug, Default)]
pub struct SearchSession {
    last_seq: u64,
    pending: Option<PendingSearch>,
    rendered_seq: Option<u64>,
    results: Vec<MapCandidate>,
    status: SearchStatus,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a search for `viewport`, superseding any pending one.
    pub fn begin(&mut self, viewport: GeoBounds) -> u64 {
        self.last_seq += 1;
        if let Some(old) = self.pending.replace(PendingSearch {
            seq: self.last_seq,
            viewport,
        }) {
            log::debug!("Search {} superseded by {}", old.seq, self.last_seq);
        }
        self.status = SearchStatus::Searching;
        self.last_seq
    }

    pub fn pending(&self) -> Option<PendingSearch> {
        self.pending
    }

    pub fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    /// Renders `candidates` for search `seq`, ranked by distance from its
    /// viewport centre. Returns false (and changes nothing) for a stale seq.
    pub fn answer(&mut self, seq: u64, candidates: Vec<MapCandidate>) -> bool {
        let Some(pending) = self.pending.filter(|p| p.seq == seq) else {
            log::debug!("Discarding results of superseded search {}", seq);
            return false;
        };
        self.pending = None;

        self.results = rank_by_distance(candidates, pending.viewport.center());
        self.rendered_seq = Some(seq);
        self.status = match self.results.len() {
            0 => SearchStatus::Empty,
            n => SearchStatus::Found(n),
        };
        log::info!("Search {} rendered {} results", seq, self.results.len());
        true
    }

    /// Reports a failure for search `seq`. Rendered results are kept.
    pub fn fail(&mut self, seq: u64, error: &Error) -> bool {
        if self.pending.is_none_or(|p| p.seq != seq) {
            return false;
        }
        self.pending = None;
        self.status = SearchStatus::Failed(error.to_string());
        true
    }

    pub fn results(&self) -> &[MapCandidate] {
        &self.results
    }

    pub fn find(&self, id: &str) -> Option<&MapCandidate> {
        self.results.iter().find(|c| c.id == id)
    }

    pub fn rendered_seq(&self) -> Option<u64> {
        self.rendered_seq
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }
}

/// Orders candidates by planar distance between their bounds centre and
/// `center`, keeping catalog order between equal distances.
pub fn rank_by_distance(mut candidates: Vec<MapCandidate>, center: Coord<f64>) -> Vec<MapCandidate> {
    candidates.sort_by(|a, b| {
        a.bounds
            .center_distance(center)
            .total_cmp(&b.bounds.center_distance(center))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::http::MockFetcher;
    use crate::catalog::{CacheLookup, CacheUpdate, CatalogClient, ResultCache};
    use crate::overlay::test_candidate;
    use std::time::Duration;
    use web_time::Instant;

    fn at(id: &str, west: f64, south: f64) -> MapCandidate {
        let mut c = test_candidate(id, Some("u"));
        c.bounds = GeoBounds::new(west, south, west + 1.0, south + 1.0).unwrap();
        c
    }

    fn view(west: f64, south: f64, east: f64, north: f64) -> GeoBounds {
        GeoBounds::new(west, south, east, north).unwrap()
    }

    #[test]
    fn test_ranked_by_distance_from_viewport_centre() {
        let mut session = SearchSession::new();
        let seq = session.begin(view(138.0, 34.0, 142.0, 38.0));
        let candidates = vec![at("far", 130.0, 31.0), at("near", 139.5, 35.5), at("mid", 136.0, 35.0)];

        assert!(session.answer(seq, candidates));
        let ids: Vec<_> = session.results().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert_eq!(session.status(), &SearchStatus::Found(3));
    }

    #[test]
    fn test_no_results_status() {
        let mut session = SearchSession::new();
        let seq = session.begin(view(0.0, 0.0, 1.0, 1.0));
        assert!(session.answer(seq, Vec::new()));
        assert_eq!(session.status(), &SearchStatus::Empty);
        assert_eq!(session.status().message(), "No maps found in this area");
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_superseded_search_is_discarded() {
        let mut session = SearchSession::new();
        let first = session.begin(view(130.0, 31.0, 132.0, 34.0));
        let second = session.begin(view(138.0, 34.0, 142.0, 38.0));

        assert!(!session.answer(first, vec![at("kyushu", 130.5, 32.0)]));
        assert!(session.results().is_empty());
        assert!(session.is_searching());

        assert!(session.answer(second, vec![at("kanto", 139.0, 35.0)]));
        assert_eq!(session.rendered_seq(), Some(second));
        assert!(!session.answer(first, vec![at("kyushu", 130.5, 32.0)]));
        assert_eq!(session.results()[0].id, "kanto");
    }

    #[test]
    fn test_failure_keeps_rendered_results() {
        let mut session = SearchSession::new();
        let seq = session.begin(view(138.0, 34.0, 142.0, 38.0));
        session.answer(seq, vec![at("kanto", 139.0, 35.0)]);

        let retry = session.begin(view(138.0, 34.0, 142.0, 38.0));
        assert!(!session.fail(seq, &Error::Api));
        assert!(session.fail(retry, &Error::Api));
        assert_eq!(session.results().len(), 1);
        assert!(matches!(session.status(), SearchStatus::Failed(_)));
    }

    #[test]
    fn test_concurrent_searches_share_fetch_and_render_latest() {
        let client = CatalogClient::new("https://catalog.test/api");
        let body = r#"{"success": true, "result": {"results": [
            {"id": "kyushu", "title": "Kyushu", "resources": [{"format": "XYZ", "url": "https://t/k/{z}/{x}/{y}.png", "description": "BBOX: 130.0,31.0,131.5,33.5"}]},
            {"id": "kanto", "title": "Kanto", "resources": [{"format": "XYZ", "url": "https://t/t/{z}/{x}/{y}.png", "description": "BBOX: 139.0,35.0,140.5,36.5"}]}
        ]}}"#;
        let mock = MockFetcher::new().with_body(&client.search_url("geo", 1000), body);
        let mut cache = ResultCache::new(client, "geo", 1000, Duration::from_secs(600));
        let mut session = SearchSession::new();
        let now = Instant::now();

        let v1 = view(129.0, 30.0, 133.0, 34.0);
        let first = session.begin(v1);
        let CacheLookup::Fetch(job) = cache.lookup(&v1, now) else {
            panic!("expected a fetch");
        };

        let v2 = view(138.0, 34.0, 142.0, 38.0);
        let second = session.begin(v2);
        assert!(matches!(cache.lookup(&v2, now), CacheLookup::InFlight));

        let done = pollster::block_on(job.run(&mock));
        assert_eq!(cache.complete(done, now), CacheUpdate::Stored(2));

        let pending = session.pending().unwrap();
        assert_eq!(pending.seq, second);
        assert!(session.answer(pending.seq, cache.filter(&pending.viewport)));
        assert!(!session.answer(first, cache.filter(&v1)));

        let ids: Vec<_> = session.results().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["kanto"]);
        assert_eq!(mock.calls(), 1);
    }
}
