//! Application state management.
//!
//! Everything the UI reads lives here and is mutated only on the UI
//! thread. Network work happens in jobs whose completions are applied
//! through [`AppState`]'s `apply_*` methods.

mod layout;
pub mod search;

pub use layout::{LayoutState, MobileTab, MOBILE_BREAKPOINT};
pub use search::{SearchSession, SearchStatus};

use crate::catalog::{
    CacheLookup, CacheUpdate, CatalogClient, Error, FetchDone, FetchJob, ResultCache,
    TileDescriptorResolver,
};
use crate::config::AppConfig;
use crate::geo::{MapView, OverlayHandle};
use crate::overlay::{
    reconcile, LegendView, MapWidget, OverlayRegistry, ResolveDone, ResolveJob, ResolveOutcome,
    SeamlessLayer, SelectionView, ToggleStep,
};
use web_time::Instant;

/// User intents collected by the panels and applied after rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Search,
    RefreshCatalog,
    Toggle(String),
    Remove(String),
    SetOpacity(String, f32),
    ZoomTo(String),
    ShowLegend(String),
    CloseLegend,
    SetSeamlessVisible(bool),
    SetSeamlessOpacity(f32),
    CopyText(String),
    DismissNotice,
}

/// Network work that the app must hand to the worker channel.
#[derive(Debug)]
pub enum Job {
    Fetch(FetchJob),
    Resolve(ResolveJob),
}

/// Root application state.
pub struct AppState {
    pub config: AppConfig,
    pub map: MapView,
    pub search: SearchSession,
    pub cache: ResultCache,
    pub resolver: TileDescriptorResolver,
    pub overlays: OverlayRegistry<OverlayHandle>,
    pub seamless: SeamlessLayer<OverlayHandle>,
    /// Derived from `overlays` and the rendered results; see [`AppState::reconcile`].
    pub selection: SelectionView,
    pub legend: Option<LegendView>,
    pub layout: LayoutState,
    /// Result row under the pointer, for the bounds preview.
    pub hovered_result: Option<String>,
    /// Layer-level message shown in the status line until dismissed.
    pub notice: Option<String>,
    pub actions: Vec<UiAction>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = CatalogClient::new(config.catalog_base_url.clone());
        let cache = ResultCache::new(
            client,
            config.search_keyword.clone(),
            config.search_rows,
            config.cache_ttl(),
        );
        let resolver =
            TileDescriptorResolver::new(config.default_min_zoom, config.default_native_max_zoom);
        let overlays = OverlayRegistry::new(config.default_opacity, config.display_max_zoom);
        let seamless = SeamlessLayer::new(
            config.seamless_tile_url.clone(),
            config.seamless_native_max_zoom,
            config.display_max_zoom,
            config.default_opacity,
        );
        let map = MapView::new(
            config.initial_center.lat,
            config.initial_center.lon,
            config.initial_span_deg,
        );

        Self {
            config,
            map,
            search: SearchSession::new(),
            cache,
            resolver,
            overlays,
            seamless,
            selection: SelectionView::default(),
            legend: None,
            layout: LayoutState::default(),
            hovered_result: None,
            notice: None,
            actions: Vec::new(),
        }
    }

    /// Text for the status line.
    pub fn status_line(&self) -> String {
        match &self.notice {
            Some(notice) => notice.clone(),
            None => self.search.status().message(),
        }
    }

    /// Recomputes the shared selection view and drops a legend whose
    /// layer is gone.
    pub fn reconcile(&mut self) {
        self.selection = reconcile(&self.overlays, self.search.results());
        let legend_gone = self
            .legend
            .as_ref()
            .is_some_and(|l| !self.overlays.contains(&l.layer_id));
        if legend_gone {
            self.legend = None;
        }
    }

    /// Starts a search over the current viewport.
    pub fn start_search(&mut self, now: Instant) -> Option<Job> {
        let viewport = self.map.viewport_bounds();
        let seq = self.search.begin(viewport);
        self.notice = None;

        let job = match self.cache.lookup(&viewport, now) {
            CacheLookup::Hit(candidates) => {
                self.search.answer(seq, candidates);
                None
            }
            CacheLookup::Fetch(job) => Some(Job::Fetch(job)),
            CacheLookup::InFlight => None,
        };
        self.reconcile();
        job
    }

    /// Applies a finished catalog fetch and answers the newest search.
    pub fn apply_fetch(&mut self, done: FetchDone, now: Instant) {
        let update = self.cache.complete(done, now);
        let Some(pending) = self.search.pending() else {
            return;
        };

        match update {
            CacheUpdate::Stored(_) => {
                let candidates = self.cache.filter(&pending.viewport);
                self.search.answer(pending.seq, candidates);
            }
            CacheUpdate::Failed(e) => {
                self.search.fail(pending.seq, &e);
            }
            CacheUpdate::Ignored => {}
        }
        self.reconcile();
    }

    /// Toggles a rendered result on or off the map.
    pub fn toggle(&mut self, id: &str) -> Option<Job> {
        let candidate = self.search.find(id)?.clone();
        let step = self.overlays.toggle(&candidate, self.resolver, &mut self.map);
        self.reconcile();

        match step {
            ToggleStep::Resolve(job) => Some(Job::Resolve(job)),
            ToggleStep::Removed | ToggleStep::InFlight => None,
        }
    }

    /// Applies a finished resolution; failures become a notice.
    pub fn apply_resolve(&mut self, done: ResolveDone) {
        match self.overlays.complete(done, &mut self.map) {
            Ok(ResolveOutcome::Added) | Ok(ResolveOutcome::Stale) => {}
            Err(e) => self.notice = Some(layer_error_message(&e)),
        }
        self.reconcile();
    }

    pub fn remove(&mut self, id: &str) {
        self.overlays.remove(id, &mut self.map);
        self.reconcile();
    }

    pub fn show_legend(&mut self, id: &str) {
        self.legend = self
            .overlays
            .get(id)
            .map(|entry| LegendView::build(&entry.data, &self.config.dataset_page_base_url));
        if self.legend.is_some() {
            self.layout.legend_open = true;
            if self.layout.is_mobile {
                self.layout.mobile_tab = MobileTab::Legend;
                self.layout.sheet_open = true;
            }
        }
    }
}

/// Status-line text for a failed selection.
pub fn layer_error_message(error: &Error) -> String {
    format!("Could not add this layer: {}", error)
}
