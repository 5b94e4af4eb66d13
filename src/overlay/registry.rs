//! The single source of truth for which datasets are shown on the map.
//!
//! Each dataset id is in one of three slots: idle, resolving (a ticket is
//! outstanding) or resolved (a live overlay exists). Selection is a
//! toggle; a toggle that arrives while the same id is still resolving is
//! ignored, so no id ever gets two overlays.

use crate::catalog::http::HttpFetch;
use crate::catalog::{
    Error, MapCandidate, ResolvedLayerData, Result, TileDescriptorResolver,
};
use crate::geo::GeoBounds;
use std::collections::HashMap;
use std::fmt::Debug;

/// Options passed to the map widget when an overlay is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    pub min_zoom: u8,
    /// Deepest zoom the map will display, upscaling past `max_native_zoom`.
    pub max_zoom: u8,
    pub max_native_zoom: u8,
    pub opacity: f32,
    pub bounds: Option<GeoBounds>,
}

/// What the registry needs from the map.
pub trait MapWidget {
    type Handle: Clone + PartialEq + Debug;

    fn add_overlay(&mut self, url_template: &str, options: OverlayOptions) -> Self::Handle;
    fn remove_overlay(&mut self, handle: &Self::Handle);
    fn set_overlay_opacity(&mut self, handle: &Self::Handle, opacity: f32);
    fn overlay_opacity(&self, handle: &Self::Handle) -> Option<f32>;
    fn viewport_bounds(&self) -> GeoBounds;
    fn fit_to_bounds(&mut self, bounds: &GeoBounds);
}

/// A dataset currently shown on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEntry<H> {
    pub id: String,
    pub handle: H,
    pub data: ResolvedLayerData,
}

/// Per-id selection state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotState<'a, H> {
    Idle,
    Resolving,
    Resolved(&'a OverlayEntry<H>),
}

/// Result of [`OverlayRegistry::toggle`].
#[derive(Debug)]
pub enum ToggleStep {
    /// The overlay was shown and is now removed.
    Removed,
    /// Run this job and pass its completion to [`OverlayRegistry::complete`].
    Resolve(ResolveJob),
    /// A resolution for this id is already running; nothing was done.
    InFlight,
}

/// Network half of a selection: resolves one candidate.
#[derive(Debug, Clone)]
pub struct ResolveJob {
    ticket: u64,
    candidate: MapCandidate,
    resolver: TileDescriptorResolver,
}

impl ResolveJob {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn id(&self) -> &str {
        &self.candidate.id
    }

    pub async fn run<F>(self, fetcher: &F) -> ResolveDone
    where
        F: HttpFetch + ?Sized,
    {
        let result = self.resolver.resolve(fetcher, &self.candidate).await;
        ResolveDone {
            ticket: self.ticket,
            id: self.candidate.id,
            result,
        }
    }

    /// Completion for a job that could not be started.
    pub fn fail(self, error: Error) -> ResolveDone {
        ResolveDone {
            ticket: self.ticket,
            id: self.candidate.id,
            result: Err(error),
        }
    }
}

/// Completion of a [`ResolveJob`].
#[derive(Debug)]
pub struct ResolveDone {
    pub ticket: u64,
    pub id: String,
    pub result: Result<ResolvedLayerData>,
}

/// Outcome of a successful [`OverlayRegistry::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Added,
    /// The ticket was no longer outstanding; nothing changed.
    Stale,
}

/// Insertion-ordered store of live overlays keyed by dataset id.
#[derive(Debug)]
pub struct OverlayRegistry<H> {
    entries: Vec<OverlayEntry<H>>,
    resolving: HashMap<String, u64>,
    next_ticket: u64,
    default_opacity: f32,
    display_max_zoom: u8,
}

impl<H: Clone + PartialEq + Debug> OverlayRegistry<H> {
    pub fn new(default_opacity: f32, display_max_zoom: u8) -> Self {
        Self {
            entries: Vec::new(),
            resolving: HashMap::new(),
            next_ticket: 0,
            default_opacity: default_opacity.clamp(0.0, 1.0),
            display_max_zoom,
        }
    }

    pub fn state(&self, id: &str) -> SlotState<'_, H> {
        if let Some(entry) = self.get(id) {
            SlotState::Resolved(entry)
        } else if self.resolving.contains_key(id) {
            SlotState::Resolving
        } else {
            SlotState::Idle
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&OverlayEntry<H>> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = &OverlayEntry<H>> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes the overlay if shown, otherwise starts resolving it.
    pub fn toggle<W>(
        &mut self,
        candidate: &MapCandidate,
        resolver: TileDescriptorResolver,
        widget: &mut W,
    ) -> ToggleStep
    where
        W: MapWidget<Handle = H>,
    {
        if self.remove(&candidate.id, widget) {
            return ToggleStep::Removed;
        }

        if self.resolving.contains_key(&candidate.id) {
            log::debug!("Toggle for {} ignored while resolving", candidate.id);
            return ToggleStep::InFlight;
        }

        self.next_ticket += 1;
        self.resolving
            .insert(candidate.id.clone(), self.next_ticket);
        log::info!("Resolving {} (ticket {})", candidate.id, self.next_ticket);

        ToggleStep::Resolve(ResolveJob {
            ticket: self.next_ticket,
            candidate: candidate.clone(),
            resolver,
        })
    }

    /// Applies a finished resolution. A failure leaves no entry behind.
    pub fn complete<W>(&mut self, done: ResolveDone, widget: &mut W) -> Result<ResolveOutcome>
    where
        W: MapWidget<Handle = H>,
    {
        if self.resolving.get(&done.id) != Some(&done.ticket) {
            log::debug!("Dropping stale resolution for {}", done.id);
            return Ok(ResolveOutcome::Stale);
        }
        self.resolving.remove(&done.id);

        let data = done.result?;
        self.add(data, widget);
        Ok(ResolveOutcome::Added)
    }

    /// Creates the live overlay and stores the entry. Never replaces an
    /// existing entry; returns whether one was added.
    pub fn add<W>(&mut self, data: ResolvedLayerData, widget: &mut W) -> bool
    where
        W: MapWidget<Handle = H>,
    {
        let id = data.id().to_string();
        if self.contains(&id) {
            return false;
        }

        let options = OverlayOptions {
            min_zoom: data.min_zoom,
            max_zoom: self.display_max_zoom.max(data.max_zoom),
            max_native_zoom: data.max_zoom,
            opacity: self.default_opacity,
            bounds: Some(data.bounds),
        };
        let handle = widget.add_overlay(&data.tile_url, options);
        log::info!("Added overlay {} ({})", id, data.tile_url);

        self.entries.push(OverlayEntry { id, handle, data });
        true
    }

    /// Removes the overlay for `id`; returns whether one existed.
    pub fn remove<W>(&mut self, id: &str, widget: &mut W) -> bool
    where
        W: MapWidget<Handle = H>,
    {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.entries.remove(index);
        widget.remove_overlay(&entry.handle);
        log::info!("Removed overlay {}", id);
        true
    }

    /// Sets opacity, clamped to `[0, 1]`. Returns whether `id` was shown.
    pub fn set_opacity<W>(&self, id: &str, opacity: f32, widget: &mut W) -> bool
    where
        W: MapWidget<Handle = H>,
    {
        match self.get(id) {
            Some(entry) => {
                let value = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
                widget.set_overlay_opacity(&entry.handle, value);
                true
            }
            None => false,
        }
    }

    pub fn opacity<W>(&self, id: &str, widget: &W) -> Option<f32>
    where
        W: MapWidget<Handle = H>,
    {
        self.get(id).and_then(|e| widget.overlay_opacity(&e.handle))
    }

    /// Fits the map to a shown overlay's bounds.
    pub fn zoom_to<W>(&self, id: &str, widget: &mut W) -> bool
    where
        W: MapWidget<Handle = H>,
    {
        match self.get(id) {
            Some(entry) => {
                widget.fit_to_bounds(&entry.data.bounds);
                true
            }
            None => false,
        }
    }
}

/// Recording map widget for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockWidget {
    pub next: u64,
    pub live: Vec<(u64, String, OverlayOptions)>,
    pub fitted: Vec<GeoBounds>,
}

#[cfg(test)]
impl MapWidget for MockWidget {
    type Handle = u64;

    fn add_overlay(&mut self, url_template: &str, options: OverlayOptions) -> u64 {
        self.next += 1;
        self.live.push((self.next, url_template.to_string(), options));
        self.next
    }

    fn remove_overlay(&mut self, handle: &u64) {
        self.live.retain(|(h, _, _)| h != handle);
    }

    fn set_overlay_opacity(&mut self, handle: &u64, opacity: f32) {
        if let Some(entry) = self.live.iter_mut().find(|(h, _, _)| h == handle) {
            entry.2.opacity = opacity;
        }
    }

    fn overlay_opacity(&self, handle: &u64) -> Option<f32> {
        self.live
            .iter()
            .find(|(h, _, _)| h == handle)
            .map(|(_, _, o)| o.opacity)
    }

    fn viewport_bounds(&self) -> GeoBounds {
        GeoBounds {
            west: 122.0,
            south: 24.0,
            east: 154.0,
            north: 46.0,
        }
    }

    fn fit_to_bounds(&mut self, bounds: &GeoBounds) {
        self.fitted.push(*bounds);
    }
}

#[cfg(test)]
pub(crate) fn test_candidate(id: &str, tile_url: Option<&str>) -> MapCandidate {
    MapCandidate {
        id: id.into(),
        name: format!("slug-{}", id),
        title: format!("Map {}", id),
        notes: None,
        author: None,
        tile_url: tile_url.map(Into::into),
        tile_descriptor_url: None,
        linked_data_url: None,
        bounds: GeoBounds {
            west: 139.0,
            south: 35.0,
            east: 140.0,
            north: 36.0,
        },
        image_url: None,
        pdf_url: None,
    }
}
