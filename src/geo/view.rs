//! The map view the overlay registry drives.
//!
//! Holds the slippy-map memory, the base map and the stack of live XYZ
//! overlays. Tile fetchers are created on first draw, so the view itself
//! can be built and driven without an egui context.

use super::{GeoBounds, TemplateSource};
use crate::overlay::{MapWidget, OverlayOptions};
use eframe::egui::{self, Vec2};
use std::f64::consts::PI;
use walkers::sources::OpenStreetMap;
use walkers::{lat_lon, HttpTiles, Map, MapMemory, Plugin, Position};

/// Pixel edge of one Web Mercator tile.
const TILE_SIZE: f64 = 256.0;
/// Map size assumed until the first frame reports the real one.
const FALLBACK_SIZE: Vec2 = Vec2::new(1024.0, 768.0);
/// Web Mercator latitude limit.
const MAX_LAT: f64 = 85.051_128_78;
const MIN_FIT_ZOOM: f64 = 2.0;
const MAX_FIT_ZOOM: f64 = 18.0;
/// Zoom levels backed off after fitting, leaving a margin around the box.
const FIT_PADDING: f64 = 0.1;

/// Identifies a live overlay on a [`MapView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(u64);

/// A raster overlay currently on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveOverlay {
    pub handle: OverlayHandle,
    pub url_template: String,
    pub options: OverlayOptions,
}

impl LiveOverlay {
    /// Whether the layer is drawn at this zoom; upscaled levels count.
    pub fn visible_at(&self, zoom: f64) -> bool {
        zoom >= self.options.min_zoom as f64 - 0.5 && zoom <= self.options.max_zoom as f64 + 0.5
    }

    /// Whether tiles at this zoom are stretched from a coarser level.
    pub fn upscaled_at(&self, zoom: f64) -> bool {
        zoom > self.options.max_native_zoom as f64 + 0.5
    }
}

struct OverlaySlot {
    overlay: LiveOverlay,
    tiles: Option<HttpTiles>,
}

/// Viewport state plus the stack of live overlays, bottom first.
pub struct MapView {
    memory: MapMemory,
    home: Position,
    home_zoom: f64,
    screen_size: Vec2,
    /// Bounds the last drawn frame covered.
    rendered: Option<GeoBounds>,
    base: Option<HttpTiles>,
    slots: Vec<OverlaySlot>,
    next_handle: u64,
}

impl MapView {
    /// A view centred on `center_lat`/`center_lon` showing about
    /// `span_deg` degrees either side of it.
    pub fn new(center_lat: f64, center_lon: f64, span_deg: f64) -> Self {
        let home = lat_lon(center_lat, center_lon);
        let home_zoom = GeoBounds::new(
            center_lon - span_deg,
            center_lat - span_deg,
            center_lon + span_deg,
            center_lat + span_deg,
        )
        .map(|b| fit_zoom(&b, FALLBACK_SIZE))
        .unwrap_or(MIN_FIT_ZOOM);

        let mut view = Self {
            memory: MapMemory::default(),
            home,
            home_zoom,
            screen_size: FALLBACK_SIZE,
            rendered: None,
            base: None,
            slots: Vec::new(),
            next_handle: 0,
        };
        view.set_zoom(home_zoom);
        view
    }

    pub fn overlays(&self) -> impl Iterator<Item = &LiveOverlay> {
        self.slots.iter().map(|s| &s.overlay)
    }

    pub fn overlay_count(&self) -> usize {
        self.slots.len()
    }

    pub fn overlay(&self, handle: &OverlayHandle) -> Option<&LiveOverlay> {
        self.overlays().find(|o| o.handle == *handle)
    }

    pub fn zoom(&self) -> f64 {
        self.memory.zoom()
    }

    /// Current centre; the home position until the user pans.
    pub fn center(&self) -> Position {
        self.memory.detached().unwrap_or(self.home)
    }

    /// Returns to the start-up centre and zoom.
    pub fn reset(&mut self) {
        self.memory.center_at(self.home);
        self.set_zoom(self.home_zoom);
        self.rendered = None;
    }

    /// Stores the bounds a drawn frame covered.
    pub fn record_viewport(&mut self, bounds: GeoBounds) {
        self.rendered = Some(bounds);
    }

    /// Draws the base map with every overlay visible at the current zoom,
    /// then `plugin` on top.
    pub fn show(&mut self, ui: &mut egui::Ui, plugin: impl Plugin) -> egui::Response {
        let ctx = ui.ctx().clone();
        let zoom = self.memory.zoom();

        let base = self
            .base
            .get_or_insert_with(|| HttpTiles::new(OpenStreetMap, ctx.clone()));
        let mut map = Map::new(Some(base), &mut self.memory, self.home);

        for slot in self.slots.iter_mut() {
            if !slot.overlay.visible_at(zoom) {
                continue;
            }
            let opacity = slot.overlay.options.opacity;
            let overlay = &slot.overlay;
            let tiles = slot.tiles.get_or_insert_with(|| {
                log::debug!("Creating tile fetcher for {}", overlay.url_template);
                let source = TemplateSource::for_overlay(&overlay.url_template, &overlay.options);
                HttpTiles::new(source, ctx.clone())
            });
            map = map.with_layer(tiles, opacity);
        }

        let response = ui.add(map.with_plugin(plugin));
        self.screen_size = response.rect.size();
        response
    }

    fn set_zoom(&mut self, zoom: f64) {
        if let Err(e) = self.memory.set_zoom(zoom) {
            log::warn!("Rejected zoom level {:.2}: {:?}", zoom, e);
        }
    }

    /// Viewport derived from the map memory and the last known map size.
    fn computed_viewport(&self) -> GeoBounds {
        let center = self.center();
        let world = TILE_SIZE * 2f64.powf(self.memory.zoom());
        let cx = mercator_x(center.x());
        let cy = mercator_y(center.y());
        let half_w = self.screen_size.x as f64 / 2.0 / world;
        let half_h = self.screen_size.y as f64 / 2.0 / world;

        GeoBounds {
            west: lon_at((cx - half_w).max(0.0)),
            south: lat_at((cy + half_h).min(1.0)),
            east: lon_at((cx + half_w).min(1.0)),
            north: lat_at((cy - half_h).max(0.0)),
        }
    }
}

impl MapWidget for MapView {
    type Handle = OverlayHandle;

    fn add_overlay(&mut self, url_template: &str, options: OverlayOptions) -> OverlayHandle {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.slots.push(OverlaySlot {
            overlay: LiveOverlay {
                handle,
                url_template: url_template.to_string(),
                options,
            },
            tiles: None,
        });
        handle
    }

    fn remove_overlay(&mut self, handle: &OverlayHandle) {
        self.slots.retain(|s| s.overlay.handle != *handle);
    }

    fn set_overlay_opacity(&mut self, handle: &OverlayHandle, opacity: f32) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.overlay.handle == *handle) {
            slot.overlay.options.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn overlay_opacity(&self, handle: &OverlayHandle) -> Option<f32> {
        self.overlay(handle).map(|o| o.options.opacity)
    }

    fn viewport_bounds(&self) -> GeoBounds {
        self.rendered.unwrap_or_else(|| self.computed_viewport())
    }

    fn fit_to_bounds(&mut self, bounds: &GeoBounds) {
        let center_y = (mercator_y(bounds.north) + mercator_y(bounds.south)) / 2.0;
        self.memory
            .center_at(lat_lon(lat_at(center_y), bounds.center().x));
        self.set_zoom(fit_zoom(bounds, self.screen_size));
        self.rendered = None;
    }
}

/// Deepest zoom at which `bounds` fits inside `size` pixels.
fn fit_zoom(bounds: &GeoBounds, size: Vec2) -> f64 {
    let dx = mercator_x(bounds.east) - mercator_x(bounds.west);
    let dy = mercator_y(bounds.south) - mercator_y(bounds.north);
    let zoom_x = (size.x as f64 / (dx * TILE_SIZE)).log2();
    let zoom_y = (size.y as f64 / (dy * TILE_SIZE)).log2();
    // A degenerate box gives +inf here, which the clamp turns into the ceiling.
    (zoom_x.min(zoom_y) - FIT_PADDING).clamp(MIN_FIT_ZOOM, MAX_FIT_ZOOM)
}

/// Longitude to the 0..1 Web Mercator x.
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Latitude to the 0..1 Web Mercator y, north at 0.
fn mercator_y(lat: f64) -> f64 {
    let phi = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0
}

fn lon_at(x: f64) -> f64 {
    x * 360.0 - 180.0
}

fn lat_at(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}
