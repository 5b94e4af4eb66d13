#![warn(clippy::all)]

//! Geological Map Viewer - A web-based viewer for published geological maps.
//!
//! Searches a CKAN catalog for maps covering the current viewport and
//! overlays the selected ones as tile layers, with legends and citations.

mod catalog;
mod config;
mod geo;
mod overlay;
mod state;
mod ui;

use catalog::{WorkerChannel, WorkerMessage};
use config::AppConfig;
use eframe::egui;
use state::{AppState, Job, UiAction};
use web_time::Instant;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Geological Map Viewer",
        native_options,
        Box::new(|cc| Ok(Box::new(GeoMapApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(GeoMapApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct GeoMapApp {
    /// Application state containing all sub-states
    state: AppState,

    /// Channel for background catalog fetches and layer resolution
    worker: WorkerChannel,

    /// The first search waits for the first frame so the viewport is known
    initial_search_pending: bool,
}

impl GeoMapApp {
    /// Creates a new GeoMapApp instance.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let config = AppConfig::load();
        log::info!(
            "Catalog {} (keyword {:?}, {} rows)",
            config.catalog_base_url,
            config.search_keyword,
            config.search_rows
        );

        let mut state = AppState::new(config);
        state.seamless.set_visible(true, &mut state.map);

        Self {
            state,
            worker: WorkerChannel::new(),
            initial_search_pending: true,
        }
    }

    fn dispatch(&self, ctx: &egui::Context, job: Option<Job>) {
        match job {
            Some(Job::Fetch(job)) => {
                log::debug!("Dispatching catalog fetch (generation {})", job.generation());
                self.worker.fetch(ctx.clone(), job);
            }
            Some(Job::Resolve(job)) => {
                log::debug!("Dispatching resolve for {} (ticket {})", job.id(), job.ticket());
                self.worker.resolve(ctx.clone(), job);
            }
            None => {}
        }
    }

    /// Applies finished background work.
    fn drain_worker(&mut self) {
        while let Some(message) = self.worker.try_recv() {
            match message {
                WorkerMessage::Fetched(done) => self.state.apply_fetch(done, Instant::now()),
                WorkerMessage::Resolved(done) => self.state.apply_resolve(done),
            }
        }
    }

    /// Applies the intents the panels collected this frame.
    fn apply_actions(&mut self, ctx: &egui::Context) {
        let actions = std::mem::take(&mut self.state.actions);
        if actions.is_empty() {
            return;
        }

        for action in actions {
            match action {
                UiAction::Search => {
                    let job = self.state.start_search(Instant::now());
                    self.dispatch(ctx, job);
                }
                UiAction::RefreshCatalog => {
                    self.state.cache.invalidate();
                    let job = self.state.start_search(Instant::now());
                    self.dispatch(ctx, job);
                }
                UiAction::Toggle(id) => {
                    let job = self.state.toggle(&id);
                    self.dispatch(ctx, job);
                }
                UiAction::Remove(id) => self.state.remove(&id),
                UiAction::SetOpacity(id, opacity) => {
                    self.state
                        .overlays
                        .set_opacity(&id, opacity, &mut self.state.map);
                }
                UiAction::ZoomTo(id) => {
                    self.state.overlays.zoom_to(&id, &mut self.state.map);
                }
                UiAction::ShowLegend(id) => self.state.show_legend(&id),
                UiAction::CloseLegend => {
                    self.state.legend = None;
                    self.state.layout.legend_open = false;
                }
                UiAction::SetSeamlessVisible(visible) => {
                    self.state.seamless.set_visible(visible, &mut self.state.map);
                }
                UiAction::SetSeamlessOpacity(opacity) => {
                    self.state.seamless.set_opacity(opacity, &mut self.state.map);
                }
                UiAction::CopyText(text) => ctx.copy_text(text),
                UiAction::DismissNotice => self.state.notice = None,
            }
        }

        self.state.reconcile();
    }
}

impl eframe::App for GeoMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_worker();

        self.state
            .layout
            .update_for_width(ctx.content_rect().width());

        // Render UI panels in the correct order for egui layout
        // Side and top/bottom panels must be rendered before CentralPanel
        ui::render_top_bar(ctx, &mut self.state);
        if self.state.layout.is_mobile {
            ui::render_mobile_sheet(ctx, &mut self.state);
        } else {
            ui::render_search_panel(ctx, &mut self.state);
            ui::render_layers_panel(ctx, &mut self.state);
        }
        ui::render_canvas(ctx, &mut self.state);

        if self.initial_search_pending {
            self.initial_search_pending = false;
            self.state.actions.push(UiAction::Search);
        }

        self.apply_actions(ctx);
    }
}
