//! UI modules for the geological map viewer.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, search shortcuts and status
//! - Left panel: Search results (desktop)
//! - Right panel: Base layer, active layers and legend (desktop)
//! - Bottom sheet: The same sections behind tabs (mobile)
//! - Central canvas: The map

mod canvas;
mod colors;
mod layers_panel;
mod mobile;
mod search_panel;
mod top_bar;

pub use canvas::render_canvas;
pub use layers_panel::render_layers_panel;
pub use mobile::render_mobile_sheet;
pub use search_panel::render_search_panel;
pub use top_bar::render_top_bar;
