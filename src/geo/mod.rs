//! Map geometry: bounding boxes, tile sources and the overlay-carrying view.

mod bounds;
mod tiles;
mod view;

pub use bounds::GeoBounds;
pub use tiles::TemplateSource;
pub use view::{MapView, OverlayHandle};
