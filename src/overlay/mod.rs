//! Overlay lifecycle: the registry of shown layers, the derived selection
//! view, legend content and the seamless base layer.

mod legend;
mod reconcile;
mod registry;
mod seamless;

pub use legend::{strip_markdown, LegendImage, LegendLink, LegendView, LinkKind};
pub use reconcile::{
    reconcile, truncate_title, ActiveLayerRow, CategoryGroup, MapCategory, ResultLayout,
    ResultRow, SelectionView,
};
pub use registry::{
    MapWidget, OverlayEntry, OverlayOptions, OverlayRegistry, ResolveDone, ResolveJob,
    ResolveOutcome, SlotState, ToggleStep,
};
pub use seamless::SeamlessLayer;

#[cfg(test)]
pub(crate) use registry::test_candidate;
