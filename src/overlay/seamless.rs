//! Nationwide seamless geology base layer.
//!
//! Not a catalog candidate: it is toggled and faded on its own and never
//! appears in the overlay registry.

use super::registry::{MapWidget, OverlayOptions};

#[derive(Debug, Clone)]
pub struct SeamlessLayer<H> {
    url_template: String,
    native_max_zoom: u8,
    display_max_zoom: u8,
    opacity: f32,
    handle: Option<H>,
}

impl<H: Clone + PartialEq + std::fmt::Debug> SeamlessLayer<H> {
    pub fn new(
        url_template: impl Into<String>,
        native_max_zoom: u8,
        display_max_zoom: u8,
        opacity: f32,
    ) -> Self {
        Self {
            url_template: url_template.into(),
            native_max_zoom,
            display_max_zoom,
            opacity: opacity.clamp(0.0, 1.0),
            handle: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.handle.is_some()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_visible<W>(&mut self, visible: bool, widget: &mut W)
    where
        W: MapWidget<Handle = H>,
    {
        match (visible, self.handle.take()) {
            (true, None) => {
                let options = OverlayOptions {
                    min_zoom: 0,
                    max_zoom: self.display_max_zoom,
                    max_native_zoom: self.native_max_zoom,
                    opacity: self.opacity,
                    bounds: None,
                };
                self.handle = Some(widget.add_overlay(&self.url_template, options));
                log::info!("Seamless layer shown");
            }
            (false, Some(handle)) => {
                widget.remove_overlay(&handle);
                log::info!("Seamless layer hidden");
            }
            (_, handle) => self.handle = handle,
        }
    }

    /// Remembers the opacity and applies it if the layer is shown.
    pub fn set_opacity<W>(&mut self, opacity: f32, widget: &mut W)
    where
        W: MapWidget<Handle = H>,
    {
        self.opacity = opacity.clamp(0.0, 1.0);
        if let Some(handle) = &self.handle {
            widget.set_overlay_opacity(handle, self.opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::registry::MockWidget;

    #[test]
    fn test_toggle_and_fade() {
        let mut widget = MockWidget::default();
        let mut layer = SeamlessLayer::new("https://s/{z}/{y}/{x}.png", 13, 18, 0.7);

        layer.set_opacity(0.4, &mut widget);
        layer.set_visible(true, &mut widget);
        layer.set_visible(true, &mut widget);
        assert_eq!(widget.live.len(), 1);
        let options = widget.live[0].2;
        assert_eq!((options.max_native_zoom, options.max_zoom), (13, 18));
        assert!((options.opacity - 0.4).abs() < f32::EPSILON);

        layer.set_opacity(2.0, &mut widget);
        assert_eq!(widget.live[0].2.opacity, 1.0);

        layer.set_visible(false, &mut widget);
        assert!(!layer.is_visible());
        assert!(widget.live.is_empty());
    }
}
