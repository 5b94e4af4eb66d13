//! Tile sources for XYZ URL templates.

use crate::overlay::OverlayOptions;
use walkers::sources::{Attribution, TileSource};
use walkers::TileId;

/// Attribution shown for catalog overlays.
const GSJ_ATTRIBUTION: &str = "Geological Survey of Japan, AIST";
const GSJ_URL: &str = "https://www.gsj.jp/";

/// A `{z}/{x}/{y}` template served up to `max_native_zoom`.
///
/// Past that level the map widget stretches the deepest native tile, so
/// sparse datasets stay visible when zoomed in.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSource {
    template: String,
    max_native_zoom: u8,
}

impl TemplateSource {
    pub fn new(template: impl Into<String>, max_native_zoom: u8) -> Self {
        Self {
            template: template.into(),
            max_native_zoom,
        }
    }

    pub fn for_overlay(template: &str, options: &OverlayOptions) -> Self {
        Self::new(template, options.max_native_zoom)
    }

    /// Expands the template for one tile. Placeholders may appear in any order.
    pub fn url_for(&self, zoom: u8, x: u32, y: u32) -> String {
        self.template
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

impl TileSource for TemplateSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.url_for(tile_id.zoom, tile_id.x, tile_id.y)
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: GSJ_ATTRIBUTION,
            url: GSJ_URL,
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        self.max_native_zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_expand_in_any_order() {
        let xyz = TemplateSource::new("https://t/a/{z}/{x}/{y}.png", 18);
        assert_eq!(xyz.url_for(10, 907, 403), "https://t/a/10/907/403.png");

        let seamless = TemplateSource::new("https://gbank/tiles/{z}/{y}/{x}.png", 13);
        assert_eq!(seamless.url_for(10, 907, 403), "https://gbank/tiles/10/403/907.png");
    }

    #[test]
    fn test_native_ceiling_comes_from_options() {
        let options = OverlayOptions {
            min_zoom: 2,
            max_zoom: 18,
            max_native_zoom: 13,
            opacity: 0.7,
            bounds: None,
        };
        let source = TemplateSource::for_overlay("https://t/{z}/{x}/{y}.png", &options);
        assert_eq!(source.max_zoom(), 13);
        assert_eq!(source.attribution().text, GSJ_ATTRIBUTION);
    }
}
