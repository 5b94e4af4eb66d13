//! Application configuration.
//!
//! Built-in defaults, optionally overridden by a JSON file named by the
//! `GEOMAP_CONFIG` environment variable (native) or by URL query
//! parameters (web). Nothing is ever written back.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable naming a JSON config file on native builds.
pub const CONFIG_ENV: &str = "GEOMAP_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog_base_url: String,
    pub dataset_page_base_url: String,
    pub search_keyword: String,
    pub search_rows: u32,
    pub cache_ttl_secs: u64,
    pub default_opacity: f32,
    pub default_min_zoom: u8,
    /// Native tile ceiling assumed when a descriptor names none.
    pub default_native_max_zoom: u8,
    /// Deepest zoom overlays are displayed at, upscaling if needed.
    pub display_max_zoom: u8,
    pub seamless_tile_url: String,
    pub seamless_native_max_zoom: u8,
    pub initial_center: LatLon,
    pub initial_span_deg: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: "https://data.gsj.jp/gkan/api/3/action".into(),
            dataset_page_base_url: "https://data.gsj.jp/gkan/dataset".into(),
            search_keyword: "地質図".into(),
            search_rows: 1000,
            cache_ttl_secs: 600, // 10 minutes
            default_opacity: 0.7,
            default_min_zoom: 2,
            default_native_max_zoom: 18,
            display_max_zoom: 18,
            seamless_tile_url: "https://gbank.gsj.jp/seamless/v2/api/1.3/tiles/{z}/{y}/{x}.png"
                .into(),
            seamless_native_max_zoom: 13,
            initial_center: LatLon {
                lat: 36.0,
                lon: 138.0,
            },
            initial_span_deg: 6.0,
        }
    }
}

impl AppConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Parses a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Applies `key=value` overrides from a URL query string.
    ///
    /// Recognised keys: `q`, `rows`, `catalog`, `lat`, `lon`, `span`.
    /// Unknown keys and unparsable values are ignored.
    pub fn apply_query(&mut self, query: &str) {
        let query = query.trim_start_matches('?');

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let mut kv = pair.splitn(2, '=');
            let key = kv.next().unwrap_or("");
            let raw = kv.next().unwrap_or("").replace('+', " ");
            let value = percent_decode_str(&raw).decode_utf8_lossy();

            match key {
                "q" if !value.trim().is_empty() => self.search_keyword = value.trim().to_string(),
                "rows" => {
                    if let Ok(rows) = value.parse::<u32>() {
                        self.search_rows = rows.max(1);
                    }
                }
                "catalog" if value.starts_with("http") => {
                    self.catalog_base_url = value.trim_end_matches('/').to_string()
                }
                "lat" => {
                    if let Some(lat) = value.parse::<f64>().ok().filter(|v| v.abs() <= 85.0) {
                        self.initial_center.lat = lat;
                    }
                }
                "lon" => {
                    if let Some(lon) = value.parse::<f64>().ok().filter(|v| v.abs() <= 180.0) {
                        self.initial_center.lon = lon;
                    }
                }
                "span" => {
                    if let Some(span) = value.parse::<f64>().ok().filter(|v| *v > 0.0) {
                        self.initial_span_deg = span;
                    }
                }
                _ => {}
            }
        }
    }

    /// Loads the configuration for this platform.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let mut config = Self::default();

        let search = web_sys::window().and_then(|w| w.location().search().ok());
        if let Some(search) = search {
            config.apply_query(&search);
        }

        log::info!("Configuration: {:?}", config);
        config
    }

    /// Loads the configuration for this platform.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring malformed config {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read config {}: {}", path, e);
                Self::default()
            }
        }
    }
}
