//! Best-effort enrichment of a candidate before it becomes an overlay.
//!
//! The tile descriptor and linked-data documents are optional extras: a
//! failed fetch only means fewer fields get filled. Each step produces an
//! [`Enrichment`] and steps are merged with "fill only what is unset", so
//! an earlier source always wins. The only fatal outcome is ending up with
//! no tile template at all.

use super::extract::MapCandidate;
use super::http::{fetch_json, HttpFetch};
use super::types::{LinkedDataRecord, TileDescriptor};
use super::{Error, Result};
use crate::geo::GeoBounds;

/// A candidate plus everything learned about it while resolving.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayerData {
    pub candidate: MapCandidate,
    pub tile_url: String,
    pub bounds: GeoBounds,
    pub min_zoom: u8,
    /// Native tile ceiling; the map may upscale beyond it.
    pub max_zoom: u8,
    pub legend_url: Option<String>,
    pub display_title: String,
    pub description: Option<String>,
    pub title_j: Option<String>,
    pub authors_j: Option<String>,
    pub geotiff_url: Option<String>,
}

impl ResolvedLayerData {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

/// Fields an enrichment step may supply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub tile_url: Option<String>,
    pub bounds: Option<GeoBounds>,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub legend_url: Option<String>,
    pub display_title: Option<String>,
    pub description: Option<String>,
    pub title_j: Option<String>,
    pub authors_j: Option<String>,
    pub geotiff_url: Option<String>,
}

impl Enrichment {
    /// Fills every field still unset in `self` from `other`.
    pub fn or(self, other: Enrichment) -> Enrichment {
        Enrichment {
            tile_url: self.tile_url.or(other.tile_url),
            bounds: self.bounds.or(other.bounds),
            min_zoom: self.min_zoom.or(other.min_zoom),
            max_zoom: self.max_zoom.or(other.max_zoom),
            legend_url: self.legend_url.or(other.legend_url),
            display_title: self.display_title.or(other.display_title),
            description: self.description.or(other.description),
            title_j: self.title_j.or(other.title_j),
            authors_j: self.authors_j.or(other.authors_j),
            geotiff_url: self.geotiff_url.or(other.geotiff_url),
        }
    }

    fn from_descriptor(descriptor: TileDescriptor) -> Self {
        let zoom = |z: Option<f64>| z.filter(|z| z.is_finite()).map(|z| z.clamp(0.0, 30.0) as u8);
        Enrichment {
            tile_url: descriptor
                .tiles
                .as_deref()
                .and_then(select_tile_template)
                .map(str::to_string),
            bounds: descriptor.bounds.as_deref().and_then(GeoBounds::from_slice),
            min_zoom: zoom(descriptor.minzoom),
            max_zoom: zoom(descriptor.maxzoom),
            legend_url: non_empty(descriptor.legend),
            display_title: non_empty(descriptor.name),
            description: non_empty(descriptor.description),
            title_j: non_empty(descriptor.title_j),
            authors_j: non_empty(descriptor.authors_j),
            geotiff_url: None,
        }
    }

    fn from_linked_data(record: LinkedDataRecord) -> Self {
        Enrichment {
            title_j: non_empty(record.title_j),
            authors_j: non_empty(record.authors_j),
            geotiff_url: record
                .download_data
                .into_iter()
                .find(|d| d.is_geotiff())
                .and_then(|d| non_empty(d.id)),
            ..Default::default()
        }
    }

    fn from_candidate(candidate: &MapCandidate) -> Self {
        Enrichment {
            tile_url: candidate.tile_url.clone(),
            bounds: Some(candidate.bounds),
            display_title: Some(candidate.title.clone()),
            ..Default::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Picks a tile template: webp first, then png, then whatever is listed first.
pub fn select_tile_template(tiles: &[String]) -> Option<&str> {
    tiles
        .iter()
        .find(|t| t.contains(".webp"))
        .or_else(|| tiles.iter().find(|t| t.contains(".png")))
        .or_else(|| tiles.first())
        .map(String::as_str)
}

/// Resolves candidates into overlay-ready data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDescriptorResolver {
    pub default_min_zoom: u8,
    pub default_max_zoom: u8,
}

impl Default for TileDescriptorResolver {
    fn default() -> Self {
        Self {
            default_min_zoom: 2,
            default_max_zoom: 18,
        }
    }
}

impl TileDescriptorResolver {
    pub fn new(default_min_zoom: u8, default_max_zoom: u8) -> Self {
        Self {
            default_min_zoom,
            default_max_zoom,
        }
    }

    /// Enriches a candidate. Fails only with [`Error::MissingTileSource`].
    pub async fn resolve<F>(&self, fetcher: &F, candidate: &MapCandidate) -> Result<ResolvedLayerData>
    where
        F: HttpFetch + ?Sized,
    {
        let descriptor = match &candidate.tile_descriptor_url {
            Some(url) => best_effort::<TileDescriptor, F>(fetcher, url, "tile descriptor")
                .await
                .map(Enrichment::from_descriptor)
                .unwrap_or_default(),
            None => Enrichment::default(),
        };

        let linked = match &candidate.linked_data_url {
            Some(url) => best_effort::<LinkedDataRecord, F>(fetcher, url, "linked data")
                .await
                .map(Enrichment::from_linked_data)
                .unwrap_or_default(),
            None => Enrichment::default(),
        };

        self.finish(candidate, descriptor.or(linked))
    }

    /// Turns merged enrichment into the final record, falling back to the
    /// candidate's own fields and the default zoom range.
    pub fn finish(&self, candidate: &MapCandidate, enrichment: Enrichment) -> Result<ResolvedLayerData> {
        let merged = enrichment.or(Enrichment::from_candidate(candidate));
        let Some(tile_url) = merged.tile_url else {
            return Err(Error::MissingTileSource {
                id: candidate.id.clone(),
            });
        };

        let min_zoom = merged.min_zoom.unwrap_or(self.default_min_zoom);
        let max_zoom = merged.max_zoom.unwrap_or(self.default_max_zoom).max(min_zoom);

        Ok(ResolvedLayerData {
            candidate: candidate.clone(),
            tile_url,
            bounds: merged.bounds.unwrap_or(candidate.bounds),
            min_zoom,
            max_zoom,
            legend_url: merged.legend_url,
            display_title: merged
                .display_title
                .unwrap_or_else(|| candidate.title.clone()),
            description: merged.description,
            title_j: merged.title_j,
            authors_j: merged.authors_j,
            geotiff_url: merged.geotiff_url,
        })
    }
}

async fn best_effort<T, F>(fetcher: &F, url: &str, what: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
    F: HttpFetch + ?Sized,
{
    match fetch_json::<T, F>(fetcher, url).await {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("Ignoring {} from {}: {}", what, url, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::http::MockFetcher;

    const DESCRIPTOR: &str = "https://tiles.test/getTileJson?id=1";
    const LINKED: &str = "https://meta.test/ld/resource/1";

    fn candidate() -> MapCandidate {
        MapCandidate {
            id: "m1".into(),
            name: "gsj-m1".into(),
            title: "Geological map of somewhere".into(),
            notes: None,
            author: Some("Survey".into()),
            tile_url: Some("https://tiles.test/own/{z}/{x}/{y}.png".into()),
            tile_descriptor_url: Some(DESCRIPTOR.into()),
            linked_data_url: None,
            bounds: GeoBounds::new(139.0, 35.0, 140.0, 36.0).unwrap(),
            image_url: None,
            pdf_url: None,
        }
    }

    fn resolve(mock: &MockFetcher, c: &MapCandidate) -> Result<ResolvedLayerData> {
        pollster::block_on(TileDescriptorResolver::default().resolve(mock, c))
    }

    #[test]
    fn test_prefers_webp_template() {
        let mock = MockFetcher::new().with_body(
            DESCRIPTOR,
            r#"{"tiles": ["https://t/a/{z}/{x}/{y}.png", "https://t/a/{z}/{x}/{y}.webp"]}"#,
        );
        let resolved = resolve(&mock, &candidate()).unwrap();
        assert!(resolved.tile_url.ends_with(".webp"));
    }

    #[test]
    fn test_tile_template_order() {
        let tiles = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(select_tile_template(&tiles(&["a.jpg", "a.png"])), Some("a.png"));
        assert_eq!(select_tile_template(&tiles(&["a.jpg", "b.jpg"])), Some("a.jpg"));
        assert_eq!(select_tile_template(&[]), None);
    }

    #[test]
    fn test_descriptor_fields_win() {
        let mock = MockFetcher::new().with_body(
            DESCRIPTOR,
            r#"{"tiles": ["https://t/d/{z}/{x}/{y}.png"], "bounds": [139.2, 35.1, 139.8, 35.9],
                "minzoom": 5, "maxzoom": 16, "legend": "https://t/legend.png",
                "name": "Descriptor name", "description": "desc"}"#,
        );
        let resolved = resolve(&mock, &candidate()).unwrap();
        assert_eq!(resolved.tile_url, "https://t/d/{z}/{x}/{y}.png");
        assert_eq!(resolved.bounds, GeoBounds::new(139.2, 35.1, 139.8, 35.9).unwrap());
        assert_eq!((resolved.min_zoom, resolved.max_zoom), (5, 16));
        assert_eq!(resolved.legend_url.as_deref(), Some("https://t/legend.png"));
        assert_eq!(resolved.display_title, "Descriptor name");
        assert_eq!(resolved.description.as_deref(), Some("desc"));
    }

    #[test]
    fn test_descriptor_failure_degrades_to_candidate() {
        let mock = MockFetcher::new().with_error(DESCRIPTOR, Error::Network("HTTP 500".into()));
        let c = candidate();
        let resolved = resolve(&mock, &c).unwrap();

        assert_eq!(Some(resolved.tile_url.clone()), c.tile_url);
        assert_eq!(resolved.bounds, c.bounds);
        assert_eq!((resolved.min_zoom, resolved.max_zoom), (2, 18));
        assert_eq!(resolved.display_title, c.title);
        assert!(resolved.legend_url.is_none());
    }

    #[test]
    fn test_malformed_descriptor_degrades() {
        let mock = MockFetcher::new().with_body(DESCRIPTOR, "<html>oops</html>");
        assert!(resolve(&mock, &candidate()).is_ok());
    }

    #[test]
    fn test_missing_tile_source_is_fatal() {
        let mut c = candidate();
        c.tile_url = None;
        let mock = MockFetcher::new().with_body(DESCRIPTOR, r#"{"name": "no tiles"}"#);

        assert_eq!(
            resolve(&mock, &c),
            Err(Error::MissingTileSource { id: "m1".into() })
        );
    }

    #[test]
    fn test_linked_data_fills_only_unset_fields() {
        let mut c = candidate();
        c.linked_data_url = Some(LINKED.into());
        let mock = MockFetcher::new()
            .with_body(DESCRIPTOR, r#"{"title_j": "From descriptor"}"#)
            .with_body(
                LINKED,
                r#"{"title_j": "From linked data", "authors_j": "Authors",
                    "downloadData": [{"title": "GeoTIFF", "@id": "https://meta.test/a.tif"}]}"#,
            );

        let resolved = resolve(&mock, &c).unwrap();
        assert_eq!(resolved.title_j.as_deref(), Some("From descriptor"));
        assert_eq!(resolved.authors_j.as_deref(), Some("Authors"));
        assert_eq!(resolved.geotiff_url.as_deref(), Some("https://meta.test/a.tif"));
        assert_eq!(mock.calls(), 2);
    }

    #[test]
    fn test_enrichment_or_keeps_earlier_values() {
        let first = Enrichment {
            legend_url: Some("first".into()),
            ..Default::default()
        };
        let second = Enrichment {
            legend_url: Some("second".into()),
            description: Some("second".into()),
            ..Default::default()
        };
        let merged = first.or(second);
        assert_eq!(merged.legend_url.as_deref(), Some("first"));
        assert_eq!(merged.description.as_deref(), Some("second"));
    }
}
