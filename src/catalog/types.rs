//! Wire shapes of the catalog, tile descriptor and linked-data documents.
//!
//! Every field the viewer does not strictly need is optional so that a
//! partially filled record still decodes.

use serde::Deserialize;

/// Envelope returned by `package_search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub success: bool,
    pub result: Option<SearchResult>,
}

/// Records stay raw until [`SearchResult::into_records`] decodes them one by one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub count: Option<u64>,
    pub results: Vec<serde_json::Value>,
}

impl SearchResult {
    /// Decodes each record on its own, skipping the ones that do not fit.
    pub fn into_records(self) -> Vec<DatasetRecord> {
        self.results
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                match serde_json::from_value::<DatasetRecord>(value) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        log::warn!("Skipping catalog record {}: {}", index, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// One catalog dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetRecord {
    pub id: String,
    pub name: String,
    pub title: String,
    pub notes: Option<String>,
    pub author: Option<String>,
    /// GeoJSON geometry, published either as an object or as a JSON string.
    pub spatial: Option<serde_json::Value>,
    pub resources: Vec<Resource>,
}

/// A downloadable or linkable artefact attached to a dataset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub format: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl Resource {
    pub fn format_is(&self, format: &str) -> bool {
        self.format.as_deref() == Some(format)
    }

    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.as_deref().is_some_and(|n| n.contains(needle))
    }

    pub fn url_contains(&self, needle: &str) -> bool {
        self.url.as_deref().is_some_and(|u| u.contains(needle))
    }
}

/// TileJSON-style descriptor document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TileDescriptor {
    pub tiles: Option<Vec<String>>,
    pub bounds: Option<Vec<f64>>,
    pub minzoom: Option<f64>,
    pub maxzoom: Option<f64>,
    pub legend: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub title_j: Option<String>,
    pub authors_j: Option<String>,
}

/// Linked-data metadata record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkedDataRecord {
    #[serde(rename = "title_j")]
    pub title_j: Option<String>,
    #[serde(rename = "authors_j")]
    pub authors_j: Option<String>,
    pub download_data: Vec<DownloadEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DownloadEntry {
    pub title: Option<String>,
    pub data_type: Option<String>,
    #[serde(rename = "@id")]
    pub id: Option<String>,
}

impl DownloadEntry {
    pub fn is_geotiff(&self) -> bool {
        self.title.as_deref() == Some("GeoTIFF")
            || self.data_type.as_deref().is_some_and(|t| t.contains("GeoTiff"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_tolerates_missing_fields() {
        let body = r#"{
            "success": true,
            "result": {
                "count": 1,
                "results": [
                    {"id": "abc", "name": "gsj-1", "title": "Map",
                     "resources": [{"format": "XYZ", "url": "https://t/{z}/{x}/{y}.png"}]}
                ]
            }
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.success);
        let results = parsed.result.unwrap().into_records();
        assert_eq!(results.len(), 1);
        assert!(results[0].spatial.is_none());
        assert!(results[0].resources[0].format_is("XYZ"));
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let body = r#"{"results": [
            {"id": "odd", "title": null, "resources": []},
            {"id": "ok", "title": "Map", "resources": [{"format": "XYZ"}]},
            {"id": "worse", "resources": {"format": "XYZ"}}
        ]}"#;
        let result: SearchResult = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = result.into_records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn test_linked_data_geotiff_entry() {
        let body = r#"{
            "title_j": "5万分の1地質図幅「東京西南部」",
            "downloadData": [
                {"title": "KML", "@id": "https://x/a.kml"},
                {"title": "Raster", "data_type": "GeoTiff", "@id": "https://x/a.tif"}
            ]
        }"#;
        let parsed: LinkedDataRecord = serde_json::from_str(body).unwrap();
        assert!(parsed.authors_j.is_none());
        let geotiff = parsed.download_data.iter().find(|d| d.is_geotiff()).unwrap();
        assert_eq!(geotiff.id.as_deref(), Some("https://x/a.tif"));
    }
}
