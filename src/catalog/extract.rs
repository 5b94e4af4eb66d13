//! Turns raw catalog records into map candidates.
//!
//! A record becomes a candidate only when it offers a tile source (direct
//! XYZ resource or a tile descriptor) and its footprint can be derived,
//! either from the GeoJSON `spatial` field or from a `BBOX:` line in the
//! tile resource description.

use super::types::{DatasetRecord, Resource};
use super::{Error, Result};
use crate::geo::GeoBounds;
use geo_types::Coord;
use geojson::{GeoJson, Value};
use regex::Regex;
use std::sync::LazyLock;

static BBOX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"BBOX:\s*(-?[\d.]+),(-?[\d.]+),(-?[\d.]+),(-?[\d.]+)").expect("bbox regex")
});

/// A catalog dataset with a displayable tile layer. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCandidate {
    pub id: String,
    /// Catalog slug, used for the dataset page link.
    pub name: String,
    pub title: String,
    pub notes: Option<String>,
    pub author: Option<String>,
    pub tile_url: Option<String>,
    pub tile_descriptor_url: Option<String>,
    pub linked_data_url: Option<String>,
    pub bounds: GeoBounds,
    pub image_url: Option<String>,
    pub pdf_url: Option<String>,
}

fn is_tile_resource(r: &Resource) -> bool {
    r.format_is("XYZ") || r.name_contains("タイル") || r.url_contains("maptile/xyz")
}

fn is_descriptor_resource(r: &Resource) -> bool {
    r.format_is("JSON") && (r.name_contains("TileJSON") || r.url_contains("getTileJson"))
}

fn is_linked_data_resource(r: &Resource) -> bool {
    r.format_is("JSON") && r.url_contains("/ld/resource/")
}

fn is_image_resource(r: &Resource) -> bool {
    r.format_is("JPEG") || r.format_is("JPG") || r.format_is("PNG")
}

fn is_pdf_resource(r: &Resource) -> bool {
    r.format_is("PDF")
}

/// Extracts candidates in input order. Records without a tile source or
/// without derivable bounds are dropped.
pub fn extract(records: &[DatasetRecord]) -> Vec<MapCandidate> {
    let candidates: Vec<MapCandidate> = records.iter().filter_map(extract_one).collect();
    log::info!(
        "Extracted {} map candidates from {} records",
        candidates.len(),
        records.len()
    );
    candidates
}

fn extract_one(record: &DatasetRecord) -> Option<MapCandidate> {
    let find = |pred: fn(&Resource) -> bool| record.resources.iter().find(|r| pred(r));

    let tile = find(is_tile_resource);
    let descriptor = find(is_descriptor_resource);
    if tile.is_none() && descriptor.is_none() {
        return None;
    }

    let from_spatial = record.spatial.as_ref().and_then(|spatial| {
        spatial_bounds(spatial)
            .map_err(|e| log::warn!("Bad spatial metadata on {}: {}", record.id, e))
            .ok()
            .flatten()
    });

    let bounds = from_spatial.or_else(|| {
        tile.and_then(|t| t.description.as_deref())
            .and_then(bbox_from_description)
    });

    let Some(bounds) = bounds else {
        log::warn!("Dropping {}: no usable bounds", record.id);
        return None;
    };

    let url_of = |r: Option<&Resource>| r.and_then(|r| r.url.clone());

    Some(MapCandidate {
        id: record.id.clone(),
        name: record.name.clone(),
        title: record.title.clone(),
        notes: record.notes.clone(),
        author: record.author.clone(),
        tile_url: url_of(tile),
        tile_descriptor_url: url_of(descriptor),
        linked_data_url: url_of(find(is_linked_data_resource)),
        bounds,
        image_url: url_of(find(is_image_resource)),
        pdf_url: url_of(find(is_pdf_resource)),
    })
}

/// Bounds of the outer ring of a GeoJSON Polygon.
///
/// Returns `Ok(None)` for valid GeoJSON that is not a Polygon.
pub fn spatial_bounds(spatial: &serde_json::Value) -> Result<Option<GeoBounds>> {
    let geojson = match spatial {
        serde_json::Value::String(text) => text.parse::<GeoJson>(),
        other => GeoJson::from_json_value(other.clone()),
    }
    .map_err(|e| Error::Parse(e.to_string()))?;

    let GeoJson::Geometry(geometry) = geojson else {
        return Ok(None);
    };

    let Value::Polygon(rings) = geometry.value else {
        return Ok(None);
    };

    let coords = rings
        .first()
        .into_iter()
        .flatten()
        .filter(|c| c.len() >= 2)
        .map(|c| Coord { x: c[0], y: c[1] });

    Ok(GeoBounds::from_coords(coords))
}

/// Parses `BBOX: west,south,east,north` out of free text.
pub fn bbox_from_description(text: &str) -> Option<GeoBounds> {
    let caps = BBOX_PATTERN.captures(text)?;
    let mut values = [0.0; 4];
    for (i, value) in values.iter_mut().enumerate() {
        *value = caps.get(i + 1)?.as_str().parse().ok()?;
    }
    GeoBounds::from_slice(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(format: &str, name: &str, url: &str, description: Option<&str>) -> Resource {
        Resource {
            format: Some(format.into()),
            name: Some(name.into()),
            url: Some(url.into()),
            description: description.map(Into::into),
        }
    }

    fn record(id: &str, spatial: Option<serde_json::Value>, resources: Vec<Resource>) -> DatasetRecord {
        DatasetRecord {
            id: id.into(),
            name: format!("slug-{}", id),
            title: format!("Map {}", id),
            spatial,
            resources,
            ..Default::default()
        }
    }

    fn polygon_string() -> serde_json::Value {
        serde_json::Value::String(
            r#"{"type":"Polygon","coordinates":[[[139.5,35.0],[140.25,35.0],[140.25,35.75],[139.5,35.75],[139.5,35.0]]]}"#
                .into(),
        )
    }

    #[test]
    fn test_extracts_from_spatial_string_and_object() {
        let object: serde_json::Value = match polygon_string() {
            serde_json::Value::String(s) => serde_json::from_str(&s).unwrap(),
            _ => unreachable!(),
        };
        let tile = resource("XYZ", "tiles", "https://t/{z}/{x}/{y}.png", None);
        let records = vec![
            record("a", Some(polygon_string()), vec![tile.clone()]),
            record("b", Some(object), vec![tile]),
        ];

        let candidates = extract(&records);
        assert_eq!(candidates.len(), 2);
        for c in &candidates {
            assert_eq!(c.bounds, GeoBounds::new(139.5, 35.0, 140.25, 35.75).unwrap());
            assert_eq!(c.tile_url.as_deref(), Some("https://t/{z}/{x}/{y}.png"));
        }
    }

    #[test]
    fn test_falls_back_to_bbox_text() {
        let tile = resource(
            "XYZ",
            "地質図タイル",
            "https://gbank.gsj.jp/maptile/xyz/a/{z}/{x}/{y}.png",
            Some("Zoom 2-14 BBOX: 139.0,35.0,140.0,36.0"),
        );
        let records = vec![record("a", Some(serde_json::json!("not geojson")), vec![tile])];

        let candidates = extract(&records);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].bounds,
            GeoBounds::new(139.0, 35.0, 140.0, 36.0).unwrap()
        );
    }

    #[test]
    fn test_unboundable_record_is_dropped() {
        let tile = resource("XYZ", "tiles", "https://t/{z}/{x}/{y}.png", Some("no box here"));
        let records = vec![
            record("lost", Some(serde_json::json!("{broken")), vec![tile.clone()]),
            record("kept", Some(polygon_string()), vec![tile]),
        ];

        let ids: Vec<_> = extract(&records).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["kept"]);
    }

    #[test]
    fn test_records_without_tile_source_are_skipped() {
        let records = vec![record(
            "pdf-only",
            Some(polygon_string()),
            vec![resource("PDF", "report", "https://x/a.pdf", None)],
        )];
        assert!(extract(&records).is_empty());
    }

    #[test]
    fn test_descriptor_only_record_with_aux_links() {
        let records = vec![record(
            "d",
            Some(polygon_string()),
            vec![
                resource("JSON", "TileJSON", "https://x/getTileJson?id=1", None),
                resource("JSON", "metadata", "https://x/ld/resource/1", None),
                resource("PNG", "map image", "https://x/a.png", None),
                resource("PDF", "explanatory text", "https://x/a.pdf", None),
                resource("JPEG", "second image", "https://x/b.jpg", None),
            ],
        )];

        let c = &extract(&records)[0];
        assert!(c.tile_url.is_none());
        assert_eq!(c.tile_descriptor_url.as_deref(), Some("https://x/getTileJson?id=1"));
        assert_eq!(c.linked_data_url.as_deref(), Some("https://x/ld/resource/1"));
        assert_eq!(c.image_url.as_deref(), Some("https://x/a.png"));
        assert_eq!(c.pdf_url.as_deref(), Some("https://x/a.pdf"));
    }

    #[test]
    fn test_non_polygon_spatial_is_not_bounds() {
        let point = serde_json::json!({"type": "Point", "coordinates": [139.0, 35.0]});
        assert_eq!(spatial_bounds(&point), Ok(None));
        assert!(spatial_bounds(&serde_json::json!("{")).is_err());
    }

    #[test]
    fn test_bbox_with_inverted_edges_is_rejected() {
        assert!(bbox_from_description("BBOX: 140.0,35.0,139.0,36.0").is_none());
        assert!(bbox_from_description("BBOX:139,35,140,36").is_some());
    }
}
