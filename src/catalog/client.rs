//! Catalog search client.

use super::http::{fetch_json, HttpFetch};
use super::types::{DatasetRecord, SearchResponse};
use super::{Error, Result};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Issues keyword searches against a CKAN-style `package_search` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogClient {
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the search URL with the keyword percent-encoded.
    pub fn search_url(&self, keyword: &str, rows: u32) -> String {
        format!(
            "{}/package_search?q={}&rows={}",
            self.base_url,
            utf8_percent_encode(keyword, NON_ALPHANUMERIC),
            rows
        )
    }

    /// Runs one search and returns the raw dataset records.
    ///
    /// No retry: transport errors surface as [`Error::Network`] and a
    /// `success: false` envelope as [`Error::Api`].
    pub async fn search<F>(&self, fetcher: &F, keyword: &str, rows: u32) -> Result<Vec<DatasetRecord>>
    where
        F: HttpFetch + ?Sized,
    {
        let url = self.search_url(keyword, rows);
        log::info!("Searching catalog: {}", url);

        let response: SearchResponse = fetch_json(fetcher, &url).await?;
        if !response.success {
            return Err(Error::Api);
        }

        let records = response
            .result
            .map(|r| r.into_records())
            .unwrap_or_default();
        log::info!("Catalog returned {} records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::http::MockFetcher;

    const BASE: &str = "https://catalog.test/api/3/action";

    #[test]
    fn test_search_url_encodes_keyword() {
        let client = CatalogClient::new(format!("{}/", BASE));
        assert_eq!(
            client.search_url("地質図", 1000),
            format!("{}/package_search?q=%E5%9C%B0%E8%B3%AA%E5%9B%B3&rows=1000", BASE)
        );
    }

    #[test]
    fn test_search_returns_records() {
        let client = CatalogClient::new(BASE);
        let mock = MockFetcher::new().with_body(
            &client.search_url("geo", 10),
            r#"{"success": true, "result": {"results": [{"id": "a"}, {"id": "b"}]}}"#,
        );

        let records = pollster::block_on(client.search(&mock, "geo", 10)).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_search_keeps_good_records_beside_bad_ones() {
        let client = CatalogClient::new(BASE);
        let mock = MockFetcher::new().with_body(
            &client.search_url("geo", 10),
            r#"{"success": true, "result": {"results": [
                {"id": "odd", "title": null, "resources": []},
                {"id": "kanto", "title": "Kanto", "resources": [
                    {"format": "XYZ", "url": "https://t/a/{z}/{x}/{y}.png",
                     "description": "BBOX: 139.0,35.0,140.5,36.5"}]}
            ]}}"#,
        );

        let records = pollster::block_on(client.search(&mock, "geo", 10)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "kanto");
        assert!(records[0].resources[0].format_is("XYZ"));
    }

    #[test]
    fn test_search_maps_failures() {
        let client = CatalogClient::new(BASE);
        let mock = MockFetcher::new()
            .with_body(&client.search_url("geo", 10), r#"{"success": false}"#)
            .with_error(
                &client.search_url("down", 10),
                Error::Network("HTTP 503".into()),
            );

        let api = pollster::block_on(client.search(&mock, "geo", 10));
        assert_eq!(api.unwrap_err(), Error::Api);

        let net = pollster::block_on(client.search(&mock, "down", 10));
        assert!(matches!(net, Err(Error::Network(_))));
    }
}
