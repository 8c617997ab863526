//! Row-oriented datastore search endpoint.

use anyhow::Result;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope around a datastore search response.
#[derive(Debug, Default, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub result: SearchResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResult {
    /// Rows in this page. Shapes vary per dataset, so rows stay loose maps.
    #[serde(default)]
    pub records: Vec<Map<String, Value>>,
    /// Server-reported total row count across all pages.
    #[serde(default)]
    pub total: u64,
}

/// Builds a datastore search URL with offset/limit pagination and an
/// optional equality filter encoded as a JSON URL parameter.
pub fn search_url(
    base: &str,
    resource_id: &str,
    limit: usize,
    offset: u64,
    filters: Option<&Value>,
) -> Result<Url> {
    let mut params: Vec<(&str, String)> = vec![
        ("resource_id", resource_id.to_string()),
        ("limit", limit.to_string()),
        ("offset", offset.to_string()),
    ];
    if let Some(filters) = filters {
        params.push(("filters", filters.to_string()));
    }
    Ok(Url::parse_with_params(base, &params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_url_encodes_filters() {
        let url = search_url(
            "https://data.gov.sg/api/action/datastore_search",
            "d_abc",
            5000,
            10000,
            Some(&json!({"flat_type": "4 ROOM"})),
        )
        .unwrap();

        let query = url.query().unwrap();
        assert!(query.contains("resource_id=d_abc"));
        assert!(query.contains("limit=5000"));
        assert!(query.contains("offset=10000"));
        // The filter JSON must survive URL encoding intact.
        assert!(query.contains("filters=%7B%22flat_type%22%3A%224+ROOM%22%7D")
            || query.contains("filters=%7B%22flat_type%22%3A%224%20ROOM%22%7D"));
    }

    #[test]
    fn test_envelope_defaults_when_fields_missing() {
        let envelope: SearchEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.result.records.is_empty());
        assert_eq!(envelope.result.total, 0);
    }

    #[test]
    fn test_envelope_parses_records() {
        let envelope: SearchEnvelope = serde_json::from_value(json!({
            "result": {"records": [{"town": "BEDOK"}], "total": 1}
        }))
        .unwrap();
        assert_eq!(envelope.result.records.len(), 1);
        assert_eq!(envelope.result.total, 1);
    }
}
