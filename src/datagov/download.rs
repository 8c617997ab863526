//! Poll-download indirection: a dataset id is first exchanged for a
//! temporary file URL, which is then fetched separately.

use crate::fetch::{HttpClient, fetch_with_retry};
use anyhow::{Result, bail};
use reqwest::Url;
use serde_json::Value;

/// Resolves the temporary download URL for `dataset_id`.
///
/// Returns `Ok(None)` when the endpoint answers successfully but carries no
/// URL — the caller treats that as "this stage has nothing", not an error.
pub async fn resolve_download_url<C: HttpClient>(
    client: &C,
    poll_download_base: &str,
    dataset_id: &str,
) -> Result<Option<Url>> {
    let url = Url::parse(&format!("{poll_download_base}/{dataset_id}/poll-download"))?;

    let response = fetch_with_retry(client, url).await?;
    if !response.status().is_success() {
        bail!("poll-download returned {}", response.status());
    }

    let body: Value = response.json().await?;
    let target = body.pointer("/data/url").and_then(Value::as_str);
    Ok(target.map(Url::parse).transpose()?)
}
