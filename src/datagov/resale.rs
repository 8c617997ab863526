//! HDB resale-price aggregation: paginated fetch, recency filter, and
//! per-town median computation.

use crate::config::PipelineConfig;
use crate::datagov::datastore::{self, SearchEnvelope, SearchResult};
use crate::fetch::{HttpClient, fetch_with_retry};
use anyhow::{Result, bail};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use tracing::{info, warn};

/// One retained resale transaction.
#[derive(Debug, Clone)]
pub struct ResaleTransaction {
    pub town: String,
    pub month: String,
    pub price: f64,
}

/// Fetches all 4-room resale transactions and reduces them to a
/// town → median-price map. Failures mid-pagination keep whatever pages
/// were already collected.
pub async fn fetch_resale_medians<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
) -> HashMap<String, i64> {
    let records = fetch_all_pages(client, config).await;
    info!(records = records.len(), "4-room resale records fetched");

    let transactions = filter_recent(&records, &config.resale_month_cutoff);
    let medians = median_by_town(&transactions);
    info!(towns = medians.len(), "Median resale prices computed");
    medians
}

async fn fetch_all_pages<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
) -> Vec<Map<String, Value>> {
    let filters = json!({"flat_type": "4 ROOM"});
    let mut all_records = Vec::new();
    let mut offset = 0u64;

    loop {
        let page = match fetch_page(client, config, &filters, offset).await {
            Ok(page) => page,
            Err(err) => {
                warn!(offset, error = %err, "Resale page fetch failed, keeping partial data");
                break;
            }
        };

        if page.records.is_empty() {
            break;
        }
        all_records.extend(page.records);
        offset += config.page_limit as u64;
        info!(fetched = all_records.len(), total = page.total, "Resale page fetched");

        if offset >= page.total {
            break;
        }
        tokio::time::sleep(config.page_delay).await;
    }

    all_records
}

async fn fetch_page<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
    filters: &Value,
    offset: u64,
) -> Result<SearchResult> {
    let url = datastore::search_url(
        &config.datastore_url,
        &config.resale_dataset,
        config.page_limit,
        offset,
        Some(filters),
    )?;

    let response = fetch_with_retry(client, url).await?;
    if !response.status().is_success() {
        bail!("datastore returned {}", response.status());
    }

    let envelope: SearchEnvelope = response.json().await?;
    Ok(envelope.result)
}

/// Keeps transactions with a usable town and price whose month string is at
/// or after `cutoff`. Month labels sort lexicographically, which holds for
/// fixed-width `YYYY-MM` labels within the same century.
fn filter_recent(records: &[Map<String, Value>], cutoff: &str) -> Vec<ResaleTransaction> {
    records
        .iter()
        .filter_map(|record| {
            let town = record
                .get("town")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_uppercase();
            if town.is_empty() {
                return None;
            }

            let price = match record.get("resale_price")? {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.trim().parse().ok()?,
                _ => return None,
            };

            let month = record
                .get("month")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if month.as_str() < cutoff {
                return None;
            }

            Some(ResaleTransaction { town, month, price })
        })
        .collect()
}

/// Median price per town: sort ascending, middle value for an odd count,
/// mean of the two central values for an even count, rounded to the
/// nearest whole dollar.
pub fn median_by_town(transactions: &[ResaleTransaction]) -> HashMap<String, i64> {
    let mut by_town: HashMap<String, Vec<f64>> = HashMap::new();
    for t in transactions {
        by_town.entry(t.town.clone()).or_default().push(t.price);
    }

    by_town
        .into_iter()
        .filter(|(_, prices)| !prices.is_empty())
        .map(|(town, mut prices)| {
            prices.sort_by(f64::total_cmp);
            let mid = prices.len() / 2;
            let median = if prices.len() % 2 == 0 {
                (prices[mid - 1] + prices[mid]) / 2.0
            } else {
                prices[mid]
            };
            (town, median.round() as i64)
        })
        .collect()
}
