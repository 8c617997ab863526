use crate::config::PipelineConfig;
use crate::fetch::{self, HttpClient};
use crate::stats::DimensionRecord;
use anyhow::{Result, bail};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::warn;

/// The demographic dimensions fetched per planning area, each backed by one
/// population API sub-resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    AgeGroup,
    EthnicGroup,
    Income,
    Dwelling,
    Transport,
    Tenancy,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::AgeGroup,
        Dimension::EthnicGroup,
        Dimension::Income,
        Dimension::Dwelling,
        Dimension::Transport,
        Dimension::Tenancy,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Dimension::AgeGroup => "getPopulationAgeGroup",
            Dimension::EthnicGroup => "getEthnicGroup",
            Dimension::Income => "getHouseholdMonthlyIncomeWork",
            Dimension::Dwelling => "getTypeOfDwellingHousehold",
            Dimension::Transport => "getModeOfTransportWork",
            Dimension::Tenancy => "getTenancyType",
        }
    }
}

/// Fetches one demographic dimension for one planning area, pausing for the
/// configured courtesy delay first.
///
/// Never fails past this boundary: 404 means the area has no data for the
/// dimension, 401 is logged in case the token went stale, and every other
/// error is logged and swallowed. Callers always get a record list to
/// aggregate over, even if it is empty.
pub async fn fetch_dimension<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
    dimension: Dimension,
    area: &str,
) -> Vec<DimensionRecord> {
    tokio::time::sleep(config.courtesy_delay).await;

    match try_fetch(client, config, dimension, area).await {
        Ok(records) => records,
        Err(err) => {
            warn!(endpoint = dimension.endpoint(), area, error = %err, "Dimension fetch failed");
            Vec::new()
        }
    }
}

async fn try_fetch<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
    dimension: Dimension,
    area: &str,
) -> Result<Vec<DimensionRecord>> {
    let url = Url::parse_with_params(
        &format!("{}/{}", config.onemap_base, dimension.endpoint()),
        &[("planningArea", area), ("year", config.population_year.as_str())],
    )?;

    let response = fetch::get(client, url).await?;
    match response.status() {
        StatusCode::NOT_FOUND => return Ok(Vec::new()),
        StatusCode::UNAUTHORIZED => {
            warn!(endpoint = dimension.endpoint(), area, "401 from population API");
            return Ok(Vec::new());
        }
        status if !status.is_success() => bail!("population API returned {status}"),
        _ => {}
    }

    let body: Value = response.json().await?;
    Ok(normalize(body))
}

/// Collapses the API's list-or-object response shapes into one variant:
/// a sequence of flat records.
///
/// Arrays are used as-is (non-object elements dropped), the "No Data Found!"
/// sentinel object becomes an empty list, and any other object wraps as a
/// single-element list.
pub fn normalize(body: Value) -> Vec<DimensionRecord> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        Value::Object(record) => {
            if record.get("Result").and_then(Value::as_str) == Some("No Data Found!") {
                Vec::new()
            } else {
                vec![record]
            }
        }
        _ => Vec::new(),
    }
}
