//! Amenity location and the point-in-polygon join.
//!
//! Each amenity dataset runs through an ordered chain of point sources:
//! the bulk GeoJSON download first, then the tabular datastore, and if both
//! come back empty every area simply counts zero. A stage failing is never
//! an error, it just hands over to the next stage.

use crate::config::PipelineConfig;
use crate::datagov::datastore::{self, SearchEnvelope};
use crate::datagov::download;
use crate::fetch::{BasicClient, HttpClient, fetch_with_retry};
use crate::geometry::AreaPolygons;
use anyhow::{Result, bail};
use async_trait::async_trait;
use geo::{Centroid, Contains, Point};
use geojson::GeoJson;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Column-name variants under which tabular rows hide their coordinates.
const LAT_COLUMNS: &[&str] = &["latitude_hd", "latitude", "lat"];
const LNG_COLUMNS: &[&str] = &["longitude_hd", "longitude", "lng"];

/// One strategy for turning a dataset id into amenity points.
#[async_trait]
pub trait PointSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn locate(&self, dataset_id: &str) -> Result<Vec<Point<f64>>>;
}

/// Bulk-geometry stage: resolve the poll-download URL, fetch the payload,
/// and reduce every feature to a representative point.
pub struct GeoJsonDownloadSource<C = BasicClient> {
    client: C,
    poll_download_base: String,
}

impl GeoJsonDownloadSource<BasicClient> {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::with_client(
            BasicClient::new(Duration::from_secs(60))?,
            config,
        ))
    }
}

impl<C: HttpClient> GeoJsonDownloadSource<C> {
    pub fn with_client(client: C, config: &PipelineConfig) -> Self {
        Self {
            client,
            poll_download_base: config.poll_download_base.clone(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> PointSource for GeoJsonDownloadSource<C> {
    fn name(&self) -> &'static str {
        "geojson-download"
    }

    async fn locate(&self, dataset_id: &str) -> Result<Vec<Point<f64>>> {
        let Some(url) =
            download::resolve_download_url(&self.client, &self.poll_download_base, dataset_id)
                .await?
        else {
            return Ok(Vec::new());
        };

        let response = fetch_with_retry(&self.client, url).await?;
        if !response.status().is_success() {
            bail!("download returned {}", response.status());
        }

        let geojson: GeoJson = response.json().await?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Ok(Vec::new());
        };

        let points = collection
            .features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .filter_map(|geometry| representative_point(&geometry.value))
            .collect();
        Ok(points)
    }
}

/// Tabular stage: datastore rows carrying latitude/longitude columns.
pub struct DatastoreSource<C = BasicClient> {
    client: C,
    datastore_url: String,
    limit: usize,
}

impl DatastoreSource<BasicClient> {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::with_client(
            BasicClient::new(Duration::from_secs(30))?,
            config,
        ))
    }
}

impl<C: HttpClient> DatastoreSource<C> {
    pub fn with_client(client: C, config: &PipelineConfig) -> Self {
        Self {
            client,
            datastore_url: config.datastore_url.clone(),
            limit: config.page_limit,
        }
    }
}

#[async_trait]
impl<C: HttpClient> PointSource for DatastoreSource<C> {
    fn name(&self) -> &'static str {
        "datastore"
    }

    async fn locate(&self, dataset_id: &str) -> Result<Vec<Point<f64>>> {
        let url = datastore::search_url(&self.datastore_url, dataset_id, self.limit, 0, None)?;

        let response = fetch_with_retry(&self.client, url).await?;
        if !response.status().is_success() {
            bail!("datastore returned {}", response.status());
        }

        let envelope: SearchEnvelope = response.json().await?;
        let points = envelope
            .result
            .records
            .iter()
            .filter_map(row_point)
            .collect();
        Ok(points)
    }
}

/// Reduces a GeoJSON geometry to a representative point: itself if already
/// a point, else its centroid.
fn representative_point(value: &geojson::Value) -> Option<Point<f64>> {
    let geometry: geo::Geometry<f64> = value.try_into().ok()?;
    match geometry {
        geo::Geometry::Point(p) => Some(p),
        other => other.centroid(),
    }
}

/// Extracts a point from a tabular row, or `None` if no coordinate column
/// variant carries a usable value.
fn row_point(record: &Map<String, Value>) -> Option<Point<f64>> {
    let lat = coordinate(record, LAT_COLUMNS)?;
    let lng = coordinate(record, LNG_COLUMNS)?;
    Some(Point::new(lng, lat))
}

fn coordinate(record: &Map<String, Value>, candidates: &[&str]) -> Option<f64> {
    for candidate in candidates {
        for (key, value) in record {
            if key.eq_ignore_ascii_case(candidate) {
                if let Some(v) = numeric(value) {
                    return Some(v);
                }
            }
        }
    }
    None
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Runs the source chain until one yields points. All sources failing or
/// coming back empty is not an error — the dataset just contributes zero
/// counts everywhere.
pub async fn locate_points(dataset_id: &str, sources: &[&dyn PointSource]) -> Vec<Point<f64>> {
    for source in sources {
        match source.locate(dataset_id).await {
            Ok(points) if !points.is_empty() => {
                debug!(source = source.name(), dataset_id, count = points.len(), "Points located");
                return points;
            }
            Ok(_) => {
                warn!(source = source.name(), dataset_id, "Source yielded no points, trying next");
            }
            Err(err) => {
                warn!(source = source.name(), dataset_id, error = %err, "Source failed, trying next");
            }
        }
    }
    Vec::new()
}

/// Assigns each point to the first polygon that contains it, iterating
/// areas in the map's fixed order. Unmatched points are dropped.
pub fn count_by_area(points: &[Point<f64>], polygons: &AreaPolygons) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> =
        polygons.keys().map(|name| (name.clone(), 0)).collect();

    let mut matched = 0u64;
    for point in points {
        for (name, polygon) in polygons {
            if polygon.contains(point) {
                if let Some(count) = counts.get_mut(name) {
                    *count += 1;
                }
                matched += 1;
                break;
            }
        }
    }

    debug!(matched, located = points.len(), "Points joined to areas");
    counts
}

/// Full amenity lookup for one dataset: locate points through the source
/// chain, then join them to planning areas.
pub async fn count_amenities(
    dataset_id: &str,
    label: &str,
    sources: &[&dyn PointSource],
    polygons: &AreaPolygons,
) -> BTreeMap<String, u64> {
    info!(label, dataset_id, "Fetching amenity locations");
    let points = locate_points(dataset_id, sources).await;
    let counts = count_by_area(&points, polygons);
    let matched: u64 = counts.values().sum();
    info!(label, matched, located = points.len(), "Amenities joined to planning areas");
    counts
}
