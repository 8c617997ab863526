//! CLI entry point for the area profiler.
//!
//! Builds one statistical profile per URA planning area from OneMap
//! population data and data.gov.sg open datasets: boundary dissolve, then
//! resale medians and amenity point-in-polygon counts, then a sequential
//! per-area loop over the six demographic dimensions.

use anyhow::{Context, Result};
use area_profiler::config::PipelineConfig;
use area_profiler::datagov::amenities::{
    self, DatastoreSource, GeoJsonDownloadSource, PointSource,
};
use area_profiler::datagov::resale;
use area_profiler::fetch::{BasicClient, Bearer, HttpClient};
use area_profiler::geometry;
use area_profiler::onemap::auth::{self, Credentials};
use area_profiler::onemap::population::{self, Dimension};
use area_profiler::output;
use area_profiler::profile::{self, AmenityCounts, AreaStats, ProfileOutcome};
use area_profiler::stats;
use clap::Parser;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "area_profiler")]
#[command(about = "Builds per-planning-area profiles from Singapore open data", long_about = None)]
struct Cli {
    /// Subzone boundary GeoJSON (PLN_AREA_N property, polygon geometries)
    #[arg(long, default_value = "data/singapore-subzone-no-sea.geojson")]
    geojson: PathBuf,

    /// Where to write the profile array
    #[arg(short, long, default_value = "data/area-profiles.json")]
    output: PathBuf,

    /// Census year passed to the population API
    #[arg(long, default_value = "2020")]
    year: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/area_profiler.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("area_profiler.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::new(cli.year);

    info!(path = %cli.geojson.display(), "Building planning area polygons");
    let polygons = geometry::build_area_polygons(&cli.geojson)?;
    info!(areas = polygons.len(), "Planning areas discovered");

    // The one fatal path: no token, no run.
    let credentials = Credentials::from_env()?;
    let token = auth::get_token(&config.onemap_auth_url, &credentials)
        .await
        .context("OneMap authentication failed")?;
    info!("Authenticated with OneMap");

    let datagov_client = BasicClient::new(Duration::from_secs(30))?;
    let resale_medians = resale::fetch_resale_medians(&datagov_client, &config).await;

    let download_source = GeoJsonDownloadSource::new(&config)?;
    let datastore_source = DatastoreSource::new(&config)?;
    let sources: [&dyn PointSource; 2] = [&download_source, &datastore_source];

    let hawker_counts =
        amenities::count_amenities(&config.hawker_dataset, "hawker centres", &sources, &polygons)
            .await;
    let supermarket_counts =
        amenities::count_amenities(&config.supermarket_dataset, "supermarkets", &sources, &polygons)
            .await;
    let school_counts =
        amenities::count_amenities(&config.school_dataset, "schools", &sources, &polygons).await;
    let clinic_counts = amenities::count_amenities(
        &config.clinic_dataset,
        "clinics/health facilities",
        &sources,
        &polygons,
    )
    .await;

    let onemap_client = Bearer::new(BasicClient::new(Duration::from_secs(30))?, &token)?;

    let total = polygons.len();
    let mut profiles = Vec::with_capacity(total);

    for (i, area) in polygons.keys().enumerate() {
        info!(area = %area, index = i + 1, total, "Processing planning area");

        let amenity_counts = AmenityCounts {
            hawker: count_for(&hawker_counts, area),
            supermarket: count_for(&supermarket_counts, area),
            school: count_for(&school_counts, area),
            clinic: count_for(&clinic_counts, area),
        };
        let resale_price = resale_medians.get(area.as_str()).copied();

        let outcome = if config.is_non_residential(area) {
            ProfileOutcome::NonResidential
        } else {
            let area_stats = compute_area_stats(&onemap_client, &config, area).await;
            ProfileOutcome::from_stats(area_stats)
        };

        profiles.push(profile::assemble(area, outcome, amenity_counts, resale_price));
    }

    output::write_profiles(&cli.output, &profiles)?;
    Ok(())
}

fn count_for(counts: &BTreeMap<String, u64>, area: &str) -> u64 {
    counts.get(area).copied().unwrap_or(0)
}

/// Fetches the six demographic dimensions for one area, sequentially, and
/// reduces them to the per-area statistics.
async fn compute_area_stats<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
    area: &str,
) -> AreaStats {
    let age = population::fetch_dimension(client, config, Dimension::AgeGroup, area).await;
    let ethnic = population::fetch_dimension(client, config, Dimension::EthnicGroup, area).await;
    let income = population::fetch_dimension(client, config, Dimension::Income, area).await;
    let dwelling = population::fetch_dimension(client, config, Dimension::Dwelling, area).await;
    let transport = population::fetch_dimension(client, config, Dimension::Transport, area).await;
    let tenancy = population::fetch_dimension(client, config, Dimension::Tenancy, area).await;

    let population = stats::total_population(&age);

    let (dominant_age, _) = stats::find_dominant(&age, stats::DOMINANT_SKIP_KEYS);
    let age_pct = stats::compute_pct(&age, &dominant_age, stats::DOMINANT_SKIP_KEYS);

    let (dominant_ethnic, _) = stats::find_dominant(&ethnic, stats::DOMINANT_SKIP_KEYS);
    let ethnic_pct = stats::compute_pct(&ethnic, &dominant_ethnic, stats::DOMINANT_SKIP_KEYS);

    let (dominant_dwelling, _) = stats::find_dominant(&dwelling, stats::DOMINANT_SKIP_KEYS);
    let dwelling_pct =
        stats::compute_pct(&dwelling, &dominant_dwelling, stats::DOMINANT_SKIP_KEYS);

    let (income_bracket, _) = stats::find_dominant(&income, stats::INCOME_SKIP_KEYS);

    let (primary_transport, _) = stats::find_dominant(&transport, stats::DOMINANT_SKIP_KEYS);
    let transport_pct =
        stats::compute_pct(&transport, &primary_transport, stats::DOMINANT_SKIP_KEYS);

    let owner_pct = stats::owner_occupier_pct(&tenancy);

    AreaStats {
        population,
        dominant_age,
        age_pct,
        dominant_ethnic,
        ethnic_pct,
        dominant_dwelling,
        dwelling_pct,
        income_bracket,
        primary_transport,
        transport_pct,
        owner_pct,
    }
}
