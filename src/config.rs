//! Fixed pipeline configuration.
//!
//! Every constant the pipeline depends on — service endpoints, dataset
//! identifiers, the non-residential allow-list, rate-limit delays — lives in
//! one immutable [`PipelineConfig`] constructed once in `main` and passed by
//! reference into every component.

use std::collections::HashSet;
use std::time::Duration;

/// data.gov.sg dataset identifiers consumed by the pipeline.
pub const HDB_RESALE_DATASET: &str = "d_8b84c4ee58e3cfc0ece0d773c8ca6abc";
pub const HAWKER_DATASET: &str = "d_4a086da0a5553be1d89383cd90d07ecd";
pub const SUPERMARKET_DATASET: &str = "d_cac2c32f01960a3ad7202a99c27268a0";
pub const SCHOOL_DATASET: &str = "d_688b934f82c1059ed0a6993d2a829089";
pub const CLINIC_DATASET: &str = "d_e4663ad3f088a46dabd3972dc166402d";

/// Planning areas with no meaningful residential population. These skip the
/// population fetches entirely and get a minimal profile.
const NON_RESIDENTIAL_AREAS: &[&str] = &[
    "CENTRAL WATER CATCHMENT",
    "CHANGI BAY",
    "LHSOUTHERN ISLANDS",
    "MARINA EAST",
    "MARINA SOUTH",
    "NORTH-EASTERN ISLANDS",
    "PANDAN",
    "SIMPANG",
    "STRAITS VIEW",
    "TENGAH",
    "TUAS",
    "WESTERN ISLANDS",
    "WESTERN WATER CATCHMENT",
    "LIM CHU KANG",
    "MANDAI",
    "SUNGEI KADUT",
    "PIONEER",
    "CHANGI",
];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub onemap_auth_url: String,
    pub onemap_base: String,
    pub datastore_url: String,
    pub poll_download_base: String,

    /// Census year passed to every population query.
    pub population_year: String,

    pub resale_dataset: String,
    pub hawker_dataset: String,
    pub supermarket_dataset: String,
    pub school_dataset: String,
    pub clinic_dataset: String,

    /// Resale transactions older than this year-month are dropped.
    pub resale_month_cutoff: String,
    /// Page size for datastore search pagination.
    pub page_limit: usize,

    pub non_residential: HashSet<String>,

    /// Pause before each population-dimension call.
    pub courtesy_delay: Duration,
    /// Pause between resale-price pages.
    pub page_delay: Duration,
}

impl PipelineConfig {
    pub fn new(population_year: impl Into<String>) -> Self {
        Self {
            onemap_auth_url: "https://www.onemap.gov.sg/api/auth/post/getToken".to_string(),
            onemap_base: "https://www.onemap.gov.sg/api/public/popapi".to_string(),
            datastore_url: "https://data.gov.sg/api/action/datastore_search".to_string(),
            poll_download_base: "https://api-open.data.gov.sg/v1/public/api/datasets".to_string(),
            population_year: population_year.into(),
            resale_dataset: HDB_RESALE_DATASET.to_string(),
            hawker_dataset: HAWKER_DATASET.to_string(),
            supermarket_dataset: SUPERMARKET_DATASET.to_string(),
            school_dataset: SCHOOL_DATASET.to_string(),
            clinic_dataset: CLINIC_DATASET.to_string(),
            resale_month_cutoff: "2023-01".to_string(),
            page_limit: 5000,
            non_residential: NON_RESIDENTIAL_AREAS
                .iter()
                .map(|a| a.to_string())
                .collect(),
            courtesy_delay: Duration::from_millis(150),
            page_delay: Duration::from_millis(500),
        }
    }

    /// Returns `true` if `area` (canonical name) is on the non-residential
    /// allow-list.
    pub fn is_non_residential(&self, area: &str) -> bool {
        self.non_residential.contains(area)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new("2020")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_residential_lookup() {
        let config = PipelineConfig::default();
        assert!(config.is_non_residential("TUAS"));
        assert!(config.is_non_residential("WESTERN WATER CATCHMENT"));
        assert!(!config.is_non_residential("BEDOK"));
    }

    #[test]
    fn test_default_year() {
        let config = PipelineConfig::default();
        assert_eq!(config.population_year, "2020");
    }
}
