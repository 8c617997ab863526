//! Final per-area profile assembly.
//!
//! Every planning area resolves to exactly one [`ProfileOutcome`], and each
//! arm assembles a complete [`AreaProfile`] — degraded profiles carry
//! literal `"N/A"` / zero values rather than omitting fields.

use crate::labels::{clean_label, format_number, thousands, title_case};
use serde::Serialize;

/// One output record per planning area. Field names are the output schema.
#[derive(Debug, Clone, Serialize)]
pub struct AreaProfile {
    pub planning_area: String,
    pub population: i64,
    pub dominant_age_group: String,
    pub dominant_ethnic_group: String,
    pub dominant_dwelling_type: String,
    pub median_income_bracket: String,
    pub primary_transport_mode: String,
    pub owner_occupier_pct: f64,
    pub median_hdb_resale_4room: Option<i64>,
    pub hawker_centre_count: u64,
    pub supermarket_count: u64,
    pub school_count: u64,
    pub clinic_count: u64,
    pub summary: String,
}

/// Amenity counts for one area, in the fixed hawker → supermarket →
/// school → clinic order used throughout the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmenityCounts {
    pub hawker: u64,
    pub supermarket: u64,
    pub school: u64,
    pub clinic: u64,
}

/// Per-area values computed by the statistics engine. Dominant keys are
/// kept raw here; label cleanup happens at assembly.
#[derive(Debug, Clone, Default)]
pub struct AreaStats {
    pub population: i64,
    pub dominant_age: String,
    pub age_pct: f64,
    pub dominant_ethnic: String,
    pub ethnic_pct: f64,
    pub dominant_dwelling: String,
    pub dwelling_pct: f64,
    pub income_bracket: String,
    pub primary_transport: String,
    pub transport_pct: f64,
    pub owner_pct: f64,
}

/// The three mutually exclusive ways an area's profile is assembled.
#[derive(Debug, Clone)]
pub enum ProfileOutcome {
    /// Area is on the non-residential allow-list; population data is never
    /// fetched for it.
    NonResidential,
    /// The population API returned no usable rows; whatever partial
    /// dominant-category data exists is kept.
    ZeroPopulation(AreaStats),
    /// Complete data, including the templated summary paragraph.
    Full(AreaStats),
}

impl ProfileOutcome {
    /// Classifies fetched stats: zero computed population means the area
    /// gets the degraded branch.
    pub fn from_stats(stats: AreaStats) -> Self {
        if stats.population == 0 {
            ProfileOutcome::ZeroPopulation(stats)
        } else {
            ProfileOutcome::Full(stats)
        }
    }
}

/// Merges an area's outcome with the precomputed amenity and resale lookups
/// into the final output record.
pub fn assemble(
    area: &str,
    outcome: ProfileOutcome,
    amenities: AmenityCounts,
    resale_price: Option<i64>,
) -> AreaProfile {
    match outcome {
        ProfileOutcome::NonResidential => AreaProfile {
            planning_area: area.to_string(),
            population: 0,
            dominant_age_group: "N/A".to_string(),
            dominant_ethnic_group: "N/A".to_string(),
            dominant_dwelling_type: "N/A".to_string(),
            median_income_bracket: "N/A".to_string(),
            primary_transport_mode: "N/A".to_string(),
            owner_occupier_pct: 0.0,
            median_hdb_resale_4room: None,
            hawker_centre_count: amenities.hawker,
            supermarket_count: amenities.supermarket,
            school_count: amenities.school,
            clinic_count: amenities.clinic,
            summary: format!("{} is primarily a non-residential area.", title_case(area)),
        },
        ProfileOutcome::ZeroPopulation(stats) => AreaProfile {
            planning_area: area.to_string(),
            population: 0,
            // Partial dominant keys are kept raw in this branch.
            dominant_age_group: stats.dominant_age,
            dominant_ethnic_group: stats.dominant_ethnic,
            dominant_dwelling_type: stats.dominant_dwelling,
            median_income_bracket: clean_label(&stats.income_bracket),
            primary_transport_mode: stats.primary_transport,
            owner_occupier_pct: stats.owner_pct,
            median_hdb_resale_4room: resale_price,
            hawker_centre_count: amenities.hawker,
            supermarket_count: amenities.supermarket,
            school_count: amenities.school,
            clinic_count: amenities.clinic,
            summary: format!(
                "{} has limited residential population data available.",
                title_case(area)
            ),
        },
        ProfileOutcome::Full(stats) => {
            let summary = build_summary(area, &stats, resale_price, amenities);
            AreaProfile {
                planning_area: area.to_string(),
                population: stats.population,
                dominant_age_group: clean_label(&stats.dominant_age),
                dominant_ethnic_group: clean_label(&stats.dominant_ethnic),
                dominant_dwelling_type: clean_label(&stats.dominant_dwelling),
                median_income_bracket: clean_label(&stats.income_bracket),
                primary_transport_mode: clean_label(&stats.primary_transport),
                owner_occupier_pct: stats.owner_pct,
                median_hdb_resale_4room: resale_price,
                hawker_centre_count: amenities.hawker,
                supermarket_count: amenities.supermarket,
                school_count: amenities.school,
                clinic_count: amenities.clinic,
                summary,
            }
        }
    }
}

/// Concatenates the fixed-template summary sentences in their fixed order.
fn build_summary(
    area: &str,
    stats: &AreaStats,
    resale_price: Option<i64>,
    amenities: AmenityCounts,
) -> String {
    let mut parts = vec![
        format!(
            "{} has a population of {}.",
            title_case(area),
            format_number(stats.population)
        ),
        format!(
            "The largest age group is {} ({:.0}%).",
            clean_label(&stats.dominant_age),
            stats.age_pct
        ),
        format!(
            "Ethnic mix: predominantly {} ({:.0}%).",
            clean_label(&stats.dominant_ethnic),
            stats.ethnic_pct
        ),
        format!(
            "Most common dwelling: {} ({:.0}%).",
            clean_label(&stats.dominant_dwelling),
            stats.dwelling_pct
        ),
        format!(
            "Median household income bracket: {}.",
            clean_label(&stats.income_bracket)
        ),
        format!(
            "Primary commute mode: {} ({:.0}%).",
            clean_label(&stats.primary_transport),
            stats.transport_pct
        ),
        format!("{:.0}% are owner-occupiers.", stats.owner_pct),
    ];

    if let Some(price) = resale_price {
        parts.push(format!(
            "A 4-room HDB flat resells for ~${}.",
            thousands(price)
        ));
    }

    let mut amenity_parts = Vec::new();
    if amenities.hawker > 0 {
        amenity_parts.push(format!("{} hawker centres", amenities.hawker));
    }
    if amenities.supermarket > 0 {
        amenity_parts.push(format!("{} supermarkets", amenities.supermarket));
    }
    if amenities.school > 0 {
        amenity_parts.push(format!("{} schools", amenities.school));
    }
    if amenities.clinic > 0 {
        amenity_parts.push(format!("{} clinics", amenities.clinic));
    }
    if !amenity_parts.is_empty() {
        parts.push(format!("Nearby amenities: {}.", amenity_parts.join(", ")));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_stats() -> AreaStats {
        AreaStats {
            population: 277_540,
            dominant_age: "age_25_29".to_string(),
            age_pct: 9.4,
            dominant_ethnic: "chinese".to_string(),
            ethnic_pct: 71.2,
            dominant_dwelling: "hdb_4_room_flats".to_string(),
            dwelling_pct: 31.9,
            income_bracket: "sgd_10000_to_10999".to_string(),
            primary_transport: "public_bus".to_string(),
            transport_pct: 27.6,
            owner_pct: 88.3,
        }
    }

    fn counts() -> AmenityCounts {
        AmenityCounts {
            hawker: 9,
            supermarket: 24,
            school: 30,
            clinic: 12,
        }
    }

    #[test]
    fn test_non_residential_profile_is_all_na() {
        let profile = assemble(
            "WESTERN WATER CATCHMENT",
            ProfileOutcome::NonResidential,
            counts(),
            Some(450_000),
        );

        assert_eq!(profile.population, 0);
        assert_eq!(profile.dominant_age_group, "N/A");
        assert_eq!(profile.dominant_ethnic_group, "N/A");
        assert_eq!(profile.dominant_dwelling_type, "N/A");
        assert_eq!(profile.median_income_bracket, "N/A");
        assert_eq!(profile.primary_transport_mode, "N/A");
        assert_eq!(profile.owner_occupier_pct, 0.0);
        // Degraded profiles never carry a resale price.
        assert_eq!(profile.median_hdb_resale_4room, None);
        // Amenity counts still come from the real lookups.
        assert_eq!(profile.hawker_centre_count, 9);
        assert_eq!(profile.clinic_count, 12);
        assert_eq!(
            profile.summary,
            "Western Water Catchment is primarily a non-residential area."
        );
    }

    #[test]
    fn test_zero_population_profile_keeps_partial_data_raw() {
        let mut stats = full_stats();
        stats.population = 0;
        let profile = assemble(
            "SELETAR",
            ProfileOutcome::from_stats(stats),
            AmenityCounts::default(),
            Some(430_000),
        );

        assert_eq!(profile.population, 0);
        // Raw dominant keys, except the income bracket which is cleaned.
        assert_eq!(profile.dominant_age_group, "age_25_29");
        assert_eq!(profile.dominant_ethnic_group, "chinese");
        assert_eq!(profile.median_income_bracket, "Sgd 10000 To 10999");
        assert_eq!(profile.median_hdb_resale_4room, Some(430_000));
        assert_eq!(
            profile.summary,
            "Seletar has limited residential population data available."
        );
    }

    #[test]
    fn test_full_profile_cleans_labels() {
        let profile = assemble(
            "BEDOK",
            ProfileOutcome::from_stats(full_stats()),
            counts(),
            Some(580_000),
        );

        assert_eq!(profile.population, 277_540);
        assert_eq!(profile.dominant_age_group, "25-29");
        assert_eq!(profile.dominant_ethnic_group, "Chinese");
        assert_eq!(profile.dominant_dwelling_type, "4 Room Flats");
        assert_eq!(profile.primary_transport_mode, "Public Bus");
        assert_eq!(profile.owner_occupier_pct, 88.3);
        assert_eq!(profile.median_hdb_resale_4room, Some(580_000));
    }

    #[test]
    fn test_full_summary_sentence_order() {
        let profile = assemble(
            "BEDOK",
            ProfileOutcome::from_stats(full_stats()),
            counts(),
            Some(580_000),
        );

        assert_eq!(
            profile.summary,
            "Bedok has a population of ~277,540. \
             The largest age group is 25-29 (9%). \
             Ethnic mix: predominantly Chinese (71%). \
             Most common dwelling: 4 Room Flats (32%). \
             Median household income bracket: Sgd 10000 To 10999. \
             Primary commute mode: Public Bus (28%). \
             88% are owner-occupiers. \
             A 4-room HDB flat resells for ~$580,000. \
             Nearby amenities: 9 hawker centres, 24 supermarkets, 30 schools, 12 clinics."
        );
    }

    #[test]
    fn test_summary_omits_resale_and_zero_amenities() {
        let amenities = AmenityCounts {
            hawker: 0,
            supermarket: 3,
            school: 0,
            clinic: 1,
        };
        let profile = assemble(
            "BEDOK",
            ProfileOutcome::from_stats(full_stats()),
            amenities,
            None,
        );

        assert!(!profile.summary.contains("resells"));
        assert!(!profile.summary.contains("hawker"));
        assert!(
            profile
                .summary
                .ends_with("Nearby amenities: 3 supermarkets, 1 clinics.")
        );
    }

    #[test]
    fn test_summary_omits_amenity_sentence_when_all_zero() {
        let profile = assemble(
            "BEDOK",
            ProfileOutcome::from_stats(full_stats()),
            AmenityCounts::default(),
            None,
        );
        assert!(profile.summary.ends_with("88% are owner-occupiers."));
    }
}
