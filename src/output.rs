//! Serialization of the final profile array.

use crate::profile::AreaProfile;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Writes the profile array as pretty-printed JSON to `path`, creating
/// parent directories as needed.
pub fn write_profiles(path: &Path, profiles: &[AreaProfile]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), profiles)?;

    info!(profiles = profiles.len(), path = %path.display(), "Area profiles written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{AmenityCounts, ProfileOutcome, assemble};
    use std::env;
    use std::fs;

    #[test]
    fn test_write_profiles_round_trips_schema() {
        let path = env::temp_dir().join("area_profiler_test_output/profiles.json");
        let _ = fs::remove_file(&path);

        let profiles = vec![assemble(
            "TUAS",
            ProfileOutcome::NonResidential,
            AmenityCounts::default(),
            None,
        )];
        write_profiles(&path, &profiles).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        let record = &parsed[0];

        assert_eq!(record["planning_area"], "TUAS");
        assert_eq!(record["population"], 0);
        assert_eq!(record["dominant_age_group"], "N/A");
        // Missing price serializes as an explicit null, not an absent field.
        assert!(record["median_hdb_resale_4room"].is_null());
        assert_eq!(record["hawker_centre_count"], 0);

        fs::remove_file(&path).unwrap();
    }
}
