//! Planning-area boundary construction.
//!
//! Loads the subzone boundary FeatureCollection and dissolves it into one
//! polygon or multipolygon per planning area. The resulting map is built
//! once at startup and never mutated.

use anyhow::{Context, Result, anyhow};
use geo::{BooleanOps, MultiPolygon};
use geojson::GeoJson;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Planning-area name → dissolved boundary. A `BTreeMap` keeps iteration in
/// name order, so every point-in-polygon scan sees the same fixed sequence.
pub type AreaPolygons = BTreeMap<String, MultiPolygon<f64>>;

/// Canonical form of a planning-area name: trimmed and uppercased.
pub fn canonical_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Loads the subzone GeoJSON at `path` and dissolves its features into one
/// geometry per planning area, keyed by the `PLN_AREA_N` property.
///
/// Features with a missing or empty area name, or with a geometry that does
/// not convert to a polygon, are skipped.
pub fn build_area_polygons(path: &Path) -> Result<AreaPolygons> {
    let file = File::open(path)
        .with_context(|| format!("failed to open geometry file {}", path.display()))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse geometry file {}", path.display()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(anyhow!("geometry file must be a FeatureCollection"));
    };

    let mut grouped: BTreeMap<String, Vec<MultiPolygon<f64>>> = BTreeMap::new();
    for feature in collection.features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("PLN_AREA_N"))
            .and_then(|v| v.as_str())
            .map(canonical_name)
            .unwrap_or_default();
        if name.is_empty() {
            continue;
        }

        let Some(geometry) = feature.geometry else {
            continue;
        };
        match to_multi_polygon(&geometry.value) {
            Some(mp) => grouped.entry(name).or_default().push(mp),
            None => warn!(area = %name, "Skipping feature with unusable geometry"),
        }
    }

    let mut dissolved = AreaPolygons::new();
    for (name, geoms) in grouped {
        let mut iter = geoms.into_iter();
        let Some(first) = iter.next() else {
            continue;
        };
        let merged = iter.fold(first, |acc, g| acc.union(&g));
        dissolved.insert(name, merged);
    }

    debug!(areas = dissolved.len(), "Planning area polygons dissolved");
    Ok(dissolved)
}

fn to_multi_polygon(value: &geojson::Value) -> Option<MultiPolygon<f64>> {
    let geometry: geo::Geometry<f64> = value.try_into().ok()?;
    match geometry {
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Contains, Point};
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn unit_square(x0: f64, y0: f64) -> String {
        format!(
            r#"[[[{x0}, {y0}], [{x1}, {y0}], [{x1}, {y1}], [{x0}, {y1}], [{x0}, {y0}]]]"#,
            x0 = x0,
            y0 = y0,
            x1 = x0 + 1.0,
            y1 = y0 + 1.0,
        )
    }

    fn feature(name: &str, coords: &str) -> String {
        format!(
            r#"{{"type": "Feature",
                "properties": {{"PLN_AREA_N": "{name}"}},
                "geometry": {{"type": "Polygon", "coordinates": {coords}}}}}"#,
        )
    }

    fn write_collection(name: &str, features: &[String]) -> PathBuf {
        let path = temp_path(name);
        fs::write(
            &path,
            format!(
                r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
                features.join(",")
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("  bedok "), "BEDOK");
        assert_eq!(canonical_name("Ang Mo Kio"), "ANG MO KIO");
    }

    #[test]
    fn test_dissolve_merges_features_of_one_area() {
        let path = write_collection(
            "area_profiler_test_dissolve.geojson",
            &[
                feature("bedok", &unit_square(0.0, 0.0)),
                feature("BEDOK", &unit_square(1.0, 0.0)),
                feature("Tampines", &unit_square(5.0, 5.0)),
            ],
        );
        let polygons = build_area_polygons(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(polygons.len(), 2);
        let bedok = &polygons["BEDOK"];
        assert!(bedok.contains(&Point::new(0.5, 0.5)));
        assert!(bedok.contains(&Point::new(1.5, 0.5)));
        assert!(!bedok.contains(&Point::new(5.5, 5.5)));
        assert!(polygons["TAMPINES"].contains(&Point::new(5.5, 5.5)));
    }

    #[test]
    fn test_unusable_geometry_is_skipped() {
        let line = r#"{"type": "Feature",
            "properties": {"PLN_AREA_N": "BEDOK"},
            "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}"#;
        let path = write_collection(
            "area_profiler_test_skip_geom.geojson",
            &[line.to_string(), feature("TAMPINES", &unit_square(0.0, 0.0))],
        );
        let polygons = build_area_polygons(&path).unwrap();
        fs::remove_file(&path).unwrap();

        // The line-only area never produced a polygon, so it has no entry.
        assert_eq!(polygons.len(), 1);
        assert!(polygons.contains_key("TAMPINES"));
    }

    #[test]
    fn test_nameless_feature_is_skipped() {
        let anon = format!(
            r#"{{"type": "Feature", "properties": {{}},
                "geometry": {{"type": "Polygon", "coordinates": {}}}}}"#,
            unit_square(0.0, 0.0)
        );
        let path = write_collection("area_profiler_test_nameless.geojson", &[anon]);
        let polygons = build_area_polygons(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(polygons.is_empty());
    }

    #[test]
    fn test_non_feature_collection_is_an_error() {
        let path = temp_path("area_profiler_test_not_fc.geojson");
        fs::write(&path, r#"{"type": "Point", "coordinates": [103.8, 1.35]}"#).unwrap();
        let result = build_area_polygons(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
