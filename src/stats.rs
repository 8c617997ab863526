//! Statistics over loosely-structured numeric records.
//!
//! Population dimension data arrives as flat category→count maps whose
//! values may be integers, floats, or numeric strings, mixed with
//! administrative keys. Everything here degrades instead of failing:
//! non-numeric values are skipped and empty inputs yield sentinel results.

use serde_json::{Map, Value};

/// One flat category→count record for a single area and dimension.
pub type DimensionRecord = Map<String, Value>;

/// Administrative keys present in every record, never aggregated.
pub const SKIP_KEYS: &[&str] = &["planning_area", "year", "gender"];

/// Exclusions for the dominant-category scan: administrative keys plus the
/// precomputed total row.
pub const DOMINANT_SKIP_KEYS: &[&str] = &["planning_area", "year", "gender", "total"];

/// The income dimension additionally excludes the no-working-person bucket
/// so a dormitory-heavy area does not report it as its income bracket.
pub const INCOME_SKIP_KEYS: &[&str] =
    &["planning_area", "year", "gender", "total", "no_working_person"];

fn is_excluded(key: &str, exclude: &[&str]) -> bool {
    let lower = key.to_lowercase();
    exclude.iter().any(|e| *e == lower)
}

fn as_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Finds the key with the highest numeric value across `records`.
///
/// Strict greater-than comparison means the first-seen key wins ties, and a
/// key whose value never exceeds zero can never win. Returns
/// `("Unknown", 0)` when no usable value exists.
pub fn find_dominant(records: &[DimensionRecord], exclude: &[&str]) -> (String, i64) {
    let mut best_key = String::from("Unknown");
    let mut best_val = 0i64;
    for record in records {
        for (key, value) in record {
            if is_excluded(key, exclude) {
                continue;
            }
            let Some(num) = as_count(value) else {
                continue;
            };
            if num > best_val {
                best_val = num;
                best_key = key.clone();
            }
        }
    }
    (best_key, best_val)
}

/// Computes what percentage `key` represents of the grand total of all
/// included values. Returns exactly `0.0` when the grand total is zero.
///
/// The key match is exact; only the exclusion check is case-insensitive.
pub fn compute_pct(records: &[DimensionRecord], key: &str, exclude: &[&str]) -> f64 {
    let mut key_total = 0i64;
    let mut grand_total = 0i64;
    for record in records {
        for (k, value) in record {
            if is_excluded(k, exclude) {
                continue;
            }
            let Some(num) = as_count(value) else {
                continue;
            };
            grand_total += num;
            if k == key {
                key_total += num;
            }
        }
    }
    if grand_total == 0 {
        0.0
    } else {
        key_total as f64 / grand_total as f64 * 100.0
    }
}

/// Sums every included value across the age-dimension records.
///
/// Excludes only the administrative keys — not `total` — so its exclusion
/// set is narrower than the dominant-key scan's.
pub fn total_population(age_records: &[DimensionRecord]) -> i64 {
    let mut total = 0i64;
    for record in age_records {
        for (key, value) in record {
            if is_excluded(key, SKIP_KEYS) {
                continue;
            }
            if let Some(num) = as_count(value) {
                total += num;
            }
        }
    }
    total
}

/// Percentage of dwellings whose tenancy key contains "owner"
/// (case-insensitive), rounded to one decimal place.
pub fn owner_occupier_pct(tenancy_records: &[DimensionRecord]) -> f64 {
    let mut owner = 0i64;
    let mut total = 0i64;
    for record in tenancy_records {
        for (key, value) in record {
            let Some(num) = as_count(value) else {
                continue;
            };
            if is_excluded(key, SKIP_KEYS) {
                continue;
            }
            total += num;
            if key.to_lowercase().contains("owner") {
                owner += num;
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        (owner as f64 / total as f64 * 1000.0).round() / 10.0
    }
}
