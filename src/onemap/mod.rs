//! OneMap population API access.
//!
//! [`auth`] performs the one-shot credential exchange — the pipeline's only
//! fatal failure path. [`population`] fetches per-area demographic
//! dimension data and normalizes the API's inconsistent response shapes.

pub mod auth;
pub mod population;
