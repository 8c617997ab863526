pub mod config;
pub mod datagov;
pub mod fetch;
pub mod geometry;
pub mod labels;
pub mod onemap;
pub mod output;
pub mod profile;
pub mod stats;
