//! data.gov.sg open-dataset access.
//!
//! Two access patterns per dataset: row-oriented datastore search
//! ([`datastore`]) and the poll-download indirection that yields bulk
//! GeoJSON payloads ([`download`]). [`amenities`] chains both into the
//! point-in-polygon join; [`resale`] paginates the resale-price dataset
//! into per-town medians.

pub mod amenities;
pub mod datastore;
pub mod download;
pub mod resale;
