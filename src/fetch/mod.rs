//! HTTP plumbing shared by every remote source.
//!
//! [`HttpClient`] is the seam all network code is written against so tests
//! can substitute a scripted client. [`fetch_with_retry`] implements the
//! bounded-backoff policy for the rate-limited open-data endpoints.

mod client;
mod retry;

pub use client::{BasicClient, Bearer, HttpClient};
pub use retry::fetch_with_retry;

use reqwest::{Method, Request, Response, Url};

/// Issues a single GET for `url` through `client`.
pub async fn get<C: HttpClient>(client: &C, url: Url) -> reqwest::Result<Response> {
    client.execute(Request::new(Method::GET, url)).await
}
