use super::HttpClient;
use anyhow::Result;
use reqwest::{Method, Request, Response, StatusCode, Url};
use std::time::Duration;
use tracing::warn;

const MAX_ATTEMPTS: u32 = 3;

/// GETs `url`, retrying on HTTP 429 and 5xx with exponential backoff
/// (2 s, 4 s, 8 s).
///
/// Exhausting all attempts returns the last response unchanged;
/// callers must inspect the status before trusting the body. Transport
/// errors (DNS failure, timeout) are returned as `Err`.
pub async fn fetch_with_retry<C: HttpClient>(client: &C, url: Url) -> Result<Response> {
    let mut attempt = 0u32;
    loop {
        let resp = client.execute(Request::new(Method::GET, url.clone())).await?;
        let status = resp.status();
        let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
        if !retryable {
            return Ok(resp);
        }

        attempt += 1;
        let wait = Duration::from_secs(1u64 << attempt);
        warn!(%status, wait_secs = wait.as_secs(), url = %url, "Rate limited, backing off");
        tokio::time::sleep(wait).await;

        if attempt >= MAX_ATTEMPTS {
            return Ok(resp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::ScriptedClient;

    fn url() -> Url {
        "https://example.test/dataset".parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_through_429_and_500_to_success() {
        let client = ScriptedClient::statuses(&[429, 500, 200]);
        let resp = fetch_with_retry(&client, url()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_return_last_response() {
        let client = ScriptedClient::statuses(&[429, 429, 429]);
        let resp = fetch_with_retry(&client, url()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_status_returns_immediately() {
        let client = ScriptedClient::statuses(&[404]);
        let resp = fetch_with_retry(&client, url()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
