use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct TokenRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// OneMap credentials read from the environment.
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Reads `ONEMAP_EMAIL` and `ONEMAP_PASSWORD`. Missing or empty values
    /// abort the run — nothing downstream can proceed without a token.
    pub fn from_env() -> Result<Self> {
        let email = std::env::var("ONEMAP_EMAIL").unwrap_or_default();
        let password = std::env::var("ONEMAP_PASSWORD").unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            bail!("ONEMAP_EMAIL and ONEMAP_PASSWORD env vars must be set");
        }
        Ok(Self { email, password })
    }
}

/// Exchanges credentials for a bearer token.
///
/// Any failure here — transport error, non-success status, empty token —
/// is fatal to the pipeline. There is no retry: components downstream must
/// never depend on re-authenticating mid-run.
pub async fn get_token(auth_url: &str, creds: &Credentials) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let response = client
        .post(auth_url)
        .json(&TokenRequest {
            email: creds.email.clone(),
            password: creds.password.clone(),
        })
        .send()
        .await
        .context("failed to send token request")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        bail!("OneMap auth returned {status}: {body}");
    }

    let token: TokenResponse = response
        .json()
        .await
        .context("failed to parse token response")?;

    if token.access_token.is_empty() {
        bail!("OneMap auth succeeded but returned no access token");
    }

    Ok(token.access_token)
}
