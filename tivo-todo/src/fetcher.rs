use crate::types::{DigestError, FetchConfig, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Thin JSON-over-HTTP client shared by the schedule and spreadsheet sources.
/// One attempt per request; any failure is returned to the caller.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Joins `path` onto `base` and appends the query pairs.
    pub fn endpoint(base: &str, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/')))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, collaborator: &'static str, url: Url) -> Result<T> {
        let start_time = Instant::now();
        debug!("Fetching {} from {}", collaborator, redact(&url));

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::collaborator(
                collaborator,
                format!("HTTP {}: {}", status, status.canonical_reason().unwrap_or("Unknown")),
            ));
        }

        let body = response.text().await?;
        info!(
            "Fetched {} ({} bytes) in {}ms",
            redact(&url),
            body.len(),
            start_time.elapsed().as_millis()
        );

        serde_json::from_str(&body)
            .map_err(|e| DigestError::collaborator(collaborator, format!("unexpected response body: {}", e)))
    }
}

/// Hides the `key` query parameter in log output.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return shown.to_string();
    }
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
