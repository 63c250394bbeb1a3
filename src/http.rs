//! Common HTTP code

use std::time::Duration;

use anyhow::Context as _;
use const_format::formatcp;
use reqwest::Url;

/// User agent sent with every request
pub(crate) const USER_AGENT: &str = formatcp!(
    "{}/{} (https://github.com/lastgrid/lastgrid)",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_VERSION")
);

/// Total timeout for API requests
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Total timeout for a single artwork download
const ARTWORK_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP interface shared by the history fetcher and the collage compositor.
/// Cheap to clone, the inner client is reference counted.
#[derive(Clone)]
pub struct ApiHttpClient {
    /// Client
    client: reqwest::Client,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(API_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Send a GET request to URL, return the raw response body.
    /// The Last.fm API reports its own errors as a JSON payload with a
    /// non 2xx status, so the body is returned for any status and the caller
    /// decodes it.
    pub(crate) async fn get(&self, url: Url) -> anyhow::Result<Vec<u8>> {
        log::trace!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Internal HTTP error for URL {url:?}"))?;
        let data = response.bytes().await?;
        log::trace!("{}", String::from_utf8_lossy(&data));
        Ok(data.into())
    }

    /// Download an artwork image into memory
    pub(crate) async fn download_artwork(&self, url: Url) -> anyhow::Result<Vec<u8>> {
        log::debug!("Downloading {url}...");
        let response = self
            .client
            .get(url)
            .timeout(ARTWORK_TIMEOUT)
            .send()
            .await?;

        anyhow::ensure!(
            response.status().is_success(),
            "Request failed with status: {}",
            response.status()
        );

        Ok(response.bytes().await?.into())
    }
}
