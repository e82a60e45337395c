//! Async HTTP fetch layer wrapping reqwest.
//!
//! Not a browser — plain GETs with redirect following, issued under a
//! [`ClientProfile`] so the server decides which markup variant to serve.
//! The `PageFetcher` trait is the seam the pipeline is tested through:
//! production uses [`HttpFetcher`], tests inject canned responses.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::config::ClientProfile;

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Original requested URL.
    pub url: String,
    /// Final URL after the redirect chain.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// Outbound fetch surface used by the resolver and collector.
///
/// Every method is best-effort from the caller's point of view: errors are
/// logged and treated as "no contribution", never propagated to the user.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` following redirects and report the final effective URL.
    async fn final_url(
        &self,
        url: &str,
        profile: &ClientProfile,
        timeout: Duration,
    ) -> Result<String>;

    /// GET `url` following redirects and return the page text.
    async fn get_text(
        &self,
        url: &str,
        profile: &ClientProfile,
        timeout: Duration,
    ) -> Result<FetchedPage>;

    /// GET `url` and parse the body as JSON. Non-2xx is an error.
    async fn get_json(
        &self,
        url: &str,
        profile: &ClientProfile,
        timeout: Duration,
    ) -> Result<serde_json::Value>;
}

/// Production fetcher backed by reqwest.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with redirect following enabled. No default headers:
    /// the identity triple is attached per request from the profile.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    fn request(
        &self,
        url: &str,
        profile: &ClientProfile,
        timeout: Duration,
    ) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .timeout(timeout)
            .header(reqwest::header::USER_AGENT, &profile.user_agent)
            .header(reqwest::header::ACCEPT_LANGUAGE, &profile.accept_language)
            .header(reqwest::header::REFERER, &profile.referer)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn final_url(
        &self,
        url: &str,
        profile: &ClientProfile,
        timeout: Duration,
    ) -> Result<String> {
        let resp = self.request(url, profile, timeout).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("GET {url} returned {status}"));
        }
        Ok(resp.url().to_string())
    }

    async fn get_text(
        &self,
        url: &str,
        profile: &ClientProfile,
        timeout: Duration,
    ) -> Result<FetchedPage> {
        let resp = self.request(url, profile, timeout).send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp.text().await.unwrap_or_default();
        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status,
            body,
        })
    }

    async fn get_json(
        &self,
        url: &str,
        profile: &ClientProfile,
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let resp = self.request(url, profile, timeout).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("GET {url} returned {status}"));
        }
        Ok(resp.json().await?)
    }
}
