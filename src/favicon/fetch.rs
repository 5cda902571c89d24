use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client, Url};

use crate::config::HttpConfig;

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// URL after redirects.
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Fetched {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Transport used by the resolver. Implementations only fail on transport
/// errors; HTTP error statuses come back as a normal [`Fetched`].
pub trait Fetcher {
    async fn get(&self, url: &Url) -> std::result::Result<Fetched, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn get(&self, url: &Url) -> std::result::Result<Fetched, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(Fetched {
            url: final_url,
            status,
            content_type,
            body,
        })
    }
}
