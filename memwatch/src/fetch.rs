//! HTTP fetcher for the mem-check endpoint, with a one-shot CORS-relay fallback.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{header::CONTENT_TYPE, Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::types::MemCheckResponse;

pub const DEFAULT_PROXY_BASE: &str = "https://api.allorigins.win/raw?url=";
const TIMEOUT_SECS: u64 = 10;

// encodeURIComponent leaves these unescaped
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch {url} directly and through proxy: {source}")]
    ProxyTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch memory data: HTTP {status}")]
    HttpStatus { status: StatusCode },
    #[error("response is not JSON (content-type: {})", .content_type.as_deref().unwrap_or("none"))]
    ContentType { content_type: Option<String> },
    #[error("malformed mem-check payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Anything that can produce a raw sample for a given endpoint.
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> Result<MemCheckResponse, FetchError>;
}

/// Relay URL for `target`: `proxy_base` + percent-encoded target.
pub fn proxy_url(proxy_base: &str, target: &str) -> String {
    format!("{proxy_base}{}", utf8_percent_encode(target, URI_COMPONENT))
}

pub fn is_json_content_type(v: Option<&str>) -> bool {
    v.and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    base_url: Url,
    proxy_base: Option<String>,
}

impl Fetcher {
    pub fn new(base_url: Url, proxy_base: Option<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            base_url,
            proxy_base,
        })
    }

    /// Absolute URL for `endpoint`; relative paths join onto the base URL.
    pub fn resolve(&self, endpoint: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(endpoint.trim())
            .map_err(|source| FetchError::InvalidUrl {
                url: endpoint.to_string(),
                source,
            })
    }

    // Only a network-level failure of the direct request goes through the relay.
    // Status and content-type failures are reported as-is.
    async fn get_with_fallback(&self, url: &Url) -> Result<Response, FetchError> {
        match self.client.get(url.as_str()).send().await {
            Ok(resp) => Ok(resp),
            Err(e) => {
                let Some(base) = self.proxy_base.as_deref() else {
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        source: e,
                    });
                };
                let relay = proxy_url(base, url.as_str());
                warn!(url = %url, error = %e, "direct fetch failed, retrying through proxy");
                self.client
                    .get(&relay)
                    .send()
                    .await
                    .map_err(|source| FetchError::ProxyTransport {
                        url: url.to_string(),
                        source,
                    })
            }
        }
    }
}

#[async_trait]
impl SampleSource for Fetcher {
    async fn fetch(&self, endpoint: &str) -> Result<MemCheckResponse, FetchError> {
        let url = self.resolve(endpoint)?;
        let resp = self.get_with_fallback(&url).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus { status });
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_json_content_type(content_type.as_deref()) {
            return Err(FetchError::ContentType { content_type });
        }

        let body = resp.bytes().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        let sample: MemCheckResponse = serde_json::from_slice(&body)?;
        debug!(url = %url, bytes = body.len(), "fetched mem-check sample");
        Ok(sample)
    }
}
