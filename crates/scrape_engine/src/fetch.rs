use std::sync::OnceLock;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

use crate::decode::decode_body;
use crate::{ErrorKind, FetchMetadata, RawPage, ScrapeError};

/// Read-only settings shared by every fetch.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Deadline for one url, connect through last body byte.
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 10,
            max_bytes: 10 * 1024 * 1024,
            user_agent: concat!("page-scrape/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawPage, ScrapeError>;
}

/// Shares one pooled client across every fetch, built on first use.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: OnceLock<Result<reqwest::Client, ScrapeError>>,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            settings,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&reqwest::Client, ScrapeError> {
        self.client
            .get_or_init(|| self.build_client())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn build_client(&self) -> Result<reqwest::Client, ScrapeError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .user_agent(self.settings.user_agent.as_str())
            .build()
            .map_err(|err| request_error(&err))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<RawPage, ScrapeError> {
        scrape_info!("fetching {}", url);
        let result = self.fetch_inner(url).await;
        if let Err(err) = &result {
            scrape_warn!("fetch failed for {}: {} ({})", url, err.kind, err.message);
        }
        result
    }
}

impl ReqwestFetcher {
    async fn fetch_inner(&self, url: &str) -> Result<RawPage, ScrapeError> {
        let parsed = url::Url::parse(url).map_err(|err| {
            ScrapeError::new(
                ErrorKind::Request,
                format!("An error occurred: invalid url {url:?}: {err}"),
            )
        })?;
        let response = self
            .client()?
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(http_error(status, &final_url));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        let decoded = decode_body(&bytes, content_type.as_deref());
        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url,
            status: status.as_u16(),
            content_type,
            byte_len: bytes.len() as u64,
            encoding_label: decoded.encoding_label,
        };
        scrape_debug!(
            "fetched {} -> {} status={} bytes={} encoding={}",
            metadata.original_url,
            metadata.final_url,
            metadata.status,
            metadata.byte_len,
            metadata.encoding_label
        );

        Ok(RawPage {
            text: decoded.text,
            metadata,
        })
    }
}

/// `404 Client Error: Not Found for url: ...`
fn http_error(status: StatusCode, url: &str) -> ScrapeError {
    let class = if status.is_client_error() {
        "Client Error"
    } else if status.is_server_error() {
        "Server Error"
    } else {
        "Unexpected Status"
    };
    let reason = status.canonical_reason().unwrap_or("Unknown");
    ScrapeError::new(
        ErrorKind::Http {
            status: status.as_u16(),
        },
        format!(
            "HTTP error occurred: {} {class}: {reason} for url: {url}",
            status.as_u16()
        ),
    )
}

fn too_large(max_bytes: u64) -> ScrapeError {
    ScrapeError::new(
        ErrorKind::Request,
        format!("An error occurred: response body exceeds {max_bytes} bytes"),
    )
}

fn request_error(err: &reqwest::Error) -> ScrapeError {
    ScrapeError::new(ErrorKind::Request, format!("An error occurred: {err}"))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ScrapeError {
    // A connect timeout reports both flags; the deadline is the better diagnosis.
    if err.is_timeout() {
        return ScrapeError::new(
            ErrorKind::Timeout,
            "The request timed out. Please try again later.",
        );
    }
    if err.is_connect() {
        return ScrapeError::new(
            ErrorKind::Connection,
            "Failed to connect to the URL. Please check your internet connection or the URL.",
        );
    }
    if err.is_builder() || err.is_request() || err.is_redirect() || err.is_body() || err.is_decode()
    {
        return request_error(&err);
    }
    ScrapeError::new(
        ErrorKind::Unexpected,
        format!("An unexpected error occurred: {err}"),
    )
}
