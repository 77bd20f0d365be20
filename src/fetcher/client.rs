use crate::fetcher::{charset, errors::FetchError, types::PageResponse};
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB

/// The supported platforms serve markedly different markup per user agent;
/// the mobile Safari string gets the lightweight pages whose embedded JSON
/// the extractors understand.
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(15))
        .user_agent(MOBILE_USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers({
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                    .parse()
                    .unwrap(),
            );
            headers.insert(
                reqwest::header::ACCEPT_LANGUAGE,
                "zh-CN,zh;q=0.9,en;q=0.8".parse().unwrap(),
            );
            headers
        })
        .build()
        .expect("Failed to build HTTP client")
});

/// The network capability the metadata orchestrator works against. Injected
/// rather than captured ambiently so tests can substitute a stub.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<PageResponse, FetchError>;

    /// Expand a short link by following redirects. Best-effort: any failure
    /// yields the input URL unchanged, never an error.
    async fn resolve_final_url(&self, url: &str) -> String;
}

/// Production fetcher over the shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher;

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<PageResponse, FetchError> {
        fetch(url).await
    }

    async fn resolve_final_url(&self, url: &str) -> String {
        resolve_final_url(url).await
    }
}

#[instrument(skip_all, fields(url = %url))]
pub async fn fetch(url: &str) -> Result<PageResponse, FetchError> {
    let parsed_url = url::Url::parse(url)?;

    let response = HTTP_CLIENT
        .get(parsed_url)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let url_final = response.url().clone();
    let status = response.status();

    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    let body_bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Io(e.to_string()))?;

    // Content-Length can be absent; enforce the cap after download too.
    if body_bytes.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
    }

    let charset = charset::detect(&content_type, &body_bytes);
    let text = charset::to_utf8(&body_bytes, &charset)?;

    Ok(PageResponse {
        url_final,
        status,
        text,
        charset,
        fetched_at: Utc::now(),
    })
}

/// Redirect-following HEAD, falling back to GET for servers that reject
/// HEAD. Returns the input on double failure — short-link expansion is an
/// optimization, not a requirement.
#[instrument(skip_all, fields(url = %url))]
pub async fn resolve_final_url(url: &str) -> String {
    match HTTP_CLIENT.head(url).send().await {
        Ok(response) => response.url().to_string(),
        Err(head_err) => {
            debug!(%head_err, "HEAD failed, retrying redirect resolution with GET");
            match HTTP_CLIENT.get(url).send().await {
                Ok(response) => response.url().to_string(),
                Err(get_err) => {
                    debug!(%get_err, "redirect resolution failed, keeping original url");
                    url.to_string()
                }
            }
        }
    }
}
