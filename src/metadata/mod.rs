//! Metadata extraction for third-party article and video URLs.
//!
//! Resolution is a cascade: detect the platform from the URL, expand short
//! links, fetch the page, try the platform-specific extractor, and finish
//! with the generic meta-tag extractors. Embedded JSON is authoritative when
//! present; everything after it exists as resilience against markup drift.
//! Only the network fetch can fail — every parse-level miss degrades to an
//! empty field.

pub mod bilibili;
pub mod decode;
pub mod douyin;
pub mod generic;
pub mod model;
pub mod source;
pub mod time;

pub use model::PageMetadata;
pub use source::Source;

use chrono::FixedOffset;
use tracing::{debug, instrument};

use crate::fetcher::{FetchError, PageFetcher};

/// Resolve a URL to a normalized metadata record.
///
/// Fails only when the content fetch itself fails; callers are expected to
/// treat that as best-effort and persist their entity with defaults.
#[instrument(skip(fetcher), fields(url = %url))]
pub async fn resolve(
    fetcher: &dyn PageFetcher,
    url: &str,
    offset: FixedOffset,
) -> Result<PageMetadata, FetchError> {
    let source = Source::detect(url);

    let target = if source.needs_redirect(url) {
        let expanded = fetcher.resolve_final_url(url).await;
        debug!(%expanded, "expanded short link");
        expanded
    } else {
        url.to_string()
    };

    let page = fetcher.fetch_page(&target).await?;
    let html = &page.text;

    let platform_record = match source {
        Source::Douyin => douyin::extract(html, offset),
        Source::Bilibili => bilibili::extract(html, offset),
        _ => None,
    };

    let mut record = platform_record.unwrap_or_default();
    if record.is_empty() {
        record.fill_missing_from(generic::extract_all(html, offset));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{Charset, PageResponse};
    use async_trait::async_trait;
    use chrono::Utc;
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use url::Url;

    struct StubFetcher {
        body: String,
        fail: bool,
        expanded_url: Option<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn serving(body: &str) -> Self {
            Self {
                body: body.to_string(),
                fail: false,
                expanded_url: None,
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                body: String::new(),
                fail: true,
                expanded_url: None,
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_page(&self, url: &str) -> Result<PageResponse, FetchError> {
            self.fetched.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(FetchError::RequestTimeout);
            }
            Ok(PageResponse {
                url_final: Url::parse("https://resolved.example/page").unwrap(),
                status: StatusCode::OK,
                text: self.body.clone(),
                charset: Charset::Utf8,
                fetched_at: Utc::now(),
            })
        }

        async fn resolve_final_url(&self, url: &str) -> String {
            self.expanded_url.clone().unwrap_or_else(|| url.to_string())
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let fetcher = StubFetcher::failing();
        let result = resolve(&fetcher, "https://example.com/x", utc()).await;
        assert!(matches!(result, Err(FetchError::RequestTimeout)));
    }

    #[tokio::test]
    async fn unrecognizable_page_yields_all_empty_record() {
        let fetcher = StubFetcher::serving("<html><body>nothing</body></html>");
        let record = resolve(&fetcher, "https://example.com/x", utc())
            .await
            .unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn douyin_url_dispatches_to_platform_extractor() {
        let fetcher = StubFetcher::serving(
            r#"<script>window._ROUTER_DATA = {"loaderData":{"k":{"aweme_detail":{
                "desc":"A douyin caption","author":{"nickname":"Bob"},
                "video":{"cover":{"url_list":["http://x/1.jpg"]}},
                "create_time":1700000000}}}}</script>"#,
        );
        let record = resolve(&fetcher, "https://www.douyin.com/video/1", utc())
            .await
            .unwrap();
        assert_eq!(record.title, "A douyin caption");
        assert_eq!(record.author, "Bob");
        assert_eq!(record.cover_image, "http://x/1.jpg");
        assert_eq!(record.publish_time, "2023-11-14 22:13");
    }

    #[tokio::test]
    async fn short_link_is_expanded_before_fetch() {
        let mut fetcher = StubFetcher::serving("<html></html>");
        fetcher.expanded_url = Some("https://www.douyin.com/video/42".to_string());
        resolve(&fetcher, "https://v.douyin.com/abc/", utc())
            .await
            .unwrap();
        assert_eq!(
            fetcher.fetched.lock().unwrap().as_slice(),
            ["https://www.douyin.com/video/42"]
        );
    }

    #[tokio::test]
    async fn full_urls_are_fetched_directly() {
        let fetcher = StubFetcher::serving("<html></html>");
        resolve(&fetcher, "https://www.bilibili.com/video/BV1", utc())
            .await
            .unwrap();
        assert_eq!(
            fetcher.fetched.lock().unwrap().as_slice(),
            ["https://www.bilibili.com/video/BV1"]
        );
    }

    #[tokio::test]
    async fn generic_extractors_back_up_platform_miss() {
        // Douyin URL but a page with nothing the platform extractor
        // recognizes, only Open Graph tags.
        let fetcher = StubFetcher::serving(
            r#"<meta property="og:title" content="OG backup title">
               <meta property="og:image" content="http://x/og.jpg">"#,
        );
        let record = resolve(&fetcher, "https://www.douyin.com/video/1", utc())
            .await
            .unwrap();
        assert_eq!(record.title, "OG backup title");
        assert_eq!(record.cover_image, "http://x/og.jpg");
    }
}
