//! Platform-agnostic field extractors.
//!
//! Each extractor is a pure function over the raw page text that walks an
//! ordered strategy table and returns the first non-empty, decoded match.
//! Empty string means "not found" — parse misses are never errors. These run
//! as the final fallback when no platform-specific extractor produced a
//! usable record.

use chrono::FixedOffset;
use regex::Regex;
use std::sync::LazyLock;

use super::decode::decode_entities;
use super::model::PageMetadata;
use super::time;

/// Title candidates at or below this many characters are treated as noise
/// and the next strategy is tried.
const MIN_TITLE_CHARS: usize = 3;

/// One way of locating a field inside raw HTML/JSON page text.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    /// `"key": "value"` inside any embedded JSON blob.
    JsonString(&'static str),
    /// `<meta property="…" content="…">`, tolerating either attribute order.
    MetaProperty(&'static str),
    /// `<meta name="…" content="…">`, tolerating either attribute order.
    MetaName(&'static str),
    /// The `<title>` element text.
    HtmlTitle,
}

/// (strategy, strip CN site suffix from the candidate)
const TITLE_STRATEGIES: &[(Strategy, bool)] = &[
    // Short-video pages use the caption ("desc") as the de-facto title.
    (Strategy::JsonString("desc"), false),
    (Strategy::MetaProperty("og:title"), true),
    (Strategy::HtmlTitle, true),
];

const AUTHOR_STRATEGIES: &[Strategy] = &[
    Strategy::JsonString("nickname"),
    Strategy::JsonString("unique_id"),
    Strategy::MetaProperty("video:director"),
    Strategy::MetaProperty("og:article:author"),
];

const DESCRIPTION_STRATEGIES: &[Strategy] = &[
    Strategy::MetaProperty("og:description"),
    Strategy::MetaName("description"),
];

const COVER_STRATEGIES: &[Strategy] = &[
    Strategy::MetaProperty("og:image"),
    Strategy::MetaProperty("og:video:image"),
];

static HTML_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>([^<]*)</title>").unwrap());

// "标题 - 抖音" and friends; everything from the separator on is dropped.
static SITE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\s*[-|·]\s*(?:抖音|今日头条|哔哩哔哩|bilibili|快手|西瓜视频).*").unwrap()
});

static CREATE_TIME_SECS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"create_time["']?\s*[:=]\s*["']?(\d{10})\b"#).unwrap());
static CREATE_TIME_MILLIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""create_time"\s*:\s*(\d{13})\b"#).unwrap());
// Timestamp buried in a percent-encoded blob: `publish_time%22%3A<secs>`.
static ENCODED_PUBLISH_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"publish_time%22%3A(\d{10})").unwrap());
static DATE_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[-/年](\d{1,2})[-/月](\d{1,2})").unwrap());

impl Strategy {
    fn apply(&self, html: &str) -> Option<String> {
        let raw = match self {
            Strategy::JsonString(key) => json_string_field(html, key)?,
            Strategy::MetaProperty(prop) => meta_content(html, "property", prop)?,
            Strategy::MetaName(name) => meta_content(html, "name", name)?,
            Strategy::HtmlTitle => HTML_TITLE_RE
                .captures(html)
                .map(|c| c[1].trim().to_string())?,
        };
        Some(decode_entities(raw.trim()))
    }
}

fn first_match(html: &str, strategies: &[Strategy]) -> String {
    strategies
        .iter()
        .filter_map(|s| s.apply(html))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Match a `<meta>` tag carrying `attr="key"`, in either attribute order.
/// Pages emitted by different template engines disagree on whether the
/// key or the content attribute comes first, so both patterns are tried.
pub(crate) fn meta_content(html: &str, attr: &str, key: &str) -> Option<String> {
    let key = regex::escape(key);
    let forward = Regex::new(&format!(
        r#"(?i)<meta[^>]*{attr}=["']{key}["'][^>]*content=["']([^"']+)["']"#
    ))
    .ok()?;
    if let Some(caps) = forward.captures(html) {
        return Some(caps[1].to_string());
    }
    let reversed = Regex::new(&format!(
        r#"(?i)<meta[^>]*content=["']([^"']+)["'][^>]*{attr}=["']{key}["']"#
    ))
    .ok()?;
    reversed.captures(html).map(|caps| caps[1].to_string())
}

/// First `"key": "value"` occurrence in any embedded JSON, escaped quotes
/// included in the value.
pub(crate) fn json_string_field(html: &str, key: &str) -> Option<String> {
    let pattern = format!(
        r#""{}"\s*:\s*"((?:[^"\\]|\\.)+)""#,
        regex::escape(key)
    );
    Regex::new(&pattern)
        .ok()?
        .captures(html)
        .map(|caps| caps[1].to_string())
}

pub fn extract_title(html: &str) -> String {
    for (strategy, strip_suffix) in TITLE_STRATEGIES {
        let Some(candidate) = strategy.apply(html) else {
            continue;
        };
        let title = if *strip_suffix {
            SITE_SUFFIX_RE.replace(&candidate, "").trim().to_string()
        } else {
            candidate
        };
        if title.chars().count() > MIN_TITLE_CHARS {
            return title;
        }
    }
    String::new()
}

pub fn extract_author(html: &str) -> String {
    first_match(html, AUTHOR_STRATEGIES)
}

pub fn extract_description(html: &str) -> String {
    first_match(html, DESCRIPTION_STRATEGIES)
}

pub fn extract_cover(html: &str) -> String {
    first_match(html, COVER_STRATEGIES)
}

/// Publish-time cascade. Embedded timestamps are normalized to
/// `YYYY-MM-DD HH:MM` in the given offset; an `article:published_time` meta
/// value passes through verbatim; bare date literals normalize to
/// `YYYY-MM-DD`.
pub fn extract_publish_time(html: &str, offset: FixedOffset) -> String {
    if let Some(caps) = CREATE_TIME_SECS_RE.captures(html)
        && let Ok(secs) = caps[1].parse::<i64>()
    {
        let formatted = time::format_unix_seconds(secs, offset);
        if !formatted.is_empty() {
            return formatted;
        }
    }

    if let Some(value) = meta_content(html, "property", "article:published_time") {
        return value;
    }

    if let Some(caps) = ENCODED_PUBLISH_TIME_RE.captures(html)
        && let Ok(secs) = caps[1].parse::<i64>()
    {
        let formatted = time::format_unix_seconds(secs, offset);
        if !formatted.is_empty() {
            return formatted;
        }
    }

    if let Some(caps) = CREATE_TIME_MILLIS_RE.captures(html)
        && let Ok(millis) = caps[1].parse::<i64>()
    {
        let formatted = time::format_unix_millis(millis, offset);
        if !formatted.is_empty() {
            return formatted;
        }
    }

    if let Some(caps) = DATE_LITERAL_RE.captures(html) {
        return format!(
            "{}-{:0>2}-{:0>2}",
            &caps[1],
            &caps[2],
            &caps[3]
        );
    }

    String::new()
}

/// Run every generic extractor over the page. Fields are filled
/// independently; whatever is not found stays empty.
pub fn extract_all(html: &str, offset: FixedOffset) -> PageMetadata {
    PageMetadata {
        title: extract_title(html),
        description: extract_description(html),
        cover_image: extract_cover(html),
        author: extract_author(html),
        publish_time: extract_publish_time(html, offset),
    }
}
