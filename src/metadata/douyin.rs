//! Douyin page extractor.
//!
//! Douyin detail pages ship their data in a `window._ROUTER_DATA` blob
//! rendered for the client-side router. When present and parseable that blob
//! is authoritative; otherwise a raw-text regex pass over the page body is
//! attempted. A parse failure is never an error — the caller falls back to
//! the generic extractors.

use chrono::FixedOffset;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use super::decode::{decode_entities, decode_json_escapes};
use super::generic::json_string_field;
use super::model::PageMetadata;
use super::time;

static ROUTER_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)window\._ROUTER_DATA\s*=\s*(\{.+?\})\s*</script>").unwrap());

/// Cover image candidate paths inside `aweme_detail`, tried in order.
const COVER_PATHS: &[&[&str]] = &[
    &["video", "cover", "url_list"],
    &["cover", "url_list"],
    &["video", "origin_cover", "url_list"],
    &["video", "dynamic_cover", "url_list"],
];

static COVER_URL_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""cover"\s*:\s*\{[^}]*"url_list"\s*:\s*\[([^\]]+)\]"#).unwrap()
});
static FIRST_STRING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());
static WEBP_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""url"\s*:\s*"([^"]*\.webp[^"]*)""#).unwrap());
static CREATE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""create_time"\s*:\s*(\d{10})\b"#).unwrap());

pub fn extract(html: &str, offset: FixedOffset) -> Option<PageMetadata> {
    if let Some(record) = from_router_data(html, offset) {
        return Some(record);
    }
    fallback_scan(html, offset)
}

fn from_router_data(html: &str, offset: FixedOffset) -> Option<PageMetadata> {
    let caps = ROUTER_DATA_RE.captures(html)?;
    let json_text = caps[1].replace('\n', "");
    let root: Value = match serde_json::from_str(&json_text) {
        Ok(v) => v,
        Err(err) => {
            debug!(%err, "router data blob is not valid JSON");
            return None;
        }
    };

    // loaderData is keyed by route id; the shape we want can hang off any of
    // them.
    let loader = root.get("loaderData")?.as_object()?;
    for entry in loader.values() {
        if let Some(detail) = entry.get("aweme_detail") {
            return Some(from_aweme_detail(detail, offset));
        }
        if let Some(note) = entry.pointer("/noteInfo/note") {
            return Some(from_note(note, offset));
        }
    }
    None
}

/// Short-video record: the caption (`desc`) doubles as title and description.
fn from_aweme_detail(detail: &Value, offset: FixedOffset) -> PageMetadata {
    let desc = str_at(detail, &["desc"]).unwrap_or_default();

    let mut cover = COVER_PATHS
        .iter()
        .find_map(|path| first_url(detail, path))
        .unwrap_or_default();
    if cover.is_empty()
        && let Some(plain) = str_at(detail, &["video", "cover"])
    {
        cover = plain.to_string();
    }

    let author = str_at(detail, &["author", "nickname"])
        .or_else(|| str_at(detail, &["author", "unique_id"]))
        .unwrap_or_default();

    let publish_time = detail
        .get("create_time")
        .and_then(Value::as_i64)
        .map(|secs| time::format_unix_seconds(secs, offset))
        .unwrap_or_default();

    PageMetadata {
        title: desc.to_string(),
        description: desc.to_string(),
        cover_image: cover,
        author: author.to_string(),
        publish_time,
    }
}

/// Image-gallery ("note") record. `createTime` is already in milliseconds.
fn from_note(note: &Value, offset: FixedOffset) -> PageMetadata {
    let title = str_at(note, &["title"])
        .filter(|t| !t.is_empty())
        .or_else(|| str_at(note, &["desc"]))
        .unwrap_or_default();
    let desc = str_at(note, &["desc"]).unwrap_or_default();

    let cover = note
        .pointer("/imageList/0/urlList/0")
        .and_then(Value::as_str)
        .map(decode_json_escapes)
        .unwrap_or_default();

    let author = str_at(note, &["authorInfo", "nickname"]).unwrap_or_default();

    let publish_time = note
        .get("createTime")
        .and_then(Value::as_i64)
        .map(|millis| time::format_unix_millis(millis, offset))
        .unwrap_or_default();

    PageMetadata {
        title: title.to_string(),
        description: desc.to_string(),
        cover_image: cover,
        author: author.to_string(),
        publish_time,
    }
}

/// Raw-text pass for pages where the router blob is missing or truncated.
/// Only counts as a hit if a title or cover image was recovered.
fn fallback_scan(html: &str, offset: FixedOffset) -> Option<PageMetadata> {
    let title = json_string_field(html, "desc")
        .map(|s| decode_entities(&s))
        .unwrap_or_default();
    let author = json_string_field(html, "nickname")
        .map(|s| decode_entities(&s))
        .unwrap_or_default();

    let mut cover = COVER_URL_LIST_RE
        .captures(html)
        .and_then(|caps| {
            FIRST_STRING_RE
                .captures(&caps[1])
                .map(|first| decode_json_escapes(&first[1]))
        })
        .unwrap_or_default();
    if cover.is_empty()
        && let Some(caps) = WEBP_URL_RE.captures(html)
    {
        cover = decode_json_escapes(&caps[1]);
    }

    let publish_time = CREATE_TIME_RE
        .captures(html)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .map(|secs| time::format_unix_seconds(secs, offset))
        .unwrap_or_default();

    if title.is_empty() && cover.is_empty() {
        return None;
    }

    debug!(
        has_title = !title.is_empty(),
        has_author = !author.is_empty(),
        has_cover = !cover.is_empty(),
        "douyin raw-text fallback hit"
    );

    Some(PageMetadata {
        description: title.clone(),
        title,
        cover_image: cover,
        author,
        publish_time,
    })
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str()
}

fn first_url(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current
        .get(0)
        .and_then(Value::as_str)
        .map(decode_json_escapes)
}
