//! Bilibili page extractor.
//!
//! Video pages embed a `window.__INITIAL_STATE__` object. Its layout has
//! drifted across site revisions, so the video record is looked for both at
//! the root and nested one level under any top-level key. When the state
//! object is absent or unparsable, a raw-markup pass reconstructs what it can
//! from the `<title>` tag and loose JSON fields.

use chrono::FixedOffset;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use super::decode::decode_entities;
use super::generic::{json_string_field, meta_content};
use super::model::PageMetadata;
use super::time;

static INITIAL_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.+?\});\s*(?:</script>|$)").unwrap()
});

// "标题 - UP主 - 哔哩哔哩" → drop everything from the segment naming the site.
static TITLE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\s*[-_|—]\s*[^-_|—]*(?:哔哩哔哩|bilibili|B站).*").unwrap()
});
static TITLE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[-_|—]\s*").unwrap());

static HTML_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").unwrap());
static OWNER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""owner"\s*:\s*\{\s*"name"\s*:\s*"([^"]+)""#).unwrap());
static PUBDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""pubdate"\s*:\s*(\d+)"#).unwrap());
static PTIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""ptime"\s*:\s*(\d+)"#).unwrap());

/// Key names the video record may hide behind at the state root.
const ROOT_KEYS: &[&str] = &["videoData", "videoInfo", "uplayerView"];

pub fn extract(html: &str, offset: FixedOffset) -> Option<PageMetadata> {
    if let Some(record) = from_initial_state(html, offset) {
        return Some(record);
    }
    fallback_scan(html, offset)
}

fn from_initial_state(html: &str, offset: FixedOffset) -> Option<PageMetadata> {
    let caps = INITIAL_STATE_RE.captures(html)?;
    let json_text = caps[1].replace('\n', "");
    let root: Value = match serde_json::from_str(&json_text) {
        Ok(v) => v,
        Err(err) => {
            debug!(%err, "initial state blob is not valid JSON");
            return None;
        }
    };

    let video = find_video_record(&root)?;

    let title = str_field(video, "title");
    let description = non_empty(str_field(video, "desc")).unwrap_or_else(|| str_field(video, "description"));
    let cover = non_empty(str_field(video, "pic")).unwrap_or_else(|| str_field(video, "cover"));
    let author = author_from_record(video);
    let publish_time = video
        .get("pubdate")
        .or_else(|| video.get("ptime"))
        .and_then(Value::as_i64)
        .map(|secs| time::format_unix_seconds(secs, offset))
        .unwrap_or_default();

    Some(PageMetadata {
        title,
        description,
        cover_image: cover,
        author,
        publish_time,
    })
}

fn find_video_record(root: &Value) -> Option<&Value> {
    if let Some(object) = root.as_object() {
        for entry in object.values() {
            if let Some(data) = entry.get("videoData") {
                return Some(data);
            }
            if let Some(data) = entry.get("view") {
                return Some(data);
            }
        }
    }
    ROOT_KEYS.iter().find_map(|key| root.get(key))
}

fn author_from_record(video: &Value) -> String {
    let candidates = [
        video.pointer("/owner/name"),
        video.pointer("/author/name"),
        video.get("up_name"),
        video.pointer("/staff/0/name"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Markup-level pass. Returns a record only when at least one of title,
/// cover, or author could be recovered.
fn fallback_scan(html: &str, offset: FixedOffset) -> Option<PageMetadata> {
    let mut title = String::new();
    let mut author = String::new();

    if let Some(caps) = HTML_TITLE_RE.captures(html) {
        let raw = decode_entities(caps[1].trim());
        let stripped = TITLE_SUFFIX_RE.replace(&raw, "");
        let parts: Vec<&str> = TITLE_SPLIT_RE
            .split(stripped.trim())
            .filter(|p| !p.is_empty())
            .collect();
        if let Some(first) = parts.first() {
            title = first.trim().to_string();
        }
        // A trailing segment is conventionally the uploader name.
        if parts.len() > 1
            && let Some(last) = parts.last()
        {
            author = last.trim().to_string();
        }
    }

    let mut cover = json_string_field(html, "pic")
        .map(|s| decode_entities(&s))
        .unwrap_or_default();
    if cover.is_empty() {
        cover = json_string_field(html, "cover")
            .map(|s| decode_entities(&s))
            .unwrap_or_default();
    }
    if cover.is_empty() {
        cover = meta_content(html, "property", "og:image").unwrap_or_default();
    }

    if author.is_empty()
        && let Some(caps) = OWNER_NAME_RE.captures(html)
    {
        author = decode_entities(&caps[1]);
    }
    if author.is_empty() {
        author = json_string_field(html, "up_name")
            .map(|s| decode_entities(&s))
            .unwrap_or_default();
    }
    if author.is_empty() {
        author = json_string_field(html, "author")
            .map(|s| decode_entities(&s))
            .unwrap_or_default();
    }

    let description = json_string_field(html, "desc")
        .map(|s| decode_entities(&s))
        .unwrap_or_default();

    let publish_time = PUBDATE_RE
        .captures(html)
        .or_else(|| PTIME_RE.captures(html))
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .map(|secs| time::format_unix_seconds(secs, offset))
        .unwrap_or_default();

    if title.is_empty() && cover.is_empty() && author.is_empty() {
        return None;
    }

    debug!(
        has_title = !title.is_empty(),
        has_author = !author.is_empty(),
        has_cover = !cover.is_empty(),
        "bilibili markup fallback hit"
    );

    Some(PageMetadata {
        title,
        description,
        cover_image: cover,
        author,
        publish_time,
    })
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
