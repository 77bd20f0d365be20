use regex::{Captures, Regex};
use std::sync::LazyLock;

static NAMED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&(amp|lt|gt|nbsp|copy|reg);").unwrap());

static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&quot;|&#34;|&#x22;").unwrap());

// Artifacts of the upstream templating layer escaping an already-escaped
// string. `\x26quot;` has to go before the bare `\x26`.
static DOUBLE_ESCAPED_QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\\x26quot;"#).unwrap());
static DOUBLE_ESCAPED_AMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\\x26"#).unwrap());

static APOS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&#39;|&#x27;").unwrap());

static DEC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());
static HEX_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&#x([0-9a-f]+);").unwrap());

/// Reverse HTML-entity escaping in extracted text. Total: never fails, and
/// text without entity sequences passes through untouched, which also makes
/// the function idempotent on its own output.
///
/// The pass order is fixed so that later rules cannot reintroduce characters
/// an earlier rule just produced: named entities, quote variants (including
/// the templating double-escape), apostrophes, then the generic decimal and
/// hex forms.
pub fn decode_entities(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let s = NAMED_RE.replace_all(s, |caps: &Captures| {
        match caps[1].to_ascii_lowercase().as_str() {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "nbsp" => " ",
            "copy" => "©",
            "reg" => "®",
            _ => unreachable!(),
        }
        .to_string()
    });

    let s = QUOTE_RE.replace_all(&s, "\"");
    let s = DOUBLE_ESCAPED_QUOTE_RE.replace_all(&s, "\"");
    let s = DOUBLE_ESCAPED_AMP_RE.replace_all(&s, "&");

    let s = APOS_RE.replace_all(&s, "'");

    let s = DEC_ENTITY_RE.replace_all(&s, |caps: &Captures| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    let s = HEX_ENTITY_RE.replace_all(&s, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    s.into_owned()
}

/// Reverse the Unicode escapes short-video pages leave inside JSON string
/// values for URL characters. Applied to extracted URL fields so the stored
/// link is usable as-is.
pub fn decode_json_escapes(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    s.replace("\\u002F", "/")
        .replace("\\u003F", "?")
        .replace("\\u003D", "=")
        .replace("\\u0026", "&")
        .replace("\\u0023", "#")
        .replace("\\u0025", "%")
}
