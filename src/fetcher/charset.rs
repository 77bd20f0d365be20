//! Charset sniffing and UTF-8 transcoding for fetched pages.
//!
//! Order of trust: Content-Type header, `<meta charset>` / http-equiv inside
//! the first 4 KB, then chardetng's statistical guess. GBK pages without any
//! declaration are common enough among the supported platforms that the
//! heuristic pass earns its keep.

use crate::fetcher::{errors::FetchError, types::Charset};
use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;

static HEADER_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

pub fn detect(content_type: &str, body: &[u8]) -> Charset {
    if let Some(encoding) = label_from(HEADER_CHARSET_RE.captures(content_type)) {
        return Charset::from_encoding(encoding);
    }

    let head = &body[..body.len().min(4096)];
    let head_str = String::from_utf8_lossy(head);

    if let Some(encoding) = label_from(META_CHARSET_RE.captures(&head_str)) {
        return Charset::from_encoding(encoding);
    }
    if let Some(encoding) = label_from(META_HTTP_EQUIV_RE.captures(&head_str)) {
        return Charset::from_encoding(encoding);
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, false);
    Charset::from_encoding(detector.guess(None, true))
}

fn label_from(captures: Option<regex::Captures<'_>>) -> Option<&'static Encoding> {
    let label = captures?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

pub fn to_utf8(body: &[u8], charset: &Charset) -> Result<String, FetchError> {
    let encoding = match charset {
        Charset::Utf8 => encoding_rs::UTF_8,
        Charset::Windows1252 => encoding_rs::WINDOWS_1252,
        Charset::ShiftJis => encoding_rs::SHIFT_JIS,
        Charset::Gbk => encoding_rs::GBK,
        Charset::Big5 => encoding_rs::BIG5,
        Charset::Other(name) => Encoding::for_label(name.as_bytes()).unwrap_or(encoding_rs::UTF_8),
    };

    let (decoded, _, had_errors) = encoding.decode(body);
    if had_errors {
        return Err(FetchError::Charset(format!(
            "undecodable bytes for declared encoding {}",
            encoding.name()
        )));
    }
    Ok(decoded.into_owned())
}
