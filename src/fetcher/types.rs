use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

/// Character encoding a page body arrived in. CN platforms still serve a mix
/// of UTF-8 and GBK, so the fetcher records what it transcoded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    Utf8,
    Windows1252,
    ShiftJis,
    Gbk,
    Big5,
    Other(String),
}

impl Charset {
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Self {
        use std::ptr;

        if ptr::eq(encoding, encoding_rs::UTF_8) {
            Self::Utf8
        } else if ptr::eq(encoding, encoding_rs::WINDOWS_1252) {
            Self::Windows1252
        } else if ptr::eq(encoding, encoding_rs::SHIFT_JIS) {
            Self::ShiftJis
        } else if ptr::eq(encoding, encoding_rs::GBK) || ptr::eq(encoding, encoding_rs::GB18030) {
            Self::Gbk
        } else if ptr::eq(encoding, encoding_rs::BIG5) {
            Self::Big5
        } else {
            Self::Other(encoding.name().to_string())
        }
    }
}

/// A fetched page. Transient: owned by a single extraction call, never cached
/// or persisted.
#[derive(Debug)]
pub struct PageResponse {
    /// URL after redirects, which is what extracted data is attributed to.
    pub url_final: Url,
    pub status: StatusCode,
    /// Body transcoded to UTF-8.
    pub text: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}
