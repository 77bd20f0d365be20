pub mod charset;
pub mod client;
pub mod errors;
pub mod types;

pub use client::{HttpFetcher, MOBILE_USER_AGENT, PageFetcher, fetch, resolve_final_url};
pub use errors::FetchError;
pub use types::{Charset, PageResponse};
