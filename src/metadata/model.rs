use serde::{Deserialize, Serialize};

/// Normalized metadata scraped from a third-party article or video page.
///
/// Every field defaults to the empty string; "not found" is never represented
/// as null. A record is built once per resolution call and returned as-is —
/// route handlers decide whether caller-supplied fields override it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub author: String,
    /// `YYYY-MM-DD HH:MM` in the resolver's fixed offset, or a verbatim
    /// ISO-8601 string when it came straight out of a meta tag. Empty when
    /// unresolved.
    pub publish_time: String,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.cover_image.is_empty()
            && self.author.is_empty()
            && self.publish_time.is_empty()
    }

    /// Field-by-field merge: existing non-empty values win, empty ones are
    /// taken from `other`.
    pub fn fill_missing_from(&mut self, other: PageMetadata) {
        if self.title.is_empty() {
            self.title = other.title;
        }
        if self.description.is_empty() {
            self.description = other.description;
        }
        if self.cover_image.is_empty() {
            self.cover_image = other.cover_image;
        }
        if self.author.is_empty() {
            self.author = other.author;
        }
        if self.publish_time.is_empty() {
            self.publish_time = other.publish_time;
        }
    }
}
