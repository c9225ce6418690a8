//! Object tags written alongside uploaded payloads.
//!
//! Tag sets are assembled once per request by upload path. Every set carries
//! `Content-Type` and `Filename`; the streaming path adds `Original-Size` and
//! `Upload-Timestamp`, the direct path may add an advisory `Original-MD5`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const FILENAME: &str = "Filename";
pub const ORIGINAL_SIZE: &str = "Original-Size";
pub const ORIGINAL_MD5: &str = "Original-MD5";
pub const UPLOAD_TIMESTAMP: &str = "Upload-Timestamp";

/// A name/value metadata pair attached to a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered tag list for one upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    /// Tags for an in-memory upload
    pub fn direct(content_type: &str, filename: &str, content_md5: Option<String>) -> Self {
        let mut tags = Self::base(content_type, filename);
        if let Some(md5) = content_md5 {
            tags.0.push(Tag::new(ORIGINAL_MD5, md5));
        }
        tags
    }

    /// Tags for an upload streamed from a staging file
    pub fn streaming(
        content_type: &str,
        filename: &str,
        original_size: u64,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        let mut tags = Self::base(content_type, filename);
        tags.0.push(Tag::new(ORIGINAL_SIZE, original_size.to_string()));
        tags.0.push(Tag::new(
            UPLOAD_TIMESTAMP,
            uploaded_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ));
        tags
    }

    fn base(content_type: &str, filename: &str) -> Self {
        TagSet(vec![
            Tag::new(CONTENT_TYPE, content_type),
            Tag::new(FILENAME, filename),
        ])
    }

    /// Value of the first tag named `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Base64-encoded JSON array, suitable for an HTTP header value.
    pub fn to_header_value(&self) -> String {
        // Serializing plain string pairs cannot fail.
        let json = serde_json::to_vec(&self.0).unwrap_or_default();
        STANDARD.encode(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_direct_tags() {
        let tags = TagSet::direct("text/plain", "test.txt", None);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get(CONTENT_TYPE), Some("text/plain"));
        assert_eq!(tags.get(FILENAME), Some("test.txt"));
        assert_eq!(tags.get(ORIGINAL_MD5), None);

        let hashed = TagSet::direct("text/plain", "test.txt", Some("abcd".to_string()));
        assert_eq!(hashed.get(ORIGINAL_MD5), Some("abcd"));
    }

    #[test]
    fn test_streaming_tags() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let tags = TagSet::streaming("video/mp4", "show.mp4", 2048, at);
        assert_eq!(tags.get(ORIGINAL_SIZE), Some("2048"));
        assert_eq!(tags.get(UPLOAD_TIMESTAMP), Some("2024-05-01T12:30:00.000Z"));
        assert_eq!(tags.get(ORIGINAL_MD5), None);
    }

    #[test]
    fn test_header_value_decodes_to_tag_array() {
        let tags = TagSet::direct("image/png", "a.png", None);
        let raw = STANDARD.decode(tags.to_header_value()).unwrap();
        let decoded: Vec<Tag> = serde_json::from_slice(&raw).unwrap();
        assert_eq!(decoded, tags.iter().cloned().collect::<Vec<_>>());
    }
}
