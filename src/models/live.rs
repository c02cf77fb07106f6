use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a live article, as persisted. Order is array position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveUpdate {
    #[serde(default)]
    pub content_title: String,
    #[serde(default)]
    pub content_description: String,
    #[serde(default)]
    pub content_detail: String,
    #[serde(rename = "isKey", default, deserialize_with = "super::de::loose_bool")]
    pub is_key: bool,
    #[serde(default = "Utc::now")]
    pub content_published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LiveUpdate {
    /// Plain text rendering of the rich detail, for terminal previews.
    pub fn detail_text(&self, width: usize) -> String {
        html2text::from_read(self.content_detail.as_bytes(), width.max(10))
            .unwrap_or_else(|_| self.content_detail.clone())
    }
}
