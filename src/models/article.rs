use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de;
use super::live::LiveUpdate;
use super::section::SectionRef;

/// Body of an article: rich text for regular articles, an ordered list of
/// updates for live coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleContent {
    Updates(Vec<LiveUpdate>),
    Html(String),
}

impl Default for ArticleContent {
    fn default() -> Self {
        ArticleContent::Html(String::new())
    }
}

impl ArticleContent {
    pub fn updates(&self) -> &[LiveUpdate] {
        match self {
            ArticleContent::Updates(updates) => updates,
            ArticleContent::Html(_) => &[],
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            ArticleContent::Html(html) => Some(html),
            ArticleContent::Updates(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: ArticleContent,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "de::string_list")]
    pub subcategory: Vec<String>,
    #[serde(default, deserialize_with = "de::string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub is_breaking: bool,
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub is_headline: bool,
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub is_topstory: bool,
    #[serde(default, deserialize_with = "de::loose_bool")]
    pub is_live: bool,
    #[serde(default)]
    pub section: Option<SectionRef>,
    #[serde(default)]
    pub livescore_tag: Option<String>,
    #[serde(default)]
    pub creator: String,
    #[serde(rename = "source_name", default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "de::embedded_json")]
    pub key_events: Vec<LiveUpdate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Brings a server record into the shape the client relies on: live
    /// articles always carry their updates as a list, even when the API
    /// hands back the JSON string that was submitted.
    pub fn normalize(mut self) -> Self {
        if self.is_live {
            if let ArticleContent::Html(raw) = &self.content {
                let trimmed = raw.trim();
                let updates = if trimmed.is_empty() {
                    Some(Vec::new())
                } else {
                    serde_json::from_str::<Vec<LiveUpdate>>(trimmed).ok()
                };
                match updates {
                    Some(updates) => self.content = ArticleContent::Updates(updates),
                    None => tracing::warn!(
                        "Live article {} has non-list content, leaving as text",
                        self.id
                    ),
                }
            }
        }
        self
    }

    /// Last time the record changed, used to order derived views.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    pub fn in_slot(&self, slot: Slot) -> bool {
        match slot {
            Slot::Breaking => self.is_breaking,
            Slot::TopStories => self.is_topstory,
            Slot::Live => self.is_live,
            Slot::Headline => self.is_headline,
        }
    }

    /// Slots whose server-side membership this record touches.
    pub fn slots(&self) -> Vec<Slot> {
        Slot::ALL.into_iter().filter(|s| self.in_slot(*s)).collect()
    }
}

/// Independently materialized article lists on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum Slot {
    Breaking,
    TopStories,
    Live,
    Headline,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Breaking, Slot::TopStories, Slot::Live, Slot::Headline];

    pub fn path_segment(&self) -> &'static str {
        match self {
            Slot::Breaking => "breaking",
            Slot::TopStories => "topstories",
            Slot::Live => "live",
            Slot::Headline => "headline",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Slot::Breaking => "Breaking news",
            Slot::TopStories => "Top stories",
            Slot::Live => "Live",
            Slot::Headline => "Headline",
        }
    }
}
