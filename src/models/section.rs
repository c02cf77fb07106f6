use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A taxonomy grouping of articles, independent of category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "displayOrder", default)]
    pub display_order: i64,
    #[serde(default)]
    pub articles_count: u64,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Section {
    /// Expiry is advisory: the server keeps serving expired sections and the
    /// client only labels them.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires| expires > now)
    }
}

/// Reference from an article to its section. The API sends either the bare
/// id or a populated object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl<'de> Deserialize<'de> for SectionRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Populated {
            #[serde(alias = "_id")]
            id: String,
            name: Option<String>,
            code: Option<String>,
            slug: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(String),
            Populated(Populated),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Id(id) => SectionRef {
                id,
                name: None,
                code: None,
                slug: None,
            },
            Raw::Populated(p) => SectionRef {
                id: p.id,
                name: p.name,
                code: p.code,
                slug: p.slug,
            },
        })
    }
}
