mod admin;
mod article;
mod brand;
mod live;
mod post;
mod section;

pub use admin::{Admin, Role};
pub use article::{Article, ArticleContent, Slot};
pub use brand::Brand;
pub use live::LiveUpdate;
pub use post::Post;
pub use section::{Section, SectionRef};

use serde::{Deserialize, Serialize};

/// Content families exposed by the API, each under its own path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentKind {
    Article,
    Feature,
    Opinion,
    Graphic,
    Section,
}

impl ContentKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Feature => "feature",
            ContentKind::Opinion => "opinion",
            ContentKind::Graphic => "graphics",
            ContentKind::Section => "sections",
        }
    }

    /// Key under which single records are nested in response envelopes.
    pub fn entity_key(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Feature => "feature",
            ContentKind::Opinion => "opinion",
            ContentKind::Graphic => "graphic",
            ContentKind::Section => "section",
        }
    }

    /// Key under which lists are nested in response envelopes.
    pub fn list_key(&self) -> &'static str {
        match self {
            ContentKind::Article => "articles",
            ContentKind::Feature => "features",
            ContentKind::Opinion => "opinions",
            ContentKind::Graphic => "graphics",
            ContentKind::Section => "sections",
        }
    }
}

/// Serde helpers for the loosely typed fields the content API returns.
pub(crate) mod de {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<String>),
        One(String),
    }

    /// Accepts an array of strings, a single string, or a comma separated
    /// string. Blank entries are dropped.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<OneOrMany>::deserialize(deserializer)?;
        let items = match value {
            None => Vec::new(),
            Some(OneOrMany::Many(items)) => items,
            Some(OneOrMany::One(s)) => s.split(',').map(str::to_string).collect(),
        };
        Ok(items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Embedded<T> {
        Value(T),
        Encoded(String),
    }

    /// Accepts a JSON value or the same value encoded as a JSON string, the
    /// way multipart submissions round-trip through the API.
    pub fn embedded_json<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        match Option::<Embedded<T>>::deserialize(deserializer)? {
            None => Ok(T::default()),
            Some(Embedded::Value(v)) => Ok(v),
            Some(Embedded::Encoded(s)) if s.trim().is_empty() => Ok(T::default()),
            Some(Embedded::Encoded(s)) => {
                serde_json::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    }

    /// Booleans sometimes come back as the strings the multipart form sent.
    pub fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Loose {
            Bool(bool),
            Text(String),
            Number(i64),
        }

        Ok(match Option::<Loose>::deserialize(deserializer)? {
            None => false,
            Some(Loose::Bool(b)) => b,
            Some(Loose::Text(s)) => matches!(s.trim(), "true" | "1" | "yes"),
            Some(Loose::Number(n)) => n != 0,
        })
    }
}
