use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

type CategoryMap = &'static [(&'static str, &'static [&'static str])];

const NEWS_CATEGORIES: CategoryMap = &[
    (
        "News",
        &["Politics", "Business", "Health", "Education", "Crime", "World"],
    ),
    ("Entertainment", &["Celebrity", "Movies", "Music", "Arts"]),
    ("Lifestyle", &["Fashion", "Food", "Travel", "Relationships"]),
    ("Sports", &["Football", "Boxing", "Athletics"]),
    ("Opinion", &["Editorial", "Columns", "Letters"]),
    ("Technology", &["Gadgets", "Startups", "Telecoms"]),
];

const SPORTS_CATEGORIES: CategoryMap = &[
    (
        "Football",
        &[
            "Ghana Premier League",
            "Black Stars",
            "Premier League",
            "La Liga",
            "Champions League",
            "AFCON",
            "Transfers",
        ],
    ),
    ("Basketball", &["NBA", "Local Basketball"]),
    ("Boxing", &["Local Boxing", "International Boxing"]),
    ("Athletics", &["Track", "Field", "Marathon"]),
    ("Tennis", &["ATP", "WTA"]),
    ("Other Sports", &["Cricket", "Rugby", "Hockey"]),
];

const MUSIC_CATEGORIES: CategoryMap = &[
    ("Music", &["Afrobeats", "Highlife", "Hiplife", "Gospel", "Drill"]),
    ("Movies", &["Nollywood", "Ghallywood", "Hollywood"]),
    ("Celebrity", &["Gossip", "Interviews"]),
    ("Events", &["Concerts", "Awards", "Festivals"]),
    ("Reviews", &["Albums", "Singles"]),
];

/// One of the branded properties sharing this admin client.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    /// General news
    #[default]
    Ghanapolitan,
    /// Sports scores and coverage
    Ghanascore,
    /// Music and entertainment
    Afrobeatsrep,
}

impl Brand {
    pub const ALL: [Brand; 3] = [Brand::Ghanapolitan, Brand::Ghanascore, Brand::Afrobeatsrep];

    /// Path segment used under `/api/<brand>/...`.
    pub fn slug(&self) -> &'static str {
        match self {
            Brand::Ghanapolitan => "ghanapolitan",
            Brand::Ghanascore => "ghanascore",
            Brand::Afrobeatsrep => "afrobeatsrep",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Brand::Ghanapolitan => "Ghanapolitan",
            Brand::Ghanascore => "Ghanascore",
            Brand::Afrobeatsrep => "Afrobeatsrep",
        }
    }

    fn category_map(&self) -> CategoryMap {
        match self {
            Brand::Ghanapolitan => NEWS_CATEGORIES,
            Brand::Ghanascore => SPORTS_CATEGORIES,
            Brand::Afrobeatsrep => MUSIC_CATEGORIES,
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &'static str> {
        self.category_map().iter().map(|(name, _)| *name)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories().any(|c| c == category)
    }

    /// Subcategory options for a selected category. Unknown or missing
    /// categories have no options.
    pub fn subcategories_for(&self, category: Option<&str>) -> &'static [&'static str] {
        let Some(category) = category else {
            return &[];
        };
        self.category_map()
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, subs)| *subs)
            .unwrap_or(&[])
    }

    /// Whether an article may carry several subcategories at once.
    pub fn multi_subcategory(&self) -> bool {
        matches!(self, Brand::Ghanapolitan)
    }

    /// Only the sports property links articles to a live score feed.
    pub fn supports_livescore(&self) -> bool {
        matches!(self, Brand::Ghanascore)
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Brand {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Brand::ALL
            .into_iter()
            .find(|b| b.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Config(format!("unknown brand '{s}'")))
    }
}
