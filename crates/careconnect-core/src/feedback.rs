//! Like/dislike log recorded from dashboard interactions.
//!
//! The log is append-only. It is reduced to a plain list of liked and
//! disliked items before it accompanies a fetch.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Music,
    Recipe,
    Photo,
    Nostalgia,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Recipe => "recipe",
            Self::Photo => "photo",
            Self::Nostalgia => "nostalgia",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "music" => Ok(Self::Music),
            "recipe" => Ok(Self::Recipe),
            "photo" => Ok(Self::Photo),
            "nostalgia" | "nostalgia_news" => Ok(Self::Nostalgia),
            other => Err(format!("unknown feedback category `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub item: String,
    pub category: Category,
    /// ISO 8601 timestamp string.
    pub timestamp: String,
}

/// Outgoing form of the log: item names only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub likes: usize,
    pub dislikes: usize,
}

/// How much feedback the caregiver has given so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    NewUser,
    Exploring,
    Engaged,
    HighlyEngaged,
}

impl Engagement {
    pub fn from_total(total: usize) -> Self {
        match total {
            0 => Self::NewUser,
            1..=2 => Self::Exploring,
            3..=5 => Self::Engaged,
            _ => Self::HighlyEngaged,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackLog {
    #[serde(default)]
    pub likes: Vec<FeedbackEntry>,
    #[serde(default)]
    pub dislikes: Vec<FeedbackEntry>,
}

impl FeedbackLog {
    /// Append an entry to the list matching its kind.
    pub fn record(&mut self, entry: FeedbackEntry) {
        match entry.kind {
            FeedbackKind::Like => self.likes.push(entry),
            FeedbackKind::Dislike => self.dislikes.push(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.likes.len() + self.dislikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item names only, in recording order. Category and timestamp are dropped.
    pub fn summary(&self) -> FeedbackSummary {
        FeedbackSummary {
            likes: self.likes.iter().map(|e| e.item.clone()).collect(),
            dislikes: self.dislikes.iter().map(|e| e.item.clone()).collect(),
        }
    }

    pub fn by_category(&self) -> BTreeMap<Category, CategoryTally> {
        let mut tallies: BTreeMap<Category, CategoryTally> = BTreeMap::new();
        for entry in &self.likes {
            tallies.entry(entry.category).or_default().likes += 1;
        }
        for entry in &self.dislikes {
            tallies.entry(entry.category).or_default().dislikes += 1;
        }
        tallies
    }

    pub fn engagement(&self) -> Engagement {
        Engagement::from_total(self.len())
    }

    /// Up to three categories with the most likes, most liked first.
    pub fn preferred_categories(&self) -> Vec<Category> {
        top_three(self.by_category().into_iter().map(|(c, t)| (c, t.likes)))
    }

    /// Up to three categories with the most dislikes, most disliked first.
    pub fn avoided_categories(&self) -> Vec<Category> {
        top_three(self.by_category().into_iter().map(|(c, t)| (c, t.dislikes)))
    }

    /// Enough entries (three or more) to steer content choices.
    pub fn personalization_ready(&self) -> bool {
        self.len() >= PERSONALIZATION_THRESHOLD
    }
}

/// Entries needed before [`FeedbackLog::personalization_ready`] holds.
pub const PERSONALIZATION_THRESHOLD: usize = 3;

fn top_three(counts: impl Iterator<Item = (Category, usize)>) -> Vec<Category> {
    let mut ranked: Vec<(Category, usize)> = counts.filter(|(_, n)| *n > 0).collect();
    // Stable sort keeps category order among ties.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(3).map(|(c, _)| c).collect()
}
