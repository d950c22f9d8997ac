//! Local profile and its anonymized, transmittable derivation.

use serde::{Deserialize, Serialize};

/// Most heritage entries a profile keeps.
pub const MAX_HERITAGE: usize = 3;

/// The full profile as held on the device. Never sent over the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub heritage: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Profile {
    /// Profile used when nothing has been saved on the device yet.
    pub fn demo() -> Self {
        Self {
            name: Some("Maria".into()),
            birth_year: Some(1945),
            heritage: vec!["Italian-American".into()],
            city: Some("Brooklyn".into()),
            state: Some("New York".into()),
            interests: vec!["music".into(), "cooking".into(), "family".into()],
        }
    }

    /// Non-blank heritage entries, capped at [`MAX_HERITAGE`].
    pub fn heritage(&self) -> impl Iterator<Item = &str> {
        self.heritage
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .take(MAX_HERITAGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Adult,
    Senior,
    OldestSenior,
}

impl AgeGroup {
    pub fn from_age(age: i32) -> Self {
        if age >= 80 {
            Self::OldestSenior
        } else if age >= 65 {
            Self::Senior
        } else {
            Self::Adult
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adult => "adult",
            Self::Senior => "senior",
            Self::OldestSenior => "oldest_senior",
        }
    }
}

/// What the remote pipeline is allowed to learn about the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizedProfile {
    pub age_group: AgeGroup,
    pub cultural_heritage: String,
    pub interests: Vec<String>,
    pub profile_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_group_thresholds() {
        assert_eq!(AgeGroup::from_age(40), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(64), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(65), AgeGroup::Senior);
        assert_eq!(AgeGroup::from_age(79), AgeGroup::Senior);
        assert_eq!(AgeGroup::from_age(80), AgeGroup::OldestSenior);
        assert_eq!(AgeGroup::from_age(101), AgeGroup::OldestSenior);
    }

    #[test]
    fn age_group_serializes_snake_case() {
        let json = serde_json::to_string(&AgeGroup::OldestSenior).unwrap();
        assert_eq!(json, "\"oldest_senior\"");
        assert_eq!(AgeGroup::Senior.as_str(), "senior");
    }

    #[test]
    fn heritage_skips_blanks_and_caps() {
        let profile = Profile {
            heritage: vec![
                " ".into(),
                "Irish".into(),
                "Italian".into(),
                "German".into(),
                "Polish".into(),
            ],
            ..Default::default()
        };
        let entries: Vec<&str> = profile.heritage().collect();
        assert_eq!(entries, vec!["Irish", "Italian", "German"]);
    }

    #[test]
    fn profile_tolerates_missing_fields() {
        let profile: Profile = serde_json::from_str(r#"{"name": "A"}"#).unwrap();
        assert_eq!(profile.name.as_deref(), Some("A"));
        assert!(profile.birth_year.is_none());
        assert!(profile.interests.is_empty());
    }
}
