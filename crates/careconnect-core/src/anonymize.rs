//! One-way reduction of a [`Profile`] to an [`AnonymizedProfile`].
//!
//! The output never carries the name, city, state or birth year. Values that
//! happen to repeat one of those identifiers are replaced or dropped, so the
//! contract holds even for oddly filled profiles.

use crate::profile::{AgeGroup, AnonymizedProfile, Profile};

pub const DEFAULT_HERITAGE: &str = "American";
pub const DEFAULT_INTERESTS: [&str; 3] = ["music", "family", "cooking"];

/// Derive the transmittable profile. `current_year` comes from the caller's clock.
pub fn anonymize(profile: &Profile, current_year: i32) -> AnonymizedProfile {
    let identifiers = Identifiers::of(profile);

    let age_group = match profile.birth_year {
        Some(year) => AgeGroup::from_age(current_year.saturating_sub(year)),
        None => AgeGroup::Senior,
    };

    let heritage = profile.heritage().next();
    let cultural_heritage = heritage
        .filter(|h| !identifiers.matches(h))
        .unwrap_or(DEFAULT_HERITAGE)
        .to_string();

    let mut interests: Vec<String> = profile
        .interests
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty() && !identifiers.matches(i))
        .map(str::to_string)
        .collect();
    if interests.is_empty() {
        interests = DEFAULT_INTERESTS.iter().map(|i| i.to_string()).collect();
    }

    AnonymizedProfile {
        age_group,
        cultural_heritage,
        interests,
        profile_complete: heritage.is_some() && profile.birth_year.is_some(),
    }
}

struct Identifiers(Vec<String>);

impl Identifiers {
    fn of(profile: &Profile) -> Self {
        let mut values: Vec<String> = [&profile.name, &profile.city, &profile.state]
            .into_iter()
            .flatten()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        if let Some(year) = profile.birth_year {
            values.push(year.to_string());
        }
        Self(values)
    }

    fn matches(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        self.0.iter().any(|id| *id == value)
    }
}
