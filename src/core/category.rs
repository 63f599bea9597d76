use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::Gender;

/// Upper age bound used when a category has no maximum
pub const MAX_AGE: u32 = 150;

fn default_max_age() -> u32 {
    MAX_AGE
}

/// Eligibility description of a participant, e.g. `M40` = men aged 40-44
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCategory {
    pub short_name: String,
    pub long_name: String,
    pub gender: Gender,
    #[serde(default)]
    pub minimum_age: u32,
    #[serde(default = "default_max_age")]
    pub maximum_age: u32,
}

impl EntryCategory {
    pub fn new(short_name: impl Into<String>, gender: Gender, min: u32, max: u32) -> Self {
        let short_name = short_name.into();
        Self {
            long_name: short_name.clone(),
            short_name,
            gender,
            minimum_age: min,
            maximum_age: max,
        }
    }
}

/// A category for which prizes are awarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeCategory {
    pub short_name: String,
    pub long_name: String,
    pub gender: Gender,
    #[serde(default)]
    pub minimum_age: u32,
    #[serde(default = "default_max_age")]
    pub maximum_age: u32,
    pub number_of_prizes: usize,
    /// Winning this category rules out winning any other exclusive category
    #[serde(default)]
    pub exclusive: bool,
    /// Restricts eligibility to members of these clubs when non-empty
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub eligible_clubs: BTreeSet<String>,
}

impl PrizeCategory {
    pub fn new(
        short_name: impl Into<String>,
        gender: Gender,
        min: u32,
        max: u32,
        number_of_prizes: usize,
    ) -> Self {
        let short_name = short_name.into();
        Self {
            long_name: short_name.clone(),
            short_name,
            gender,
            minimum_age: min,
            maximum_age: max,
            number_of_prizes,
            exclusive: false,
            eligible_clubs: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    #[must_use]
    pub fn with_clubs<I, S>(mut self, clubs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible_clubs = clubs.into_iter().map(Into::into).collect();
        self
    }

    /// Order two categories so that the more general one comes first.
    ///
    /// Lower age threshold first, then gender precedence, then the wider
    /// upper age bound. Remaining ties keep declaration order when used
    /// with a stable sort.
    #[must_use]
    pub fn cmp_generality(&self, other: &Self) -> Ordering {
        self.minimum_age
            .cmp(&other.minimum_age)
            .then_with(|| self.gender.cmp(&other.gender))
            .then_with(|| other.maximum_age.cmp(&self.maximum_age))
    }

    /// Whether an entry category's age band lies inside this category's band
    #[must_use]
    pub fn contains_ages_of(&self, category: &EntryCategory) -> bool {
        self.minimum_age <= category.minimum_age && category.maximum_age <= self.maximum_age
    }
}

impl std::fmt::Display for PrizeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.long_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generality_prefers_lower_age_threshold() {
        let open = PrizeCategory::new("Open", Gender::Open, 0, MAX_AGE, 3);
        let v40 = PrizeCategory::new("M40", Gender::Men, 40, MAX_AGE, 1);
        assert_eq!(open.cmp_generality(&v40), Ordering::Less);
        assert_eq!(v40.cmp_generality(&open), Ordering::Greater);
    }

    #[test]
    fn test_generality_gender_precedence_on_tie() {
        let open = PrizeCategory::new("Open", Gender::Open, 0, MAX_AGE, 3);
        let women = PrizeCategory::new("Women", Gender::Women, 0, MAX_AGE, 3);
        let mixed = PrizeCategory::new("Mixed", Gender::Mixed, 0, MAX_AGE, 3);
        assert_eq!(open.cmp_generality(&women), Ordering::Less);
        assert_eq!(women.cmp_generality(&mixed), Ordering::Less);
    }

    #[test]
    fn test_generality_wider_band_first() {
        let senior = PrizeCategory::new("Women", Gender::Women, 0, MAX_AGE, 3);
        let junior = PrizeCategory::new("WU20", Gender::Women, 0, 19, 1);
        assert_eq!(senior.cmp_generality(&junior), Ordering::Less);
    }

    #[test]
    fn test_contains_ages_of() {
        let v40 = PrizeCategory::new("M40+", Gender::Men, 40, MAX_AGE, 1);
        assert!(v40.contains_ages_of(&EntryCategory::new("M50", Gender::Men, 50, 54)));
        assert!(v40.contains_ages_of(&EntryCategory::new("M40", Gender::Men, 40, 44)));
        assert!(!v40.contains_ages_of(&EntryCategory::new("MS", Gender::Men, 20, 39)));
    }
}
