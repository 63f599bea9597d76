//! Prize eligibility: gender equivalence, age-band containment and club allow-lists.

use crate::catalog::store::CategoryCatalog;
use crate::core::category::{EntryCategory, PrizeCategory};
use crate::core::entry::Entry;
use crate::core::types::Gender;

impl CategoryCatalog {
    /// Whether entrants of `entry` gender may win a `prize` gender category.
    ///
    /// Every gender may win its own categories and Open categories; the
    /// catalog may declare further pairings.
    #[must_use]
    pub fn gender_eligible(&self, entry: Gender, prize: Gender) -> bool {
        entry == prize
            || prize == Gender::Open
            || self
                .gender_eligibility
                .iter()
                .any(|g| g.entry == entry && g.prize == prize)
    }

    /// Whether an entrant in `category`, belonging to `club`, may win `prize`
    #[must_use]
    pub fn eligible(
        &self,
        category: &EntryCategory,
        club: Option<&str>,
        prize: &PrizeCategory,
    ) -> bool {
        if !self.gender_eligible(category.gender, prize.gender) {
            return false;
        }

        if !prize.contains_ages_of(category) {
            return false;
        }

        if prize.eligible_clubs.is_empty() {
            return true;
        }

        club.is_some_and(|club| prize.eligible_clubs.contains(club))
    }

    /// Whether an entry may win `prize`; entries with unknown categories never can
    #[must_use]
    pub fn entry_eligible(&self, entry: &Entry, prize: &PrizeCategory) -> bool {
        self.entry_category(entry.category())
            .is_some_and(|category| self.eligible(category, entry.participant.club(), prize))
    }
}
