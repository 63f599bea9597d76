//! Prize allocation across overlapping categories.
//!
//! Categories are visited most general first. Each walks the ranked results
//! and awards its prizes to candidates in rank order: entrants who complete,
//! are eligible, and (for exclusive categories) have not already won another
//! exclusive category.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::store::CategoryCatalog;
use crate::core::category::PrizeCategory;
use crate::core::result::{PrizeAward, RaceResult};
use crate::core::types::Bib;

/// Winners of one prize category, first prize first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPrizes {
    pub category: PrizeCategory,
    pub winners: Vec<Bib>,
}

/// The outcome of one allocation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrizeAllocation {
    /// In allocation order
    pub by_category: Vec<CategoryPrizes>,
    /// Prizes won by each bib, in allocation order
    pub awards: HashMap<Bib, Vec<PrizeAward>>,
}

impl PrizeAllocation {
    /// Allocate prizes over `ranked`, which must already be in rank order
    #[must_use]
    pub fn allocate(ranked: &[RaceResult], catalog: &CategoryCatalog) -> Self {
        let mut allocation = Self::default();

        for category in catalog.prize_categories_by_generality() {
            let mut winners = Vec::new();

            for result in ranked {
                if winners.len() >= category.number_of_prizes {
                    break;
                }
                if !allocation.is_candidate(result, category, catalog) {
                    continue;
                }

                winners.push(result.bib());
                allocation
                    .awards
                    .entry(result.bib())
                    .or_default()
                    .push(PrizeAward {
                        category: category.clone(),
                        place: winners.len(),
                    });
            }

            debug!(
                "Prize category {}: {} of {} prize(s) awarded",
                category.short_name,
                winners.len(),
                category.number_of_prizes
            );
            allocation.by_category.push(CategoryPrizes {
                category: category.clone(),
                winners,
            });
        }

        allocation
    }

    fn is_candidate(
        &self,
        result: &RaceResult,
        category: &PrizeCategory,
        catalog: &CategoryCatalog,
    ) -> bool {
        if !result.can_complete || !catalog.entry_eligible(&result.entry, category) {
            return false;
        }
        !(category.exclusive && self.has_exclusive_award(result.bib()))
    }

    /// Whether a bib already holds a prize in an exclusive category
    #[must_use]
    pub fn has_exclusive_award(&self, bib: Bib) -> bool {
        self.awards
            .get(&bib)
            .is_some_and(|awards| awards.iter().any(|a| a.category.exclusive))
    }

    #[must_use]
    pub fn awards_for(&self, bib: Bib) -> &[PrizeAward] {
        self.awards.get(&bib).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of prizes awarded
    #[must_use]
    pub fn prize_count(&self) -> usize {
        self.by_category.iter().map(|c| c.winners.len()).sum()
    }

    /// Copy the awards onto the results they belong to
    pub fn apply(&self, results: &mut [RaceResult]) {
        for result in results {
            result.prizes = self.awards_for(result.bib()).to_vec();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::category::{EntryCategory, MAX_AGE};
    use crate::core::entry::Entry;
    use crate::core::types::Gender;

    fn catalog() -> CategoryCatalog {
        let mut catalog = CategoryCatalog::new();
        for category in [
            EntryCategory::new("MS", Gender::Men, 0, 39),
            EntryCategory::new("M40", Gender::Men, 40, 49),
            EntryCategory::new("WS", Gender::Women, 0, 39),
            EntryCategory::new("W40", Gender::Women, 40, 49),
        ] {
            catalog.add_entry_category(category).unwrap();
        }
        for category in [
            PrizeCategory::new("M40", Gender::Men, 40, MAX_AGE, 1).exclusive(),
            PrizeCategory::new("Open", Gender::Open, 0, MAX_AGE, 3).exclusive(),
            PrizeCategory::new("Women", Gender::Women, 0, MAX_AGE, 2).exclusive(),
            PrizeCategory::new("W40", Gender::Women, 40, MAX_AGE, 1).exclusive(),
        ] {
            catalog.add_prize_category(category).unwrap();
        }
        catalog
    }

    fn finisher(bib: u32, category: &str, club: &str) -> RaceResult {
        let mut result = RaceResult::empty(Entry::runner(bib, format!("R{bib}"), club, category), 1);
        result.can_complete = true;
        result.performance = Some(Duration::from_secs(600 + u64::from(bib)));
        result
    }

    fn winners<'a>(allocation: &'a PrizeAllocation, short_name: &str) -> &'a [Bib] {
        allocation
            .by_category
            .iter()
            .find(|c| c.category.short_name == short_name)
            .map(|c| c.winners.as_slice())
            .unwrap_or_default()
    }

    #[test]
    fn test_general_categories_allocated_first() {
        let ranked = vec![
            finisher(1, "M40", "A"),
            finisher(2, "MS", "A"),
            finisher(3, "W40", "A"),
            finisher(4, "M40", "A"),
            finisher(5, "WS", "A"),
            finisher(6, "W40", "A"),
            finisher(7, "WS", "A"),
        ];
        let allocation = PrizeAllocation::allocate(&ranked, &catalog());

        let order: Vec<&str> = allocation
            .by_category
            .iter()
            .map(|c| c.category.short_name.as_str())
            .collect();
        assert_eq!(order, vec!["Open", "Women", "W40", "M40"]);

        // Bib 1 wins Open rather than M40 even though M40 was declared first
        assert_eq!(winners(&allocation, "Open"), &[Bib(1), Bib(2), Bib(3)]);
        assert_eq!(winners(&allocation, "Women"), &[Bib(5), Bib(6)]);
        assert_eq!(winners(&allocation, "M40"), &[Bib(4)]);
        assert!(winners(&allocation, "W40").is_empty());
        assert_eq!(allocation.prize_count(), 6);
    }

    #[test]
    fn test_exclusivity_invariant() {
        let ranked: Vec<RaceResult> = (1..=12)
            .map(|bib| {
                let category = ["MS", "M40", "WS", "W40"][(bib as usize) % 4];
                finisher(bib, category, "A")
            })
            .collect();
        let mut results = ranked.clone();
        let allocation = PrizeAllocation::allocate(&ranked, &catalog());
        allocation.apply(&mut results);

        for result in &results {
            assert!(result.exclusive_prize_count() <= 1, "bib {}", result.bib());
        }
    }

    #[test]
    fn test_non_exclusive_prizes_accumulate() {
        let mut catalog = catalog();
        catalog
            .add_prize_category(
                PrizeCategory::new("Club", Gender::Open, 0, MAX_AGE, 2).with_clubs(["Fife AC"]),
            )
            .unwrap();

        let mut results = vec![
            finisher(1, "MS", "Fife AC"),
            finisher(2, "MS", "Other"),
            finisher(3, "MS", "Fife AC"),
        ];
        let allocation = PrizeAllocation::allocate(&results, &catalog);
        allocation.apply(&mut results);

        assert_eq!(winners(&allocation, "Club"), &[Bib(1), Bib(3)]);
        let names: Vec<&str> = results[0]
            .prizes
            .iter()
            .map(|p| p.category.short_name.as_str())
            .collect();
        assert_eq!(names, vec!["Open", "Club"]);
        assert_eq!(results[2].prizes[1].place, 2);
        assert!(results[1].prizes.iter().all(|p| p.category.short_name != "Club"));
    }

    #[test]
    fn test_non_finishers_never_win() {
        let mut dnf = finisher(1, "MS", "A");
        dnf.can_complete = false;
        let ranked = vec![finisher(2, "MS", "A"), dnf];
        let allocation = PrizeAllocation::allocate(&ranked, &catalog());
        assert!(allocation.awards_for(Bib(1)).is_empty());
        assert_eq!(winners(&allocation, "Open"), &[Bib(2)]);
    }

    #[test]
    fn test_unknown_entry_category_is_ineligible() {
        let ranked = vec![finisher(1, "X99", "A"), finisher(2, "MS", "A")];
        let allocation = PrizeAllocation::allocate(&ranked, &catalog());
        assert_eq!(winners(&allocation, "Open"), &[Bib(2)]);
    }

    #[test]
    fn test_apply_replaces_previous_prizes() {
        let mut results = vec![finisher(1, "MS", "A")];
        let allocation = PrizeAllocation::allocate(&results, &catalog());
        allocation.apply(&mut results);
        allocation.apply(&mut results);
        assert_eq!(results[0].prizes.len(), 1);
        assert_eq!(results[0].prizes[0].place, 1);
    }
}
