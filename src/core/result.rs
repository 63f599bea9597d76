use std::time::Duration;

use crate::core::category::PrizeCategory;
use crate::core::entry::Entry;
use crate::core::types::Bib;

/// Outcome of one leg of a relay for one team
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegResult {
    pub bib: Bib,

    /// 1-based leg number
    pub leg_number: usize,

    /// Elapsed race time at which the leg started
    pub start_time: Option<Duration>,

    /// Elapsed race time at which the leg finished
    pub finish_time: Option<Duration>,

    pub can_complete: bool,

    /// Leg started in a mass start rather than from a hand-off
    pub in_mass_start: bool,

    /// Explicitly marked as not finished by configuration
    pub dnf: bool,

    /// Index in the raw results of the record that finished this leg
    pub recorded_position: Option<usize>,

    /// Leg number written on the raw record, if any
    pub explicit_leg: Option<usize>,

    /// Position among all runners of this leg, assigned by ranking
    pub position: Option<String>,
}

impl LegResult {
    #[must_use]
    pub fn unfinished(bib: Bib, leg_number: usize) -> Self {
        Self {
            bib,
            leg_number,
            start_time: None,
            finish_time: None,
            can_complete: false,
            in_mass_start: false,
            dnf: false,
            recorded_position: None,
            explicit_leg: None,
            position: None,
        }
    }

    /// Time taken on this leg, if it was completed
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        if !self.can_complete {
            return None;
        }
        match (self.start_time, self.finish_time) {
            (Some(start), Some(finish)) => finish.checked_sub(start),
            _ => None,
        }
    }
}

/// A prize won by a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeAward {
    pub category: PrizeCategory,
    /// 1 for the category's first prize, 2 for the second, ...
    pub place: usize,
}

/// The resolved result of one entrant, individual or team
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    pub entry: Entry,

    /// Elapsed time of the entrant's final finish
    pub finish_time: Option<Duration>,

    /// One per leg in leg order; empty for single-leg races
    pub leg_results: Vec<LegResult>,

    /// Value ranked on, lower is better
    pub performance: Option<Duration>,

    pub can_complete: bool,

    /// Index in the raw results of the decisive finish record
    pub recorded_position: Option<usize>,

    /// Assigned by ranking; `None` until then
    pub position: Option<String>,

    /// Prizes in allocation order
    pub prizes: Vec<PrizeAward>,
}

impl RaceResult {
    /// A result with nothing recorded yet
    #[must_use]
    pub fn empty(entry: Entry, legs: usize) -> Self {
        let leg_results = if legs > 1 {
            (1..=legs)
                .map(|leg| LegResult::unfinished(entry.bib, leg))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            entry,
            finish_time: None,
            leg_results,
            performance: None,
            can_complete: false,
            recorded_position: None,
            position: None,
            prizes: Vec::new(),
        }
    }

    #[must_use]
    pub fn bib(&self) -> Bib {
        self.entry.bib
    }

    #[must_use]
    pub fn is_relay(&self) -> bool {
        !self.leg_results.is_empty()
    }

    #[must_use]
    pub fn exclusive_prize_count(&self) -> usize {
        self.prizes.iter().filter(|p| p.category.exclusive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_duration_requires_completion() {
        let mut leg = LegResult::unfinished(Bib(1), 2);
        leg.start_time = Some(Duration::from_secs(100));
        leg.finish_time = Some(Duration::from_secs(250));
        assert_eq!(leg.duration(), None);

        leg.can_complete = true;
        assert_eq!(leg.duration(), Some(Duration::from_secs(150)));
    }

    #[test]
    fn test_empty_result_slots() {
        let single = RaceResult::empty(Entry::runner(1, "A", "Club", "MS"), 1);
        assert!(!single.is_relay());

        let relay = RaceResult::empty(
            Entry::team(2, "T", "Open", vec!["a".into(), "b".into(), "c".into()]),
            3,
        );
        assert!(relay.is_relay());
        let legs: Vec<usize> = relay.leg_results.iter().map(|l| l.leg_number).collect();
        assert_eq!(legs, vec![1, 2, 3]);
        assert!(relay.position.is_none());
    }
}
