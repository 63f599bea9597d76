//! Ordering of results and assignment of position strings.
//!
//! Comparison is an ordered list of named [`TieBreakRule`]s evaluated left to
//! right; the first rule that separates two results decides their order.

use std::cmp::Ordering;
use std::time::Duration;

use crate::core::result::{LegResult, RaceResult};
use crate::core::types::Bib;

/// Position string given to results that cannot complete
pub const UNRANKED: &str = "-";

/// Anything the ranking engine can order
pub trait Rankable {
    fn can_complete(&self) -> bool;

    /// Lower is better; only meaningful when `can_complete` holds
    fn performance(&self) -> Option<Duration>;

    /// Index of the decisive finish record in the raw results
    fn recorded_position(&self) -> Option<usize>;

    /// Orders non-finishers among themselves
    fn secondary_key(&self) -> Bib;

    fn set_position(&mut self, position: String);
}

impl Rankable for RaceResult {
    fn can_complete(&self) -> bool {
        self.can_complete
    }

    fn performance(&self) -> Option<Duration> {
        self.performance
    }

    fn recorded_position(&self) -> Option<usize> {
        self.recorded_position
    }

    fn secondary_key(&self) -> Bib {
        self.bib()
    }

    fn set_position(&mut self, position: String) {
        self.position = Some(position);
    }
}

impl Rankable for LegResult {
    fn can_complete(&self) -> bool {
        self.can_complete
    }

    fn performance(&self) -> Option<Duration> {
        self.duration()
    }

    fn recorded_position(&self) -> Option<usize> {
        self.recorded_position
    }

    fn secondary_key(&self) -> Bib {
        self.bib
    }

    fn set_position(&mut self, position: String) {
        self.position = Some(position);
    }
}

/// One step of the comparison chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreakRule {
    /// Finishers before non-finishers
    CompletionStatus,
    /// Lower performance first, between two finishers
    Performance,
    /// Earlier decisive record first, between two finishers
    RecordedOrder,
    /// Secondary key ascending, between two non-finishers
    SecondaryKey,
}

impl TieBreakRule {
    pub fn compare<R: Rankable + ?Sized>(self, a: &R, b: &R) -> Ordering {
        let both_finish = a.can_complete() && b.can_complete();
        let neither_finishes = !a.can_complete() && !b.can_complete();

        match self {
            Self::CompletionStatus => b.can_complete().cmp(&a.can_complete()),
            Self::Performance if both_finish => a.performance().cmp(&b.performance()),
            Self::RecordedOrder if both_finish => {
                match (a.recorded_position(), b.recorded_position()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => Ordering::Equal,
                }
            }
            Self::SecondaryKey if neither_finishes => a.secondary_key().cmp(&b.secondary_key()),
            _ => Ordering::Equal,
        }
    }
}

/// The first non-equal ordering produced by the rules, in rule order
pub fn first_nonzero<R: Rankable + ?Sized>(rules: &[TieBreakRule], a: &R, b: &R) -> Ordering {
    rules
        .iter()
        .map(|rule| rule.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Orders results and assigns position strings for one ranking scope
#[derive(Debug, Clone)]
pub struct RankingEngine {
    dead_heats: bool,
    rules: Vec<TieBreakRule>,
}

impl RankingEngine {
    #[must_use]
    pub fn new(dead_heats: bool) -> Self {
        let rules = if dead_heats {
            vec![
                TieBreakRule::CompletionStatus,
                TieBreakRule::Performance,
                TieBreakRule::SecondaryKey,
            ]
        } else {
            vec![
                TieBreakRule::CompletionStatus,
                TieBreakRule::Performance,
                TieBreakRule::RecordedOrder,
                TieBreakRule::SecondaryKey,
            ]
        };
        Self { dead_heats, rules }
    }

    pub fn compare<R: Rankable + ?Sized>(&self, a: &R, b: &R) -> Ordering {
        first_nonzero(&self.rules, a, b)
    }

    /// Stable sort; equal results keep their relative order
    pub fn sort<R: Rankable>(&self, results: &mut [R]) {
        results.sort_by(|a, b| self.compare(a, b));
    }

    /// Position strings for an already sorted sequence
    #[must_use]
    pub fn positions<R: Rankable>(&self, sorted: &[&R]) -> Vec<String> {
        let mut positions = Vec::with_capacity(sorted.len());
        let mut i = 0;

        while i < sorted.len() {
            if !sorted[i].can_complete() {
                positions.push(UNRANKED.to_string());
                i += 1;
                continue;
            }

            let mut end = i + 1;
            if self.dead_heats {
                while end < sorted.len()
                    && sorted[end].can_complete()
                    && self.compare(sorted[i], sorted[end]).is_eq()
                {
                    end += 1;
                }
            }

            let label = if end - i > 1 {
                format!("{}=", i + 1)
            } else {
                (i + 1).to_string()
            };
            positions.extend(std::iter::repeat(label).take(end - i));
            i = end;
        }

        positions
    }

    /// Assign positions to an already sorted sequence
    pub fn assign_positions<R: Rankable>(&self, results: &mut [R]) {
        let positions = {
            let sorted: Vec<&R> = results.iter().collect();
            self.positions(&sorted)
        };
        for (result, position) in results.iter_mut().zip(positions) {
            result.set_position(position);
        }
    }

    /// Sort, then assign positions
    pub fn rank<R: Rankable>(&self, results: &mut [R]) {
        self.sort(results);
        self.assign_positions(results);
    }

    /// Rank a subset of `results` without reordering them.
    ///
    /// Returns `(index, position)` pairs in ranked order.
    #[must_use]
    pub fn rank_subset<R: Rankable>(&self, results: &[R], indices: &[usize]) -> Vec<(usize, String)> {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| self.compare(&results[a], &results[b]));

        let sorted: Vec<&R> = order.iter().map(|&i| &results[i]).collect();
        let positions = self.positions(&sorted);
        order.into_iter().zip(positions).collect()
    }
}
