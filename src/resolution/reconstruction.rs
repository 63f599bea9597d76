//! Attribution of raw records to entrants and relay legs.
//!
//! Records are taken in recording order and given to the entrant's earliest
//! unfilled leg slot. The filled slots are then stable-sorted by explicit leg
//! number, a record without one counting as leg 0, and renumbered `1..=n` in
//! that order.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::debug;

use crate::config::RaceConfig;
use crate::core::entry::Entry;
use crate::core::raw::RawResult;
use crate::core::result::{LegResult, RaceResult};
use crate::core::types::{Bib, PerformanceMeasure};
use crate::parsing::time::format_time;
use crate::resolution::ResolveError;

/// Builds one `RaceResult` per entry from time-complete raw records
pub struct Reconstruction<'a> {
    config: &'a RaceConfig,
    entries: &'a [Entry],
    source_name: &'a str,
    measure: PerformanceMeasure,
}

impl<'a> Reconstruction<'a> {
    pub fn new(config: &'a RaceConfig, entries: &'a [Entry], source_name: &'a str) -> Self {
        Self {
            config,
            entries,
            source_name,
            measure: PerformanceMeasure::for_legs(config.legs),
        }
    }

    fn describe(&self, record: &RawResult) -> String {
        format!("{}, {}", self.source_name, record.describe())
    }

    /// Reconstruct results, one per entry in roster order
    ///
    /// # Errors
    ///
    /// Returns an error for unregistered bibs, surplus results, bad explicit leg
    /// numbers, finishes before starts, or DNF/individual-start references to
    /// unknown bibs.
    pub fn run(&self, raw: &[RawResult]) -> Result<Vec<RaceResult>, ResolveError> {
        let legs = self.config.legs;
        let index: HashMap<Bib, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.bib, i))
            .collect();

        for start in &self.config.individual_leg_starts {
            if !index.contains_key(&Bib(start.bib)) {
                return Err(ResolveError::UnknownIndividualStart(Bib(start.bib)));
            }
        }

        let assigned = self.assign_records(raw, &index)?;

        let mut results: Vec<RaceResult> = self
            .entries
            .iter()
            .map(|entry| RaceResult::empty(entry.clone(), legs))
            .collect();

        for (result, records) in results.iter_mut().zip(&assigned) {
            if legs > 1 {
                let slots = self.place_in_slots(raw, records);
                fill_legs(result, raw, &slots);
                self.compute_leg_starts(result)?;
            } else if let Some(&position) = records.first() {
                result.finish_time = raw[position].finish_time;
                result.recorded_position = Some(position);
            }
        }

        let whole_dnf = self.apply_dnfs(&mut results, &index)?;

        for result in &mut results {
            let is_dnf = whole_dnf.contains(&result.bib());
            self.finalize(result, is_dnf)?;
        }

        Ok(results)
    }

    /// Raw record indices per entry, in recording order
    fn assign_records(
        &self,
        raw: &[RawResult],
        index: &HashMap<Bib, usize>,
    ) -> Result<Vec<Vec<usize>>, ResolveError> {
        let legs = self.config.legs;
        let mut assigned: Vec<Vec<usize>> = vec![Vec::new(); self.entries.len()];

        for (position, record) in raw.iter().enumerate() {
            let Some(bib) = record.bib else {
                debug!("Skipping record with unknown bib: {}", record.describe());
                continue;
            };

            let &entry_index = index.get(&bib).ok_or_else(|| ResolveError::UnregisteredBib {
                record: self.describe(record),
            })?;

            if let Some(leg) = record.explicit_leg {
                if leg == 0 || leg > legs {
                    return Err(ResolveError::LegOutOfRange {
                        record: self.describe(record),
                        leg,
                        legs,
                    });
                }
            }

            let slots = &mut assigned[entry_index];
            if slots.len() >= legs {
                return Err(ResolveError::SurplusResult {
                    record: self.describe(record),
                    bib,
                    legs,
                });
            }
            slots.push(position);
        }

        Ok(assigned)
    }

    /// Order an entrant's records into leg slots, honouring explicit leg numbers
    fn place_in_slots(&self, raw: &[RawResult], records: &[usize]) -> Vec<Option<usize>> {
        let mut ordered = records.to_vec();
        ordered.sort_by_key(|&position| raw[position].explicit_leg.unwrap_or(0));

        let mut slots: Vec<Option<usize>> = ordered.into_iter().map(Some).collect();
        slots.resize(self.config.legs, None);
        slots
    }

    /// Start times and mass-start flags for each leg, in leg order
    fn compute_leg_starts(&self, result: &mut RaceResult) -> Result<(), ResolveError> {
        let bib = result.bib();
        let mut previous_finish: Option<Duration> = None;

        for leg in &mut result.leg_results {
            let leg_number = leg.leg_number;
            let mass_start = self.config.mass_start(leg_number);

            if let Some(start) = self.config.individual_start(bib.0, leg_number) {
                leg.start_time = Some(start);
                leg.in_mass_start = false;
            } else if leg_number == 1 {
                leg.start_time = Some(Duration::ZERO);
                leg.in_mass_start = false;
            } else {
                match previous_finish {
                    None => {
                        leg.start_time = None;
                        leg.in_mass_start = mass_start.is_some();
                    }
                    Some(handoff) => match mass_start {
                        Some(mass) if mass < handoff => {
                            leg.start_time = Some(mass);
                            leg.in_mass_start = true;
                        }
                        _ => {
                            leg.start_time = Some(handoff);
                            leg.in_mass_start = false;
                        }
                    },
                }
            }

            if let (Some(start), Some(finish)) = (leg.start_time, leg.finish_time) {
                if finish < start {
                    return Err(ResolveError::FinishBeforeStart {
                        bib,
                        leg: leg_number,
                        start: format_time(start),
                        finish: format_time(finish),
                    });
                }
            }

            leg.can_complete = leg.start_time.is_some() && leg.finish_time.is_some();
            previous_finish = leg.finish_time;
        }

        Ok(())
    }

    /// Mark configured non-finishers, returning the bibs declared DNF as a whole
    fn apply_dnfs(
        &self,
        results: &mut [RaceResult],
        index: &HashMap<Bib, usize>,
    ) -> Result<HashSet<Bib>, ResolveError> {
        let mut whole = HashSet::new();

        for dnf in &self.config.dnf {
            let bib = Bib(dnf.bib);
            let &i = index.get(&bib).ok_or(ResolveError::UnknownDnfEntry(bib))?;
            let result = &mut results[i];

            match dnf.leg {
                Some(leg) if result.is_relay() => {
                    let leg_result = leg
                        .checked_sub(1)
                        .and_then(|i| result.leg_results.get_mut(i))
                        .ok_or(ResolveError::UnknownDnfEntry(bib))?;
                    mark_dnf(leg_result);
                }
                _ => {
                    for leg_result in &mut result.leg_results {
                        mark_dnf(leg_result);
                    }
                    whole.insert(bib);
                }
            }
            debug!("Applied DNF for bib {bib}");
        }

        Ok(whole)
    }

    /// Derive completion, performance and the decisive record from the legs
    fn finalize(&self, result: &mut RaceResult, is_dnf: bool) -> Result<(), ResolveError> {
        match self.measure {
            PerformanceMeasure::SumOfLegDurations => {
                result.can_complete =
                    !is_dnf && result.leg_results.iter().all(|l| l.can_complete);
                result.performance = if result.can_complete {
                    result
                        .leg_results
                        .iter()
                        .map(LegResult::duration)
                        .sum::<Option<Duration>>()
                } else {
                    None
                };
                if let Some(last) = result.leg_results.last() {
                    result.finish_time = last.finish_time;
                    result.recorded_position = last.recorded_position;
                }
            }
            PerformanceMeasure::FinishTime => {
                let start = self
                    .config
                    .individual_start(result.bib().0, 1)
                    .unwrap_or(Duration::ZERO);

                if let Some(finish) = result.finish_time {
                    if finish < start {
                        return Err(ResolveError::FinishBeforeStart {
                            bib: result.bib(),
                            leg: 1,
                            start: format_time(start),
                            finish: format_time(finish),
                        });
                    }
                }

                result.can_complete = !is_dnf && result.finish_time.is_some();
                result.performance = if result.can_complete {
                    result.finish_time.map(|finish| finish - start)
                } else {
                    None
                };
            }
        }

        Ok(())
    }
}

fn fill_legs(result: &mut RaceResult, raw: &[RawResult], slots: &[Option<usize>]) {
    for (leg, slot) in result.leg_results.iter_mut().zip(slots) {
        if let Some(position) = *slot {
            leg.finish_time = raw[position].finish_time;
            leg.recorded_position = Some(position);
            leg.explicit_leg = raw[position].explicit_leg;
        }
    }
}

fn mark_dnf(leg: &mut LegResult) {
    leg.dnf = true;
    leg.can_complete = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn mins(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    fn teams(n: u32, legs: usize) -> Vec<Entry> {
        (1..=n)
            .map(|bib| {
                Entry::team(
                    bib,
                    format!("Team {bib}"),
                    "Open",
                    (1..=legs).map(|l| format!("Runner {bib}.{l}")).collect(),
                )
            })
            .collect()
    }

    fn runners(n: u32) -> Vec<Entry> {
        (1..=n)
            .map(|bib| Entry::runner(bib, format!("Runner {bib}"), "Club", "MS"))
            .collect()
    }

    fn record(bib: u32, time: Duration) -> RawResult {
        RawResult::new(Some(bib), Some(time))
    }

    #[test]
    fn test_single_race_attribution() {
        let config = RaceConfig::new("5k", 1);
        let entries = runners(3);
        let raw = vec![record(2, secs(900)), record(1, secs(950))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();

        assert_eq!(results[0].performance, Some(secs(950)));
        assert_eq!(results[0].recorded_position, Some(1));
        assert_eq!(results[1].performance, Some(secs(900)));
        assert!(results[1].can_complete);
        assert!(!results[2].can_complete);
        assert_eq!(results[2].performance, None);
    }

    #[test]
    fn test_unregistered_bib() {
        let config = RaceConfig::new("5k", 1);
        let entries = runners(2);
        let raw = vec![record(9, secs(900)).at_line(4)];

        let err = Reconstruction::new(&config, &entries, "raw.txt")
            .run(&raw)
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnregisteredBib { .. }));
        assert!(err.to_string().contains("raw.txt, line 4"));
    }

    #[test]
    fn test_surplus_result() {
        let config = RaceConfig::new("Relay", 2);
        let entries = teams(1, 2);
        let raw = vec![
            record(1, mins(20)),
            record(1, mins(40)),
            record(1, mins(41)),
        ];

        let err = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::SurplusResult { bib: Bib(1), legs: 2, .. }
        ));
    }

    #[test]
    fn test_slots_filled_first_come_first_served() {
        let config = RaceConfig::new("Relay", 3);
        let entries = teams(2, 3);
        let raw = vec![
            record(1, mins(10)),
            record(2, mins(11)),
            record(2, mins(20)),
            record(1, mins(22)),
            record(1, mins(30)),
        ];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();

        let team1 = &results[0];
        let positions: Vec<Option<usize>> = team1
            .leg_results
            .iter()
            .map(|l| l.recorded_position)
            .collect();
        assert_eq!(positions, vec![Some(0), Some(3), Some(4)]);
        assert_eq!(team1.leg_results[1].start_time, Some(mins(10)));
        assert_eq!(team1.leg_results[2].duration(), Some(mins(8)));
        assert_eq!(team1.performance, Some(mins(30)));
        assert_eq!(team1.recorded_position, Some(4));

        // Team 2 never finished leg 3
        let team2 = &results[1];
        assert!(!team2.can_complete);
        assert!(team2.leg_results[1].can_complete);
        assert!(!team2.leg_results[2].can_complete);
        assert_eq!(team2.leg_results[2].start_time, Some(mins(20)));
    }

    #[test]
    fn test_explicit_leg_numbers_reorder_slots() {
        // Leg 3 runner (mass start) finished before the leg 2 runner
        let config = RaceConfig::new("Relay", 3)
            .with_mass_starts(vec![None, None, Some(mins(15))]);
        let entries = teams(1, 3);
        let raw = vec![
            record(1, mins(10)),
            record(1, mins(28)).with_leg(3),
            record(1, mins(30)),
        ];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();

        let legs = &results[0].leg_results;
        let numbers: Vec<usize> = legs.iter().map(|l| l.leg_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(legs[1].recorded_position, Some(2));
        assert_eq!(legs[2].recorded_position, Some(1));
        assert_eq!(legs[2].explicit_leg, Some(3));
        // Leg 3 mass start at 15:00 is earlier than leg 2's finish at 30:00
        assert_eq!(legs[2].start_time, Some(mins(15)));
        assert!(legs[2].in_mass_start);
        assert_eq!(legs[2].duration(), Some(mins(13)));
    }

    #[test]
    fn test_explicit_leg_out_of_range() {
        let config = RaceConfig::new("Relay", 2);
        let entries = teams(1, 2);
        let raw = vec![record(1, mins(10)).with_leg(3)];
        assert!(matches!(
            Reconstruction::new(&config, &entries, "raw").run(&raw),
            Err(ResolveError::LegOutOfRange { leg: 3, .. })
        ));
    }

    #[test]
    fn test_unnumbered_record_sorts_before_explicit_leg_one() {
        let config = RaceConfig::new("Relay", 2);
        let entries = teams(1, 2);
        let raw = vec![record(1, mins(10)), record(1, mins(20)).with_leg(1)];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        let legs = &results[0].leg_results;
        assert_eq!(legs[0].finish_time, Some(mins(10)));
        assert_eq!(legs[1].finish_time, Some(mins(20)));
        assert_eq!(legs[1].start_time, Some(mins(10)));
        assert_eq!(results[0].performance, Some(mins(20)));
    }

    #[test]
    fn test_repeated_explicit_leg_keeps_recording_order() {
        let config = RaceConfig::new("Relay", 2);
        let entries = teams(1, 2);
        let raw = vec![record(1, mins(10)).with_leg(2), record(1, mins(20)).with_leg(2)];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        let legs = &results[0].leg_results;
        let numbers: Vec<usize> = legs.iter().map(|l| l.leg_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(legs[0].recorded_position, Some(0));
        assert_eq!(legs[1].recorded_position, Some(1));
        assert!(results[0].can_complete);
    }

    #[test]
    fn test_mass_start_earlier_than_handoff() {
        let config = RaceConfig::new("Relay", 2).with_mass_starts(vec![None, Some(mins(30))]);
        let entries = teams(1, 2);
        let raw = vec![record(1, mins(35)), record(1, mins(60))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        let leg2 = &results[0].leg_results[1];
        assert_eq!(leg2.start_time, Some(mins(30)));
        assert!(leg2.in_mass_start);
        assert_eq!(results[0].performance, Some(mins(35) + mins(30)));
    }

    #[test]
    fn test_handoff_earlier_than_mass_start() {
        let config = RaceConfig::new("Relay", 2).with_mass_starts(vec![None, Some(mins(30))]);
        let entries = teams(1, 2);
        let raw = vec![record(1, mins(25)), record(1, mins(50))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        let leg2 = &results[0].leg_results[1];
        assert_eq!(leg2.start_time, Some(mins(25)));
        assert!(!leg2.in_mass_start);
    }

    #[test]
    fn test_unfinished_previous_leg_blocks_next() {
        let config = RaceConfig::new("Relay", 3)
            .with_mass_starts(vec![None, None, Some(mins(40))]);
        let entries = teams(2, 3);
        // Team 1 only records one finish, attributed to leg 1
        let raw = vec![record(1, mins(20)), record(2, mins(21))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        let legs = &results[0].leg_results;
        assert_eq!(legs[1].start_time, Some(mins(20)));
        assert!(!legs[1].can_complete);
        assert_eq!(legs[2].start_time, None);
        assert!(!legs[2].can_complete);
        assert!(legs[2].in_mass_start);
        assert!(!legs[1].in_mass_start);
    }

    #[test]
    fn test_individual_leg_start_takes_priority() {
        let config = RaceConfig::new("Relay", 2)
            .with_mass_starts(vec![None, Some(mins(30))])
            .with_individual_start(1, 2, mins(33));
        let entries = teams(1, 2);
        let raw = vec![record(1, mins(35)), record(1, mins(60))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        let leg2 = &results[0].leg_results[1];
        assert_eq!(leg2.start_time, Some(mins(33)));
        assert!(!leg2.in_mass_start);
    }

    #[test]
    fn test_individual_start_for_unknown_bib() {
        let config = RaceConfig::new("Relay", 2).with_individual_start(5, 2, mins(33));
        let entries = teams(1, 2);
        assert!(matches!(
            Reconstruction::new(&config, &entries, "raw").run(&[]),
            Err(ResolveError::UnknownIndividualStart(Bib(5)))
        ));
    }

    #[test]
    fn test_finish_before_individual_start() {
        let config = RaceConfig::new("Relay", 2).with_individual_start(1, 2, mins(50));
        let entries = teams(1, 2);
        let raw = vec![record(1, mins(35)), record(1, mins(45))];
        assert!(matches!(
            Reconstruction::new(&config, &entries, "raw").run(&raw),
            Err(ResolveError::FinishBeforeStart { leg: 2, .. })
        ));
    }

    #[test]
    fn test_staggered_start_in_single_race() {
        let config = RaceConfig::new("Handicap", 1).with_individual_start(1, 1, mins(5));
        let entries = runners(1);
        let raw = vec![record(1, mins(25))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        assert_eq!(results[0].performance, Some(mins(20)));
    }

    #[test]
    fn test_dnf_leg_keeps_handoff() {
        let config = RaceConfig::new("Relay", 2).with_dnf(1, Some(1));
        let entries = teams(1, 2);
        let raw = vec![record(1, mins(20)), record(1, mins(40))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        let team = &results[0];
        assert!(team.leg_results[0].dnf);
        assert!(!team.leg_results[0].can_complete);
        // Leg 2 still starts from the leg 1 hand-off
        assert_eq!(team.leg_results[1].start_time, Some(mins(20)));
        assert!(team.leg_results[1].can_complete);
        assert!(!team.can_complete);
        assert_eq!(team.performance, None);
    }

    #[test]
    fn test_dnf_whole_entrant() {
        let config = RaceConfig::new("5k", 1).with_dnf(2, None);
        let entries = runners(2);
        let raw = vec![record(1, secs(900)), record(2, secs(950))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        assert!(results[0].can_complete);
        assert!(!results[1].can_complete);
        assert_eq!(results[1].performance, None);
        // The recorded finish is kept for reference
        assert_eq!(results[1].finish_time, Some(secs(950)));
    }

    #[test]
    fn test_dnf_unknown_bib() {
        let config = RaceConfig::new("5k", 1).with_dnf(7, None);
        let entries = runners(2);
        assert!(matches!(
            Reconstruction::new(&config, &entries, "raw").run(&[]),
            Err(ResolveError::UnknownDnfEntry(Bib(7)))
        ));
    }

    #[test]
    fn test_unknown_bib_records_are_skipped() {
        let config = RaceConfig::new("5k", 1);
        let entries = runners(2);
        let raw = vec![record(1, secs(900)), RawResult::new(None, Some(secs(910)))];

        let results = Reconstruction::new(&config, &entries, "raw")
            .run(&raw)
            .unwrap();
        assert!(results[0].can_complete);
        assert!(!results[1].can_complete);
    }
}
