//! Missing-data inference for raw finish records.
//!
//! Unknown times are always filled. Unknown bib numbers are only guessed when
//! the number of records equals `entrants x legs`: only then is every entrant
//! known to have finished every leg, so a missing bib cannot belong to a true
//! non-finisher.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::entry::Entry;
use crate::core::raw::{Annotation, RawResult};
use crate::core::types::Bib;
use crate::parsing::time::format_time;
use crate::resolution::ResolveError;

/// Counts of values fabricated by inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferenceSummary {
    pub times_inferred: usize,
    pub bibs_guessed: usize,
    pub bibs_unresolved: usize,
}

/// Check that recorded times never go backwards in recording order
///
/// # Errors
///
/// Returns `ResolveError::OutOfOrder` naming the first record earlier than its predecessor.
pub fn check_chronological_order(raw: &[RawResult], source_name: &str) -> Result<(), ResolveError> {
    let mut previous: Option<Duration> = None;

    for record in raw {
        let Some(time) = record.finish_time else {
            continue;
        };
        if let Some(prev) = previous {
            if time < prev {
                return Err(ResolveError::OutOfOrder {
                    record: format!("{source_name}, {}", record.describe()),
                    previous: format_time(prev),
                });
            }
        }
        previous = Some(time);
    }

    Ok(())
}

/// Time `k` of `n` evenly spaced between `t0` and `t1`
fn interpolate(t0: Duration, t1: Duration, k: usize, n: usize) -> Duration {
    let gap = t1.saturating_sub(t0).as_nanos();
    let step = gap * k as u128 / (n as u128 + 1);
    t0 + Duration::from_nanos(u64::try_from(step).unwrap_or(u64::MAX))
}

/// Fill every unknown finish time, returning how many were filled.
///
/// Records before the first known time copy it; a run of unknowns between two
/// known times is spread evenly between them; a trailing run copies the last
/// known time.
///
/// # Errors
///
/// Returns `ResolveError::NoRecordedTimes` if there are records but none has a time.
pub fn interpolate_times(raw: &mut [RawResult], source_name: &str) -> Result<usize, ResolveError> {
    if raw.is_empty() {
        return Ok(0);
    }

    let Some(first_known) = raw.iter().position(|r| r.finish_time.is_some()) else {
        return Err(ResolveError::NoRecordedTimes(source_name.to_string()));
    };

    let mut filled = 0;

    let first_time = raw[first_known].finish_time;
    for record in &mut raw[..first_known] {
        record.finish_time = first_time;
        record.annotate(Annotation::TimeBeforeFirstRecorded);
        filled += 1;
    }

    let mut last_known = first_known;
    let mut i = first_known + 1;
    while i < raw.len() {
        if raw[i].finish_time.is_some() {
            last_known = i;
            i += 1;
            continue;
        }

        let run_start = i;
        let mut run_end = i;
        while run_end < raw.len() && raw[run_end].finish_time.is_none() {
            run_end += 1;
        }

        let t0 = raw[last_known].finish_time.unwrap_or_default();
        let run_len = run_end - run_start;

        if run_end == raw.len() {
            for record in &mut raw[run_start..run_end] {
                record.finish_time = Some(t0);
                record.annotate(Annotation::TimeAfterLastRecorded);
            }
        } else {
            let t1 = raw[run_end].finish_time.unwrap_or(t0);
            for (k, record) in raw[run_start..run_end].iter_mut().enumerate() {
                record.finish_time = Some(interpolate(t0, t1, k + 1, run_len));
                record.annotate(Annotation::TimeInterpolated);
            }
        }

        filled += run_len;
        i = run_end;
    }

    Ok(filled)
}

/// Where an entrant's recorded finishes fall relative to one raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishingSummary {
    pub finishes_before: usize,
    pub finishes_after: usize,
    pub previous_finish: Option<Duration>,
    pub next_finish: Option<Duration>,
}

impl FinishingSummary {
    /// Summarise `bib`'s finishes around position `at`, ignoring the record at `at`
    #[must_use]
    pub fn at(raw: &[RawResult], at: usize, bib: Bib) -> Self {
        let mut summary = Self {
            finishes_before: 0,
            finishes_after: 0,
            previous_finish: None,
            next_finish: None,
        };

        for (i, record) in raw.iter().enumerate() {
            if record.bib != Some(bib) || i == at {
                continue;
            }
            if i < at {
                summary.finishes_before += 1;
                summary.previous_finish = record.finish_time;
            } else {
                summary.finishes_after += 1;
                if summary.next_finish.is_none() {
                    summary.next_finish = record.finish_time;
                }
            }
        }

        summary
    }

    /// Lower is a better candidate for the unknown record.
    ///
    /// A missing next finish sorts after any time; a missing previous finish
    /// counts as the race start.
    #[must_use]
    pub fn key(&self) -> (usize, usize, Duration, Duration) {
        (
            self.finishes_before,
            self.finishes_after,
            self.next_finish.unwrap_or(Duration::MAX),
            self.previous_finish.unwrap_or(Duration::ZERO),
        )
    }
}

/// Fill unknown bib numbers when the record count allows it.
///
/// Returns `(guessed, unresolved)`. Guesses are made in recording order and
/// count as known for later records. Ties go to the entrant listed first.
pub fn guess_bibs(raw: &mut [RawResult], entries: &[Entry], legs: usize) -> (usize, usize) {
    let unknown = raw.iter().filter(|r| r.bib.is_none()).count();
    if unknown == 0 {
        return (0, 0);
    }

    let expected = entries.len() * legs;
    if raw.len() != expected || entries.is_empty() {
        warn!(
            "{unknown} bib number(s) not recorded; not guessing since {} records were found but {expected} are expected if everyone finished",
            raw.len()
        );
        for record in raw.iter_mut().filter(|r| r.bib.is_none()) {
            record.annotate(Annotation::BibUnresolved);
        }
        return (0, unknown);
    }

    let mut guessed = 0;
    for i in 0..raw.len() {
        if raw[i].bib.is_some() {
            continue;
        }

        let records: &[RawResult] = raw;
        let best = entries
            .iter()
            .min_by_key(|entry| FinishingSummary::at(records, i, entry.bib).key());

        if let Some(entry) = best {
            debug!("Guessed bib {} for record {}", entry.bib, raw[i].describe());
            raw[i].bib = Some(entry.bib);
            raw[i].annotate(Annotation::BibGuessed(entry.bib));
            guessed += 1;
        }
    }

    (guessed, 0)
}

/// Run all inference over the raw records in place
///
/// # Errors
///
/// Returns an error if recorded times go backwards or no time was recorded at all.
pub fn infer_missing_data(
    raw: &mut [RawResult],
    entries: &[Entry],
    legs: usize,
    source_name: &str,
) -> Result<InferenceSummary, ResolveError> {
    check_chronological_order(raw, source_name)?;

    let times_inferred = interpolate_times(raw, source_name)?;
    let (bibs_guessed, bibs_unresolved) = guess_bibs(raw, entries, legs);

    let summary = InferenceSummary {
        times_inferred,
        bibs_guessed,
        bibs_unresolved,
    };

    info!(
        "Inference: {} time(s) inferred, {} bib(s) guessed, {} bib(s) unresolved",
        summary.times_inferred, summary.bibs_guessed, summary.bibs_unresolved
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Option<Duration> {
        Some(Duration::from_secs(s))
    }

    fn raw(records: &[(Option<u32>, Option<Duration>)]) -> Vec<RawResult> {
        records
            .iter()
            .map(|(bib, time)| RawResult::new(*bib, *time))
            .collect()
    }

    fn entries(n: u32) -> Vec<Entry> {
        (1..=n)
            .map(|bib| Entry::runner(bib, format!("Runner {bib}"), "Club", "MS"))
            .collect()
    }

    #[test]
    fn test_interpolation_is_evenly_spaced() {
        let mut records = raw(&[
            (Some(1), secs(100)),
            (Some(2), None),
            (Some(3), None),
            (Some(4), None),
            (Some(5), secs(200)),
        ]);

        let filled = interpolate_times(&mut records, "raw").unwrap();
        assert_eq!(filled, 3);

        let times: Vec<Duration> = records.iter().map(|r| r.finish_time.unwrap()).collect();
        assert_eq!(
            times,
            vec![
                Duration::from_secs(100),
                Duration::from_secs(125),
                Duration::from_secs(150),
                Duration::from_secs(175),
                Duration::from_secs(200),
            ]
        );
        assert_eq!(records[2].annotations, vec![Annotation::TimeInterpolated]);
        assert!(records[0].annotations.is_empty());
    }

    #[test]
    fn test_interpolated_values_strictly_between() {
        let mut records = raw(&[
            (Some(1), secs(60)),
            (Some(2), None),
            (Some(3), None),
            (Some(4), secs(61)),
        ]);
        interpolate_times(&mut records, "raw").unwrap();

        let t1 = records[1].finish_time.unwrap();
        let t2 = records[2].finish_time.unwrap();
        assert!(Duration::from_secs(60) < t1);
        assert!(t1 < t2);
        assert!(t2 < Duration::from_secs(61));
        assert_eq!(t2 - t1, t1 - Duration::from_secs(60));
    }

    #[test]
    fn test_leading_and_trailing_unknown_times() {
        let mut records = raw(&[
            (Some(1), None),
            (Some(2), None),
            (Some(3), secs(300)),
            (Some(4), secs(400)),
            (Some(5), None),
        ]);
        interpolate_times(&mut records, "raw").unwrap();

        assert_eq!(records[0].finish_time, secs(300));
        assert_eq!(records[1].finish_time, secs(300));
        assert_eq!(records[4].finish_time, secs(400));
        assert_eq!(
            records[0].annotations,
            vec![Annotation::TimeBeforeFirstRecorded]
        );
        assert_eq!(
            records[4].annotations,
            vec![Annotation::TimeAfterLastRecorded]
        );
    }

    #[test]
    fn test_no_recorded_times_is_an_error() {
        let mut records = raw(&[(Some(1), None), (Some(2), None)]);
        assert!(matches!(
            interpolate_times(&mut records, "raw"),
            Err(ResolveError::NoRecordedTimes(_))
        ));
        assert_eq!(interpolate_times(&mut [], "raw").unwrap(), 0);
    }

    #[test]
    fn test_out_of_order_times_rejected() {
        let records = raw(&[(Some(1), secs(100)), (Some(2), None), (Some(3), secs(90))]);
        let err = check_chronological_order(&records, "raw.txt").unwrap_err();
        assert!(matches!(err, ResolveError::OutOfOrder { .. }));
        assert!(err.to_string().contains("bib 3"));

        let equal = raw(&[(Some(1), secs(100)), (Some(2), secs(100))]);
        assert!(check_chronological_order(&equal, "raw.txt").is_ok());
    }

    #[test]
    fn test_guess_resolves_entrant_yet_to_finish() {
        // Bib 1 finished before the unknown record, bib 2 after; bib 3 has no
        // other finish so it must be the missing one.
        let mut records = raw(&[(Some(1), secs(100)), (None, secs(110)), (Some(2), secs(120))]);
        let (guessed, unresolved) = guess_bibs(&mut records, &entries(3), 1);

        assert_eq!((guessed, unresolved), (1, 0));
        assert_eq!(records[1].bib, Some(Bib(3)));
        assert_eq!(records[1].annotations, vec![Annotation::BibGuessed(Bib(3))]);
    }

    #[test]
    fn test_guess_precondition_blocks_fabrication() {
        // Four entrants but only three records: someone did not finish
        let mut records = raw(&[(Some(1), secs(100)), (None, secs(110)), (Some(2), secs(120))]);
        let (guessed, unresolved) = guess_bibs(&mut records, &entries(4), 1);

        assert_eq!((guessed, unresolved), (0, 1));
        assert_eq!(records[1].bib, None);
        assert_eq!(records[1].annotations, vec![Annotation::BibUnresolved]);
    }

    #[test]
    fn test_guess_relay_prefers_fewest_completed_legs() {
        // Two teams, two legs: team 1 has finished leg 1 before the unknown
        // record, team 2 has not finished anything yet.
        let mut records = raw(&[
            (Some(1), secs(100)),
            (None, secs(110)),
            (Some(1), secs(200)),
            (Some(2), secs(210)),
        ]);
        let (guessed, _) = guess_bibs(&mut records, &entries(2), 2);
        assert_eq!(guessed, 1);
        assert_eq!(records[1].bib, Some(Bib(2)));
    }

    #[test]
    fn test_guesses_count_for_later_records() {
        let mut records = raw(&[(None, secs(100)), (None, secs(110))]);
        let (guessed, _) = guess_bibs(&mut records, &entries(2), 1);
        assert_eq!(guessed, 2);
        assert_eq!(records[0].bib, Some(Bib(1)));
        assert_eq!(records[1].bib, Some(Bib(2)));
    }

    #[test]
    fn test_finishing_summary() {
        let records = raw(&[
            (Some(1), secs(100)),
            (Some(2), secs(110)),
            (None, secs(120)),
            (Some(1), secs(130)),
            (Some(1), secs(140)),
        ]);
        let summary = FinishingSummary::at(&records, 2, Bib(1));
        assert_eq!(summary.finishes_before, 1);
        assert_eq!(summary.finishes_after, 2);
        assert_eq!(summary.previous_finish, secs(100));
        assert_eq!(summary.next_finish, secs(130));

        let absent = FinishingSummary::at(&records, 2, Bib(9));
        assert_eq!(
            absent.key(),
            (0, 0, Duration::MAX, Duration::ZERO)
        );
    }

    #[test]
    fn test_infer_missing_data_summary() {
        let mut records = raw(&[(Some(1), secs(100)), (None, None), (Some(2), secs(120))]);
        let summary = infer_missing_data(&mut records, &entries(3), 1, "raw").unwrap();
        assert_eq!(
            summary,
            InferenceSummary {
                times_inferred: 1,
                bibs_guessed: 1,
                bibs_unresolved: 0,
            }
        );
        assert_eq!(records[1].finish_time, secs(110));
        assert_eq!(records[1].bib, Some(Bib(3)));
    }
}
