//! Centralized validation and helper functions.

use std::collections::HashSet;

use crate::core::entry::{Entry, Participant};

/// Maximum number of raw finish records allowed in a single file
pub const MAX_RECORDS: usize = 100_000;

/// Maximum number of entries allowed in a single roster
pub const MAX_ENTRIES: usize = 50_000;

/// Separator between the two runner names of a paired leg
pub const PAIRED_LEG_SEPARATOR: &str = " & ";

/// Check if adding another raw record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_RECORDS}"
        ))
    } else {
        None
    }
}

/// Check if adding another entry would exceed the maximum allowed.
#[must_use]
pub fn check_entry_limit(count: usize) -> Option<String> {
    if count >= MAX_ENTRIES {
        Some(format!(
            "Too many entries: adding another would exceed maximum of {MAX_ENTRIES}"
        ))
    } else {
        None
    }
}

/// Tracks bib numbers and participant identities already registered,
/// so each new entry can be checked for duplication as it is loaded.
#[derive(Debug, Default)]
pub struct EntryUniqueness {
    bibs: HashSet<u32>,
    runners: HashSet<(String, String)>,
    teams: HashSet<String>,
}

impl EntryUniqueness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, returning a description of the clash if it duplicates an earlier one
    pub fn register(&mut self, entry: &Entry) -> Option<String> {
        if !self.bibs.insert(entry.bib.0) {
            return Some(format!("duplicate bib number {}", entry.bib));
        }

        match &entry.participant {
            Participant::Runner(runner) => {
                let key = (runner.name.to_lowercase(), runner.club.to_lowercase());
                if !self.runners.insert(key) {
                    return Some(format!(
                        "duplicate entry for {} ({})",
                        runner.name, runner.club
                    ));
                }
            }
            Participant::Team(team) => {
                if !self.teams.insert(team.name.to_lowercase()) {
                    return Some(format!("duplicate team name {}", team.name));
                }
            }
        }

        None
    }
}

/// Whether a runner field names exactly two runners, as a paired leg requires
#[must_use]
pub fn is_valid_pair(names: &str) -> bool {
    let parts: Vec<&str> = names.split(PAIRED_LEG_SEPARATOR).collect();
    parts.len() == 2 && parts.iter().all(|p| !p.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_limit() {
        assert!(check_record_limit(0).is_none());
        assert!(check_record_limit(MAX_RECORDS - 1).is_none());
        assert!(check_record_limit(MAX_RECORDS).is_some());
    }

    #[test]
    fn test_entry_limit() {
        assert!(check_entry_limit(10).is_none());
        assert!(check_entry_limit(MAX_ENTRIES).is_some());
    }

    #[test]
    fn test_duplicate_bib() {
        let mut seen = EntryUniqueness::new();
        assert!(seen.register(&Entry::runner(1, "Ann", "Fife AC", "WS")).is_none());
        let clash = seen.register(&Entry::runner(1, "Bob", "Fife AC", "MS"));
        assert_eq!(clash.as_deref(), Some("duplicate bib number 1"));
    }

    #[test]
    fn test_duplicate_runner_is_case_insensitive() {
        let mut seen = EntryUniqueness::new();
        assert!(seen.register(&Entry::runner(1, "Ann Lee", "Fife AC", "WS")).is_none());
        assert!(seen.register(&Entry::runner(2, "ann lee", "FIFE AC", "WS")).is_some());
        // Same name, different club is a different person
        assert!(seen.register(&Entry::runner(3, "Ann Lee", "Dundee RR", "WS")).is_none());
    }

    #[test]
    fn test_duplicate_team() {
        let mut seen = EntryUniqueness::new();
        assert!(seen.register(&Entry::team(1, "Harriers A", "Open", vec![])).is_none());
        assert!(seen.register(&Entry::team(2, "Harriers A", "Open", vec![])).is_some());
    }

    #[test]
    fn test_is_valid_pair() {
        assert!(is_valid_pair("Ann Lee & Bob Roy"));
        assert!(!is_valid_pair("Ann Lee"));
        assert!(!is_valid_pair("Ann & "));
        assert!(!is_valid_pair("A & B & C"));
    }
}
