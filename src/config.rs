//! Per-race configuration, read from a JSON file.
//!
//! ```json
//! {
//!   "name": "Round the Lochs Relay",
//!   "legs": 4,
//!   "dead_heats": false,
//!   "mass_starts": ["none", "none", "1:05:00", "1:50:00"],
//!   "paired_legs": [false, false, true, false],
//!   "individual_leg_starts": [{ "bib": 12, "leg": 2, "start": "0:41:00" }],
//!   "dnf": [{ "bib": 7, "leg": 3 }, { "bib": 9 }],
//!   "entries": "entries.tsv",
//!   "raw_results": "raw.txt",
//!   "categories": "categories.json"
//! }
//! ```
//!
//! Input paths are relative to the directory holding the configuration file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::parsing::time::{deserialize_optional_times, deserialize_time};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read race configuration: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse race configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid race configuration: {0}")]
    Invalid(String),
}

fn default_legs() -> usize {
    1
}

/// A leg start time recorded for one runner instead of a hand-off
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndividualLegStart {
    pub bib: u32,
    pub leg: usize,
    #[serde(deserialize_with = "deserialize_time")]
    pub start: Duration,
}

/// An entrant (or one leg of a team) declared not to have finished
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnfDeclaration {
    pub bib: u32,
    /// Whole entrant when absent
    #[serde(default)]
    pub leg: Option<usize>,
}

/// Configuration for one race run
#[derive(Debug, Clone, Deserialize)]
pub struct RaceConfig {
    pub name: String,

    /// Number of legs; 1 for an individual race
    #[serde(default = "default_legs")]
    pub legs: usize,

    /// Entrants with equal performance share a position
    #[serde(default)]
    pub dead_heats: bool,

    /// Per-leg mass-start elapsed time, `none` where the leg has no mass start
    #[serde(default, deserialize_with = "deserialize_optional_times")]
    pub mass_starts: Vec<Option<Duration>>,

    /// Per-leg flag for legs run by a pair of runners
    #[serde(default)]
    pub paired_legs: Vec<bool>,

    #[serde(default)]
    pub individual_leg_starts: Vec<IndividualLegStart>,

    #[serde(default)]
    pub dnf: Vec<DnfDeclaration>,

    /// Entries file
    pub entries: PathBuf,

    /// Raw results file
    pub raw_results: PathBuf,

    /// Category catalog file; the embedded catalog is used when absent
    #[serde(default)]
    pub categories: Option<PathBuf>,

    /// Directory relative input paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl RaceConfig {
    /// Configuration for an in-memory race with no input files
    pub fn new(name: impl Into<String>, legs: usize) -> Self {
        Self {
            name: name.into(),
            legs,
            dead_heats: false,
            mass_starts: Vec::new(),
            paired_legs: Vec::new(),
            individual_leg_starts: Vec::new(),
            dnf: Vec::new(),
            entries: PathBuf::new(),
            raw_results: PathBuf::new(),
            categories: None,
            base_dir: PathBuf::new(),
        }
    }

    #[must_use]
    pub fn with_dead_heats(mut self) -> Self {
        self.dead_heats = true;
        self
    }

    #[must_use]
    pub fn with_mass_starts(mut self, mass_starts: Vec<Option<Duration>>) -> Self {
        self.mass_starts = mass_starts;
        self
    }

    #[must_use]
    pub fn with_individual_start(mut self, bib: u32, leg: usize, start: Duration) -> Self {
        self.individual_leg_starts
            .push(IndividualLegStart { bib, leg, start });
        self
    }

    #[must_use]
    pub fn with_dnf(mut self, bib: u32, leg: Option<usize>) -> Self {
        self.dnf.push(DnfDeclaration { bib, leg });
        self
    }

    /// Load and validate a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, lacks a
    /// required key, or fails validation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Parse and validate a configuration from JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, lacks a required key, or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.legs == 0 {
            return Err(ConfigError::Invalid("legs must be at least 1".to_string()));
        }

        if !self.mass_starts.is_empty() {
            if self.mass_starts.len() != self.legs {
                return Err(ConfigError::Invalid(format!(
                    "mass_starts has {} values but the race has {} legs",
                    self.mass_starts.len(),
                    self.legs
                )));
            }
            if self.mass_starts[0].is_some() {
                return Err(ConfigError::Invalid(
                    "leg 1 cannot have a mass start; use \"none\"".to_string(),
                ));
            }
        }

        if !self.paired_legs.is_empty() && self.paired_legs.len() != self.legs {
            return Err(ConfigError::Invalid(format!(
                "paired_legs has {} values but the race has {} legs",
                self.paired_legs.len(),
                self.legs
            )));
        }

        let mut seen = HashSet::new();
        for start in &self.individual_leg_starts {
            self.check_leg(start.leg, "individual_leg_starts")?;
            if !seen.insert((start.bib, start.leg)) {
                return Err(ConfigError::Invalid(format!(
                    "individual_leg_starts lists bib {} leg {} twice",
                    start.bib, start.leg
                )));
            }
        }

        for dnf in &self.dnf {
            if let Some(leg) = dnf.leg {
                self.check_leg(leg, "dnf")?;
            }
        }

        Ok(())
    }

    fn check_leg(&self, leg: usize, key: &str) -> Result<(), ConfigError> {
        if leg == 0 || leg > self.legs {
            return Err(ConfigError::Invalid(format!(
                "{key} refers to leg {leg} but the race has {} legs",
                self.legs
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_relay(&self) -> bool {
        self.legs > 1
    }

    /// Mass-start time of a leg (1-based), if it has one
    #[must_use]
    pub fn mass_start(&self, leg: usize) -> Option<Duration> {
        leg.checked_sub(1)
            .and_then(|i| self.mass_starts.get(i))
            .copied()
            .flatten()
    }

    /// Individually recorded start time for a bib on a leg
    #[must_use]
    pub fn individual_start(&self, bib: u32, leg: usize) -> Option<Duration> {
        self.individual_leg_starts
            .iter()
            .find(|s| s.bib == bib && s.leg == leg)
            .map(|s| s.start)
    }

    /// Resolve an input path against the configuration file's directory
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    #[must_use]
    pub fn entries_path(&self) -> PathBuf {
        self.resolve_path(&self.entries)
    }

    #[must_use]
    pub fn raw_results_path(&self) -> PathBuf {
        self.resolve_path(&self.raw_results)
    }

    #[must_use]
    pub fn categories_path(&self) -> Option<PathBuf> {
        self.categories.as_deref().map(|p| self.resolve_path(p))
    }
}
