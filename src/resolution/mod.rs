//! Results resolution engine.
//!
//! This module turns raw finish-line records into ranked, prize-allocated results:
//!
//! - [`inference`]: fills in missing finish times and, when safe, missing bib numbers
//! - [`reconstruction`]: attributes records to entrants and relay legs, computes leg starts
//! - [`ranking`]: orders results with named tie-break rules and assigns positions
//! - [`prizes`]: allocates prizes across categories, most general first
//! - [`engine`]: runs the stages in order for one race
//!
//! ## Pipeline
//!
//! 1. **Order check**: recorded times must never go backwards
//! 2. **Interpolation**: unknown times are spread evenly between known neighbours
//! 3. **Bib guessing**: only when every entrant is known to have finished every leg
//! 4. **Reconstruction**: first-come-first-served leg slots, explicit legs re-sorted
//! 5. **DNF list**: configured non-finishers override inferred completion
//! 6. **Ranking**: completion, performance, then recorded order (or a shared position)
//! 7. **Prizes**: quotas and exclusivity, most general category first
//!
//! ## Example
//!
//! ```rust,no_run
//! use race_resolver::{CategoryCatalog, RaceConfig, ResultsEngine};
//! use race_resolver::parsing::entries::{parse_entries_text, EntryLayout};
//! use race_resolver::parsing::raw::parse_raw_results_text;
//!
//! let catalog = CategoryCatalog::load_embedded().unwrap();
//! let config = RaceConfig::new("Parkrun", 1).with_dead_heats();
//! let entries = parse_entries_text(
//!     "1\tAnn Lee\tFife AC\tWS\n2\tBob Roy\tFife AC\tMS\n",
//!     "entries",
//!     EntryLayout::individual(),
//!     &catalog,
//! )
//! .unwrap();
//! let raw = parse_raw_results_text("2\t17:02\n1\t17:02\n", "raw").unwrap();
//!
//! let engine = ResultsEngine::new(&config, &entries, &catalog).unwrap();
//! let race = engine.resolve(raw).unwrap();
//! for result in &race.results {
//!     println!("{} {}", result.position.as_deref().unwrap_or("-"), result.entry.name());
//! }
//! ```

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::types::Bib;

pub mod engine;
pub mod inference;
pub mod prizes;
pub mod ranking;
pub mod reconstruction;

/// Fatal problems found while resolving a race. Each names the offending record.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No finish times recorded in {0}")]
    NoRecordedTimes(String),

    #[error("{record}: recorded out of order, earlier than the previous time {previous}")]
    OutOfOrder { record: String, previous: String },

    #[error("{record}: bib number is not registered")]
    UnregisteredBib { record: String },

    #[error("{record}: surplus result, bib {bib} already has all {legs} leg(s) recorded")]
    SurplusResult {
        record: String,
        bib: Bib,
        legs: usize,
    },

    #[error("{record}: leg {leg} is outside 1..={legs}")]
    LegOutOfRange {
        record: String,
        leg: usize,
        legs: usize,
    },

    #[error("Bib {bib} leg {leg}: finish time {finish} is before start time {start}")]
    FinishBeforeStart {
        bib: Bib,
        leg: usize,
        start: String,
        finish: String,
    },

    #[error("DNF list refers to bib {0}, which is not registered")]
    UnknownDnfEntry(Bib),

    #[error("Individual leg start refers to bib {0}, which is not registered")]
    UnknownIndividualStart(Bib),
}
