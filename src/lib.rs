//! # race-resolver
//!
//! A library for turning noisy finish-line records into ranked, prize-allocated
//! race results.
//!
//! Finish recorders miss things: a bib number goes unread, a time is not
//! written down, a relay runner crosses the line before the teammate who was
//! supposed to hand over. `race-resolver` reconstructs a consistent result for
//! every entrant from such records, for individual races and for multi-leg
//! relays.
//!
//! ## Features
//!
//! - **Time interpolation**: unrecorded times are spread between recorded neighbours
//! - **Bib guessing**: only when every entrant is known to have finished
//! - **Relay reconstruction**: leg attribution, hand-offs, mass starts and explicit legs
//! - **Ranking**: named tie-break rules, optional dead heats
//! - **Prize allocation**: quotas and exclusivity, most general category first
//!
//! ## Example
//!
//! ```rust,no_run
//! use race_resolver::{CategoryCatalog, RaceConfig, ResultsEngine};
//! use race_resolver::parsing::entries::{parse_entries_text, EntryLayout};
//! use race_resolver::parsing::raw::parse_raw_results_text;
//!
//! let catalog = CategoryCatalog::load_embedded().unwrap();
//! let config = RaceConfig::new("Parkrun", 1);
//! let entries = parse_entries_text(
//!     "1\tAnn Lee\tFife AC\tWS\n2\tBob Roy\tFife AC\tMS\n",
//!     "entries",
//!     EntryLayout::individual(),
//!     &catalog,
//! )
//! .unwrap();
//! let raw = parse_raw_results_text("2\t17:02\n?\t17:40\n", "raw").unwrap();
//!
//! let engine = ResultsEngine::new(&config, &entries, &catalog).unwrap();
//! let race = engine.resolve(raw).unwrap();
//! for note in race.notes() {
//!     println!("record {}: {}", note.record_index, note.message);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Entry and prize category catalog and eligibility
//! - [`config`]: Per-race configuration
//! - [`core`]: Core data types for entries, records and results
//! - [`parsing`]: Parsers for entries, raw results and times
//! - [`resolution`]: Inference, reconstruction, ranking and prize allocation
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod parsing;
pub mod resolution;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::CategoryCatalog;
pub use config::RaceConfig;
pub use core::entry::Entry;
pub use core::raw::RawResult;
pub use core::result::{LegResult, RaceResult};
pub use core::types::*;
pub use resolution::engine::{ResolvedRace, ResultsEngine};
pub use resolution::ResolveError;
