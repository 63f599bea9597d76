//! Command-line interface for race-resolver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **resolve**: Resolve a race and print ranked results, prizes and notes
//! - **infer**: Print the raw results after missing times and bibs are filled in
//! - **check**: Validate a race's inputs without printing results
//! - **categories**: List the category catalog in prize allocation order
//!
//! ## Usage
//!
//! ```text
//! # Resolve a race described by a configuration file
//! race-resolver resolve races/lochs/race.json
//!
//! # JSON output for scripting
//! race-resolver resolve races/lochs/race.json --format json
//!
//! # See what inference did to the raw results
//! race-resolver infer races/lochs/race.json
//!
//! # List the embedded category catalog
//! race-resolver categories
//! ```

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::store::CategoryCatalog;
use crate::config::RaceConfig;
use crate::core::entry::Entry;
use crate::core::raw::RawResult;
use crate::core::result::PrizeAward;
use crate::parsing::entries::{parse_entries_file, EntryLayout};
use crate::parsing::raw::parse_raw_results_file;
use crate::resolution::engine::ResultsEngine;

pub mod categories;
pub mod check;
pub mod infer;
pub mod resolve;

#[derive(Parser)]
#[command(name = "race-resolver")]
#[command(version)]
#[command(about = "Resolve raw finish records into ranked, prize-allocated race results")]
#[command(
    long_about = "race-resolver turns the finish records of a race into final results.\n\nIt fills in unrecorded times and bib numbers where that is safe, reconstructs relay legs from the order runners crossed the line, and provides:\n- Rankings with recorded-order tie-breaks or dead heats\n- Prize allocation across overlapping, exclusive categories\n- Per-leg rankings and category standings for relays\n- Notes for every value that was inferred rather than recorded"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a race and print results
    Resolve(resolve::ResolveArgs),

    /// Print raw results after missing-data inference
    Infer(infer::InferArgs),

    /// Validate a race's configuration and input files
    Check(check::CheckArgs),

    /// List entry and prize categories
    Categories(categories::CategoriesArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Everything read from disk for one race run
pub struct RaceInputs {
    pub config: RaceConfig,
    pub catalog: CategoryCatalog,
    pub entries: Vec<Entry>,
    pub raw: Vec<RawResult>,
    /// Display name of the raw results file
    pub raw_source: String,
}

impl RaceInputs {
    /// Load a race configuration and the files it refers to
    ///
    /// # Errors
    ///
    /// Returns an error naming the file that could not be read or parsed.
    pub fn load(config_path: &Path, verbose: bool) -> anyhow::Result<Self> {
        let config = RaceConfig::load_from_file(config_path)
            .with_context(|| format!("Failed to load race configuration {}", config_path.display()))?;

        let catalog = match config.categories_path() {
            Some(path) => CategoryCatalog::load_from_file(&path)
                .with_context(|| format!("Failed to load categories {}", path.display()))?,
            None => CategoryCatalog::load_embedded()?,
        };

        let layout = if config.is_relay() {
            EntryLayout::relay(config.legs, &config.paired_legs)
        } else {
            EntryLayout::individual()
        };
        let entries_path = config.entries_path();
        let entries = parse_entries_file(&entries_path, layout, &catalog)
            .with_context(|| format!("Failed to load entries {}", entries_path.display()))?;

        let raw_path = config.raw_results_path();
        let raw = parse_raw_results_file(&raw_path)
            .with_context(|| format!("Failed to load raw results {}", raw_path.display()))?;

        if verbose {
            eprintln!(
                "Loaded {}: {} entries, {} raw results, {} prize categories",
                config.name,
                entries.len(),
                raw.len(),
                catalog.len()
            );
        }

        Ok(Self {
            config,
            catalog,
            entries,
            raw,
            raw_source: raw_path.display().to_string(),
        })
    }

    /// An engine over the loaded inputs
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is inconsistent.
    pub fn engine(&self) -> anyhow::Result<ResultsEngine<'_>> {
        Ok(ResultsEngine::new(&self.config, &self.entries, &self.catalog)?
            .with_source_name(self.raw_source.clone()))
    }
}

/// Prize list for display, e.g. `Open (1st), W40 (1st)`
pub(crate) fn format_prizes(prizes: &[PrizeAward]) -> String {
    prizes
        .iter()
        .map(|p| format!("{} ({})", p.category.short_name, ordinal(p.place)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Truncate to at most `max_len` characters, marking the cut with `...`
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
