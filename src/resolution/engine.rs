//! One race run: inference, reconstruction, ranking and prize allocation.

use std::time::Duration;

use tracing::{debug, info};

use crate::catalog::store::CategoryCatalog;
use crate::config::RaceConfig;
use crate::core::category::PrizeCategory;
use crate::core::entry::Entry;
use crate::core::raw::RawResult;
use crate::core::result::{LegResult, RaceResult};
use crate::core::types::Bib;
use crate::resolution::inference::{infer_missing_data, InferenceSummary};
use crate::resolution::prizes::PrizeAllocation;
use crate::resolution::ranking::RankingEngine;
use crate::resolution::reconstruction::Reconstruction;
use crate::resolution::ResolveError;

/// Source name used in error messages when none is given
pub const DEFAULT_SOURCE_NAME: &str = "raw results";

/// Runs the resolution stages for one race over borrowed inputs
pub struct ResultsEngine<'a> {
    config: &'a RaceConfig,
    entries: &'a [Entry],
    catalog: &'a CategoryCatalog,
    source_name: String,
}

impl<'a> ResultsEngine<'a> {
    /// Create an engine for a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Config` if the configuration is inconsistent.
    pub fn new(
        config: &'a RaceConfig,
        entries: &'a [Entry],
        catalog: &'a CategoryCatalog,
    ) -> Result<Self, ResolveError> {
        config.validate()?;
        Ok(Self {
            config,
            entries,
            catalog,
            source_name: DEFAULT_SOURCE_NAME.to_string(),
        })
    }

    /// Name of the raw results source, used in error messages
    #[must_use]
    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    /// Fill in missing times and, where safe, missing bibs
    ///
    /// # Errors
    ///
    /// Returns an error if recorded times go backwards or none were recorded.
    pub fn infer(&self, raw: &mut [RawResult]) -> Result<InferenceSummary, ResolveError> {
        infer_missing_data(raw, self.entries, self.config.legs, &self.source_name)
    }

    /// Resolve the raw records into ranked, prize-allocated results
    ///
    /// # Errors
    ///
    /// Returns the first data-integrity failure found; no partial results are produced.
    pub fn resolve(&self, mut raw: Vec<RawResult>) -> Result<ResolvedRace, ResolveError> {
        let summary = self.infer(&mut raw)?;

        let mut results =
            Reconstruction::new(self.config, self.entries, &self.source_name).run(&raw)?;

        let ranking = RankingEngine::new(self.config.dead_heats);
        ranking.rank(&mut results);

        let leg_rankings = self.rank_legs(&results);
        let category_standings = self.category_standings(&results, &ranking);

        let prizes = PrizeAllocation::allocate(&results, self.catalog);
        prizes.apply(&mut results);

        info!(
            "Resolved {}: {} of {} entrant(s) finished, {} prize(s) awarded",
            self.config.name,
            results.iter().filter(|r| r.can_complete).count(),
            results.len(),
            prizes.prize_count()
        );

        Ok(ResolvedRace {
            name: self.config.name.clone(),
            legs: self.config.legs,
            dead_heats: self.config.dead_heats,
            results,
            leg_rankings,
            prizes,
            category_standings,
            raw_results: raw,
            summary,
        })
    }

    /// Every team's result for each leg, fastest first; dead heats always share
    fn rank_legs(&self, results: &[RaceResult]) -> Vec<LegRanking> {
        if !self.config.is_relay() {
            return Vec::new();
        }

        let ranking = RankingEngine::new(true);
        (1..=self.config.legs)
            .map(|leg| {
                let mut leg_results: Vec<LegResult> = results
                    .iter()
                    .filter_map(|r| r.leg_results.get(leg - 1).cloned())
                    .collect();
                ranking.rank(&mut leg_results);

                let mass_starters = leg_results.iter().filter(|l| l.in_mass_start).count();
                if mass_starters > 0 {
                    debug!("Leg {leg}: {mass_starters} runner(s) in mass start");
                }

                LegRanking {
                    leg,
                    mass_start: self.config.mass_start(leg),
                    results: leg_results,
                }
            })
            .collect()
    }

    fn category_standings(
        &self,
        results: &[RaceResult],
        ranking: &RankingEngine,
    ) -> Vec<CategoryStanding> {
        self.catalog
            .prize_categories_by_generality()
            .into_iter()
            .map(|category| {
                let eligible: Vec<usize> = results
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| self.catalog.entry_eligible(&r.entry, category))
                    .map(|(i, _)| i)
                    .collect();

                let standings = ranking
                    .rank_subset(results, &eligible)
                    .into_iter()
                    .map(|(i, position)| Standing {
                        bib: results[i].bib(),
                        position,
                    })
                    .collect();

                CategoryStanding {
                    category: category.clone(),
                    standings,
                }
            })
            .collect()
    }
}

/// Results of one leg across all teams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegRanking {
    pub leg: usize,
    pub mass_start: Option<Duration>,
    /// Ranked by leg duration
    pub results: Vec<LegResult>,
}

/// Position of one entrant within a category's eligible field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub bib: Bib,
    pub position: String,
}

/// Ranking restricted to the entrants eligible for one prize category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStanding {
    pub category: PrizeCategory,
    pub standings: Vec<Standing>,
}

/// An inference annotation surfaced for the race report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingNote {
    /// Index of the record in the raw results
    pub record_index: usize,
    /// Line in the raw results file; 0 when not read from a file
    pub line: usize,
    pub bib: Option<Bib>,
    pub message: String,
}

/// Fully resolved race, ready for reporting
#[derive(Debug, Clone)]
pub struct ResolvedRace {
    pub name: String,
    pub legs: usize,
    pub dead_heats: bool,
    /// Ranked, with positions and prizes
    pub results: Vec<RaceResult>,
    /// One per leg for relays, empty otherwise
    pub leg_rankings: Vec<LegRanking>,
    pub prizes: PrizeAllocation,
    /// In prize allocation order
    pub category_standings: Vec<CategoryStanding>,
    /// After inference
    pub raw_results: Vec<RawResult>,
    pub summary: InferenceSummary,
}

impl ResolvedRace {
    #[must_use]
    pub fn is_relay(&self) -> bool {
        self.legs > 1
    }

    #[must_use]
    pub fn result(&self, bib: Bib) -> Option<&RaceResult> {
        self.results.iter().find(|r| r.bib() == bib)
    }

    #[must_use]
    pub fn finishers(&self) -> usize {
        self.results.iter().filter(|r| r.can_complete).count()
    }

    /// One note per inference annotation, in recording order
    #[must_use]
    pub fn notes(&self) -> Vec<ProcessingNote> {
        self.raw_results
            .iter()
            .enumerate()
            .flat_map(|(i, record)| {
                record.annotations.iter().map(move |annotation| ProcessingNote {
                    record_index: i,
                    line: record.line,
                    bib: record.bib,
                    message: annotation.to_string(),
                })
            })
            .collect()
    }
}
