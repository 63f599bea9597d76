//! Check command - validate a race's inputs and report what was found.

use std::path::PathBuf;

use clap::Args;

use crate::cli::{OutputFormat, RaceInputs};

#[derive(Args)]
pub struct CheckArgs {
    /// Race configuration file (JSON)
    #[arg(required = true)]
    pub config: PathBuf,
}

/// Counts gathered while checking one race
struct CheckSummary {
    race: String,
    legs: usize,
    entries: usize,
    records: usize,
    unknown_bibs: usize,
    unknown_times: usize,
    finishers: usize,
    notes: usize,
}

/// Execute check subcommand
///
/// Loading and resolving are both run so that every data-integrity error the
/// resolve command would hit is reported here too.
///
/// # Errors
///
/// Returns the first problem found in the configuration or input files.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CheckArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let inputs = RaceInputs::load(&args.config, verbose)?;
    let race = inputs.engine()?.resolve(inputs.raw.clone())?;

    let summary = CheckSummary {
        race: inputs.config.name.clone(),
        legs: inputs.config.legs,
        entries: inputs.entries.len(),
        records: inputs.raw.len(),
        unknown_bibs: inputs.raw.iter().filter(|r| r.bib.is_none()).count(),
        unknown_times: inputs.raw.iter().filter(|r| r.finish_time.is_none()).count(),
        finishers: race.finishers(),
        notes: race.notes().len(),
    };

    match format {
        OutputFormat::Text => {
            println!("OK: {}", summary.race);
            println!("  Legs:           {}", summary.legs);
            println!("  Entries:        {}", summary.entries);
            println!("  Raw results:    {}", summary.records);
            println!("  Unknown bibs:   {}", summary.unknown_bibs);
            println!("  Unknown times:  {}", summary.unknown_times);
            println!("  Finishers:      {}", summary.finishers);
            println!("  Notes:          {}", summary.notes);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "race": summary.race,
                "legs": summary.legs,
                "entries": summary.entries,
                "raw_results": summary.records,
                "unknown_bibs": summary.unknown_bibs,
                "unknown_times": summary.unknown_times,
                "finishers": summary.finishers,
                "notes": summary.notes,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("race\tlegs\tentries\traw_results\tunknown_bibs\tunknown_times\tfinishers\tnotes");
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                summary.race,
                summary.legs,
                summary.entries,
                summary.records,
                summary.unknown_bibs,
                summary.unknown_times,
                summary.finishers,
                summary.notes
            );
        }
    }

    Ok(())
}
