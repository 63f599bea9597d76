//! Infer command - show the raw results after missing data is filled in.
//!
//! Useful for checking a finish recorder's sheet before resolving: every
//! inferred time and guessed bib is printed next to the record it belongs to.

use std::path::PathBuf;

use clap::Args;

use crate::cli::{OutputFormat, RaceInputs};
use crate::core::raw::RawResult;
use crate::parsing::raw::UNKNOWN_VALUE;
use crate::parsing::time::format_time;
use crate::resolution::inference::InferenceSummary;

#[derive(Args)]
pub struct InferArgs {
    /// Race configuration file (JSON)
    #[arg(required = true)]
    pub config: PathBuf,

    /// Only print records changed or flagged by inference
    #[arg(long)]
    pub changed_only: bool,
}

/// Execute infer subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or the recorded times are inconsistent.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: InferArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let inputs = RaceInputs::load(&args.config, verbose)?;
    let mut raw = inputs.raw.clone();
    let summary = inputs.engine()?.infer(&mut raw)?;

    let records: Vec<&RawResult> = raw
        .iter()
        .filter(|r| !args.changed_only || !r.annotations.is_empty())
        .collect();

    match format {
        OutputFormat::Text => print_text(&records, &summary),
        OutputFormat::Json => print_json(&records, &summary)?,
        OutputFormat::Tsv => print_tsv(&records),
    }

    Ok(())
}

fn bib(record: &RawResult) -> String {
    record
        .bib
        .map_or_else(|| UNKNOWN_VALUE.to_string(), |b| b.to_string())
}

fn time(record: &RawResult) -> String {
    record
        .finish_time
        .map_or_else(|| UNKNOWN_VALUE.to_string(), format_time)
}

fn leg(record: &RawResult) -> String {
    record.explicit_leg.map(|l| l.to_string()).unwrap_or_default()
}

fn print_text(records: &[&RawResult], summary: &InferenceSummary) {
    println!(
        "{} time(s) inferred, {} bib(s) guessed, {} bib(s) unresolved\n",
        summary.times_inferred, summary.bibs_guessed, summary.bibs_unresolved
    );
    println!("{:>5}  {:>5}  {:>10}  {:>3}  Comment", "Line", "Bib", "Time", "Leg");
    println!("{}", "-".repeat(40));

    for record in records {
        println!(
            "{:>5}  {:>5}  {:>10}  {:>3}  {}",
            record.line,
            bib(record),
            time(record),
            leg(record),
            record.full_comment()
        );
    }
}

fn print_json(records: &[&RawResult], summary: &InferenceSummary) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "summary": {
            "times_inferred": summary.times_inferred,
            "bibs_guessed": summary.bibs_guessed,
            "bibs_unresolved": summary.bibs_unresolved,
        },
        "records": records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "line": r.line,
                    "bib": r.bib,
                    "time": r.finish_time.map(format_time),
                    "leg": r.explicit_leg,
                    "comment": r.comment,
                    "annotations": r.annotations.iter().map(ToString::to_string).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(records: &[&RawResult]) {
    println!("line\tbib\ttime\tleg\tcomment");
    for record in records {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            record.line,
            bib(record),
            time(record),
            leg(record),
            record.full_comment()
        );
    }
}
