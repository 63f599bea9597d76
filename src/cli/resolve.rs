//! Resolve command - run the full engine and report the results.

use std::path::PathBuf;

use clap::Args;

use crate::cli::{format_prizes, ordinal, truncate, OutputFormat, RaceInputs};
use crate::core::result::{LegResult, RaceResult};
use crate::parsing::time::{format_optional_time, format_time};
use crate::resolution::engine::{LegRanking, ResolvedRace};
use crate::resolution::ranking::UNRANKED;

const NAME_WIDTH: usize = 30;

#[derive(Args)]
pub struct ResolveArgs {
    /// Race configuration file (JSON)
    #[arg(required = true)]
    pub config: PathBuf,

    /// Omit per-leg rankings for relays
    #[arg(long)]
    pub no_legs: bool,

    /// Include standings within each prize category
    #[arg(long)]
    pub standings: bool,

    /// Omit notes about inferred times and bibs
    #[arg(long)]
    pub no_notes: bool,
}

/// Execute resolve subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or the race cannot be resolved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ResolveArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let inputs = RaceInputs::load(&args.config, verbose)?;
    let race = inputs.engine()?.resolve(inputs.raw.clone())?;

    if verbose {
        eprintln!(
            "Resolved {} entrants: {} finished, {} prize(s) awarded",
            race.results.len(),
            race.finishers(),
            race.prizes.prize_count()
        );
    }

    match format {
        OutputFormat::Text => print_text(&race, &args),
        OutputFormat::Json => print_json(&race, &args)?,
        OutputFormat::Tsv => print_tsv(&race),
    }

    Ok(())
}

fn position(result: &RaceResult) -> &str {
    result.position.as_deref().unwrap_or(UNRANKED)
}

fn print_text(race: &ResolvedRace, args: &ResolveArgs) {
    println!("{}", race.name);
    println!(
        "Finishers: {} of {}{}\n",
        race.finishers(),
        race.results.len(),
        if race.dead_heats {
            " (dead heats allowed)"
        } else {
            ""
        }
    );

    print_results_table(race);
    print_prize_winners(race);

    if race.is_relay() && !args.no_legs {
        for leg in &race.leg_rankings {
            print_leg_table(race, leg);
        }
    }

    if args.standings {
        print_standings(race);
    }

    if !args.no_notes {
        let notes = race.notes();
        if !notes.is_empty() {
            println!("\nNotes:");
            for note in &notes {
                if note.line > 0 {
                    println!("  line {}: {}", note.line, note.message);
                } else {
                    println!("  record {}: {}", note.record_index + 1, note.message);
                }
            }
        }
    }
}

fn print_results_table(race: &ResolvedRace) {
    let name_width = race
        .results
        .iter()
        .map(|r| r.entry.name().chars().count().min(NAME_WIDTH))
        .max()
        .unwrap_or(4)
        .max(4);
    let category_width = race
        .results
        .iter()
        .map(|r| r.entry.category().len())
        .max()
        .unwrap_or(8)
        .max(8);

    println!(
        "{:<5} {:>5}  {:<name_w$}  {:<cat_w$}  {:>10}  Prizes",
        "Pos",
        "Bib",
        "Name",
        "Category",
        "Time",
        name_w = name_width,
        cat_w = category_width
    );
    println!("{}", "-".repeat(5 + 1 + 5 + 2 + name_width + 2 + category_width + 2 + 10 + 8));

    for result in &race.results {
        println!(
            "{:<5} {:>5}  {:<name_w$}  {:<cat_w$}  {:>10}  {}",
            position(result),
            result.bib(),
            truncate(result.entry.name(), name_width),
            result.entry.category(),
            format_optional_time(result.performance),
            format_prizes(&result.prizes),
            name_w = name_width,
            cat_w = category_width
        );
    }
}

fn print_prize_winners(race: &ResolvedRace) {
    let awarded: Vec<_> = race
        .prizes
        .by_category
        .iter()
        .filter(|c| !c.winners.is_empty())
        .collect();
    if awarded.is_empty() {
        return;
    }

    println!("\nPrize winners:");
    for category in awarded {
        println!("  {}:", category.category.long_name);
        for (i, bib) in category.winners.iter().enumerate() {
            if let Some(result) = race.result(*bib) {
                println!(
                    "    {:<5} {} ({}) {}",
                    ordinal(i + 1),
                    result.entry.name(),
                    bib,
                    format_optional_time(result.performance)
                );
            }
        }
    }
}

fn runner_name<'a>(race: &'a ResolvedRace, leg: &LegResult) -> &'a str {
    race.result(leg.bib)
        .and_then(|r| r.entry.participant.runner_on_leg(leg.leg_number))
        .unwrap_or("")
}

fn print_leg_table(race: &ResolvedRace, leg: &LegRanking) {
    match leg.mass_start {
        Some(start) => println!("\nLeg {} (mass start {}):", leg.leg, format_time(start)),
        None => println!("\nLeg {}:", leg.leg),
    }

    for result in &leg.results {
        let mass = if result.in_mass_start { " M" } else { "" };
        let dnf = if result.dnf { " DNF" } else { "" };
        println!(
            "  {:<5} {:>5}  {:<name_w$}  {:>10}  {:>10}  {:>10}{mass}{dnf}",
            result.position.as_deref().unwrap_or(UNRANKED),
            result.bib,
            truncate(runner_name(race, result), NAME_WIDTH),
            format_optional_time(result.start_time),
            format_optional_time(result.finish_time),
            format_optional_time(result.duration()),
            name_w = NAME_WIDTH
        );
    }
}

fn print_standings(race: &ResolvedRace) {
    for standing in &race.category_standings {
        if standing.standings.is_empty() {
            continue;
        }
        println!("\n{} standings:", standing.category.long_name);
        for entry in &standing.standings {
            if let Some(result) = race.result(entry.bib) {
                println!(
                    "  {:<5} {:>5}  {:<name_w$}  {:>10}",
                    entry.position,
                    entry.bib,
                    truncate(result.entry.name(), NAME_WIDTH),
                    format_optional_time(result.performance),
                    name_w = NAME_WIDTH
                );
            }
        }
    }
}

fn leg_json(race: &ResolvedRace, leg: &LegResult) -> serde_json::Value {
    serde_json::json!({
        "leg": leg.leg_number,
        "bib": leg.bib,
        "runner": runner_name(race, leg),
        "start": leg.start_time.map(format_time),
        "finish": leg.finish_time.map(format_time),
        "time": leg.duration().map(format_time),
        "position": leg.position,
        "in_mass_start": leg.in_mass_start,
        "dnf": leg.dnf,
    })
}

fn print_json(race: &ResolvedRace, args: &ResolveArgs) -> anyhow::Result<()> {
    let results: Vec<serde_json::Value> = race
        .results
        .iter()
        .map(|r| {
            let mut json = serde_json::json!({
                "position": position(r),
                "bib": r.bib(),
                "name": r.entry.name(),
                "category": r.entry.category(),
                "club": r.entry.participant.club(),
                "time": r.performance.map(format_time),
                "finish_time": r.finish_time.map(format_time),
                "finished": r.can_complete,
                "prizes": r.prizes.iter().map(|p| serde_json::json!({
                    "category": p.category.short_name,
                    "place": p.place,
                })).collect::<Vec<_>>(),
            });
            if r.is_relay() {
                json["legs"] = r
                    .leg_results
                    .iter()
                    .map(|leg| leg_json(race, leg))
                    .collect::<Vec<_>>()
                    .into();
            }
            json
        })
        .collect();

    let prizes: Vec<serde_json::Value> = race
        .prizes
        .by_category
        .iter()
        .map(|c| {
            serde_json::json!({
                "category": c.category.short_name,
                "long_name": c.category.long_name,
                "exclusive": c.category.exclusive,
                "number_of_prizes": c.category.number_of_prizes,
                "winners": c.winners,
            })
        })
        .collect();

    let mut output = serde_json::json!({
        "race": race.name,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "legs": race.legs,
        "dead_heats": race.dead_heats,
        "summary": {
            "entrants": race.results.len(),
            "finishers": race.finishers(),
            "times_inferred": race.summary.times_inferred,
            "bibs_guessed": race.summary.bibs_guessed,
            "bibs_unresolved": race.summary.bibs_unresolved,
        },
        "results": results,
        "prizes": prizes,
    });

    if race.is_relay() && !args.no_legs {
        output["leg_rankings"] = race
            .leg_rankings
            .iter()
            .map(|leg| {
                serde_json::json!({
                    "leg": leg.leg,
                    "mass_start": leg.mass_start.map(format_time),
                    "results": leg.results.iter().map(|l| leg_json(race, l)).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>()
            .into();
    }

    if args.standings {
        output["category_standings"] = race
            .category_standings
            .iter()
            .map(|s| {
                serde_json::json!({
                    "category": s.category.short_name,
                    "standings": s.standings.iter().map(|e| serde_json::json!({
                        "bib": e.bib,
                        "position": e.position,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>()
            .into();
    }

    if !args.no_notes {
        output["notes"] = race
            .notes()
            .iter()
            .map(|n| {
                serde_json::json!({
                    "record": n.record_index + 1,
                    "line": n.line,
                    "bib": n.bib,
                    "message": n.message,
                })
            })
            .collect::<Vec<_>>()
            .into();
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(race: &ResolvedRace) {
    let mut header = String::from("position\tbib\tname\tcategory\ttime\tprizes");
    for leg in 1..=race.leg_rankings.len() {
        header.push_str(&format!("\tleg{leg}_time"));
    }
    println!("{header}");

    for result in &race.results {
        let mut row = format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            position(result),
            result.bib(),
            result.entry.name(),
            result.entry.category(),
            format_optional_time(result.performance),
            format_prizes(&result.prizes)
        );
        for leg in &result.leg_results {
            row.push('\t');
            row.push_str(&format_optional_time(leg.duration()));
        }
        println!("{row}");
    }
}
