//! Categories command - list the category catalog.

use std::path::PathBuf;

use clap::Args;

use crate::catalog::store::CategoryCatalog;
use crate::cli::OutputFormat;
use crate::core::category::{PrizeCategory, MAX_AGE};

#[derive(Args)]
pub struct CategoriesArgs {
    /// Path to a custom category catalog (the embedded catalog by default)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Also list entry categories
    #[arg(long)]
    pub entries: bool,
}

/// Execute categories subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CategoriesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = if let Some(path) = &args.catalog {
        CategoryCatalog::load_from_file(path)?
    } else {
        CategoryCatalog::load_embedded()?
    };

    if verbose {
        eprintln!(
            "Loaded catalog with {} entry categories and {} prize categories",
            catalog.entry_categories.len(),
            catalog.len()
        );
    }

    let prizes = catalog.prize_categories_by_generality();

    match format {
        OutputFormat::Text => print_text(&catalog, &prizes, args.entries),
        OutputFormat::Json => print_json(&catalog, &prizes, args.entries)?,
        OutputFormat::Tsv => print_tsv(&prizes),
    }

    Ok(())
}

fn age_band(min: u32, max: u32) -> String {
    match (min, max) {
        (0, MAX_AGE) => "any".to_string(),
        (0, max) => format!("under {}", max + 1),
        (min, MAX_AGE) => format!("{min}+"),
        (min, max) => format!("{min}-{max}"),
    }
}

fn print_text(catalog: &CategoryCatalog, prizes: &[&PrizeCategory], with_entries: bool) {
    let name_width = prizes
        .iter()
        .map(|p| p.long_name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("Prize categories ({}), in allocation order\n", prizes.len());
    println!(
        "{:<10} {:<name_w$} {:<6} {:<9} {:>6}  Exclusive",
        "Code",
        "Name",
        "Gender",
        "Ages",
        "Prizes",
        name_w = name_width
    );
    println!("{}", "-".repeat(10 + 1 + name_width + 1 + 6 + 1 + 9 + 1 + 6 + 11));

    for prize in prizes {
        println!(
            "{:<10} {:<name_w$} {:<6} {:<9} {:>6}  {}",
            prize.short_name,
            prize.long_name,
            prize.gender,
            age_band(prize.minimum_age, prize.maximum_age),
            prize.number_of_prizes,
            if prize.exclusive { "yes" } else { "no" },
            name_w = name_width
        );
        if !prize.eligible_clubs.is_empty() {
            let clubs: Vec<&str> = prize.eligible_clubs.iter().map(String::as_str).collect();
            println!("  └─ Clubs: {}", clubs.join(", "));
        }
    }

    if with_entries {
        println!("\nEntry categories ({})\n", catalog.entry_categories.len());
        for category in &catalog.entry_categories {
            println!(
                "{:<10} {:<name_w$} {:<6} {}",
                category.short_name,
                category.long_name,
                category.gender,
                age_band(category.minimum_age, category.maximum_age),
                name_w = name_width
            );
        }
    }
}

fn print_json(
    catalog: &CategoryCatalog,
    prizes: &[&PrizeCategory],
    with_entries: bool,
) -> anyhow::Result<()> {
    let mut output = serde_json::json!({
        "prize_categories": prizes,
    });
    if with_entries {
        output["entry_categories"] = serde_json::to_value(&catalog.entry_categories)?;
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(prizes: &[&PrizeCategory]) {
    println!("short_name\tlong_name\tgender\tminimum_age\tmaximum_age\tnumber_of_prizes\texclusive\teligible_clubs");
    for prize in prizes {
        let clubs: Vec<&str> = prize.eligible_clubs.iter().map(String::as_str).collect();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            prize.short_name,
            prize.long_name,
            prize.gender,
            prize.minimum_age,
            prize.maximum_age,
            prize.number_of_prizes,
            prize.exclusive,
            clubs.join(",")
        );
    }
}
