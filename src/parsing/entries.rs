use std::path::Path;

use crate::catalog::store::CategoryCatalog;
use crate::core::entry::Entry;
use crate::parsing::ParseError;
use crate::utils::validation::{check_entry_limit, is_valid_pair, EntryUniqueness};

/// Shape of the roster expected for a race
#[derive(Debug, Clone, Copy)]
pub struct EntryLayout<'a> {
    /// Number of legs; 1 for an individual race
    pub legs: usize,
    /// Per-leg flag for legs run by two runners together
    pub paired_legs: &'a [bool],
}

impl<'a> EntryLayout<'a> {
    #[must_use]
    pub fn individual() -> Self {
        Self {
            legs: 1,
            paired_legs: &[],
        }
    }

    #[must_use]
    pub fn relay(legs: usize, paired_legs: &'a [bool]) -> Self {
        Self { legs, paired_legs }
    }

    fn is_relay(&self) -> bool {
        self.legs > 1
    }

    fn is_paired(&self, leg: usize) -> bool {
        leg.checked_sub(1)
            .and_then(|i| self.paired_legs.get(i))
            .copied()
            .unwrap_or(false)
    }
}

/// Parse a tab-separated entries file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_entries_file(
    path: &Path,
    layout: EntryLayout<'_>,
    catalog: &CategoryCatalog,
) -> Result<Vec<Entry>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_entries_text(&content, &path.display().to_string(), layout, catalog)
}

/// Parse tab-separated entries text.
///
/// Individual races use `bib name club category`; relays use
/// `bib team category runner1 .. runnerN`. A first line starting with
/// `bib` is treated as a header.
///
/// # Errors
///
/// Returns `ParseError::InvalidLine` for malformed lines, unknown categories,
/// duplicate bibs or participants, or `ParseError::Empty` if no entries are found.
pub fn parse_entries_text(
    text: &str,
    source_name: &str,
    layout: EntryLayout<'_>,
    catalog: &CategoryCatalog,
) -> Result<Vec<Entry>, ParseError> {
    let mut entries = Vec::new();
    let mut uniqueness = EntryUniqueness::new();
    let mut first_data_line = true;

    let expected_fields = if layout.is_relay() { 3 + layout.legs } else { 4 };

    for (i, line) in text.lines().enumerate() {
        let line_num = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split('\t').map(str::trim).collect();

        if first_data_line {
            first_data_line = false;
            if fields
                .first()
                .is_some_and(|f| f.eq_ignore_ascii_case("bib"))
            {
                continue;
            }
        }

        if fields.len() != expected_fields {
            return Err(ParseError::line(
                source_name,
                line_num,
                format!(
                    "expected {expected_fields} tab-separated fields, found {}",
                    fields.len()
                ),
            ));
        }

        let bib: u32 = fields[0].parse().map_err(|_| {
            ParseError::line(
                source_name,
                line_num,
                format!("invalid bib number '{}'", fields[0]),
            )
        })?;

        let entry = if layout.is_relay() {
            let runner_names: Vec<String> = fields[3..].iter().map(ToString::to_string).collect();
            for (leg_index, names) in runner_names.iter().enumerate() {
                let leg = leg_index + 1;
                if layout.is_paired(leg) && !is_valid_pair(names) {
                    return Err(ParseError::line(
                        source_name,
                        line_num,
                        format!("leg {leg} is paired but '{names}' does not name two runners"),
                    ));
                }
            }
            Entry::team(bib, fields[1], fields[2], runner_names)
        } else {
            Entry::runner(bib, fields[1], fields[2], fields[3])
        };

        if entry.name().is_empty() {
            return Err(ParseError::line(source_name, line_num, "missing name"));
        }

        if catalog.entry_category(entry.category()).is_none() {
            return Err(ParseError::line(
                source_name,
                line_num,
                format!("unknown category '{}'", entry.category()),
            ));
        }

        if let Some(clash) = uniqueness.register(&entry) {
            return Err(ParseError::line(source_name, line_num, clash));
        }

        if let Some(message) = check_entry_limit(entries.len()) {
            return Err(ParseError::line(source_name, line_num, message));
        }

        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(ParseError::Empty("entries", source_name.to_string()));
    }

    Ok(entries)
}
