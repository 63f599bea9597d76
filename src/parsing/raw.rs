use std::path::Path;

use crate::core::raw::RawResult;
use crate::parsing::time::parse_time;
use crate::parsing::ParseError;
use crate::utils::validation::check_record_limit;

/// Marker for a bib number or time that was not recorded
pub const UNKNOWN_VALUE: &str = "?";

/// Parse a raw results file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_raw_results_file(path: &Path) -> Result<Vec<RawResult>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_raw_results_text(&content, &path.display().to_string())
}

/// Parse raw results text: `bib time [leg] [# comment]`, `?` for unknown values
///
/// # Errors
///
/// Returns `ParseError::InvalidLine` for lines with missing or invalid fields, or
/// `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_raw_results_text(text: &str, source_name: &str) -> Result<Vec<RawResult>, ParseError> {
    let mut results = Vec::new();

    for (i, line) in text.lines().enumerate() {
        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        let (data, comment) = match line.split_once('#') {
            Some((data, comment)) => (data.trim(), comment.trim()),
            None => (line.trim(), ""),
        };
        if data.is_empty() {
            continue;
        }

        let fields: Vec<&str> = data.split_whitespace().collect();
        if fields.len() < 2 || fields.len() > 3 {
            return Err(ParseError::line(
                source_name,
                line_num,
                format!("expected 'bib time [leg]', found {} fields", fields.len()),
            ));
        }

        let bib = if fields[0] == UNKNOWN_VALUE {
            None
        } else {
            let bib: u32 = fields[0].parse().map_err(|_| {
                ParseError::line(
                    source_name,
                    line_num,
                    format!("invalid bib number '{}'", fields[0]),
                )
            })?;
            Some(bib)
        };

        let finish_time = if fields[1] == UNKNOWN_VALUE {
            None
        } else {
            let time = parse_time(fields[1])
                .map_err(|e| ParseError::line(source_name, line_num, e.to_string()))?;
            Some(time)
        };

        let mut result = RawResult::new(bib, finish_time)
            .with_comment(comment)
            .at_line(line_num);

        if let Some(leg_field) = fields.get(2) {
            let leg: usize = leg_field.parse().map_err(|_| {
                ParseError::line(
                    source_name,
                    line_num,
                    format!("invalid leg number '{leg_field}'"),
                )
            })?;
            // Leg 0 means the recorder did not note a leg
            if leg > 0 {
                result = result.with_leg(leg);
            }
        }

        if check_record_limit(results.len()).is_some() {
            return Err(ParseError::TooManyRecords(results.len()));
        }

        results.push(result);
    }

    Ok(results)
}
