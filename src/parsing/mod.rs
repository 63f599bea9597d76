//! Loaders for the text inputs of a race run.
//!
//! This module provides parsers for:
//!
//! - **Raw results**: the finish-line record, one finish per line
//! - **Entries**: the roster of bib numbers, runners and teams
//! - **Times**: elapsed-time strings shared by every input
//!
//! ## Raw result format
//!
//! ```text
//! # bib   time      [leg]   [# comment]
//! 12      0:31:02
//! ?       0:31:40           # bib obscured
//! 7       ?
//! 31      0:58:10   3
//! ```
//!
//! ## Entry format
//!
//! | Race       | Columns                                  |
//! |------------|------------------------------------------|
//! | Individual | bib, name, club, category                |
//! | Relay      | bib, team name, category, runner per leg |

use thiserror::Error;

pub mod entries;
pub mod raw;
pub mod time;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{source_name}, line {line}: {message}")]
    InvalidLine {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("Invalid time: '{0}'")]
    InvalidTime(String),

    #[error("Too many records: {0} exceeds maximum allowed ({max})", max = crate::utils::validation::MAX_RECORDS)]
    TooManyRecords(usize),

    #[error("No {0} found in {1}")]
    Empty(&'static str, String),
}

impl ParseError {
    pub(crate) fn line(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidLine {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }
}
