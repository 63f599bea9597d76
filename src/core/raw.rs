use std::time::Duration;

use crate::core::types::Bib;
use crate::parsing::time::format_time;

/// Value fabricated by missing-data inference, recorded against the raw result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// No earlier recorded time exists, so the first recorded time was copied back
    TimeBeforeFirstRecorded,
    /// Time interpolated between the surrounding recorded times
    TimeInterpolated,
    /// No later recorded time exists, so the last recorded time was copied forward
    TimeAfterLastRecorded,
    /// Bib number guessed from the finishing pattern
    BibGuessed(Bib),
    /// Bib number left unknown because some entrants may not have finished
    BibUnresolved,
}

impl Annotation {
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::BibUnresolved)
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeBeforeFirstRecorded => write!(
                f,
                "Time not recorded. No basis for interpolation so set to first recorded finish time."
            ),
            Self::TimeInterpolated => write!(f, "Time not recorded. Time interpolated."),
            Self::TimeAfterLastRecorded => write!(
                f,
                "Time not recorded. No basis for interpolation so set to last recorded finish time."
            ),
            Self::BibGuessed(bib) => write!(f, "Bib number not recorded. Guessed as {bib}."),
            Self::BibUnresolved => write!(
                f,
                "Bib number not recorded. Not guessed since some entrants may not have finished."
            ),
        }
    }
}

/// A single finish event as recorded at the finish line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    /// Bib number, `None` when not recorded
    pub bib: Option<Bib>,

    /// Elapsed time since the race start, `None` when not recorded
    pub finish_time: Option<Duration>,

    /// Leg number written down by the recorder, `None` when not recorded
    pub explicit_leg: Option<usize>,

    /// Free-text comment from the source file
    pub comment: String,

    /// Values fabricated by inference
    pub annotations: Vec<Annotation>,

    /// 1-based line in the source file (0 when constructed in memory)
    pub line: usize,
}

impl RawResult {
    #[must_use]
    pub fn new(bib: Option<u32>, finish_time: Option<Duration>) -> Self {
        Self {
            bib: bib.map(Bib),
            finish_time,
            explicit_leg: None,
            comment: String::new(),
            annotations: Vec::new(),
            line: 0,
        }
    }

    #[must_use]
    pub fn with_leg(mut self, leg: usize) -> Self {
        self.explicit_leg = Some(leg);
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn annotate(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Comment from the source followed by any inference notes
    #[must_use]
    pub fn full_comment(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.comment.is_empty() {
            parts.push(self.comment.clone());
        }
        parts.extend(self.annotations.iter().map(ToString::to_string));
        parts.join(" ")
    }

    /// Human-readable reference to this record for error messages
    #[must_use]
    pub fn describe(&self) -> String {
        let bib = self
            .bib
            .map_or_else(|| "?".to_string(), |b| b.to_string());
        let time = self
            .finish_time
            .map_or_else(|| "?".to_string(), format_time);
        if self.line > 0 {
            format!("line {}: bib {bib} at {time}", self.line)
        } else {
            format!("bib {bib} at {time}")
        }
    }
}
