use serde::{Deserialize, Serialize};

/// Bib number worn by an individual runner or shared by a relay team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bib(pub u32);

impl Bib {
    #[must_use]
    pub fn new(n: u32) -> Self {
        Self(n)
    }
}

impl std::fmt::Display for Bib {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Gender classification shared by entry and prize categories.
///
/// The declaration order is the precedence used when two prize categories
/// have the same age threshold: Open is allocated before Women, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(alias = "open", alias = "O")]
    Open,
    #[serde(alias = "women", alias = "Female", alias = "F", alias = "W")]
    Women,
    #[serde(alias = "men", alias = "Male", alias = "M")]
    Men,
    #[serde(alias = "mixed", alias = "X")]
    Mixed,
}

impl Gender {
    /// Parse a gender from its name or single-letter code
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "o" => Some(Self::Open),
            "women" | "female" | "f" | "w" => Some(Self::Women),
            "men" | "male" | "m" => Some(Self::Men),
            "mixed" | "x" => Some(Self::Mixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => f.pad("Open"),
            Self::Women => f.pad("Women"),
            Self::Men => f.pad("Men"),
            Self::Mixed => f.pad("Mixed"),
        }
    }
}

/// How an entrant's overall performance is derived from its finish records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMeasure {
    /// Elapsed time of the single recorded finish
    FinishTime,
    /// Sum of the durations of every leg
    SumOfLegDurations,
}

impl PerformanceMeasure {
    #[must_use]
    pub fn for_legs(legs: usize) -> Self {
        if legs > 1 {
            Self::SumOfLegDurations
        } else {
            Self::FinishTime
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("Women"), Some(Gender::Women));
        assert_eq!(Gender::parse("f"), Some(Gender::Women));
        assert_eq!(Gender::parse(" M "), Some(Gender::Men));
        assert_eq!(Gender::parse("x"), Some(Gender::Mixed));
        assert_eq!(Gender::parse("unknown"), None);
    }

    #[test]
    fn test_gender_precedence() {
        assert!(Gender::Open < Gender::Women);
        assert!(Gender::Women < Gender::Men);
        assert!(Gender::Men < Gender::Mixed);
    }

    #[test]
    fn test_performance_measure_for_legs() {
        assert_eq!(PerformanceMeasure::for_legs(1), PerformanceMeasure::FinishTime);
        assert_eq!(
            PerformanceMeasure::for_legs(4),
            PerformanceMeasure::SumOfLegDurations
        );
    }
}
