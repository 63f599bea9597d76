use serde::{Deserialize, Serialize};

use crate::core::types::Bib;

/// An individual runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub name: String,
    pub club: String,
    /// Short code of the runner's entry category (e.g. `M40`)
    pub category: String,
}

/// A relay team, one runner name per leg
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Short code of the team's entry category
    pub category: String,
    pub runner_names: Vec<String>,
}

/// The individual or team behind a bib number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participant {
    Runner(Runner),
    Team(Team),
}

impl Participant {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Runner(runner) => &runner.name,
            Self::Team(team) => &team.name,
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::Runner(runner) => &runner.category,
            Self::Team(team) => &team.category,
        }
    }

    /// Club of an individual runner; teams carry no club
    #[must_use]
    pub fn club(&self) -> Option<&str> {
        match self {
            Self::Runner(runner) => Some(&runner.club),
            Self::Team(_) => None,
        }
    }

    /// Name of the runner on a given leg (1-based)
    #[must_use]
    pub fn runner_on_leg(&self, leg: usize) -> Option<&str> {
        match self {
            Self::Runner(runner) if leg == 1 => Some(&runner.name),
            Self::Runner(_) => None,
            Self::Team(team) => leg
                .checked_sub(1)
                .and_then(|i| team.runner_names.get(i))
                .map(String::as_str),
        }
    }
}

/// A registered bib number and who wears it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub bib: Bib,
    pub participant: Participant,
}

impl Entry {
    pub fn runner(
        bib: u32,
        name: impl Into<String>,
        club: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            bib: Bib(bib),
            participant: Participant::Runner(Runner {
                name: name.into(),
                club: club.into(),
                category: category.into(),
            }),
        }
    }

    pub fn team(
        bib: u32,
        name: impl Into<String>,
        category: impl Into<String>,
        runner_names: Vec<String>,
    ) -> Self {
        Self {
            bib: Bib(bib),
            participant: Participant::Team(Team {
                name: name.into(),
                category: category.into(),
                runner_names,
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.participant.name()
    }

    #[must_use]
    pub fn category(&self) -> &str {
        self.participant.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_on_leg() {
        let team = Entry::team(
            7,
            "Harriers A",
            "Open",
            vec!["Ann".to_string(), "Bob".to_string()],
        );
        assert_eq!(team.participant.runner_on_leg(1), Some("Ann"));
        assert_eq!(team.participant.runner_on_leg(2), Some("Bob"));
        assert_eq!(team.participant.runner_on_leg(3), None);
        assert_eq!(team.participant.runner_on_leg(0), None);

        let runner = Entry::runner(3, "Cat", "Fife AC", "W40");
        assert_eq!(runner.participant.runner_on_leg(1), Some("Cat"));
        assert_eq!(runner.participant.club(), Some("Fife AC"));
        assert_eq!(team.participant.club(), None);
    }
}
