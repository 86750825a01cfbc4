use std::fmt::{Display, Formatter};

/// Event log handed to deciders. Only the round in progress and the one
/// before it are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundHistory {
    current_round: Vec<String>,
    previous_round: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundConclusion {
    Concluded,
    NoEntries,
}

impl Display for RoundConclusion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundConclusion::Concluded => f.write_str("Round concluded. Starting new round."),
            RoundConclusion::NoEntries => f.write_str("Round concluded with no additional entries."),
        }
    }
}

impl RoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: impl Into<String>) {
        self.current_round.push(entry.into());
    }

    pub fn current_round(&self) -> &[String] {
        &self.current_round
    }

    pub fn previous_round(&self) -> &[String] {
        &self.previous_round
    }

    /// Moves the current round into the previous slot. An empty round leaves
    /// the previous one untouched.
    pub fn conclude_round(&mut self) -> RoundConclusion {
        if self.current_round.is_empty() {
            return RoundConclusion::NoEntries;
        }

        self.previous_round = std::mem::take(&mut self.current_round);
        RoundConclusion::Concluded
    }

    pub fn full_history(&self) -> Vec<&str> {
        self.previous_round
            .iter()
            .chain(self.current_round.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn reset(&mut self) {
        self.current_round.clear();
        self.previous_round.clear();
    }
}

impl Display for RoundHistory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.previous_round.is_empty() {
            f.write_str("No previous round\n")?;
        } else {
            f.write_str("Previous Round:\n")?;
            for entry in &self.previous_round {
                f.write_fmt(format_args!("{entry}\n"))?;
            }
        }

        f.write_str("\nCurrent Round:\nStart")?;
        for entry in &self.current_round {
            f.write_fmt(format_args!("\n{entry}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{RoundConclusion, RoundHistory};

    #[test]
    fn conclude() {
        let mut history = RoundHistory::new();
        history.append("P1 takes Income");
        history.append("P2 collects Tax");

        assert_eq!(history.conclude_round(), RoundConclusion::Concluded);
        assert!(history.current_round().is_empty());
        assert_eq!(history.previous_round(), &["P1 takes Income", "P2 collects Tax"]);
    }

    #[test]
    fn conclude_twice_is_a_no_op() {
        let mut history = RoundHistory::new();
        history.append("P1 takes Income");
        history.conclude_round();

        let before = history.clone();
        let second = history.conclude_round();
        assert_eq!(second, RoundConclusion::NoEntries);
        assert_eq!(second.to_string(), "Round concluded with no additional entries.");
        assert_eq!(history, before);
    }

    #[test]
    fn only_two_rounds_are_kept() {
        let mut history = RoundHistory::new();
        history.append("a");
        history.conclude_round();
        history.append("b");
        history.conclude_round();
        history.append("c");

        assert_eq!(history.full_history(), vec!["b", "c"]);

        history.reset();
        assert!(history.full_history().is_empty());
    }

    #[test]
    fn render() {
        let mut history = RoundHistory::new();
        assert_eq!(history.to_string(), "No previous round\n\nCurrent Round:\nStart");

        history.append("a");
        history.conclude_round();
        history.append("b");
        assert_eq!(history.to_string(), "Previous Round:\na\n\nCurrent Round:\nStart\nb");
    }
}
