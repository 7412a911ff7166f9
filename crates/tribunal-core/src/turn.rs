//! Argument turns and debate summaries
//!
//! An [`ArgumentTurn`] is one argument or rebuttal produced by one role in
//! one round. Turns are immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Domain;

/// Which side produced a turn, and in what capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Round 1: the proponent's opening argument
    ProponentOpening,
    /// Odd rounds after the first
    ProponentRebuttal,
    /// Even rounds
    CriticRebuttal,
}

impl TurnRole {
    /// The role that speaks in a given (1-indexed) round
    pub fn for_round(round: u32) -> Self {
        match round {
            0 | 1 => Self::ProponentOpening,
            r if r % 2 == 0 => Self::CriticRebuttal,
            _ => Self::ProponentRebuttal,
        }
    }

    /// Whether the proponent speaks this turn
    pub fn is_proponent(&self) -> bool {
        !matches!(self, Self::CriticRebuttal)
    }

    /// Speaker label used when replaying history into a prompt
    pub fn speaker(&self) -> &'static str {
        if self.is_proponent() {
            "Proponent"
        } else {
            "Critic"
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProponentOpening => write!(f, "proponent_opening"),
            Self::ProponentRebuttal => write!(f, "proponent_rebuttal"),
            Self::CriticRebuttal => write!(f, "critic_rebuttal"),
        }
    }
}

/// A single argument produced during a debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentTurn {
    /// Round number (1-indexed)
    pub round: u32,
    /// Speaker and capacity
    pub role: TurnRole,
    /// Domain under debate
    pub domain: Domain,
    /// Argument text as returned by the oracle
    pub text: String,
    /// When the turn was recorded
    pub created_at: DateTime<Utc>,
}

impl ArgumentTurn {
    /// Create a turn for the given round; the role follows from the round number
    pub fn new(round: u32, domain: Domain, text: &str) -> Self {
        Self {
            round,
            role: TurnRole::for_round(round),
            domain,
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Replay a turn history as prompt text
pub fn render_history(turns: &[ArgumentTurn]) -> String {
    turns
        .iter()
        .map(|t| format!("Round {} - {}:\n{}", t.round, t.role.speaker(), t.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Lifecycle status of a debate session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

/// Closing summary produced by the proponent after the last turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Narrative synthesis, including a 0-10 score
    pub narrative_text: String,
    /// Number of turns the debate ran
    pub rounds_completed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_alternation() {
        assert_eq!(TurnRole::for_round(1), TurnRole::ProponentOpening);
        assert_eq!(TurnRole::for_round(2), TurnRole::CriticRebuttal);
        assert_eq!(TurnRole::for_round(3), TurnRole::ProponentRebuttal);
        assert_eq!(TurnRole::for_round(4), TurnRole::CriticRebuttal);
        assert_eq!(TurnRole::for_round(5), TurnRole::ProponentRebuttal);
    }

    #[test]
    fn test_render_history() {
        let turns = vec![
            ArgumentTurn::new(1, Domain::Accuracy, "The answer is right.  "),
            ArgumentTurn::new(2, Domain::Accuracy, "It omits a caveat."),
        ];
        let text = render_history(&turns);
        assert_eq!(
            text,
            "Round 1 - Proponent:\nThe answer is right.\n\nRound 2 - Critic:\nIt omits a caveat."
        );
    }

    #[test]
    fn test_role_display() {
        assert_eq!(TurnRole::CriticRebuttal.to_string(), "critic_rebuttal");
        assert_eq!(TurnRole::ProponentOpening.speaker(), "Proponent");
    }
}
