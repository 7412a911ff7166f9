//! Debate session state machine
//!
//! A [`DebateSession`] records one domain's debate: the turns, the closing
//! summary and every phase transition. The protocol driver in
//! [`crate::protocol`] moves it through its phases; this module only
//! enforces which moves are legal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use tribunal_core::{ArgumentTurn, Domain, SessionStatus, SummaryRecord, TurnRole};
use tribunal_llm::LlmError;

/// Phase of a debate session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Created, no oracle call made yet
    Init,
    /// Proponent is arguing (opening or rebuttal)
    ProponentTurn,
    /// Critic is rebutting
    CriticTurn,
    /// Proponent is writing the closing summary
    Summarizing,
    /// Summary recorded
    Completed,
    /// Aborted by an oracle failure or cancellation
    Failed,
}

impl SessionPhase {
    /// Whether this is a terminal phase
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Valid transitions from this phase
    pub fn valid_transitions(self) -> &'static [SessionPhase] {
        match self {
            Self::Init => &[Self::ProponentTurn, Self::Failed],
            Self::ProponentTurn => &[Self::CriticTurn, Self::Summarizing, Self::Failed],
            Self::CriticTurn => &[Self::ProponentTurn, Self::Summarizing, Self::Failed],
            Self::Summarizing => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    /// Coarse status exposed to callers
    pub fn status(self) -> SessionStatus {
        match self {
            Self::Completed => SessionStatus::Completed,
            Self::Failed => SessionStatus::Failed,
            _ => SessionStatus::Running,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::ProponentTurn => write!(f, "proponent_turn"),
            Self::CriticTurn => write!(f, "critic_turn"),
            Self::Summarizing => write!(f, "summarizing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Errors that end a debate
#[derive(Debug, Clone, Error)]
pub enum DebateError {
    #[error("Oracle call failed: {0}")]
    Oracle(#[from] LlmError),
    #[error("Invalid transition {from} -> {to}")]
    InvalidTransition {
        from: SessionPhase,
        to: SessionPhase,
    },
    #[error("Debate cancelled after round {round}")]
    Cancelled { round: u32 },
    #[error("No agents registered for domain '{0}'")]
    MissingAgents(Domain),
}

/// A phase transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: SessionPhase,
    pub to: SessionPhase,
    pub at: DateTime<Utc>,
}

/// One domain's debate, from first turn to summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSession {
    /// Unique session ID
    pub id: Uuid,
    /// Domain under debate
    pub domain: Domain,
    /// Current phase
    pub phase: SessionPhase,
    /// Round currently being argued (0 before the opening)
    pub current_round: u32,
    /// Number of argument turns to run
    pub max_rounds: u32,
    /// Turns recorded so far, in order
    pub turns: Vec<ArgumentTurn>,
    /// Closing summary, once completed
    pub summary: Option<SummaryRecord>,
    /// Why the session failed
    pub error: Option<String>,
    /// Transition history
    pub transitions: Vec<PhaseTransition>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DebateSession {
    /// Create a session in [`SessionPhase::Init`]
    pub fn new(domain: Domain, max_rounds: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain,
            phase: SessionPhase::Init,
            current_round: 0,
            max_rounds,
            turns: Vec::new(),
            summary: None,
            error: None,
            transitions: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Coarse status
    pub fn status(&self) -> SessionStatus {
        self.phase.status()
    }

    /// Turns completed so far
    pub fn rounds_completed(&self) -> u32 {
        self.turns.len() as u32
    }

    /// Move to `to`, rejecting illegal transitions.
    ///
    /// Entering a turn phase advances the round counter.
    pub fn transition(&mut self, to: SessionPhase) -> Result<(), DebateError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(DebateError::InvalidTransition {
                from: self.phase,
                to,
            });
        }

        self.transitions.push(PhaseTransition {
            from: self.phase,
            to,
            at: Utc::now(),
        });
        self.phase = to;

        if matches!(to, SessionPhase::ProponentTurn | SessionPhase::CriticTurn) {
            self.current_round += 1;
        }
        if to.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    /// The phase that should follow the current turn, if any
    pub fn next_phase(&self) -> Option<SessionPhase> {
        match self.phase {
            SessionPhase::Init => Some(SessionPhase::ProponentTurn),
            SessionPhase::ProponentTurn | SessionPhase::CriticTurn => {
                if self.current_round >= self.max_rounds {
                    Some(SessionPhase::Summarizing)
                } else if TurnRole::for_round(self.current_round + 1).is_proponent() {
                    Some(SessionPhase::ProponentTurn)
                } else {
                    Some(SessionPhase::CriticTurn)
                }
            }
            SessionPhase::Summarizing => Some(SessionPhase::Completed),
            SessionPhase::Completed | SessionPhase::Failed => None,
        }
    }

    /// Record the current round's argument
    pub fn record_turn(&mut self, text: &str) -> Result<&ArgumentTurn, DebateError> {
        let expected = match self.phase {
            SessionPhase::ProponentTurn => true,
            SessionPhase::CriticTurn => false,
            other => {
                return Err(DebateError::InvalidTransition {
                    from: other,
                    to: other,
                })
            }
        };
        let turn = ArgumentTurn::new(self.current_round, self.domain, text);
        debug_assert_eq!(turn.role.is_proponent(), expected);
        self.turns.push(turn);
        Ok(&self.turns[self.turns.len() - 1])
    }

    /// Record the closing summary and complete the session
    pub fn conclude(&mut self, narrative: &str) -> Result<(), DebateError> {
        self.transition(SessionPhase::Completed)?;
        self.summary = Some(SummaryRecord {
            narrative_text: narrative.to_string(),
            rounds_completed: self.rounds_completed(),
        });
        Ok(())
    }

    /// Mark the session failed. No-op once terminal.
    pub fn fail(&mut self, error: &DebateError) {
        if self.phase.is_terminal() {
            return;
        }
        self.error = Some(error.to_string());
        // Failed is reachable from every non-terminal phase
        let _ = self.transition(SessionPhase::Failed);
    }

    /// SHA-256 over round, role and text of every turn, hex-encoded
    pub fn transcript_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for turn in &self.turns {
            hasher.update(turn.round.to_be_bytes());
            hasher.update(turn.role.to_string().as_bytes());
            hasher.update([0u8]);
            hasher.update(turn.text.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    /// One-line status for logs
    pub fn status_line(&self) -> String {
        format!(
            "[{}] {} round {}/{}",
            self.domain, self.phase, self.current_round, self.max_rounds
        )
    }
}
