//! # Tribunal Adversarial
//!
//! Proponent/critic debates over a single judgment domain, plus the score
//! extraction that turns free-form evaluator text into numbers.
//!
//! ## Key Types
//!
//! - [`DebateAgent`] and [`AgentPair`] - the two sides of a debate
//! - [`DomainAgentRegistry`] - domain → agent pair lookup
//! - [`DebateSession`] - phase state machine and transcript
//! - [`DebateProtocol`] - drives a session to completion
//! - [`DiscreteScorer`] - 1-4 verdict for a finished debate
//!
//! ## Score extraction
//!
//! ```rust
//! use tribunal_adversarial::{extract_continuous, extract_discrete};
//!
//! let scores = extract_continuous("Accuracy Score: 8\nOverall: 7/10");
//! assert_eq!(scores["Accuracy Score"], 8.0);
//! assert_eq!(scores["Overall Score"], 7.0);
//!
//! let verdict = extract_discrete("THE FINAL SCORE IS: 3\nSound.").unwrap();
//! assert_eq!(verdict.score, 3);
//! ```
//!
//! ## Running a debate
//!
//! ```rust
//! use std::sync::Arc;
//! use tribunal_adversarial::{AgentPair, CancellationFlag, DebateProtocol};
//! use tribunal_core::{Domain, EvaluationRequest, NoContext, SessionStatus};
//! use tribunal_llm::{MockProvider, NoPacing};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let protocol = DebateProtocol::new(Arc::new(NoContext), Arc::new(NoPacing));
//! let pair = AgentPair::from_llm(Domain::Accuracy, Arc::new(MockProvider::smart()));
//! let request = EvaluationRequest::new("Is the earth round?", "Yes, roughly.");
//!
//! let session = protocol
//!     .run(&request, Domain::Accuracy, &pair, 3, &CancellationFlag::new())
//!     .await;
//! assert_eq!(session.status(), SessionStatus::Completed);
//! # }
//! ```

pub mod agent;
pub mod debate;
pub mod protocol;
pub mod scoring;
pub mod verdict;

pub use agent::{
    AgentConfig, AgentPair, AgentRole, DebateAgent, DebateBrief, DomainAgentRegistry,
    LlmDebateAgent,
};
pub use debate::{DebateError, DebateSession, PhaseTransition, SessionPhase};
pub use protocol::{CancellationFlag, DebateProtocol, DEBATES_FAILED_METRIC, DEBATES_METRIC};
pub use scoring::{extract_continuous, extract_discrete, FINAL_SCORE_MARKER, OVERALL_SCORE_KEY};
pub use verdict::{
    default_verdict, rubric, verdict_or_default, DiscreteScorer, DEFAULT_DISCRETE_SCORE,
    SCORING_DEFAULTS_METRIC,
};
