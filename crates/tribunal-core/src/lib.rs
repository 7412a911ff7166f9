//! # Tribunal Core
//!
//! Core types for the Tribunal evaluation engine:
//! - [`Domain`] - closed set of debate-capable judgment domains
//! - [`EvaluationRequest`] - what to evaluate, and how
//! - [`ArgumentTurn`] / [`SummaryRecord`] - debate history
//! - [`ExpertEvaluation`] / [`AggregatedResult`] / [`EvaluationResult`] - outputs
//! - [`ContextRetriever`] - boundary to the context-retrieval service

pub mod domain;
pub mod error;
pub mod evaluation;
pub mod request;
pub mod retrieval;
pub mod turn;

pub use domain::Domain;
pub use error::{EvaluationError, RetrievalError};
pub use evaluation::{
    discrete_label, AggregatedResult, ContinuousScores, DiscreteVerdict, EvaluationResult,
    EvaluationSource, ExpertEvaluation, DISCRETE_MAX, DISCRETE_MIN,
};
pub use request::{render_context, ContextDocument, EvaluationRequest, DEFAULT_MAX_ROUNDS};
pub use retrieval::{ContextRetriever, NoContext, StaticContextRetriever};
pub use turn::{render_history, ArgumentTurn, SessionStatus, SummaryRecord, TurnRole};
