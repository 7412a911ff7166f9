//! Request-level errors
//!
//! Only problems that make the whole evaluation meaningless surface here.
//! Oracle failures inside a domain are recovered and reported as data on
//! [`crate::ExpertEvaluation::error`].

use thiserror::Error;

/// Errors returned to the caller of an evaluation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("Unknown domain '{name}' (valid domains: {valid})")]
    InvalidDomain { name: String, valid: String },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Standard evaluation failed: {0}")]
    Standard(String),
}

/// Errors from a context-retrieval backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("Retrieval backend unavailable: {0}")]
    Unavailable(String),
    #[error("Retrieval query failed: {0}")]
    QueryFailed(String),
}
