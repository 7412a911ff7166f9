//! Expert evaluations and the aggregated report
//!
//! These are the result types that leave the engine. Everything here is
//! plain serializable data: no handles, no interior mutability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::Domain;
use crate::turn::ArgumentTurn;

/// Criterion label → value on the 0-10 scale
pub type ContinuousScores = BTreeMap<String, f64>;

/// Lowest and highest values on the discrete scale
pub const DISCRETE_MIN: u8 = 1;
pub const DISCRETE_MAX: u8 = 4;

/// Label for a value on the 1-4 scale
pub fn discrete_label(score: u8) -> &'static str {
    match score {
        1 => "Poor",
        2 => "Fair",
        3 => "Good",
        4 => "Excellent",
        _ => "Unknown",
    }
}

/// A 1-4 verdict with its justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteVerdict {
    /// Score on the 1-4 scale
    pub score: u8,
    /// Reasoning given for the score
    pub justification: String,
}

/// How an expert evaluation was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    /// Proponent/critic debate
    Debate,
    /// Single-pass standard evaluator
    Standard,
}

/// One expert's (or one domain's) evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpertEvaluation {
    /// Expertise the result is reported under
    pub expertise: String,
    /// Debate domain, if the evaluation came from a debate
    pub domain: Option<Domain>,
    /// Narrative produced by the expert (debate summary for debates)
    pub narrative: String,
    /// Criterion scores on the 0-10 scale
    pub continuous_scores: ContinuousScores,
    /// Verdict on the 1-4 scale
    pub discrete_score: Option<u8>,
    /// Justification for the discrete verdict
    pub discrete_justification: Option<String>,
    /// Argument turns completed (0 for standard evaluations)
    pub rounds_completed: u32,
    /// Set when this expert's evaluation failed
    pub error: Option<String>,
    /// Debate or standard evaluation
    pub source: EvaluationSource,
    /// Full debate history (empty for standard evaluations)
    #[serde(default)]
    pub transcript: Vec<ArgumentTurn>,
    /// SHA-256 digest of the transcript, for audit trails
    #[serde(default)]
    pub transcript_digest: Option<String>,
}

impl ExpertEvaluation {
    /// A successful evaluation with no scores attached yet
    pub fn new(expertise: &str, source: EvaluationSource, narrative: &str) -> Self {
        Self {
            expertise: expertise.to_string(),
            domain: None,
            narrative: narrative.to_string(),
            continuous_scores: ContinuousScores::new(),
            discrete_score: None,
            discrete_justification: None,
            rounds_completed: 0,
            error: None,
            source,
            transcript: Vec::new(),
            transcript_digest: None,
        }
    }

    /// A failed evaluation: error set, numeric fields empty
    pub fn failed(expertise: &str, source: EvaluationSource, error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(expertise, source, "")
        }
    }

    /// Attach a discrete verdict
    pub fn with_verdict(mut self, verdict: DiscreteVerdict) -> Self {
        self.discrete_score = Some(verdict.score);
        self.discrete_justification = Some(verdict.justification);
        self
    }

    /// Whether this evaluation failed
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// The discrete verdict, if one is present
    pub fn verdict(&self) -> Option<DiscreteVerdict> {
        self.discrete_score.map(|score| DiscreteVerdict {
            score,
            justification: self.discrete_justification.clone().unwrap_or_default(),
        })
    }
}

/// Statistics reconciled across every expert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Each expert's continuous scores
    pub per_expert: BTreeMap<String, ContinuousScores>,
    /// Mean of all continuous samples (0 when there are none)
    pub overall_mean: f64,
    /// Median of all continuous samples (0 when there are none)
    pub overall_median: f64,
    /// Minimum continuous sample (0 when there are none)
    pub overall_min: f64,
    /// Maximum continuous sample (0 when there are none)
    pub overall_max: f64,
    /// Sample standard deviation, only with two or more samples
    pub overall_std_dev: Option<f64>,
    /// Number of continuous samples
    pub sample_count: usize,
    /// Each expert's discrete verdict
    pub discrete_per_expert: BTreeMap<String, DiscreteVerdict>,
    /// Mean discrete score
    pub avg_discrete_score: Option<f64>,
    /// Mean discrete score rounded to the nearest integer
    pub overall_discrete_score: Option<u8>,
}

/// The terminal artifact handed back to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Unique ID of this evaluation run
    pub id: Uuid,
    /// Every expert's evaluation, keyed by expertise
    pub per_expert: BTreeMap<String, ExpertEvaluation>,
    /// Reconciled statistics
    pub aggregated: AggregatedResult,
    /// Synthesized report across all experts
    pub consensus_narrative: String,
    /// Set when the consensus narrative could not be generated
    pub consensus_error: Option<String>,
    /// When the evaluation finished
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationResult {
    /// Experts whose evaluation failed
    pub fn failed_experts(&self) -> Vec<&str> {
        self.per_expert
            .iter()
            .filter(|(_, e)| e.is_failed())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_has_no_numbers() {
        let eval = ExpertEvaluation::failed("Legal Expert", EvaluationSource::Debate, "boom");
        assert!(eval.is_failed());
        assert!(eval.continuous_scores.is_empty());
        assert!(eval.discrete_score.is_none());
        assert_eq!(eval.rounds_completed, 0);
        assert!(eval.verdict().is_none());
    }

    #[test]
    fn test_with_verdict() {
        let eval = ExpertEvaluation::new("Editor", EvaluationSource::Standard, "Readable.")
            .with_verdict(DiscreteVerdict {
                score: 3,
                justification: "Clear structure".to_string(),
            });
        assert_eq!(eval.discrete_score, Some(3));
        assert_eq!(eval.verdict().unwrap().justification, "Clear structure");
        assert_eq!(discrete_label(3), "Good");
    }

    #[test]
    fn test_serializes_to_json() {
        let eval = ExpertEvaluation::new("Editor", EvaluationSource::Standard, "ok");
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["source"], "standard");
        assert!(json["error"].is_null());
    }
}
