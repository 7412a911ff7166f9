//! Discrete 1-4 scoring of a finished debate
//!
//! The scorer never fails: if the oracle errors or its reply carries no
//! recognisable score, the verdict defaults to 2 (Fair) and the reason is
//! recorded in the justification.

use std::sync::Arc;

use tribunal_core::{discrete_label, render_history, ArgumentTurn, DiscreteVerdict, Domain};
use tribunal_llm::{LlmProvider, LlmRequest};

use crate::scoring::{extract_discrete, FINAL_SCORE_MARKER};

/// Score used whenever no verdict could be obtained
pub const DEFAULT_DISCRETE_SCORE: u8 = 2;

/// Counter bumped every time a verdict falls back to the default
pub const SCORING_DEFAULTS_METRIC: &str = "tribunal_scoring_defaults_total";

/// Default verdict carrying `reason` in its justification
pub fn default_verdict(reason: &str) -> DiscreteVerdict {
    metrics::counter!(SCORING_DEFAULTS_METRIC).increment(1);
    DiscreteVerdict {
        score: DEFAULT_DISCRETE_SCORE,
        justification: format!(
            "Scoring error: {}. Defaulting to {} ({}).",
            reason,
            DEFAULT_DISCRETE_SCORE,
            discrete_label(DEFAULT_DISCRETE_SCORE)
        ),
    }
}

/// Extract a verdict from `text`, defaulting when none is present
pub fn verdict_or_default(text: &str) -> DiscreteVerdict {
    extract_discrete(text).unwrap_or_else(|| {
        tracing::warn!("no discrete score found in evaluator reply");
        default_verdict("no 1-4 score found in the evaluator reply")
    })
}

/// Rubric sent to the scoring oracle
pub fn rubric() -> String {
    format!(
        "Rate the answer on this scale:\n\
         1 = {}: wrong, unsafe or unusable for its purpose\n\
         2 = {}: partly right, with significant gaps or problems\n\
         3 = {}: sound, with only minor issues\n\
         4 = {}: fully correct and complete, nothing material to add\n\n\
         Begin your reply with the line '{} [1-4]' and put your justification \
         on the lines after it.",
        discrete_label(1),
        discrete_label(2),
        discrete_label(3),
        discrete_label(4),
        FINAL_SCORE_MARKER
    )
}

/// Converts a debate into a 1-4 verdict via one oracle call
#[derive(Debug, Clone)]
pub struct DiscreteScorer {
    llm: Arc<dyn LlmProvider>,
}

impl DiscreteScorer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Prompt asking for a verdict on a finished debate
    pub fn prompt(domain: Domain, turns: &[ArgumentTurn], summary: &str) -> String {
        format!(
            "DISCRETE SCORING ({domain})\n\n\
             A proponent and a critic debated an AI-generated answer, focusing on {}.\n\n\
             Debate transcript:\n{}\n\nClosing summary:\n{}\n\n{}",
            domain.focus(),
            render_history(turns),
            summary.trim(),
            rubric()
        )
    }

    /// Score a debate. Always returns a verdict.
    pub async fn score(
        &self,
        domain: Domain,
        turns: &[ArgumentTurn],
        summary: &str,
    ) -> DiscreteVerdict {
        let request = LlmRequest::with_role(
            "You are an impartial judge who scores debates about answer quality.",
            &Self::prompt(domain, turns, summary),
        )
        .temperature(0.0);

        match self.llm.complete(request).await {
            Ok(response) => {
                let verdict = verdict_or_default(&response.content);
                tracing::debug!(domain = %domain, score = verdict.score, "debate scored");
                verdict
            }
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "scoring oracle failed");
                default_verdict(&e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribunal_llm::MockProvider;

    fn turns() -> Vec<ArgumentTurn> {
        vec![
            ArgumentTurn::new(1, Domain::Accuracy, "Correct."),
            ArgumentTurn::new(2, Domain::Accuracy, "Missing a date."),
        ]
    }

    #[test]
    fn test_prompt_contains_marker_and_history() {
        let prompt = DiscreteScorer::prompt(Domain::Accuracy, &turns(), "Mostly fine.");
        assert!(prompt.contains("THE FINAL SCORE IS: [1-4]"));
        assert!(prompt.contains("Round 2 - Critic:\nMissing a date."));
        assert!(prompt.contains("4 = Excellent"));
    }

    #[tokio::test]
    async fn test_score_from_oracle() {
        let scorer = DiscreteScorer::new(Arc::new(MockProvider::constant(
            "THE FINAL SCORE IS: 4\nNothing to add.",
        )));
        let verdict = scorer.score(Domain::Accuracy, &turns(), "ok").await;
        assert_eq!(verdict.score, 4);
        assert_eq!(verdict.justification, "Nothing to add.");
    }

    #[tokio::test]
    async fn test_score_defaults_on_miss() {
        let scorer = DiscreteScorer::new(Arc::new(MockProvider::constant("I cannot decide.")));
        let verdict = scorer.score(Domain::Accuracy, &turns(), "ok").await;
        assert_eq!(verdict.score, DEFAULT_DISCRETE_SCORE);
        assert!(verdict.justification.starts_with("Scoring error:"));
    }

    #[tokio::test]
    async fn test_score_defaults_on_oracle_failure() {
        let scorer = DiscreteScorer::new(Arc::new(MockProvider::failing("timeout")));
        let verdict = scorer.score(Domain::Safety, &turns(), "ok").await;
        assert_eq!(verdict.score, 2);
        assert!(verdict.justification.contains("timeout"));
        assert!(verdict.justification.ends_with("Defaulting to 2 (Fair)."));
    }
}
