use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tribunal_adversarial::{
    extract_continuous, extract_discrete, AgentPair, CancellationFlag, DebateProtocol,
    DiscreteScorer, DEFAULT_DISCRETE_SCORE,
};
use tribunal_core::{Domain, EvaluationRequest, NoContext, SessionStatus, TurnRole};
use tribunal_llm::{LlmProvider, MockProvider, NoPacing, PacingPolicy};

#[derive(Debug, Default)]
struct CountingPacing {
    pauses: AtomicUsize,
}

#[async_trait]
impl PacingPolicy for CountingPacing {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

/// Cancels the shared flag on the first pause, i.e. right after the opening
#[derive(Debug)]
struct CancelOnPause(CancellationFlag);

#[async_trait]
impl PacingPolicy for CancelOnPause {
    async fn pause(&self) {
        self.0.cancel();
    }
}

fn request() -> EvaluationRequest {
    EvaluationRequest::new(
        "Is it safe to mix bleach and ammonia?",
        "No. The mixture releases toxic chloramine vapour.",
    )
}

#[tokio::test]
async fn test_roles_alternate_for_any_round_count() {
    for max_rounds in 1..=5u32 {
        let pacing = Arc::new(CountingPacing::default());
        let mock = Arc::new(MockProvider::smart());
        let pair = AgentPair::from_llm(Domain::Safety, mock.clone());
        let protocol = DebateProtocol::new(Arc::new(NoContext), pacing.clone());

        let session = protocol
            .run(&request(), Domain::Safety, &pair, max_rounds, &CancellationFlag::new())
            .await;

        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.rounds_completed(), max_rounds);
        for (i, turn) in session.turns.iter().enumerate() {
            let round = i as u32 + 1;
            assert_eq!(turn.round, round);
            let expected = match round {
                1 => TurnRole::ProponentOpening,
                r if r % 2 == 0 => TurnRole::CriticRebuttal,
                _ => TurnRole::ProponentRebuttal,
            };
            assert_eq!(turn.role, expected, "round {} of {}", round, max_rounds);
        }

        // every oracle call but the first is paced: N turns + summary - 1
        assert_eq!(pacing.pauses.load(Ordering::SeqCst), max_rounds as usize);
        assert_eq!(mock.call_count(), max_rounds as usize + 1);
    }
}

#[tokio::test]
async fn test_rebuttals_see_full_history() {
    let mock = Arc::new(MockProvider::scripted(
        vec![
            ("closing summary", "Overall Score: 6/10"),
            ("round 1 - proponent", "second"),
            ("opening argument", "first"),
        ],
        "unexpected",
    ));
    let pair = AgentPair::from_llm(Domain::Accuracy, mock.clone());
    let protocol = DebateProtocol::new(Arc::new(NoContext), Arc::new(NoPacing));

    let session = protocol
        .run(&request(), Domain::Accuracy, &pair, 2, &CancellationFlag::new())
        .await;

    let texts: Vec<&str> = session.turns.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(
        session.summary.unwrap().narrative_text,
        "Overall Score: 6/10"
    );
}

#[tokio::test]
async fn test_cancellation_between_turns() {
    let cancel = CancellationFlag::new();
    let mock = Arc::new(MockProvider::smart());
    let pair = AgentPair::from_llm(Domain::Legality, mock.clone());
    let protocol = DebateProtocol::new(Arc::new(NoContext), Arc::new(CancelOnPause(cancel.clone())));

    // The pause before round 2 flips the flag, but round 2 is already
    // committed; the check before round 3 stops the debate.
    let session = protocol
        .run(&request(), Domain::Legality, &pair, 5, &cancel)
        .await;

    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(session.rounds_completed(), 2);
    assert_eq!(session.error.as_deref(), Some("Debate cancelled after round 2"));
    assert!(session.summary.is_none());
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_failed_opening_records_no_turns() {
    let mock: Arc<dyn LlmProvider> = Arc::new(MockProvider::failing("connection refused"));
    let pair = AgentPair::from_llm(Domain::Compliance, mock);
    let protocol = DebateProtocol::new(Arc::new(NoContext), Arc::new(NoPacing));

    let session = protocol
        .run(&request(), Domain::Compliance, &pair, 3, &CancellationFlag::new())
        .await;

    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(session.turns.is_empty());
    assert!(session.error.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_scorer_after_debate() {
    let mock = Arc::new(MockProvider::smart());
    let pair = AgentPair::from_llm(Domain::Clarity, mock.clone());
    let protocol = DebateProtocol::new(Arc::new(NoContext), Arc::new(NoPacing));
    let session = protocol
        .run(&request(), Domain::Clarity, &pair, 3, &CancellationFlag::new())
        .await;
    let summary = session.summary.clone().unwrap();

    let verdict = DiscreteScorer::new(mock)
        .score(Domain::Clarity, &session.turns, &summary.narrative_text)
        .await;
    assert_eq!(verdict.score, 3);

    let broken = DiscreteScorer::new(Arc::new(MockProvider::constant("no idea")))
        .score(Domain::Clarity, &session.turns, &summary.narrative_text)
        .await;
    assert_eq!(broken.score, DEFAULT_DISCRETE_SCORE);
}

proptest! {
    #[test]
    fn prop_extractors_are_pure(text in "(?s).{0,200}") {
        prop_assert_eq!(extract_continuous(&text), extract_continuous(&text));
        prop_assert_eq!(extract_discrete(&text), extract_discrete(&text));
    }

    #[test]
    fn prop_discrete_scores_stay_in_range(text in "(?s).{0,200}") {
        if let Some(verdict) = extract_discrete(&text) {
            prop_assert!((1..=4).contains(&verdict.score));
        }
    }

    #[test]
    fn prop_marker_line_is_read_back(
        score in 1u8..=4,
        justification in "[a-zA-Z ,.]{0,80}",
    ) {
        let text = format!("THE FINAL SCORE IS: {}\n{}", score, justification);
        let verdict = extract_discrete(&text).unwrap();
        prop_assert_eq!(verdict.score, score);
        prop_assert_eq!(verdict.justification, justification.trim());
    }

    #[test]
    fn prop_labelled_score_is_read_back(value in 0u32..=100) {
        let v = value as f64 / 10.0;
        let scores = extract_continuous(&format!("Depth Score: {}", v));
        prop_assert_eq!(scores.get("Depth Score").copied(), Some(v));
    }
}
