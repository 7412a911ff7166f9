//! Debate protocol driver
//!
//! Runs one domain's debate to completion:
//!
//! 1. resolve supporting context (request first, then the retriever)
//! 2. proponent opening argument
//! 3. alternating rebuttals over the full history until `max_rounds` turns
//! 4. proponent closing summary
//!
//! The pacing policy is awaited before every oracle call except the first,
//! and the cancellation flag is checked before each new turn. Any failure
//! ends the session in [`SessionPhase::Failed`]; nothing is retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tribunal_core::{ContextDocument, ContextRetriever, Domain, EvaluationRequest};
use tribunal_llm::PacingPolicy;

use crate::agent::{AgentPair, DebateBrief};
use crate::debate::{DebateError, DebateSession, SessionPhase};

/// Counter of debates run, labelled by outcome
pub const DEBATES_METRIC: &str = "tribunal_debates_total";
/// Counter of debates that ended in failure
pub const DEBATES_FAILED_METRIC: &str = "tribunal_debates_failed_total";

/// Cooperative cancellation shared between a caller and running debates
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. In-flight oracle calls are allowed to finish.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives debates with a shared retriever and pacing policy
#[derive(Debug, Clone)]
pub struct DebateProtocol {
    retriever: Arc<dyn ContextRetriever>,
    pacing: Arc<dyn PacingPolicy>,
}

impl DebateProtocol {
    pub fn new(retriever: Arc<dyn ContextRetriever>, pacing: Arc<dyn PacingPolicy>) -> Self {
        Self { retriever, pacing }
    }

    /// Context for `domain`: the request's own documents, else the retriever's.
    ///
    /// Retrieval failures degrade to no context.
    pub async fn resolve_context(
        &self,
        request: &EvaluationRequest,
        domain: Domain,
    ) -> Vec<ContextDocument> {
        let supplied = request.context_for(domain);
        if !supplied.is_empty() {
            return supplied.to_vec();
        }

        match self
            .retriever
            .retrieve(&request.retrieval_query(), domain)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "context retrieval failed, continuing without context");
                Vec::new()
            }
        }
    }

    /// Run a full debate for `domain`. Always returns a terminal session.
    pub async fn run(
        &self,
        request: &EvaluationRequest,
        domain: Domain,
        pair: &AgentPair,
        max_rounds: u32,
        cancel: &CancellationFlag,
    ) -> DebateSession {
        let mut session = DebateSession::new(domain, max_rounds);
        let context = self.resolve_context(request, domain).await;
        let brief = DebateBrief {
            domain,
            prompt: request.prompt.clone(),
            response: request.response.clone(),
            context,
        };

        tracing::info!(session = %session.id, domain = %domain, max_rounds, "debate started");

        match self.drive(&mut session, &brief, pair, cancel).await {
            Ok(()) => {
                metrics::counter!(DEBATES_METRIC, "outcome" => "completed").increment(1);
                tracing::info!(
                    session = %session.id,
                    rounds = session.rounds_completed(),
                    "debate completed"
                );
            }
            Err(e) => {
                metrics::counter!(DEBATES_METRIC, "outcome" => "failed").increment(1);
                metrics::counter!(DEBATES_FAILED_METRIC, "domain" => domain.as_str()).increment(1);
                tracing::warn!(
                    session = %session.id,
                    status = %session.status_line(),
                    error = %e,
                    "debate failed"
                );
                session.fail(&e);
            }
        }

        session
    }

    async fn drive(
        &self,
        session: &mut DebateSession,
        brief: &DebateBrief,
        pair: &AgentPair,
        cancel: &CancellationFlag,
    ) -> Result<(), DebateError> {
        let mut first_call = true;

        while let Some(next) = session.next_phase() {
            if next == SessionPhase::Completed {
                break;
            }
            if cancel.is_cancelled() {
                return Err(DebateError::Cancelled {
                    round: session.rounds_completed(),
                });
            }
            if !first_call {
                self.pacing.pause().await;
            }
            first_call = false;

            session.transition(next)?;
            tracing::debug!(status = %session.status_line(), "turn");

            match next {
                SessionPhase::ProponentTurn if session.current_round == 1 => {
                    let text = pair.proponent.present_argument(brief).await?;
                    session.record_turn(&text)?;
                }
                SessionPhase::ProponentTurn => {
                    let text = pair
                        .proponent
                        .present_counter_argument(brief, &session.turns)
                        .await?;
                    session.record_turn(&text)?;
                }
                SessionPhase::CriticTurn => {
                    let text = pair
                        .critic
                        .present_counter_argument(brief, &session.turns)
                        .await?;
                    session.record_turn(&text)?;
                }
                SessionPhase::Summarizing => {
                    let text = pair.proponent.summarize(brief, &session.turns).await?;
                    session.conclude(&text)?;
                }
                other => {
                    return Err(DebateError::InvalidTransition {
                        from: session.phase,
                        to: other,
                    })
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tribunal_core::{
        NoContext, RetrievalError, SessionStatus, StaticContextRetriever, TurnRole,
    };
    use tribunal_llm::{LlmProvider, MockProvider, NoPacing};

    #[derive(Debug)]
    struct FailingRetriever;

    #[async_trait]
    impl ContextRetriever for FailingRetriever {
        async fn retrieve(
            &self,
            _query: &str,
            _domain: Domain,
        ) -> Result<Vec<ContextDocument>, RetrievalError> {
            Err(RetrievalError::Unavailable("index offline".to_string()))
        }
    }

    fn protocol() -> DebateProtocol {
        DebateProtocol::new(Arc::new(NoContext), Arc::new(NoPacing))
    }

    fn request() -> EvaluationRequest {
        EvaluationRequest::new("What is the boiling point of water?", "100 C at sea level.")
    }

    #[tokio::test]
    async fn test_full_debate_with_smart_mock() {
        let mock = Arc::new(MockProvider::smart());
        let pair = AgentPair::from_llm(Domain::Accuracy, mock.clone());
        let session = protocol()
            .run(&request(), Domain::Accuracy, &pair, 3, &CancellationFlag::new())
            .await;

        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.rounds_completed(), 3);
        assert_eq!(session.turns[0].role, TurnRole::ProponentOpening);
        assert_eq!(session.turns[1].role, TurnRole::CriticRebuttal);
        assert_eq!(session.turns[2].role, TurnRole::ProponentRebuttal);
        let summary = session.summary.expect("summary");
        assert!(summary.narrative_text.contains("Overall Score: 7/10"));
        assert_eq!(summary.rounds_completed, 3);
        // three turns plus the summary
        assert_eq!(mock.call_count(), 4);
    }

    #[tokio::test]
    async fn test_oracle_failure_mid_debate() {
        let mock = Arc::new(MockProvider::fail_after(2, "quota exhausted"));
        let pair = AgentPair::from_llm(Domain::Safety, mock);
        let session = protocol()
            .run(&request(), Domain::Safety, &pair, 4, &CancellationFlag::new())
            .await;

        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.rounds_completed(), 2);
        assert!(session.summary.is_none());
        assert!(session.error.as_deref().unwrap().contains("quota exhausted"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mock = Arc::new(MockProvider::smart());
        let pair = AgentPair::from_llm(Domain::Clarity, mock.clone());
        let cancel = CancellationFlag::new();
        cancel.cancel();

        let session = protocol()
            .run(&request(), Domain::Clarity, &pair, 3, &cancel)
            .await;
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.error.as_deref(), Some("Debate cancelled after round 0"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_request_context_beats_retriever() {
        let mut retriever = StaticContextRetriever::new(3);
        retriever.insert(
            Domain::Accuracy,
            ContextDocument::new("Water boiling point depends on pressure."),
        );
        let protocol = DebateProtocol::new(Arc::new(retriever), Arc::new(NoPacing));

        let retrieved = protocol.resolve_context(&request(), Domain::Accuracy).await;
        assert_eq!(retrieved.len(), 1);

        let supplied = request().with_context(
            Domain::Accuracy,
            vec![ContextDocument::new("Supplied by the caller.")],
        );
        let docs = protocol.resolve_context(&supplied, Domain::Accuracy).await;
        assert_eq!(docs[0].text, "Supplied by the caller.");
    }

    #[tokio::test]
    async fn test_single_round_goes_straight_to_summary() {
        let mock: Arc<dyn LlmProvider> = Arc::new(MockProvider::smart());
        let pair = AgentPair::from_llm(Domain::Compliance, mock);
        let session = protocol()
            .run(&request(), Domain::Compliance, &pair, 1, &CancellationFlag::new())
            .await;
        assert_eq!(session.rounds_completed(), 1);
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_retrieval_failure_means_no_context() {
        let protocol = DebateProtocol::new(Arc::new(FailingRetriever), Arc::new(NoPacing));
        let docs = protocol.resolve_context(&request(), Domain::Accuracy).await;
        assert!(docs.is_empty());

        let mock = Arc::new(MockProvider::smart());
        let pair = AgentPair::from_llm(Domain::Accuracy, mock.clone());
        let session = protocol
            .run(&request(), Domain::Accuracy, &pair, 3, &CancellationFlag::new())
            .await;
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.error.is_none());
        assert_eq!(mock.call_count(), 4);
    }
}
