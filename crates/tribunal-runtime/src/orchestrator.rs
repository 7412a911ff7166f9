//! Orchestrator - runs one debate per domain and scores the outcome

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

use tribunal_adversarial::{
    extract_continuous, CancellationFlag, DebateError, DebateProtocol, DebateSession,
    DiscreteScorer, DomainAgentRegistry,
};
use tribunal_core::{
    ContextRetriever, Domain, EvaluationError, EvaluationRequest, EvaluationSource,
    ExpertEvaluation, NoContext,
};
use tribunal_llm::{LlmProvider, NoPacing, PacingPolicy};

use crate::config::OrchestratorConfig;

/// Result of [`DebateOrchestrator::run`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateOutcome {
    /// Exactly one domain was requested
    Single(ExpertEvaluation),
    /// Several domains, keyed by domain
    Multiple(BTreeMap<Domain, ExpertEvaluation>),
}

impl DebateOutcome {
    /// Every evaluation in the outcome
    pub fn evaluations(&self) -> Vec<&ExpertEvaluation> {
        match self {
            Self::Single(eval) => vec![eval],
            Self::Multiple(map) => map.values().collect(),
        }
    }
}

/// Orchestrator runs domain debates, isolating failures per domain
#[derive(Debug, Clone)]
pub struct DebateOrchestrator {
    /// Configuration
    pub config: OrchestratorConfig,
    registry: DomainAgentRegistry,
    scorer: DiscreteScorer,
    protocol: DebateProtocol,
    cancel: CancellationFlag,
}

impl DebateOrchestrator {
    /// Create an orchestrator from explicit collaborators
    pub fn new(
        registry: DomainAgentRegistry,
        scorer: DiscreteScorer,
        retriever: Arc<dyn ContextRetriever>,
        pacing: Arc<dyn PacingPolicy>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            config,
            registry,
            scorer,
            protocol: DebateProtocol::new(retriever, pacing),
            cancel: CancellationFlag::new(),
        }
    }

    /// Oracle-backed agents for every domain, no retrieval, no pacing
    pub fn with_llm(llm: Arc<dyn LlmProvider>) -> Self {
        Self::new(
            DomainAgentRegistry::with_llm(llm.clone()),
            DiscreteScorer::new(llm),
            Arc::new(NoContext),
            Arc::new(NoPacing),
            OrchestratorConfig::default(),
        )
    }

    /// Flag that stops every running debate before its next turn.
    ///
    /// The flag is sticky: once cancelled, every later run that uses it fails
    /// at round 0. Callers that reuse an orchestrator after cancelling pass a
    /// fresh flag to [`DebateOrchestrator::run_domains_cancellable`] instead.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Validate `request` and debate each of its domains
    pub async fn run(&self, request: &EvaluationRequest) -> Result<DebateOutcome, EvaluationError> {
        let domains = request.validate()?;
        let mut results = self.run_domains(request, &domains).await;

        if let [only] = domains.as_slice() {
            if let Some(eval) = results.remove(only) {
                return Ok(DebateOutcome::Single(eval));
            }
        }
        Ok(DebateOutcome::Multiple(results))
    }

    /// Debate each domain, concurrently unless configured otherwise
    pub async fn run_domains(
        &self,
        request: &EvaluationRequest,
        domains: &[Domain],
    ) -> BTreeMap<Domain, ExpertEvaluation> {
        self.run_domains_cancellable(request, domains, &self.cancel)
            .await
    }

    /// [`DebateOrchestrator::run_domains`] observing `cancel` instead of the
    /// orchestrator's own flag
    pub async fn run_domains_cancellable(
        &self,
        request: &EvaluationRequest,
        domains: &[Domain],
        cancel: &CancellationFlag,
    ) -> BTreeMap<Domain, ExpertEvaluation> {
        let permits = self.config.permits(domains.len());
        let semaphore = Semaphore::new(permits);
        let semaphore = &semaphore;

        tracing::info!(
            domains = domains.len(),
            permits,
            max_rounds = request.max_rounds,
            "starting domain debates"
        );

        let tasks = domains.iter().map(|&domain| async move {
            let _permit = semaphore.acquire().await;
            (domain, self.evaluate_domain(request, domain, cancel).await)
        });

        join_all(tasks).await.into_iter().collect()
    }

    async fn evaluate_domain(
        &self,
        request: &EvaluationRequest,
        domain: Domain,
        cancel: &CancellationFlag,
    ) -> ExpertEvaluation {
        let Some(pair) = self.registry.get(domain) else {
            let err = DebateError::MissingAgents(domain);
            tracing::warn!(domain = %domain, "{}", err);
            let mut eval =
                ExpertEvaluation::failed(domain.expertise(), EvaluationSource::Debate, &err.to_string());
            eval.domain = Some(domain);
            return eval;
        };

        let session = self
            .protocol
            .run(request, domain, pair, request.max_rounds, cancel)
            .await;
        self.score_session(session).await
    }

    /// Turn a finished session into an expert evaluation
    async fn score_session(&self, session: DebateSession) -> ExpertEvaluation {
        let domain = session.domain;
        let digest = session.transcript_digest();

        let mut eval = match (&session.summary, &session.error) {
            (Some(summary), None) => {
                let verdict = self
                    .scorer
                    .score(domain, &session.turns, &summary.narrative_text)
                    .await;
                let mut eval = ExpertEvaluation::new(
                    domain.expertise(),
                    EvaluationSource::Debate,
                    &summary.narrative_text,
                )
                .with_verdict(verdict);
                eval.continuous_scores = extract_continuous(&summary.narrative_text);
                eval.rounds_completed = summary.rounds_completed;
                eval
            }
            (_, error) => ExpertEvaluation::failed(
                domain.expertise(),
                EvaluationSource::Debate,
                error.as_deref().unwrap_or("debate ended without a summary"),
            ),
        };

        eval.domain = Some(domain);
        eval.transcript = session.turns;
        eval.transcript_digest = Some(digest);
        eval
    }
}
