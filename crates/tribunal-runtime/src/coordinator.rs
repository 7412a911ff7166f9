//! Evaluation coordinator
//!
//! Entry point for a full evaluation: routes each expertise to a domain
//! debate or the standard evaluator, aggregates the scores and asks the
//! oracle for a consensus report across experts.

use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use tribunal_core::{
    discrete_label, AggregatedResult, Domain, EvaluationError, EvaluationRequest,
    EvaluationResult, EvaluationSource, ExpertEvaluation,
};
use tribunal_adversarial::CancellationFlag;
use tribunal_llm::LlmProvider;

use crate::aggregate::ScoreAggregator;
use crate::orchestrator::DebateOrchestrator;
use crate::standard::{LlmStandardEvaluator, StandardEvaluator};

/// Counter of evaluations run
pub const EVALUATIONS_METRIC: &str = "tribunal_evaluations_total";

const CONSENSUS_SYSTEM: &str =
    "You are the chair of an expert review panel. You write balanced, specific reports.";

/// Where an expertise is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Debate(Domain),
    Standard,
}

/// Coordinates debates, standard evaluations, aggregation and consensus
#[derive(Debug, Clone)]
pub struct EvaluationCoordinator {
    orchestrator: DebateOrchestrator,
    standard: Option<Arc<dyn StandardEvaluator>>,
    llm: Arc<dyn LlmProvider>,
    aggregator: ScoreAggregator,
}

impl EvaluationCoordinator {
    /// Coordinator without a standard evaluator
    pub fn new(orchestrator: DebateOrchestrator, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            orchestrator,
            standard: None,
            llm,
            aggregator: ScoreAggregator::new(),
        }
    }

    /// Everything backed by one oracle, including standard evaluations
    pub fn with_llm(llm: Arc<dyn LlmProvider>) -> Self {
        Self::new(DebateOrchestrator::with_llm(llm.clone()), llm.clone())
            .with_standard_evaluator(Arc::new(LlmStandardEvaluator::new(llm)))
    }

    /// Evaluate non-debated expertises with `evaluator`
    pub fn with_standard_evaluator(mut self, evaluator: Arc<dyn StandardEvaluator>) -> Self {
        self.standard = Some(evaluator);
        self
    }

    /// The underlying orchestrator
    pub fn orchestrator(&self) -> &DebateOrchestrator {
        &self.orchestrator
    }

    fn route(expertise: &str, request: &EvaluationRequest, domains: &[Domain]) -> Route {
        match Domain::for_expertise(expertise) {
            Some(domain) if request.use_debate && domains.contains(&domain) => {
                Route::Debate(domain)
            }
            _ => Route::Standard,
        }
    }

    /// Run a full evaluation.
    ///
    /// Request-level problems (unknown domain, no rounds, nothing to
    /// evaluate) are returned before any oracle call. Everything after that
    /// is recorded in the result instead of failing it.
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        let cancel = self.orchestrator.cancellation();
        self.evaluate_cancellable(request, &cancel).await
    }

    /// [`EvaluationCoordinator::evaluate`] with a cancellation flag scoped to
    /// this one call
    pub async fn evaluate_cancellable(
        &self,
        request: &EvaluationRequest,
        cancel: &CancellationFlag,
    ) -> Result<EvaluationResult, EvaluationError> {
        let domains = request.validate()?;
        let expertises = request.effective_expertises()?;
        if expertises.is_empty() {
            return Err(EvaluationError::InvalidRequest(
                "no expertises or domains to evaluate".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let routes: Vec<(String, Route)> = expertises
            .iter()
            .map(|e| (e.clone(), Self::route(e, request, &domains)))
            .collect();

        let mut debated: Vec<Domain> = Vec::new();
        for (_, route) in &routes {
            if let Route::Debate(domain) = route {
                if !debated.contains(domain) {
                    debated.push(*domain);
                }
            }
        }

        tracing::info!(
            evaluation = %id,
            experts = routes.len(),
            debates = debated.len(),
            "evaluation started"
        );

        let standard_names: Vec<&str> = routes
            .iter()
            .filter(|(_, r)| *r == Route::Standard)
            .map(|(name, _)| name.as_str())
            .collect();

        let (debate_results, standard_results) = futures::join!(
            self.orchestrator
                .run_domains_cancellable(request, &debated, cancel),
            join_all(
                standard_names
                    .iter()
                    .map(|name| self.evaluate_standard(name, request))
            )
        );

        let mut per_expert: BTreeMap<String, ExpertEvaluation> = BTreeMap::new();
        for (name, route) in &routes {
            if let Route::Debate(domain) = route {
                if let Some(eval) = debate_results.get(domain) {
                    let mut eval = eval.clone();
                    eval.expertise = name.clone();
                    per_expert.insert(name.clone(), eval);
                }
            }
        }
        for eval in standard_results {
            per_expert.insert(eval.expertise.clone(), eval);
        }

        let aggregated = self.aggregator.aggregate(&per_expert);
        let (consensus_narrative, consensus_error) =
            self.consensus(request, &per_expert, &aggregated).await;

        let result = EvaluationResult {
            id,
            per_expert,
            aggregated,
            consensus_narrative,
            consensus_error,
            evaluated_at: Utc::now(),
        };

        metrics::counter!(EVALUATIONS_METRIC).increment(1);
        tracing::info!(
            evaluation = %id,
            failed = result.failed_experts().len(),
            mean = result.aggregated.overall_mean,
            discrete = ?result.aggregated.overall_discrete_score,
            "evaluation finished"
        );
        Ok(result)
    }

    async fn evaluate_standard(&self, expertise: &str, request: &EvaluationRequest) -> ExpertEvaluation {
        let Some(evaluator) = &self.standard else {
            tracing::warn!(expertise, "no standard evaluator configured");
            return ExpertEvaluation::failed(
                expertise,
                EvaluationSource::Standard,
                "no standard evaluator is configured for this expertise",
            );
        };

        let context = Domain::for_expertise(expertise)
            .map(|d| request.context_for(d))
            .unwrap_or(&[]);

        match evaluator
            .evaluate(
                expertise,
                &request.prompt,
                &request.response,
                context,
                request.fetch_more_context,
            )
            .await
        {
            Ok(eval) => eval,
            Err(e) => {
                tracing::warn!(expertise, error = %e, "standard evaluation failed");
                ExpertEvaluation::failed(expertise, EvaluationSource::Standard, &e.to_string())
            }
        }
    }

    fn statistics_block(aggregated: &AggregatedResult) -> String {
        let std_dev = aggregated
            .overall_std_dev
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        let avg_discrete = aggregated
            .avg_discrete_score
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        let discrete = aggregated
            .overall_discrete_score
            .map(|s| format!("{s} ({})", discrete_label(s)))
            .unwrap_or_else(|| "n/a".to_string());

        format!(
            "Aggregate statistics ({} continuous scores):\n\
             - mean: {:.2}/10\n\
             - median: {:.2}/10\n\
             - min: {:.2}/10\n\
             - max: {:.2}/10\n\
             - std dev: {std_dev}\n\
             - average discrete score: {avg_discrete}\n\
             - overall discrete score: {discrete}",
            aggregated.sample_count,
            aggregated.overall_mean,
            aggregated.overall_median,
            aggregated.overall_min,
            aggregated.overall_max,
        )
    }

    /// Prompt for the cross-expert consensus report.
    ///
    /// Carries every expert's narrative and discrete justification plus the
    /// full aggregate statistics.
    pub fn consensus_prompt(
        request: &EvaluationRequest,
        experts: &BTreeMap<String, ExpertEvaluation>,
        aggregated: &AggregatedResult,
    ) -> String {
        let mut sections = Vec::new();
        for (name, eval) in experts {
            let body = match &eval.error {
                Some(err) => format!("Evaluation failed: {err}"),
                None => {
                    let discrete = eval
                        .discrete_score
                        .map(|s| format!("{s} ({})", discrete_label(s)))
                        .unwrap_or_else(|| "none".to_string());
                    let justification = eval
                        .discrete_justification
                        .as_deref()
                        .map(str::trim)
                        .filter(|j| !j.is_empty())
                        .unwrap_or("none given");
                    format!(
                        "Discrete score: {discrete}\nJustification: {justification}\n\
                         Continuous scores: {:?}\n{}",
                        eval.continuous_scores,
                        eval.narrative.trim()
                    )
                }
            };
            sections.push(format!("### {name}\n{body}"));
        }

        format!(
            "Write a CONSENSUS REPORT for the expert panel below.\n\n\
             Question:\n{}\n\nAnswer under review:\n{}\n\n{}\n\n{}\n\n\
             The report must:\n\
             1. State the overall quality of the answer on both the 1-4 and the 0-10 scale\n\
             2. List the strengths identified across experts\n\
             3. List the weaknesses consistently raised\n\
             4. Give concrete recommendations for improving the answer\n\
             5. Summarize how far the experts agree with each other",
            request.prompt.trim(),
            request.response.trim(),
            Self::statistics_block(aggregated),
            sections.join("\n\n")
        )
    }

    async fn consensus(
        &self,
        request: &EvaluationRequest,
        experts: &BTreeMap<String, ExpertEvaluation>,
        aggregated: &AggregatedResult,
    ) -> (String, Option<String>) {
        let prompt = Self::consensus_prompt(request, experts, aggregated);
        match self.llm.generate(CONSENSUS_SYSTEM, &prompt).await {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::warn!(error = %e, "consensus generation failed, using fallback narrative");
                let fallback = format!(
                    "Consensus report unavailable. {} of {} experts produced scores; \
                     mean continuous score {:.2}/10, overall discrete score {}.",
                    experts.values().filter(|e| !e.is_failed()).count(),
                    experts.len(),
                    aggregated.overall_mean,
                    aggregated
                        .overall_discrete_score
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "n/a".to_string())
                );
                (fallback, Some(e.to_string()))
            }
        }
    }
}
