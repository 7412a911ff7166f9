//! Single-pass evaluation for expertises that are not debated

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use tribunal_adversarial::{extract_continuous, rubric, verdict_or_default};
use tribunal_core::{
    render_context, ContextDocument, ContextRetriever, Domain, EvaluationError,
    EvaluationSource, ExpertEvaluation, NoContext,
};
use tribunal_llm::{LlmProvider, LlmRequest};

/// Evaluates an answer from one expertise's point of view without a debate
#[async_trait]
pub trait StandardEvaluator: Send + Sync + fmt::Debug {
    async fn evaluate(
        &self,
        expertise: &str,
        prompt: &str,
        response: &str,
        context: &[ContextDocument],
        fetch_more: bool,
    ) -> Result<ExpertEvaluation, EvaluationError>;
}

/// Oracle-backed [`StandardEvaluator`]
#[derive(Debug, Clone)]
pub struct LlmStandardEvaluator {
    llm: Arc<dyn LlmProvider>,
    retriever: Arc<dyn ContextRetriever>,
}

impl LlmStandardEvaluator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            retriever: Arc::new(NoContext),
        }
    }

    /// Retriever consulted when a caller asks for more context
    pub fn with_retriever(mut self, retriever: Arc<dyn ContextRetriever>) -> Self {
        self.retriever = retriever;
        self
    }

    /// Evaluation prompt for one expertise
    pub fn prompt(
        expertise: &str,
        prompt: &str,
        response: &str,
        context: &[ContextDocument],
    ) -> String {
        format!(
            "STANDARD EVALUATION by a {expertise}\n\n\
             Question:\n{}\n\nAnswer under review:\n{}\n\nSupporting context:\n{}\n\n\
             Assess the answer from the perspective of a {expertise}. For each criterion \
             you consider, write one line of the form '<Criterion> Score: <0-10>'.\n\n{}",
            prompt.trim(),
            response.trim(),
            render_context(context),
            rubric()
        )
    }

    async fn gather_context(
        &self,
        expertise: &str,
        prompt: &str,
        response: &str,
        supplied: &[ContextDocument],
        fetch_more: bool,
    ) -> Vec<ContextDocument> {
        let mut docs = supplied.to_vec();
        if !fetch_more {
            return docs;
        }

        // Expertises outside the domain table search the accuracy corpus
        let domain = Domain::for_expertise(expertise).unwrap_or(Domain::Accuracy);
        let query = format!("{} {}", prompt, response);
        match self.retriever.retrieve(&query, domain).await {
            Ok(extra) => docs.extend(extra.into_iter().filter(|d| !supplied.contains(d))),
            Err(e) => {
                tracing::warn!(expertise, error = %e, "extra context retrieval failed");
            }
        }
        docs
    }
}

#[async_trait]
impl StandardEvaluator for LlmStandardEvaluator {
    async fn evaluate(
        &self,
        expertise: &str,
        prompt: &str,
        response: &str,
        context: &[ContextDocument],
        fetch_more: bool,
    ) -> Result<ExpertEvaluation, EvaluationError> {
        let context = self
            .gather_context(expertise, prompt, response, context, fetch_more)
            .await;

        let request = LlmRequest::with_role(
            &format!("You are an experienced {expertise} reviewing AI-generated answers."),
            &Self::prompt(expertise, prompt, response, &context),
        )
        .temperature(0.2);

        let reply = self
            .llm
            .complete(request)
            .await
            .map_err(|e| EvaluationError::Standard(format!("{expertise}: {e}")))?;

        let mut eval =
            ExpertEvaluation::new(expertise, EvaluationSource::Standard, &reply.content);
        eval.domain = Domain::for_expertise(expertise);
        eval.continuous_scores = extract_continuous(&reply.content);
        let eval = eval.with_verdict(verdict_or_default(&reply.content));

        tracing::debug!(
            expertise,
            scores = eval.continuous_scores.len(),
            discrete = ?eval.discrete_score,
            "standard evaluation finished"
        );
        Ok(eval)
    }
}
