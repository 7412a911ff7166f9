//! Evaluation requests and the context documents that accompany them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Domain;
use crate::error::EvaluationError;

/// Default number of argument turns per debate
pub const DEFAULT_MAX_ROUNDS: u32 = 3;

/// A supporting passage supplied by the caller or fetched by a retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDocument {
    /// Passage text
    pub text: String,
    /// Opaque metadata (source, score, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ContextDocument {
    /// Create a document without metadata
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Render documents as a numbered block for inclusion in a prompt
pub fn render_context(docs: &[ContextDocument]) -> String {
    if docs.is_empty() {
        return "No supporting context was provided.".to_string();
    }
    docs.iter()
        .enumerate()
        .map(|(i, doc)| format!("[{}] {}", i + 1, doc.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

fn default_use_debate() -> bool {
    true
}

/// What the caller wants evaluated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The question that was asked
    pub prompt: String,
    /// The generated answer under evaluation
    pub response: String,
    /// Requested debate domains (validated against [`Domain::ALL`])
    #[serde(default)]
    pub domains: Vec<String>,
    /// Caller-supplied context, keyed by domain name
    #[serde(default)]
    pub context: BTreeMap<String, Vec<ContextDocument>>,
    /// Number of argument turns per debate
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Experts to consult; empty means one expert per requested domain
    #[serde(default)]
    pub expertises: Vec<String>,
    /// Route debate-capable expertises through a debate
    #[serde(default = "default_use_debate")]
    pub use_debate: bool,
    /// Let standard evaluators fetch extra context
    #[serde(default)]
    pub fetch_more_context: bool,
}

impl EvaluationRequest {
    /// Create a request with default settings
    pub fn new(prompt: &str, response: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            response: response.to_string(),
            domains: Vec::new(),
            context: BTreeMap::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            expertises: Vec::new(),
            use_debate: true,
            fetch_more_context: false,
        }
    }

    /// Request debates in the given domains
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Consult the given experts
    pub fn with_expertises<I, S>(mut self, expertises: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expertises = expertises.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of argument turns
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Supply context documents for a domain
    pub fn with_context(mut self, domain: Domain, docs: Vec<ContextDocument>) -> Self {
        self.context.insert(domain.as_str().to_string(), docs);
        self
    }

    /// Check invariants and return the requested domains, parsed and de-duplicated
    /// in request order.
    pub fn validate(&self) -> Result<Vec<Domain>, EvaluationError> {
        if self.max_rounds < 1 {
            return Err(EvaluationError::InvalidRequest(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.use_debate && self.domains.is_empty() {
            return Err(EvaluationError::InvalidRequest(format!(
                "debate mode requires at least one domain (valid domains: {})",
                Domain::valid_names()
            )));
        }

        let mut parsed = Vec::with_capacity(self.domains.len());
        for name in &self.domains {
            let domain: Domain = name.parse()?;
            if !parsed.contains(&domain) {
                parsed.push(domain);
            }
        }
        Ok(parsed)
    }

    /// Caller-supplied context for a domain (empty when none was given)
    pub fn context_for(&self, domain: Domain) -> &[ContextDocument] {
        self.context
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(domain.as_str()))
            .map(|(_, docs)| docs.as_slice())
            .unwrap_or(&[])
    }

    /// Retrieval query used when a domain has no supplied context
    pub fn retrieval_query(&self) -> String {
        format!("{} {}", self.prompt, self.response)
    }

    /// The experts to consult, falling back to the domains' own experts
    pub fn effective_expertises(&self) -> Result<Vec<String>, EvaluationError> {
        if !self.expertises.is_empty() {
            return Ok(self.expertises.clone());
        }
        Ok(self
            .validate()?
            .into_iter()
            .map(|d| d.expertise().to_string())
            .collect())
    }
}
