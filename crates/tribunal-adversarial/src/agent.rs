//! Proponent and critic agents
//!
//! Every domain debates with its own [`AgentPair`]. Pairs are looked up in
//! a [`DomainAgentRegistry`] handed to the orchestrator at construction, so
//! tests can swap in scripted or failing agents per domain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tribunal_core::{render_context, render_history, ArgumentTurn, ContextDocument, Domain};
use tribunal_llm::{LlmError, LlmProvider, LlmRequest};

/// Side an agent argues for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Defends the answer's merits
    Proponent,
    /// Attacks the answer's weaknesses
    Critic,
}

impl AgentRole {
    /// The other side
    pub fn opponent(&self) -> Self {
        match self {
            Self::Proponent => Self::Critic,
            Self::Critic => Self::Proponent,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proponent => write!(f, "proponent"),
            Self::Critic => write!(f, "critic"),
        }
    }
}

/// Everything an agent needs to know about the answer under review
#[derive(Debug, Clone)]
pub struct DebateBrief {
    pub domain: Domain,
    pub prompt: String,
    pub response: String,
    pub context: Vec<ContextDocument>,
}

/// One side of a domain debate
#[async_trait]
pub trait DebateAgent: Send + Sync + fmt::Debug {
    /// Which side this agent argues
    fn role(&self) -> AgentRole;

    /// Domain this agent specialises in
    fn domain(&self) -> Domain;

    /// Opening argument from the brief alone
    async fn present_argument(&self, brief: &DebateBrief) -> Result<String, LlmError>;

    /// Rebuttal addressing the entire history so far
    async fn present_counter_argument(
        &self,
        brief: &DebateBrief,
        history: &[ArgumentTurn],
    ) -> Result<String, LlmError>;

    /// Closing synthesis of both sides, ending in a 0-10 score
    async fn summarize(
        &self,
        brief: &DebateBrief,
        history: &[ArgumentTurn],
    ) -> Result<String, LlmError>;
}

/// Configuration for an oracle-backed agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Human-readable name, e.g. "legality_critic"
    pub name: String,
    /// Persona sent as the system prompt
    pub persona: String,
    /// Sampling temperature for arguments
    pub temperature: f32,
}

impl AgentConfig {
    /// Default persona for a side of a domain debate
    pub fn for_role(domain: Domain, role: AgentRole) -> Self {
        let persona = match role {
            AgentRole::Proponent => format!(
                "You are the proponent in a structured review of an AI-generated answer. \
                 Your speciality is {domain}: {}. Argue for the answer's strengths, \
                 concede only what the evidence forces you to, and stay specific.",
                domain.focus()
            ),
            AgentRole::Critic => format!(
                "You are the critic in a structured review of an AI-generated answer. \
                 Your speciality is {domain}: {}. Find concrete flaws, omissions and \
                 risks, and press on the weakest points of the other side's case.",
                domain.focus()
            ),
        };
        Self {
            name: format!("{}_{}", domain, role),
            persona,
            temperature: 0.7,
        }
    }
}

/// Agent that argues by prompting an oracle
#[derive(Debug, Clone)]
pub struct LlmDebateAgent {
    pub config: AgentConfig,
    role: AgentRole,
    domain: Domain,
    llm: Arc<dyn LlmProvider>,
}

impl LlmDebateAgent {
    /// Create an agent with the default persona for its role
    pub fn new(domain: Domain, role: AgentRole, llm: Arc<dyn LlmProvider>) -> Self {
        Self::with_config(domain, role, llm, AgentConfig::for_role(domain, role))
    }

    /// Create an agent with a custom configuration
    pub fn with_config(
        domain: Domain,
        role: AgentRole,
        llm: Arc<dyn LlmProvider>,
        config: AgentConfig,
    ) -> Self {
        Self {
            config,
            role,
            domain,
            llm,
        }
    }

    fn header(brief: &DebateBrief) -> String {
        format!(
            "Question:\n{}\n\nAnswer under review:\n{}\n\nSupporting context:\n{}",
            brief.prompt.trim(),
            brief.response.trim(),
            render_context(&brief.context)
        )
    }

    /// Prompt for the opening argument
    pub fn opening_prompt(&self, brief: &DebateBrief) -> String {
        format!(
            "OPENING ARGUMENT ({} review)\n\n{}\n\n\
             Present your opening argument on {}. Ground each claim in the question, \
             the answer or the supporting context.",
            self.domain,
            Self::header(brief),
            self.domain.focus()
        )
    }

    /// Prompt for a rebuttal over the full history
    pub fn rebuttal_prompt(&self, brief: &DebateBrief, history: &[ArgumentTurn]) -> String {
        let round = history.len() + 1;
        format!(
            "REBUTTAL (round {round}, {} review)\n\n{}\n\nDebate so far:\n{}\n\n\
             As the {}, respond to the {}'s latest point while taking the entire debate \
             into account. Do not repeat earlier arguments unless you strengthen them.",
            self.domain,
            Self::header(brief),
            render_history(history),
            self.role,
            self.role.opponent()
        )
    }

    /// Prompt for the closing summary
    pub fn summary_prompt(&self, brief: &DebateBrief, history: &[ArgumentTurn]) -> String {
        format!(
            "CLOSING SUMMARY ({} review)\n\n{}\n\nFull debate:\n{}\n\n\
             Write the closing summary of this debate. You must:\n\
             1. Synthesize the strongest points made by both sides\n\
             2. State clearly where the sides agree and where they disagree\n\
             3. End with a line of the form 'Overall Score: X/10' rating the answer on {}",
            self.domain,
            Self::header(brief),
            render_history(history),
            self.domain.focus()
        )
    }

    async fn call(&self, prompt: String) -> Result<String, LlmError> {
        let request =
            LlmRequest::with_role(&self.config.persona, &prompt).temperature(self.config.temperature);
        let response = self.llm.complete(request).await?;
        tracing::debug!(
            agent = %self.config.name,
            model = %response.model,
            latency_ms = response.latency_ms,
            "agent spoke"
        );
        Ok(response.content)
    }
}

#[async_trait]
impl DebateAgent for LlmDebateAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    fn domain(&self) -> Domain {
        self.domain
    }

    async fn present_argument(&self, brief: &DebateBrief) -> Result<String, LlmError> {
        self.call(self.opening_prompt(brief)).await
    }

    async fn present_counter_argument(
        &self,
        brief: &DebateBrief,
        history: &[ArgumentTurn],
    ) -> Result<String, LlmError> {
        self.call(self.rebuttal_prompt(brief, history)).await
    }

    async fn summarize(
        &self,
        brief: &DebateBrief,
        history: &[ArgumentTurn],
    ) -> Result<String, LlmError> {
        self.call(self.summary_prompt(brief, history)).await
    }
}

/// The two sides of one domain's debate
#[derive(Debug, Clone)]
pub struct AgentPair {
    pub proponent: Arc<dyn DebateAgent>,
    pub critic: Arc<dyn DebateAgent>,
}

impl AgentPair {
    /// Pair two existing agents
    pub fn new(proponent: Arc<dyn DebateAgent>, critic: Arc<dyn DebateAgent>) -> Self {
        Self { proponent, critic }
    }

    /// Oracle-backed pair with default personas
    pub fn from_llm(domain: Domain, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            proponent: Arc::new(LlmDebateAgent::new(domain, AgentRole::Proponent, llm.clone())),
            critic: Arc::new(LlmDebateAgent::new(domain, AgentRole::Critic, llm)),
        }
    }
}

/// Domain → agent pair lookup
#[derive(Debug, Clone, Default)]
pub struct DomainAgentRegistry {
    pairs: BTreeMap<Domain, AgentPair>,
}

impl DomainAgentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with an oracle-backed pair for every supported domain
    pub fn with_llm(llm: Arc<dyn LlmProvider>) -> Self {
        let mut registry = Self::new();
        for domain in Domain::ALL {
            registry.register(domain, AgentPair::from_llm(domain, llm.clone()));
        }
        registry
    }

    /// Register (or replace) the pair for a domain
    pub fn register(&mut self, domain: Domain, pair: AgentPair) -> &mut Self {
        self.pairs.insert(domain, pair);
        self
    }

    /// The pair for a domain
    pub fn get(&self, domain: Domain) -> Option<&AgentPair> {
        self.pairs.get(&domain)
    }

    /// Domains with a registered pair
    pub fn domains(&self) -> Vec<Domain> {
        self.pairs.keys().copied().collect()
    }
}
