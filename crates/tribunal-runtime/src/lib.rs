//! # Tribunal Runtime
//!
//! Tokio-based orchestration of domain debates and evaluation coordination.
//!
//! - [`DebateOrchestrator`] runs one debate per domain, concurrently and
//!   with per-domain failure isolation
//! - [`ScoreAggregator`] reconciles continuous and discrete scores
//! - [`EvaluationCoordinator`] routes expertises, aggregates and writes the
//!   consensus report
//!
//! ```rust
//! use std::sync::Arc;
//! use tribunal_core::EvaluationRequest;
//! use tribunal_llm::MockProvider;
//! use tribunal_runtime::EvaluationCoordinator;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let coordinator = EvaluationCoordinator::with_llm(Arc::new(MockProvider::smart()));
//! let request = EvaluationRequest::new("Is 17 prime?", "Yes, 17 is prime.")
//!     .with_domains(["accuracy", "clarity"]);
//!
//! let result = coordinator.evaluate(&request).await.unwrap();
//! assert_eq!(result.per_expert.len(), 2);
//! assert_eq!(result.aggregated.overall_discrete_score, Some(3));
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod orchestrator;
pub mod standard;

pub use aggregate::{round2, ScoreAggregator};
pub use config::{OrchestratorConfig, TribunalConfig};
pub use coordinator::{EvaluationCoordinator, EVALUATIONS_METRIC};
pub use orchestrator::{DebateOrchestrator, DebateOutcome};
pub use standard::{LlmStandardEvaluator, StandardEvaluator};
