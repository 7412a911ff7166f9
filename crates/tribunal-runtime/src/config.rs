//! Runtime configuration
//!
//! Environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `TRIBUNAL_MAX_ROUNDS` | 3 | argument turns per debate when a request does not say |
//! | `TRIBUNAL_ROUND_DELAY_MS` | 0 | pause before every oracle call after a debate's first |
//! | `TRIBUNAL_PARALLEL` | true | debate domains concurrently |
//! | `TRIBUNAL_MAX_CONCURRENCY` | unset | cap on concurrent debates |

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tribunal_core::DEFAULT_MAX_ROUNDS;
use tribunal_llm::{ConfigError, FixedDelay, NoPacing, PacingPolicy};

/// How the orchestrator schedules domain debates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Run domains concurrently (false: one after the other)
    pub parallel: bool,
    /// Upper bound on concurrent debates; `None` means one per domain
    pub max_concurrency: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_concurrency: None,
        }
    }
}

impl OrchestratorConfig {
    /// Semaphore permits for `domains` concurrent debates
    pub fn permits(&self, domains: usize) -> usize {
        if !self.parallel {
            return 1;
        }
        self.max_concurrency
            .unwrap_or(domains)
            .min(domains)
            .max(1)
    }
}

/// Top-level configuration for an evaluation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TribunalConfig {
    /// Argument turns used when a request does not specify them
    pub default_max_rounds: u32,
    /// Delay between consecutive oracle calls within a debate
    pub round_delay_ms: u64,
    /// Debate scheduling
    pub orchestrator: OrchestratorConfig,
}

impl Default for TribunalConfig {
    fn default() -> Self {
        Self {
            default_max_rounds: DEFAULT_MAX_ROUNDS,
            round_delay_ms: 0,
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{key}={raw:?} is not a valid value"))),
        Err(_) => Ok(None),
    }
}

impl TribunalConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_max_rounds =
            parse_var::<u32>("TRIBUNAL_MAX_ROUNDS")?.unwrap_or(defaults.default_max_rounds);
        if default_max_rounds == 0 {
            return Err(ConfigError::Invalid(
                "TRIBUNAL_MAX_ROUNDS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            default_max_rounds,
            round_delay_ms: parse_var("TRIBUNAL_ROUND_DELAY_MS")?
                .unwrap_or(defaults.round_delay_ms),
            orchestrator: OrchestratorConfig {
                parallel: parse_var("TRIBUNAL_PARALLEL")?
                    .unwrap_or(defaults.orchestrator.parallel),
                max_concurrency: parse_var::<usize>("TRIBUNAL_MAX_CONCURRENCY")?
                    .filter(|n| *n > 0),
            },
        })
    }

    /// Pacing policy implied by `round_delay_ms`
    pub fn pacing(&self) -> Arc<dyn PacingPolicy> {
        if self.round_delay_ms == 0 {
            Arc::new(NoPacing)
        } else {
            Arc::new(FixedDelay::new(Duration::from_millis(self.round_delay_ms)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TribunalConfig::default();
        assert_eq!(config.default_max_rounds, 3);
        assert!(config.orchestrator.parallel);
        assert_eq!(format!("{:?}", config.pacing()), "NoPacing");
    }

    #[test]
    fn test_permits() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.permits(3), 3);
        assert_eq!(config.permits(0), 1);

        let capped = OrchestratorConfig {
            parallel: true,
            max_concurrency: Some(2),
        };
        assert_eq!(capped.permits(5), 2);
        assert_eq!(capped.permits(1), 1);

        let sequential = OrchestratorConfig {
            parallel: false,
            max_concurrency: Some(8),
        };
        assert_eq!(sequential.permits(5), 1);
    }

    #[test]
    fn test_delay_builds_fixed_pacing() {
        let config = TribunalConfig {
            round_delay_ms: 250,
            ..Default::default()
        };
        assert!(format!("{:?}", config.pacing()).contains("FixedDelay"));
    }
}
