//! Tribunal demo - evaluate a generated answer from the command line
//!
//! # Usage
//!
//! ```bash
//! # Debate accuracy and safety with the offline mock oracle
//! tribunal --prompt "Is it safe to mix bleach and ammonia?" \
//!          --response "No, it releases toxic gas." -d accuracy -d safety
//!
//! # Use a real provider and pace calls one second apart
//! TRIBUNAL_DEFAULT_PROVIDER=openai OPENAI_API_KEY=sk-... TRIBUNAL_ROUND_DELAY_MS=1000 \
//!     tribunal --request request.json --pretty -v
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use tribunal_adversarial::{CancellationFlag, DiscreteScorer, DomainAgentRegistry};
use tribunal_core::{discrete_label, EvaluationRequest, EvaluationResult, NoContext};
use tribunal_llm::{LlmConfig, LlmProvider};
use tribunal_runtime::{
    DebateOrchestrator, EvaluationCoordinator, LlmStandardEvaluator, TribunalConfig,
};

/// Tribunal - debate-based answer evaluation
#[derive(Parser)]
#[command(
    name = "tribunal",
    version,
    about = "Evaluate a generated answer with proponent/critic debates"
)]
struct Cli {
    /// Read the full evaluation request from a JSON file
    #[arg(long, conflicts_with_all = ["prompt", "response"])]
    request: Option<PathBuf>,

    /// The question that was asked
    #[arg(long, required_unless_present = "request")]
    prompt: Option<String>,

    /// The answer to evaluate
    #[arg(long, required_unless_present = "request")]
    response: Option<String>,

    /// Domain to debate (repeatable)
    #[arg(short, long = "domain", default_values = ["accuracy", "safety"])]
    domains: Vec<String>,

    /// Expertise to report (repeatable); defaults to the domains' experts
    #[arg(short, long = "expertise")]
    expertises: Vec<String>,

    /// Argument turns per debate
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Skip debates and use single-pass evaluations only
    #[arg(long)]
    no_debate: bool,

    /// Oracle provider (mock, ollama, openai, deepseek, mistral)
    #[arg(long, env = "TRIBUNAL_DEFAULT_PROVIDER")]
    provider: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn build_request(cli: &Cli, config: &TribunalConfig) -> Result<EvaluationRequest> {
    if let Some(path) = &cli.request {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading request file {}", path.display()))?;
        let mut value: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing request file {}", path.display()))?;

        // --rounds beats the file, and the file beats TRIBUNAL_MAX_ROUNDS
        if let Some(fields) = value.as_object_mut() {
            match cli.rounds {
                Some(rounds) => {
                    fields.insert("max_rounds".to_string(), rounds.into());
                }
                None => {
                    fields
                        .entry("max_rounds")
                        .or_insert_with(|| config.default_max_rounds.into());
                }
            }
        }
        return serde_json::from_value(value)
            .with_context(|| format!("invalid request in {}", path.display()));
    }

    let prompt = cli.prompt.as_deref().context("--prompt is required")?;
    let response = cli.response.as_deref().context("--response is required")?;

    let mut request = EvaluationRequest::new(prompt, response)
        .with_domains(cli.domains.iter().cloned())
        .with_expertises(cli.expertises.iter().cloned())
        .with_max_rounds(cli.rounds.unwrap_or(config.default_max_rounds));
    request.use_debate = !cli.no_debate;
    Ok(request)
}

fn print_summary(result: &EvaluationResult) {
    eprintln!("{}", "Tribunal verdict".bold());
    for (name, eval) in &result.per_expert {
        match (&eval.error, eval.discrete_score) {
            (Some(err), _) => eprintln!("  {} {}: {}", "✗".red().bold(), name, err),
            (None, Some(score)) => eprintln!(
                "  {} {}: {} ({}), {} rounds",
                "✓".green().bold(),
                name,
                score,
                discrete_label(score),
                eval.rounds_completed
            ),
            (None, None) => eprintln!("  {} {}: no discrete score", "•".yellow(), name),
        }
    }

    let agg = &result.aggregated;
    let overall = agg
        .overall_discrete_score
        .map(|s| format!("{} ({})", s, discrete_label(s)))
        .unwrap_or_else(|| "n/a".to_string());
    eprintln!(
        "  overall: {} | mean {:.2}/10 over {} scores",
        overall.cyan().bold(),
        agg.overall_mean,
        agg.sample_count
    );
    if let Some(err) = &result.consensus_error {
        eprintln!("  {} consensus unavailable: {}", "!".yellow().bold(), err);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let llm_config = LlmConfig::from_env();
    let llm = match &cli.provider {
        Some(name) => llm_config.build(name)?,
        None => llm_config.build_provider()?,
    };
    let config = TribunalConfig::from_env()?;
    tracing::info!(provider = llm.name(), ?config, "configuration loaded");

    let request = build_request(&cli, &config)?;

    let orchestrator = DebateOrchestrator::new(
        DomainAgentRegistry::with_llm(llm.clone()),
        DiscreteScorer::new(llm.clone()),
        Arc::new(NoContext),
        config.pacing(),
        config.orchestrator.clone(),
    );
    let coordinator = EvaluationCoordinator::new(orchestrator, llm.clone())
        .with_standard_evaluator(Arc::new(LlmStandardEvaluator::new(llm)));

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping debates after the current turn");
            on_interrupt.cancel();
        }
    });

    let result = coordinator.evaluate_cancellable(&request, &cancel).await?;

    print_summary(&result);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    Ok(())
}
