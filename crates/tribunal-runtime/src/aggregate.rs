//! Statistical reconciliation of expert scores
//!
//! Continuous values from every expert are flattened into one sample set.
//! Discrete verdicts are averaged separately. Failed experts are skipped.

use std::collections::BTreeMap;

use tribunal_core::{AggregatedResult, ContinuousScores, DiscreteVerdict, ExpertEvaluation};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Sample (n-1) standard deviation; `None` below two samples
fn sample_std_dev(samples: &[f64], mean: f64) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let variance =
        samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Combines per-expert evaluations into an [`AggregatedResult`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, experts: &BTreeMap<String, ExpertEvaluation>) -> AggregatedResult {
        let healthy = experts.iter().filter(|(_, e)| !e.is_failed());

        let mut per_expert: BTreeMap<String, ContinuousScores> = BTreeMap::new();
        let mut discrete_per_expert: BTreeMap<String, DiscreteVerdict> = BTreeMap::new();
        let mut samples: Vec<f64> = Vec::new();

        for (name, eval) in healthy {
            samples.extend(eval.continuous_scores.values().copied());
            per_expert.insert(name.clone(), eval.continuous_scores.clone());
            if let Some(verdict) = eval.verdict() {
                discrete_per_expert.insert(name.clone(), verdict);
            }
        }

        samples.sort_by(f64::total_cmp);
        let sample_count = samples.len();

        let (mean, median, min, max, std_dev) = if samples.is_empty() {
            (0.0, 0.0, 0.0, 0.0, None)
        } else {
            let mean = samples.iter().sum::<f64>() / sample_count as f64;
            (
                round2(mean),
                round2(median(&samples)),
                round2(samples[0]),
                round2(samples[sample_count - 1]),
                sample_std_dev(&samples, mean).map(round2),
            )
        };

        let discrete: Vec<f64> = discrete_per_expert
            .values()
            .map(|v| f64::from(v.score))
            .collect();
        let discrete_mean = if discrete.is_empty() {
            None
        } else {
            Some(discrete.iter().sum::<f64>() / discrete.len() as f64)
        };

        tracing::debug!(
            experts = experts.len(),
            samples = sample_count,
            discrete = discrete.len(),
            "scores aggregated"
        );

        AggregatedResult {
            per_expert,
            overall_mean: mean,
            overall_median: median,
            overall_min: min,
            overall_max: max,
            overall_std_dev: std_dev,
            sample_count,
            discrete_per_expert,
            avg_discrete_score: discrete_mean.map(round2),
            overall_discrete_score: discrete_mean.map(|m| m.round_ties_even() as u8),
        }
    }
}
