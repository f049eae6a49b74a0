//! Descriptive statistics over result collections.
//!
//! Summaries are derived views: they borrow a collection, compute mean,
//! median and standard deviation, and never mutate the underlying values.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use stoplab_core::{ResultCollections, StoppingDecision, Strategy, StrategyId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("cannot summarize an empty collection")]
    Empty,
}

/// Standard deviation convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDevConvention {
    /// Divide by n - 1; reported as 0 with fewer than 2 observations.
    #[default]
    Sample,
    /// Divide by n.
    Population,
}

/// Mean, median and standard deviation of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl SummaryStats {
    pub fn from_values(values: &[f64], convention: StdDevConvention) -> Result<Self, SummaryError> {
        if values.is_empty() {
            return Err(SummaryError::Empty);
        }
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let sorted = sorted_copy(values);
        let median = percentile_sorted(&sorted, 50.0);

        let sq_dev = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        let std_dev = match convention {
            StdDevConvention::Sample if n < 2 => 0.0,
            StdDevConvention::Sample => (sq_dev / (n - 1) as f64).sqrt(),
            StdDevConvention::Population => (sq_dev / n as f64).sqrt(),
        };

        Ok(Self {
            count: n,
            mean,
            median,
            std_dev,
        })
    }
}

/// Summary of one strategy's collection, with its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub id: StrategyId,
    pub label: String,
    pub stats: SummaryStats,
}

/// Side-by-side summary of every strategy in a comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub entries: Vec<StrategySummary>,
}

impl ComparisonSummary {
    /// Summarize every collection in `results`, in canonical strategy order.
    ///
    /// Labels come from the matching entry of `strategies`; ids without one
    /// fall back to the identifier.
    pub fn from_results(
        results: &ResultCollections,
        strategies: &[Strategy],
        convention: StdDevConvention,
    ) -> Result<Self, SummaryError> {
        let entries = results
            .iter()
            .map(|(id, values)| {
                let label = strategies
                    .iter()
                    .find(|s| s.id() == id)
                    .map(Strategy::label)
                    .unwrap_or_else(|| id.to_string());
                Ok(StrategySummary {
                    id,
                    label,
                    stats: SummaryStats::from_values(values, convention)?,
                })
            })
            .collect::<Result<Vec<_>, SummaryError>>()?;
        Ok(Self { entries })
    }

    /// Strategy with the highest mean payoff; the earliest wins ties.
    pub fn best_by_mean(&self) -> Option<&StrategySummary> {
        self.entries.iter().fold(None, |best: Option<&StrategySummary>, e| match best {
            Some(b) if b.stats.mean >= e.stats.mean => Some(b),
            _ => Some(e),
        })
    }

    /// One line per strategy, then the best-by-mean line.
    pub fn format_text(&self) -> String {
        let mut lines: Vec<String> = self
            .entries
            .iter()
            .map(|e| {
                format!(
                    "{}: mean={:.4}, median={:.4}, stddev={:.4}",
                    e.label, e.stats.mean, e.stats.median, e.stats.std_dev
                )
            })
            .collect();
        if let Some(best) = self.best_by_mean() {
            lines.push(format!("Best by mean payoff: {}", best.label));
        }
        lines.join("\n")
    }
}

/// Summary of a recorded decision file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub payoff: SummaryStats,
    /// Mean stop index over decisions that carry one.
    pub mean_stop_index: Option<f64>,
}

impl DecisionSummary {
    pub fn from_decisions(
        decisions: &[StoppingDecision],
        convention: StdDevConvention,
    ) -> Result<Self, SummaryError> {
        let payoffs: Vec<f64> = decisions.iter().map(|d| d.value).collect();
        let payoff = SummaryStats::from_values(&payoffs, convention)?;

        let indices: Vec<f64> = decisions
            .iter()
            .filter_map(|d| d.index)
            .map(|i| i as f64)
            .collect();
        let mean_stop_index =
            (!indices.is_empty()).then(|| indices.iter().sum::<f64>() / indices.len() as f64);

        Ok(Self {
            payoff,
            mean_stop_index,
        })
    }

    pub fn format_text(&self) -> String {
        let mut lines = vec![
            format!("Runs: {}", self.payoff.count),
            format!("Mean payoff: {:.4}", self.payoff.mean),
            format!("Median payoff: {:.4}", self.payoff.median),
            format!("Std dev: {:.4}", self.payoff.std_dev),
        ];
        if let Some(idx) = self.mean_stop_index {
            lines.push(format!("Mean stop index: {idx:.2}"));
        }
        lines.join("\n")
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Percentile of a sorted slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}
