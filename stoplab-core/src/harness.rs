//! Monte-Carlo harness: repeated shuffled trials over one payoff pool.
//!
//! Each trial draws a fresh permutation of the whole pool from the shuffle
//! generator and evaluates every configured strategy on that same
//! permutation, so strategies are compared on identical orderings. Trials run
//! strictly in order because they share the state of both generators.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pool::PayoffPool;
use crate::rng::TrialRngs;
use crate::strategy::{StoppingDecision, Strategy, StrategyError, StrategyId};

/// Default explore/exploit cutoff (the "37% rule").
pub const DEFAULT_THRESHOLD: f64 = 0.37;

/// Default number of trials.
pub const DEFAULT_RUNS: usize = 1000;

// ─── Configuration ───────────────────────────────────────────────────

/// Parameters shared by every strategy in one harness run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fraction of each permutation observed before committing.
    pub threshold: f64,
    /// Number of trials.
    pub runs: usize,
    /// Master seed; `None` draws both generators from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            runs: DEFAULT_RUNS,
            seed: None,
        }
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// Per-strategy chosen values, each in trial order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCollections(BTreeMap<StrategyId, Vec<f64>>);

impl ResultCollections {
    pub fn get(&self, id: StrategyId) -> Option<&[f64]> {
        self.0.get(&id).map(Vec::as_slice)
    }

    /// Strategy ids present, in canonical report order.
    pub fn ids(&self) -> impl Iterator<Item = StrategyId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StrategyId, &[f64])> {
        self.0.iter().map(|(id, values)| (*id, values.as_slice()))
    }

    /// Every chosen value across all strategies.
    pub fn all_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().flat_map(|values| values.iter().copied())
    }

    /// Number of trials recorded (length of any collection).
    pub fn runs(&self) -> usize {
        self.0.values().next().map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<StrategyId, Vec<f64>>> for ResultCollections {
    fn from(map: BTreeMap<StrategyId, Vec<f64>>) -> Self {
        Self(map)
    }
}

/// A view of one finished trial, handed to [`MonteCarloHarness::run_observed`] observers.
#[derive(Debug)]
pub struct TrialRecord<'a> {
    pub trial: usize,
    pub permutation: &'a [f64],
    pub decisions: &'a [(StrategyId, StoppingDecision)],
}

impl TrialRecord<'_> {
    pub fn decision(&self, id: StrategyId) -> Option<StoppingDecision> {
        self.decisions
            .iter()
            .find(|(strategy, _)| *strategy == id)
            .map(|(_, decision)| *decision)
    }
}

/// Errors from a harness run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("payoff pool is empty")]
    InvalidPool,

    #[error("strategy '{id}' configured more than once")]
    DuplicateStrategy { id: StrategyId },

    #[error("strategy '{id}' failed on trial {trial}: {source}")]
    Strategy {
        id: StrategyId,
        trial: usize,
        #[source]
        source: StrategyError,
    },
}

// ─── Harness ─────────────────────────────────────────────────────────

/// Runs a fixed set of strategies over many shuffles of one pool.
#[derive(Debug, Clone)]
pub struct MonteCarloHarness {
    config: SimulationConfig,
    strategies: Vec<Strategy>,
}

impl MonteCarloHarness {
    pub fn new(config: SimulationConfig, strategies: Vec<Strategy>) -> Self {
        Self { config, strategies }
    }

    /// Threshold rule plus the three baselines, in report order.
    pub fn all_strategies(config: SimulationConfig) -> Self {
        Self::new(
            config,
            vec![
                Strategy::Threshold {
                    threshold: config.threshold,
                },
                Strategy::RandomPick,
                Strategy::AlwaysFirst,
                Strategy::AlwaysLast,
            ],
        )
    }

    /// Random pick, always-first and always-last.
    pub fn baselines(config: SimulationConfig) -> Self {
        Self::new(
            config,
            vec![Strategy::RandomPick, Strategy::AlwaysFirst, Strategy::AlwaysLast],
        )
    }

    /// Only the threshold rule.
    pub fn secretary(config: SimulationConfig) -> Self {
        Self::new(
            config,
            vec![Strategy::Threshold {
                threshold: config.threshold,
            }],
        )
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Run all trials and return one collection per strategy.
    pub fn run(&self, pool: &PayoffPool) -> Result<ResultCollections, HarnessError> {
        self.run_observed(pool, |_| {})
    }

    /// Run all trials, calling `observer` after each one.
    ///
    /// Fails before the first trial when the pool is empty or a strategy id
    /// is configured twice. A strategy failure aborts the run; no partial
    /// collections are returned.
    pub fn run_observed<F>(
        &self,
        pool: &PayoffPool,
        mut observer: F,
    ) -> Result<ResultCollections, HarnessError>
    where
        F: FnMut(&TrialRecord<'_>),
    {
        if pool.is_empty() {
            return Err(HarnessError::InvalidPool);
        }

        let mut collections: BTreeMap<StrategyId, Vec<f64>> = BTreeMap::new();
        for strategy in &self.strategies {
            let id = strategy.id();
            if collections
                .insert(id, Vec::with_capacity(self.config.runs))
                .is_some()
            {
                return Err(HarnessError::DuplicateStrategy { id });
            }
        }

        debug!(
            "harness: {} trials, {} strategies, pool size {}, seed {:?}",
            self.config.runs,
            self.strategies.len(),
            pool.len(),
            self.config.seed
        );

        let mut rngs = TrialRngs::new(self.config.seed);
        let mut decisions = Vec::with_capacity(self.strategies.len());

        for trial in 0..self.config.runs {
            let permutation = pool.shuffled(&mut rngs.shuffle);

            decisions.clear();
            for strategy in &self.strategies {
                let id = strategy.id();
                let decision = strategy
                    .evaluate(&permutation, &mut rngs.choice)
                    .map_err(|source| HarnessError::Strategy { id, trial, source })?;
                decisions.push((id, decision));
            }

            for (id, decision) in &decisions {
                if let Some(values) = collections.get_mut(id) {
                    values.push(decision.value);
                }
            }

            observer(&TrialRecord {
                trial,
                permutation: &permutation,
                decisions: &decisions,
            });
        }

        Ok(ResultCollections(collections))
    }
}
