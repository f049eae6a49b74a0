//! Stopping strategies: the threshold (secretary) rule and three baselines.
//!
//! Every strategy is a variant of the closed [`Strategy`] enum and is applied
//! through a single [`Strategy::evaluate`] call. Only the threshold rule has
//! real algorithmic content: a single linear scan, O(n) time, O(1) extra
//! space, deterministic for a given sequence and threshold. The baselines
//! exist as comparison anchors.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while evaluating a strategy on one sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("cannot evaluate a strategy on an empty sequence")]
    EmptySequence,

    #[error(
        "threshold {threshold} explores no elements of a sequence of length {length} \
         (need floor(length * threshold) >= 1)"
    )]
    EmptyExploration { length: usize, threshold: f64 },

    #[error("threshold must lie strictly between 0 and 1, got {threshold}")]
    ThresholdOutOfRange { threshold: f64 },
}

/// The value a strategy committed to, and where the threshold rule stopped.
///
/// `index` is `Some` only for the threshold rule. Baselines have no stop
/// index semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingDecision {
    pub value: f64,
    pub index: Option<usize>,
}

impl StoppingDecision {
    pub fn stopped(value: f64, index: usize) -> Self {
        Self {
            value,
            index: Some(index),
        }
    }

    pub fn picked(value: f64) -> Self {
        Self { value, index: None }
    }
}

/// Stable identifier for a strategy; also the key of a result collection.
///
/// Declaration order is the canonical report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    Secretary,
    Random,
    First,
    Last,
}

impl StrategyId {
    pub const ALL: [StrategyId; 4] = [
        StrategyId::Secretary,
        StrategyId::Random,
        StrategyId::First,
        StrategyId::Last,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::Secretary => "secretary",
            StrategyId::Random => "random",
            StrategyId::First => "first",
            StrategyId::Last => "last",
        }
    }

    /// Chart colour as a `#rrggbb` hex string.
    pub fn color(self) -> &'static str {
        match self {
            StrategyId::Secretary => "#264653",
            StrategyId::Random => "#f4a261",
            StrategyId::First => "#2a9d8f",
            StrategyId::Last => "#e76f51",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secretary" => Ok(StrategyId::Secretary),
            "random" => Ok(StrategyId::Random),
            "first" => Ok(StrategyId::First),
            "last" => Ok(StrategyId::Last),
            other => Err(format!(
                "unknown strategy '{other}'. Valid: secretary, random, first, last"
            )),
        }
    }
}

/// A decision rule applied to one ordered sequence of payoffs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// Observe the first `floor(n * threshold)` values, then take the first
    /// value that beats all of them (or the last value if none does).
    Threshold { threshold: f64 },
    /// Uniformly random index, drawn from the dedicated choice RNG.
    RandomPick,
    /// Always take the first value.
    AlwaysFirst,
    /// Always take the last value.
    AlwaysLast,
}

impl Strategy {
    pub fn id(&self) -> StrategyId {
        match self {
            Strategy::Threshold { .. } => StrategyId::Secretary,
            Strategy::RandomPick => StrategyId::Random,
            Strategy::AlwaysFirst => StrategyId::First,
            Strategy::AlwaysLast => StrategyId::Last,
        }
    }

    /// Human-readable label used in summaries and chart legends.
    pub fn label(&self) -> String {
        match self {
            Strategy::Threshold { threshold } => {
                format!("{}% rule", (threshold * 100.0).round() as i64)
            }
            Strategy::RandomPick => "Random choice".to_string(),
            Strategy::AlwaysFirst => "Always first".to_string(),
            Strategy::AlwaysLast => "Always last".to_string(),
        }
    }

    /// Apply this strategy to `sequence`.
    ///
    /// `choice_rng` is only consumed by [`Strategy::RandomPick`].
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        sequence: &[f64],
        choice_rng: &mut R,
    ) -> Result<StoppingDecision, StrategyError> {
        let (&first, &last) = match (sequence.first(), sequence.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(StrategyError::EmptySequence),
        };

        match *self {
            Strategy::Threshold { threshold } => threshold_rule(sequence, threshold),
            Strategy::RandomPick => {
                let idx = choice_rng.gen_range(0..sequence.len());
                Ok(StoppingDecision::picked(sequence[idx]))
            }
            Strategy::AlwaysFirst => Ok(StoppingDecision::picked(first)),
            Strategy::AlwaysLast => Ok(StoppingDecision::picked(last)),
        }
    }
}

/// Number of leading values the threshold rule observes without committing.
pub fn explore_count(length: usize, threshold: f64) -> usize {
    (length as f64 * threshold).floor() as usize
}

/// The classical explore-then-commit rule.
///
/// Returns the first value after the exploration prefix that is strictly
/// greater than the prefix maximum, paired with its index. Falls back to the
/// last value (index `len - 1`) when nothing beats the prefix.
///
/// `threshold` must lie in `(0, 1)`, so the stop index is never inside the
/// exploration prefix.
pub fn threshold_rule(sequence: &[f64], threshold: f64) -> Result<StoppingDecision, StrategyError> {
    let (&last, _) = sequence
        .split_last()
        .ok_or(StrategyError::EmptySequence)?;
    let length = sequence.len();

    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(StrategyError::ThresholdOutOfRange { threshold });
    }
    // `length * threshold` can round up to `length` for thresholds just below 1.
    let explore = explore_count(length, threshold).min(length - 1);
    if explore == 0 {
        return Err(StrategyError::EmptyExploration { length, threshold });
    }

    let max_explored = sequence[..explore]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let decision = sequence[explore..]
        .iter()
        .position(|&v| v > max_explored)
        .map(|offset| StoppingDecision::stopped(sequence[explore + offset], explore + offset))
        .unwrap_or_else(|| StoppingDecision::stopped(last, length - 1));

    Ok(decision)
}
