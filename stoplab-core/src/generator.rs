//! Synthetic payoff generation.
//!
//! Produces the payoff pool for an experiment from a simple parametric
//! distribution. Output is deterministic for a given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distribution payoffs are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayoffDistribution {
    /// Uniform: U(low, high)
    Uniform { low: f64, high: f64 },
    /// Normal: N(mean, std_dev)
    Normal { mean: f64, std_dev: f64 },
}

impl Default for PayoffDistribution {
    fn default() -> Self {
        Self::Uniform {
            low: 0.0,
            high: 100.0,
        }
    }
}

impl PayoffDistribution {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        match *self {
            Self::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() {
                    return Err(GeneratorError::NonFinite);
                }
                if low >= high {
                    return Err(GeneratorError::EmptyRange { low, high });
                }
                if !(high - low).is_finite() {
                    return Err(GeneratorError::RangeOverflow { low, high });
                }
            }
            Self::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() {
                    return Err(GeneratorError::NonFinite);
                }
                if std_dev <= 0.0 {
                    return Err(GeneratorError::NonPositiveStdDev { std_dev });
                }
            }
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Uniform { low, high } => rng.gen_range(low..high),
            Self::Normal { mean, std_dev } => {
                // Box-Muller; u1 in (0, 1] keeps ln finite
                let u1: f64 = 1.0 - rng.gen::<f64>();
                let u2: f64 = rng.gen();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
                mean + std_dev * z
            }
        }
    }
}

/// Errors from payoff generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    #[error("payoff count must be at least 1")]
    ZeroCount,

    #[error("uniform range is empty: low {low} >= high {high}")]
    EmptyRange { low: f64, high: f64 },

    #[error("uniform range [{low}, {high}) is too wide to sample")]
    RangeOverflow { low: f64, high: f64 },

    #[error("normal std_dev must be positive, got {std_dev}")]
    NonPositiveStdDev { std_dev: f64 },

    #[error("distribution parameters must be finite")]
    NonFinite,
}

/// Draw `count` payoffs from `distribution`.
///
/// A `Some` seed makes the output reproducible; `None` seeds from OS entropy.
pub fn generate_payoffs(
    count: usize,
    distribution: &PayoffDistribution,
    seed: Option<u64>,
) -> Result<Vec<f64>, GeneratorError> {
    if count == 0 {
        return Err(GeneratorError::ZeroCount);
    }
    distribution.validate()?;

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    Ok((0..count).map(|_| distribution.sample(&mut rng)).collect())
}
