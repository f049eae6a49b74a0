//! The payoff pool: the fixed universe of candidate values.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ordered, immutable sequence of payoffs observed (in some order) each trial.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayoffPool(Vec<f64>);

impl PayoffPool {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A fresh random permutation of the pool (Fisher–Yates).
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let mut permutation = self.0.clone();
        permutation.shuffle(rng);
        permutation
    }

    /// Deterministic BLAKE3 hash over the values in pool order.
    ///
    /// Identifies the input data in run manifests; two pools with the same
    /// values in the same order always share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.0.len() as u64).to_le_bytes());
        for value in &self.0 {
            hasher.update(&value.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl From<Vec<f64>> for PayoffPool {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl FromIterator<f64> for PayoffPool {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
