//! StopLab Core — payoff pools, stopping strategies, and the Monte-Carlo harness.
//!
//! This crate contains the simulation engine for the secretary problem:
//! - Payoff pool with a content fingerprint
//! - Threshold (secretary) rule plus three baseline strategies
//! - Independent shuffle/choice RNG pair
//! - Monte-Carlo harness producing per-strategy result collections
//! - Synthetic payoff generator

pub mod generator;
pub mod harness;
pub mod pool;
pub mod rng;
pub mod strategy;

pub use generator::{generate_payoffs, GeneratorError, PayoffDistribution};
pub use harness::{
    HarnessError, MonteCarloHarness, ResultCollections, SimulationConfig, TrialRecord,
    DEFAULT_RUNS, DEFAULT_THRESHOLD,
};
pub use pool::PayoffPool;
pub use rng::TrialRngs;
pub use strategy::{
    explore_count, threshold_rule, StoppingDecision, Strategy, StrategyError, StrategyId,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public value types stay Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PayoffPool>();
        require_sync::<PayoffPool>();
        require_send::<Strategy>();
        require_sync::<Strategy>();
        require_send::<StoppingDecision>();
        require_sync::<StoppingDecision>();
        require_send::<SimulationConfig>();
        require_sync::<SimulationConfig>();
        require_send::<ResultCollections>();
        require_sync::<ResultCollections>();
        require_send::<MonteCarloHarness>();
        require_sync::<MonteCarloHarness>();
        require_send::<TrialRngs>();
        require_sync::<TrialRngs>();
        require_send::<PayoffDistribution>();
        require_sync::<PayoffDistribution>();
    }

    #[test]
    fn error_types_are_std_errors() {
        fn require_error<E: std::error::Error + Send + Sync + 'static>() {}
        require_error::<StrategyError>();
        require_error::<HarnessError>();
        require_error::<GeneratorError>();
    }
}
