//! StopLab Runner — experiment plumbing around `stoplab-core`.
//!
//! This crate provides:
//! - TOML experiment configuration with validation
//! - CSV loading of payoff pools and recorded decisions
//! - Summary statistics and the comparison report
//! - CSV and JSON manifest export
//! - SVG histograms and the strategy comparison figure

pub mod config;
pub mod data_loader;
pub mod export;
pub mod plot;
pub mod summary;

pub use config::{
    ConfigError, ExperimentConfig, GeneratorConfig, HistogramConfig, DEFAULT_BINS,
    DEFAULT_PAYOFF_COUNT,
};
pub use data_loader::{load_decisions, load_payoffs, LoadError};
pub use export::{RunManifest, SCHEMA_VERSION};
pub use plot::{
    box_summary, plot_comparison, plot_payoff_histogram, plot_strategy_histograms, PlotError,
};
pub use summary::{
    ComparisonSummary, DecisionSummary, StdDevConvention, StrategySummary, SummaryError,
    SummaryStats,
};
