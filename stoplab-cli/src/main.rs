//! StopLab CLI — secretary-problem experiments from the command line.
//!
//! Commands:
//! - `generate` — draw a synthetic payoff pool and write it as CSV
//! - `simulate` — apply the threshold rule to a pool and record decisions
//! - `analyze` — summarize a decision file
//! - `visualize` — histogram of the payoffs in a decision file
//! - `baselines` — per-baseline histograms over many shuffles
//! - `compare` — run every strategy and write the comparison report
//!
//! Every command accepts `--config <file.toml>`; explicit flags override
//! values from the file. Set `RUST_LOG=debug` for progress logging.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use stoplab_core::{
    generate_payoffs, threshold_rule, MonteCarloHarness, PayoffDistribution, PayoffPool,
    StrategyId,
};
use stoplab_runner::export::{
    write_decisions_csv, write_manifest, write_payoffs_csv, write_results_csv, write_text,
};
use stoplab_runner::{
    load_decisions, load_payoffs, plot_comparison, plot_payoff_histogram,
    plot_strategy_histograms, ComparisonSummary, DecisionSummary, ExperimentConfig, RunManifest,
    StdDevConvention,
};

#[derive(Parser)]
#[command(
    name = "stoplab",
    about = "StopLab CLI — optimal stopping strategy simulations"
)]
struct Cli {
    /// Path to a TOML experiment config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic payoff pool.
    Generate {
        /// Number of payoffs. Defaults to 100.
        #[arg(long)]
        count: Option<usize>,

        /// Seed for reproducible output.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum)]
        distribution: Option<DistributionKind>,

        /// Uniform lower bound.
        #[arg(long)]
        low: Option<f64>,

        /// Uniform upper bound (exclusive).
        #[arg(long)]
        high: Option<f64>,

        /// Normal mean.
        #[arg(long)]
        mean: Option<f64>,

        /// Normal standard deviation.
        #[arg(long)]
        std_dev: Option<f64>,

        #[arg(long, default_value = "payoffs.csv")]
        output: PathBuf,
    },
    /// Apply the threshold rule once in input order, or over `--runs` shuffles.
    Simulate {
        /// Payoff CSV.
        #[arg(long)]
        input: PathBuf,

        #[arg(long, default_value = "decisions.csv")]
        output: PathBuf,

        #[command(flatten)]
        sim: SimArgs,
    },
    /// Summarize a decision CSV.
    Analyze {
        /// Decision CSV written by `simulate`.
        #[arg(long)]
        input: PathBuf,

        /// Write the summary here instead of only printing it.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render the payoff histogram of a decision CSV.
    Visualize {
        /// Decision CSV written by `simulate`.
        #[arg(long)]
        input: PathBuf,

        #[arg(long, default_value = "payoff_hist.svg")]
        output: PathBuf,

        #[command(flatten)]
        hist: HistArgs,
    },
    /// Histogram each baseline strategy over many shuffles.
    Baselines {
        /// Payoff CSV.
        #[arg(long)]
        input: PathBuf,

        #[arg(long, default_value = "baselines")]
        output_dir: PathBuf,

        #[command(flatten)]
        sim: SimArgs,

        #[command(flatten)]
        hist: HistArgs,
    },
    /// Run all strategies and write the comparison figure and summary.
    Compare {
        /// Payoff CSV.
        #[arg(long)]
        input: PathBuf,

        #[arg(long, default_value = "comparison.svg")]
        output: PathBuf,

        /// Summary text file. Printed to stdout when omitted.
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Per-trial results CSV.
        #[arg(long)]
        results: Option<PathBuf>,

        /// JSON run manifest.
        #[arg(long)]
        manifest: Option<PathBuf>,

        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DistributionKind {
    Uniform,
    Normal,
}

#[derive(Args, Debug, Default)]
struct SimArgs {
    /// Exploration fraction in (0, 1). Defaults to 0.37.
    #[arg(long)]
    threshold: Option<f64>,

    /// Number of shuffled trials. Defaults to 1000.
    #[arg(long)]
    runs: Option<usize>,

    /// Master seed for the shuffle and choice generators.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Default)]
struct HistArgs {
    /// Histogram bins. Defaults to 20.
    #[arg(long)]
    bins: Option<usize>,

    #[arg(long)]
    range_min: Option<f64>,

    #[arg(long)]
    range_max: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            count,
            seed,
            distribution,
            low,
            high,
            mean,
            std_dev,
            output,
        } => {
            let params = DistributionArgs {
                kind: distribution,
                low,
                high,
                mean,
                std_dev,
            };
            run_generate(config, count, seed, &params, &output)
        }
        Commands::Simulate { input, output, sim } => run_simulate(config, &input, &output, &sim),
        Commands::Analyze { input, output } => run_analyze(&input, output.as_deref()),
        Commands::Visualize {
            input,
            output,
            hist,
        } => run_visualize(config, &input, &output, &hist),
        Commands::Baselines {
            input,
            output_dir,
            sim,
            hist,
        } => run_baselines(config, &input, &output_dir, &sim, &hist),
        Commands::Compare {
            input,
            output,
            summary,
            results,
            manifest,
            sim,
        } => {
            let outputs = CompareOutputs {
                figure: output,
                summary,
                results,
                manifest,
            };
            run_compare(config, &input, &outputs, &sim)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ExperimentConfig> {
    match path {
        Some(p) => ExperimentConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(ExperimentConfig::default()),
    }
}

/// Layer explicit flags over the config file and re-validate.
fn apply_overrides(
    mut config: ExperimentConfig,
    sim: &SimArgs,
    hist: &HistArgs,
) -> Result<ExperimentConfig> {
    if let Some(t) = sim.threshold {
        config.simulation.threshold = t;
    }
    if let Some(r) = sim.runs {
        config.simulation.runs = r;
    }
    if sim.seed.is_some() {
        config.simulation.seed = sim.seed;
    }
    if let Some(b) = hist.bins {
        config.histogram.bins = b;
    }
    if hist.range_min.is_some() {
        config.histogram.range_min = hist.range_min;
    }
    if hist.range_max.is_some() {
        config.histogram.range_max = hist.range_max;
    }
    config.validate()?;
    Ok(config)
}

fn load_pool(path: &Path) -> Result<PayoffPool> {
    let pool = load_payoffs(path)?;
    if pool.is_empty() {
        bail!("no payoffs found in {}", path.display());
    }
    info!("loaded {} payoffs from {}", pool.len(), path.display());
    Ok(pool)
}

// ─── generate ───────────────────────────────────────────────────────

struct DistributionArgs {
    kind: Option<DistributionKind>,
    low: Option<f64>,
    high: Option<f64>,
    mean: Option<f64>,
    std_dev: Option<f64>,
}

/// Resolve the generator distribution: flags override the config, and a
/// switched distribution kind starts from that kind's defaults.
fn resolve_distribution(
    base: PayoffDistribution,
    args: &DistributionArgs,
) -> Result<PayoffDistribution> {
    let base_kind = match base {
        PayoffDistribution::Uniform { .. } => DistributionKind::Uniform,
        PayoffDistribution::Normal { .. } => DistributionKind::Normal,
    };
    let kind = args.kind.unwrap_or(base_kind);

    match kind {
        DistributionKind::Uniform => {
            if args.mean.is_some() || args.std_dev.is_some() {
                bail!("--mean/--std-dev only apply to --distribution normal");
            }
            let (low, high) = match base {
                PayoffDistribution::Uniform { low, high } => (low, high),
                PayoffDistribution::Normal { .. } => (0.0, 100.0),
            };
            Ok(PayoffDistribution::Uniform {
                low: args.low.unwrap_or(low),
                high: args.high.unwrap_or(high),
            })
        }
        DistributionKind::Normal => {
            if args.low.is_some() || args.high.is_some() {
                bail!("--low/--high only apply to --distribution uniform");
            }
            let (mean, std_dev) = match base {
                PayoffDistribution::Normal { mean, std_dev } => (mean, std_dev),
                PayoffDistribution::Uniform { .. } => (50.0, 15.0),
            };
            Ok(PayoffDistribution::Normal {
                mean: args.mean.unwrap_or(mean),
                std_dev: args.std_dev.unwrap_or(std_dev),
            })
        }
    }
}

fn run_generate(
    config: ExperimentConfig,
    count: Option<usize>,
    seed: Option<u64>,
    params: &DistributionArgs,
    output: &Path,
) -> Result<()> {
    let count = count.unwrap_or(config.generator.count);
    let seed = seed.or(config.generator.seed);
    let distribution = resolve_distribution(config.generator.distribution, params)?;

    let payoffs = generate_payoffs(count, &distribution, seed)?;
    write_payoffs_csv(output, &payoffs)?;
    println!("Wrote {count} payoffs to {}", output.display());
    Ok(())
}

// ─── simulate / analyze / visualize ─────────────────────────────────

fn run_simulate(config: ExperimentConfig, input: &Path, output: &Path, sim: &SimArgs) -> Result<()> {
    let config = apply_overrides(config, sim, &HistArgs::default())?;
    let pool = load_pool(input)?;

    let decisions = if sim.runs.is_none() {
        let decision = threshold_rule(pool.values(), config.simulation.threshold)?;
        match decision.index {
            Some(idx) => println!("Stopped at index {idx} with payoff {}", decision.value),
            None => println!("Picked payoff {}", decision.value),
        }
        vec![decision]
    } else {
        let mut decisions = Vec::with_capacity(config.simulation.runs);
        MonteCarloHarness::secretary(config.simulation).run_observed(&pool, |trial| {
            if let Some(d) = trial.decision(StrategyId::Secretary) {
                decisions.push(d);
            }
        })?;
        println!("Recorded {} decisions", decisions.len());
        decisions
    };

    write_decisions_csv(output, &decisions)?;
    println!("Decisions written to: {}", output.display());
    Ok(())
}

fn run_analyze(input: &Path, output: Option<&Path>) -> Result<()> {
    let decisions = load_decisions(input)?;
    if decisions.is_empty() {
        bail!("no decisions found in {}", input.display());
    }
    let summary = DecisionSummary::from_decisions(&decisions, StdDevConvention::Sample)?;
    let text = summary.format_text();
    println!("{text}");
    if let Some(path) = output {
        write_text(path, &text)?;
    }
    Ok(())
}

fn run_visualize(config: ExperimentConfig, input: &Path, output: &Path, hist: &HistArgs) -> Result<()> {
    let config = apply_overrides(config, &SimArgs::default(), hist)?;
    let decisions = load_decisions(input)?;
    if decisions.is_empty() {
        bail!("no decisions found in {}", input.display());
    }
    let payoffs: Vec<f64> = decisions.iter().map(|d| d.value).collect();
    plot_payoff_histogram(output, &payoffs, &config.histogram)?;
    println!("Histogram saved to: {}", output.display());
    Ok(())
}

// ─── baselines / compare ────────────────────────────────────────────

fn run_baselines(
    config: ExperimentConfig,
    input: &Path,
    output_dir: &Path,
    sim: &SimArgs,
    hist: &HistArgs,
) -> Result<()> {
    let config = apply_overrides(config, sim, hist)?;
    let pool = load_pool(input)?;

    let harness = MonteCarloHarness::baselines(config.simulation);
    let results = harness.run(&pool)?;
    let written = plot_strategy_histograms(output_dir, &results, harness.strategies(), &config.histogram)?;
    for path in &written {
        println!("Histogram saved to: {}", path.display());
    }
    Ok(())
}

struct CompareOutputs {
    figure: PathBuf,
    summary: Option<PathBuf>,
    results: Option<PathBuf>,
    manifest: Option<PathBuf>,
}

fn run_compare(
    config: ExperimentConfig,
    input: &Path,
    outputs: &CompareOutputs,
    sim: &SimArgs,
) -> Result<()> {
    let config = apply_overrides(config, sim, &HistArgs::default())?;
    let pool = load_pool(input)?;

    let harness = MonteCarloHarness::all_strategies(config.simulation);
    let results = harness.run(&pool)?;
    let summary =
        ComparisonSummary::from_results(&results, harness.strategies(), StdDevConvention::Sample)?;

    plot_comparison(&outputs.figure, &results, &summary)?;
    println!("Comparison figure saved to: {}", outputs.figure.display());

    let text = summary.format_text();
    match &outputs.summary {
        Some(path) => {
            write_text(path, &text)?;
            println!("Summary saved to: {}", path.display());
        }
        None => println!("{text}"),
    }

    if let Some(path) = &outputs.results {
        write_results_csv(path, &results)?;
        println!("Results saved to: {}", path.display());
    }
    if let Some(path) = &outputs.manifest {
        let manifest = RunManifest::new(config.simulation, harness.strategies(), &pool, summary);
        write_manifest(path, &manifest)?;
        println!("Manifest saved to: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_params() -> DistributionArgs {
        DistributionArgs {
            kind: None,
            low: None,
            high: None,
            mean: None,
            std_dev: None,
        }
    }

    #[test]
    fn cli_parses_compare_with_global_config() {
        let cli = Cli::try_parse_from([
            "stoplab", "compare", "--input", "p.csv", "--runs", "50", "--config", "x.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Compare { input, sim, output, .. } => {
                assert_eq!(input, PathBuf::from("p.csv"));
                assert_eq!(sim.runs, Some(50));
                assert_eq!(output, PathBuf::from("comparison.svg"));
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn simulate_requires_input() {
        assert!(Cli::try_parse_from(["stoplab", "simulate"]).is_err());
    }

    #[test]
    fn flags_override_config_values() {
        let sim = SimArgs {
            threshold: Some(0.5),
            runs: None,
            seed: Some(3),
        };
        let hist = HistArgs {
            bins: Some(8),
            ..HistArgs::default()
        };
        let config = apply_overrides(ExperimentConfig::default(), &sim, &hist).unwrap();
        assert_eq!(config.simulation.threshold, 0.5);
        assert_eq!(config.simulation.runs, 1000);
        assert_eq!(config.simulation.seed, Some(3));
        assert_eq!(config.histogram.bins, 8);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let sim = SimArgs {
            threshold: Some(1.0),
            ..SimArgs::default()
        };
        assert!(apply_overrides(ExperimentConfig::default(), &sim, &HistArgs::default()).is_err());
    }

    #[test]
    fn distribution_defaults_to_config() {
        let dist = resolve_distribution(PayoffDistribution::default(), &no_params()).unwrap();
        assert_eq!(dist, PayoffDistribution::default());
    }

    #[test]
    fn switching_to_normal_uses_normal_defaults() {
        let args = DistributionArgs {
            kind: Some(DistributionKind::Normal),
            std_dev: Some(4.0),
            ..no_params()
        };
        let dist = resolve_distribution(PayoffDistribution::default(), &args).unwrap();
        assert_eq!(
            dist,
            PayoffDistribution::Normal {
                mean: 50.0,
                std_dev: 4.0
            }
        );
    }

    #[test]
    fn mismatched_distribution_flags_fail() {
        let args = DistributionArgs {
            mean: Some(1.0),
            ..no_params()
        };
        assert!(resolve_distribution(PayoffDistribution::default(), &args).is_err());
    }
}
