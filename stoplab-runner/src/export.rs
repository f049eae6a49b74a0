//! Export of experiment artifacts: CSV files, summary text and the JSON run
//! manifest.
//!
//! The `export_*` functions render into a `String`; the `write_*` functions
//! render and persist, creating parent directories as needed. Manifests carry
//! a `schema_version` and newer versions are rejected on load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use stoplab_core::{PayoffPool, ResultCollections, SimulationConfig, StoppingDecision, Strategy};

use crate::summary::ComparisonSummary;

/// Current manifest schema version.
pub const SCHEMA_VERSION: u32 = 1;

// ─── CSV export ─────────────────────────────────────────────────────

/// Render payoffs as a single `payoff` column.
pub fn export_payoffs_csv(payoffs: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["payoff"])?;
    for p in payoffs {
        wtr.write_record([p.to_string()])?;
    }
    finish(wtr)
}

/// Render decisions as `payoff,index`; baseline picks leave the index empty.
pub fn export_decisions_csv(decisions: &[StoppingDecision]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["payoff", "index"])?;
    for d in decisions {
        let index = d.index.map(|i| i.to_string()).unwrap_or_default();
        wtr.write_record([d.value.to_string(), index])?;
    }
    finish(wtr)
}

/// Render result collections with one row per trial.
///
/// Columns: `trial`, then one column per strategy id in canonical order.
pub fn export_results_csv(results: &ResultCollections) -> Result<String> {
    let columns: Vec<&[f64]> = results.iter().map(|(_, values)| values).collect();
    if let Some(bad) = columns.iter().find(|c| c.len() != results.runs()) {
        bail!(
            "result collections have unequal lengths ({} vs {})",
            bad.len(),
            results.runs()
        );
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["trial".to_string()];
    header.extend(results.ids().map(|id| id.to_string()));
    wtr.write_record(&header)?;

    for trial in 0..results.runs() {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(trial.to_string());
        row.extend(columns.iter().map(|c| c[trial].to_string()));
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn write_payoffs_csv(path: &Path, payoffs: &[f64]) -> Result<()> {
    write_text(path, &export_payoffs_csv(payoffs)?)
}

pub fn write_decisions_csv(path: &Path, decisions: &[StoppingDecision]) -> Result<()> {
    write_text(path, &export_decisions_csv(decisions)?)
}

pub fn write_results_csv(path: &Path, results: &ResultCollections) -> Result<()> {
    write_text(path, &export_results_csv(results)?)
}

/// Write text to `path`, creating missing parent directories.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

// ─── Run manifest ───────────────────────────────────────────────────

/// Provenance record for one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub config: SimulationConfig,
    pub strategies: Vec<Strategy>,
    pub pool_size: usize,
    /// BLAKE3 hex digest of the pool, see [`PayoffPool::fingerprint`].
    pub pool_fingerprint: String,
    pub summary: ComparisonSummary,
}

impl RunManifest {
    pub fn new(
        config: SimulationConfig,
        strategies: &[Strategy],
        pool: &PayoffPool,
        summary: ComparisonSummary,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
            config,
            strategies: strategies.to_vec(),
            pool_size: pool.len(),
            pool_fingerprint: pool.fingerprint(),
            summary,
        }
    }
}

pub fn export_manifest(manifest: &RunManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize run manifest")
}

/// Parse a manifest, rejecting schema versions newer than this build.
pub fn import_manifest(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize run manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    write_text(path, &export_manifest(manifest)?)
}

pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_manifest(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{parse_decisions, parse_payoffs};
    use crate::summary::StdDevConvention;
    use std::collections::BTreeMap;
    use stoplab_core::StrategyId;

    fn sample_results() -> ResultCollections {
        let mut map = BTreeMap::new();
        map.insert(StrategyId::Last, vec![3.0, 4.0]);
        map.insert(StrategyId::Secretary, vec![1.5, 2.5]);
        ResultCollections::from(map)
    }

    #[test]
    fn payoffs_csv_loads_back() {
        let payoffs = [12.25, 0.1, -7.0, 99.999];
        let csv = export_payoffs_csv(&payoffs).unwrap();
        assert!(csv.starts_with("payoff\n"));
        assert_eq!(parse_payoffs(csv.as_bytes()).unwrap(), payoffs);
    }

    #[test]
    fn decisions_csv_leaves_missing_index_empty() {
        let decisions = [StoppingDecision::stopped(20.0, 1), StoppingDecision::picked(7.5)];
        let csv = export_decisions_csv(&decisions).unwrap();
        assert_eq!(csv, "payoff,index\n20,1\n7.5,\n");
        assert_eq!(parse_decisions(csv.as_bytes()).unwrap(), decisions);
    }

    #[test]
    fn results_csv_has_trial_column_in_canonical_order() {
        let csv = export_results_csv(&sample_results()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines, ["trial,secretary,last", "0,1.5,3", "1,2.5,4"]);
    }

    #[test]
    fn results_csv_rejects_ragged_collections() {
        let mut map = BTreeMap::new();
        map.insert(StrategyId::Secretary, vec![1.0, 2.0]);
        map.insert(StrategyId::First, vec![1.0]);
        assert!(export_results_csv(&ResultCollections::from(map)).is_err());
    }

    fn sample_manifest() -> RunManifest {
        let strategies = [Strategy::Threshold { threshold: 0.37 }, Strategy::AlwaysLast];
        let summary = ComparisonSummary::from_results(
            &sample_results(),
            &strategies,
            StdDevConvention::Sample,
        )
        .unwrap();
        let pool = PayoffPool::new(vec![1.5, 2.5, 3.0, 4.0]);
        RunManifest::new(SimulationConfig::default(), &strategies, &pool, summary)
    }

    #[test]
    fn manifest_json_roundtrip() {
        let manifest = sample_manifest();
        let json = export_manifest(&manifest).unwrap();
        assert!(json.contains("\"schema_version\": 1"));

        let loaded = import_manifest(&json).unwrap();
        assert_eq!(loaded.created_at, manifest.created_at);
        assert_eq!(loaded.strategies, manifest.strategies);
        assert_eq!(loaded.pool_size, 4);
        assert_eq!(loaded.pool_fingerprint, manifest.pool_fingerprint);
        assert_eq!(loaded.summary.entries.len(), 2);
        assert_eq!(loaded.summary.entries[0].label, "37% rule");
        assert!((loaded.summary.entries[1].stats.mean - 3.5).abs() < 1e-12);
    }

    #[test]
    fn manifest_rejects_newer_schema() {
        let mut manifest = sample_manifest();
        manifest.schema_version = SCHEMA_VERSION + 1;
        let json = export_manifest(&manifest).unwrap();
        let err = import_manifest(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }
}
