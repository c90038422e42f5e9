//! Closed-loop backtesting against a known objective surface.
//!
//! A simulation drives a campaign through repeated recommend/observe cycles
//! where the observations come from a [`Lookup`] instead of a real
//! experiment. The per-iteration summaries record the raw target values
//! together with the best value seen in each iteration and over the run so
//! far, which is the data needed for convergence plots.

use std::collections::BTreeMap;

use doe_core::{CellValue, DataTable, DoeError, ErrorInfo};
use doe_space::{Target, TargetMode};
use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::proposer::Proposer;

/// Source of ground-truth target values for simulated measurements.
///
/// Implemented for any `Fn(&[CellValue]) -> Vec<f64>` closure, which
/// receives the configuration cells in search space parameter order and
/// returns one value per objective target, and by [`TableLookup`] for
/// pre-measured data.
pub trait Lookup {
    /// Returns one value per target, in target order, for a single
    /// configuration.
    fn targets_for(
        &self,
        columns: &[String],
        configuration: &[CellValue],
        targets: &[Target],
    ) -> Result<Vec<f64>, DoeError>;
}

impl<F> Lookup for F
where
    F: Fn(&[CellValue]) -> Vec<f64>,
{
    fn targets_for(
        &self,
        _columns: &[String],
        configuration: &[CellValue],
        _targets: &[Target],
    ) -> Result<Vec<f64>, DoeError> {
        Ok(self(configuration))
    }
}

/// Lookup backed by a table of previously measured configurations.
///
/// A queried configuration must match a table row exactly on every query
/// column; the first matching row wins. A configuration with no match is an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLookup {
    table: DataTable,
}

impl TableLookup {
    /// Wraps a reference table carrying parameter and target columns.
    pub fn new(table: DataTable) -> Self {
        Self { table }
    }
}

impl Lookup for TableLookup {
    fn targets_for(
        &self,
        columns: &[String],
        configuration: &[CellValue],
        targets: &[Target],
    ) -> Result<Vec<f64>, DoeError> {
        let indices: Vec<usize> = columns
            .iter()
            .map(|name| {
                self.table.column_index(name).ok_or_else(|| {
                    DoeError::Schema(
                        ErrorInfo::new(
                            "lookup-missing-column",
                            "lookup table lacks a queried column",
                        )
                        .with_context("column", name.clone()),
                    )
                })
            })
            .collect::<Result<_, _>>()?;
        for (row_idx, row) in self.table.rows().iter().enumerate() {
            let matches = indices
                .iter()
                .zip(configuration)
                .all(|(&idx, cell)| &row[idx] == cell);
            if !matches {
                continue;
            }
            return targets
                .iter()
                .map(|target| {
                    let cell = self.table.cell(row_idx, &target.name).ok_or_else(|| {
                        DoeError::Schema(
                            ErrorInfo::new(
                                "lookup-missing-column",
                                "lookup table lacks a target column",
                            )
                            .with_context("column", target.name.clone()),
                        )
                    })?;
                    cell.as_f64().ok_or_else(|| {
                        DoeError::Schema(
                            ErrorInfo::new(
                                "lookup-non-numeric",
                                "lookup table holds a non-numeric target value",
                            )
                            .with_context("column", target.name.clone())
                            .with_context("row", row_idx.to_string()),
                        )
                    })
                })
                .collect();
        }
        let mut info = ErrorInfo::new(
            "lookup-miss",
            "configuration not present in the lookup table",
        );
        for (name, cell) in columns.iter().zip(configuration) {
            info = info.with_context(name.clone(), cell.to_string());
        }
        Err(DoeError::Schema(info))
    }
}

/// Fills in target columns for a table of queried configurations.
///
/// The result carries the query columns unchanged, followed by one column
/// per target in target order. The lookup must return exactly one finite
/// value per target for every row.
pub fn look_up_targets<L>(
    queries: &DataTable,
    targets: &[Target],
    lookup: &L,
) -> Result<DataTable, DoeError>
where
    L: Lookup + ?Sized,
{
    let mut columns: Vec<String> = queries.columns().to_vec();
    columns.extend(targets.iter().map(|t| t.name.clone()));
    let mut rows = Vec::with_capacity(queries.len());
    for row in queries.rows() {
        let values = lookup.targets_for(queries.columns(), row, targets)?;
        if values.len() != targets.len() {
            return Err(DoeError::Schema(
                ErrorInfo::new(
                    "lookup-arity",
                    "lookup returned the wrong number of target values",
                )
                .with_context("expected", targets.len().to_string())
                .with_context("returned", values.len().to_string()),
            ));
        }
        let mut full = row.clone();
        for (target, value) in targets.iter().zip(values) {
            if !value.is_finite() {
                return Err(DoeError::Schema(
                    ErrorInfo::new("lookup-nonfinite", "lookup returned a non-finite value")
                        .with_context("target", target.name.clone()),
                ));
            }
            full.push(CellValue::Float(value));
        }
        rows.push(full);
    }
    DataTable::new(columns, rows)
}

/// Per-iteration summary of a simulated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationSummary {
    /// Zero-based iteration counter.
    pub iteration: u64,
    /// Running number of measurements ingested up to and including this
    /// iteration.
    pub cumulative_measurements: u64,
    /// Raw measured values per target, in batch row order.
    pub target_values: BTreeMap<String, Vec<f64>>,
    /// Best value per target within this iteration's batch.
    pub iteration_best: BTreeMap<String, f64>,
    /// Best value per target over the run so far.
    pub cumulative_best: BTreeMap<String, f64>,
}

/// Runs a recommend/observe loop against a lookup for a fixed number of
/// iterations.
///
/// Each iteration recommends a batch, fills in its target values via the
/// lookup, and ingests the result as measurements, so the proposer sees the
/// growing history. The campaign is left holding all simulated
/// measurements; callers wanting to keep the starting state clone first.
pub fn simulate_experiment<P, L>(
    campaign: &mut Campaign<P>,
    lookup: &L,
    batch_quantity: u64,
    n_iterations: u64,
) -> Result<Vec<IterationSummary>, DoeError>
where
    P: Proposer,
    L: Lookup + ?Sized,
{
    if n_iterations == 0 {
        return Err(DoeError::Batch(
            ErrorInfo::new("simulate-empty-run", "simulation needs at least one iteration")
                .with_context("n_iterations", n_iterations.to_string()),
        ));
    }
    let targets = campaign.objective().targets().to_vec();
    let mut cumulative_best: BTreeMap<String, f64> = BTreeMap::new();
    let mut cumulative_measurements = 0u64;
    let mut summaries = Vec::with_capacity(n_iterations as usize);
    for iteration in 0..n_iterations {
        let batch = campaign.recommend(batch_quantity)?;
        let measured = look_up_targets(&batch, &targets, lookup)?;
        campaign.add_measurements(&measured)?;
        cumulative_measurements += measured.len() as u64;

        let mut target_values = BTreeMap::new();
        let mut iteration_best = BTreeMap::new();
        for target in &targets {
            let idx = measured.column_index(&target.name).ok_or_else(|| {
                DoeError::Serde(
                    ErrorInfo::new(
                        "simulate-target-column",
                        "looked-up table lost a target column",
                    )
                    .with_context("target", target.name.clone()),
                )
            })?;
            let values: Vec<f64> = measured
                .rows()
                .iter()
                .filter_map(|row| row[idx].as_f64())
                .collect();
            let best = match values.iter().copied().reduce(|a, b| preferred(target, a, b)) {
                Some(best) => best,
                None => continue,
            };
            iteration_best.insert(target.name.clone(), best);
            let running = match cumulative_best.get(&target.name) {
                Some(&prev) => preferred(target, prev, best),
                None => best,
            };
            cumulative_best.insert(target.name.clone(), running);
            target_values.insert(target.name.clone(), values);
        }
        summaries.push(IterationSummary {
            iteration,
            cumulative_measurements,
            target_values,
            iteration_best,
            cumulative_best: cumulative_best.clone(),
        });
    }
    Ok(summaries)
}

/// Picks the better of two measured values under a target's mode.
fn preferred(target: &Target, current: f64, candidate: f64) -> f64 {
    match (target.mode, target.bounds) {
        (TargetMode::Max, _) => current.max(candidate),
        (TargetMode::Min, _) => current.min(candidate),
        (TargetMode::Match, Some((lower, upper))) => {
            let midpoint = lower + (upper - lower) / 2.0;
            if (candidate - midpoint).abs() < (current - midpoint).abs() {
                candidate
            } else {
                current
            }
        }
        // Match targets carry bounds by construction.
        (TargetMode::Match, None) => candidate,
    }
}
