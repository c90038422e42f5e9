//! The campaign controller driving recommend/observe cycles.

use std::collections::BTreeSet;
use std::sync::Arc;

use doe_core::{CellValue, DataTable, DoeError, ErrorInfo};
use doe_space::{Objective, SearchSpace};

use crate::cache::{CachedBatch, RecommendationCache};
use crate::proposer::{Proposer, RandomProposer};
use crate::store::MeasurementStore;

/// Stateful controller over a sequence of recommend/observe cycles.
///
/// The campaign owns its measurement store and recommendation cache and
/// holds the search space and objective by shared reference. It is intended
/// for sequential use by a single caller; no internal synchronization is
/// provided.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign<P = RandomProposer> {
    space: Arc<SearchSpace>,
    objective: Arc<Objective>,
    proposer: P,
    store: MeasurementStore,
    cache: RecommendationCache,
    enforce_tolerance: bool,
}

impl Campaign<RandomProposer> {
    /// Creates a campaign with the default random proposer and tolerance
    /// enforcement enabled.
    pub fn new(
        space: impl Into<Arc<SearchSpace>>,
        objective: impl Into<Arc<Objective>>,
    ) -> Self {
        let space = space.into();
        let objective = objective.into();
        let store = MeasurementStore::new(store_columns(&space, &objective));
        Self {
            space,
            objective,
            proposer: RandomProposer::default(),
            store,
            cache: RecommendationCache::new(),
            enforce_tolerance: true,
        }
    }
}

fn store_columns(space: &SearchSpace, objective: &Objective) -> Vec<String> {
    let mut columns = space.parameter_names();
    columns.extend(objective.target_names());
    columns
}

impl<P> Campaign<P> {
    /// Replaces the proposer, keeping all other state.
    pub fn with_proposer<Q>(self, proposer: Q) -> Campaign<Q> {
        Campaign {
            space: self.space,
            objective: self.objective,
            proposer,
            store: self.store,
            cache: self.cache,
            enforce_tolerance: self.enforce_tolerance,
        }
    }

    /// Sets whether discrete numeric measurements must lie within tolerance
    /// of a legal level. Enabled by default.
    pub fn with_tolerance_enforcement(mut self, enabled: bool) -> Self {
        self.enforce_tolerance = enabled;
        self
    }

    /// Reassembles a campaign from deserialized parts.
    pub(crate) fn from_parts(
        space: Arc<SearchSpace>,
        objective: Arc<Objective>,
        proposer: P,
        store: MeasurementStore,
        cache: RecommendationCache,
        enforce_tolerance: bool,
    ) -> Self {
        Self {
            space,
            objective,
            proposer,
            store,
            cache,
            enforce_tolerance,
        }
    }

    /// Returns the search space.
    pub fn search_space(&self) -> &SearchSpace {
        &self.space
    }

    /// Returns the objective.
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Returns the proposer.
    pub fn proposer(&self) -> &P {
        &self.proposer
    }

    /// Returns the accumulated measurements.
    pub fn measurements(&self) -> &MeasurementStore {
        &self.store
    }

    /// Returns the recommendation cache state.
    pub(crate) fn cache(&self) -> &RecommendationCache {
        &self.cache
    }

    /// Returns whether tolerance enforcement is enabled.
    pub fn tolerance_enforced(&self) -> bool {
        self.enforce_tolerance
    }

    /// Validates an incoming measurement table against the expected columns
    /// and every parameter domain. Returns rows reordered into store column
    /// order; the store is untouched on any failure.
    fn validate_measurements(&self, table: &DataTable) -> Result<Vec<Vec<CellValue>>, DoeError> {
        let expected: BTreeSet<&str> = self.store.columns().iter().map(String::as_str).collect();
        let provided: BTreeSet<&str> = table.columns().iter().map(String::as_str).collect();
        let missing: Vec<&str> = expected.difference(&provided).copied().collect();
        let extra: Vec<&str> = provided.difference(&expected).copied().collect();
        if !missing.is_empty() || !extra.is_empty() {
            let mut info = ErrorInfo::new(
                "measurements-schema",
                "measurement columns do not match the campaign schema",
            );
            if !missing.is_empty() {
                info = info.with_context("missing", missing.join(","));
            }
            if !extra.is_empty() {
                info = info.with_context("extra", extra.join(","));
            }
            return Err(DoeError::Schema(info));
        }

        // Store column order is parameter names followed by target names.
        let order: Vec<usize> = self
            .store
            .columns()
            .iter()
            .map(|name| {
                table.column_index(name).ok_or_else(|| {
                    DoeError::Serde(
                        ErrorInfo::new(
                            "measurements-column-index",
                            "schema-checked column vanished during reordering",
                        )
                        .with_context("column", name.clone()),
                    )
                })
            })
            .collect::<Result<_, _>>()?;

        let mut info = ErrorInfo::new(
            "measurements-tolerance",
            "measurement values outside their parameter domain",
        );
        let mut violations = 0usize;
        for (row_idx, row) in table.rows().iter().enumerate() {
            for (param_idx, parameter) in self.space.parameters().iter().enumerate() {
                let cell = &row[order[param_idx]];
                if !parameter.domain.accepts(cell, self.enforce_tolerance) {
                    violations += 1;
                    info = info.with_context(
                        format!("row{row_idx}.{}", parameter.name),
                        cell.to_string(),
                    );
                }
            }
        }
        if violations > 0 {
            return Err(DoeError::Tolerance(
                info.with_context("violations", violations.to_string()),
            ));
        }

        let rows = table
            .rows()
            .iter()
            .map(|row| order.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        Ok(rows)
    }

    /// Appends measurement rows after all-or-nothing validation.
    ///
    /// The table must carry exactly one column per search space parameter
    /// plus one per objective target; missing or extra columns are rejected
    /// with no state change. Domain and tolerance violations are collected
    /// across all rows and reported in one error, again with no state
    /// change. On success the rows are appended in input order. Every
    /// accepted call invalidates the recommendation cache, including calls
    /// with an empty (but schema-valid) table.
    pub fn add_measurements(&mut self, table: &DataTable) -> Result<(), DoeError> {
        let rows = self.validate_measurements(table)?;
        self.cache.invalidate();
        if rows.is_empty() {
            return Ok(());
        }
        self.store.append_rows(rows);
        Ok(())
    }
}

impl<P: Proposer> Campaign<P> {
    /// Returns a batch of exactly `batch_quantity` recommended configurations.
    ///
    /// A repeat call with the same batch size and no intervening measurement
    /// additions is served from the cache without consulting the proposer.
    pub fn recommend(&mut self, batch_quantity: u64) -> Result<DataTable, DoeError> {
        if batch_quantity == 0 {
            return Err(DoeError::Batch(
                ErrorInfo::new("recommend-empty-batch", "batch quantity must be at least 1")
                    .with_context("batch_quantity", batch_quantity.to_string()),
            ));
        }
        let fingerprint = self.store.epoch();
        if let Some(batch) = self.cache.lookup(batch_quantity, fingerprint) {
            return Ok(batch);
        }
        let batch = self
            .proposer
            .propose(&self.space, &self.store, batch_quantity)?;
        if batch.len() as u64 != batch_quantity {
            return Err(DoeError::Serde(
                ErrorInfo::new("proposal-size", "proposer returned a mis-sized batch")
                    .with_context("requested", batch_quantity.to_string())
                    .with_context("returned", batch.len().to_string()),
            ));
        }
        if batch.columns() != self.space.parameter_names().as_slice() {
            return Err(DoeError::Serde(
                ErrorInfo::new("proposal-columns", "proposer returned unexpected columns")
                    .with_context("expected", self.space.parameter_names().join(","))
                    .with_context("returned", batch.columns().join(",")),
            ));
        }
        self.cache.store(CachedBatch {
            batch_quantity,
            fingerprint,
            batch: batch.clone(),
        });
        Ok(batch)
    }
}
