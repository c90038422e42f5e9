//! Optimization targets and the objective signal transform.

use doe_core::{CellValue, DataTable, DoeError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Direction in which a target is optimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetMode {
    /// The target is to be minimized.
    Min,
    /// The target is to be maximized.
    Max,
    /// The target should be as close as possible to the bounds midpoint.
    Match,
}

/// Single optimization target, backed by one measurement column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Target name, also the measurement column name.
    pub name: String,
    /// Optimization direction.
    pub mode: TargetMode,
    /// Optional closed bounds used by the signal transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<(f64, f64)>,
}

impl Target {
    /// Creates a target after validating its bounds.
    ///
    /// Bounds must be finite on both ends when present, and `Match` mode
    /// requires them.
    pub fn new(
        name: impl Into<String>,
        mode: TargetMode,
        bounds: Option<(f64, f64)>,
    ) -> Result<Self, DoeError> {
        let target = Self {
            name: name.into(),
            mode,
            bounds,
        };
        target.validate()?;
        Ok(target)
    }

    pub(crate) fn validate(&self) -> Result<(), DoeError> {
        let reject = |code: &str, message: &str| {
            Err(DoeError::Space(
                ErrorInfo::new(code, message).with_context("target", self.name.clone()),
            ))
        };
        if self.name.is_empty() {
            return reject("space-empty-target-name", "target name must be non-empty");
        }
        if let Some((lower, upper)) = self.bounds {
            if !lower.is_finite() || !upper.is_finite() {
                return reject(
                    "space-nonfinite-target-bounds",
                    "target bounds must be finite on both ends",
                );
            }
            if lower >= upper {
                return reject(
                    "space-degenerate-target-bounds",
                    "target bounds must span a non-empty interval",
                );
            }
        } else if self.mode == TargetMode::Match {
            return reject(
                "space-match-without-bounds",
                "MATCH mode requires finite bounds",
            );
        }
        Ok(())
    }

    /// Maps a raw measured value onto the optimization signal scale.
    ///
    /// Bounded targets map into [0, 1]: linearly ascending for `Max`,
    /// descending for `Min`, and via a triangular peak at the bounds midpoint
    /// for `Match`. Unbounded targets pass through (`Max`) or negate (`Min`).
    pub fn transform_value(&self, value: f64) -> f64 {
        match (self.bounds, self.mode) {
            (Some((lower, upper)), TargetMode::Max) => {
                ((value - lower) / (upper - lower)).clamp(0.0, 1.0)
            }
            (Some((lower, upper)), TargetMode::Min) => {
                ((upper - value) / (upper - lower)).clamp(0.0, 1.0)
            }
            (Some((lower, upper)), TargetMode::Match) => {
                let half_width = (upper - lower) / 2.0;
                let midpoint = lower + half_width;
                (1.0 - (value - midpoint).abs() / half_width).clamp(0.0, 1.0)
            }
            (None, TargetMode::Min) => -value,
            (None, _) => value,
        }
    }
}

/// Collection of targets defining the optimization signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Objective {
    targets: Vec<Target>,
}

impl Objective {
    /// Creates an objective from validated targets.
    pub fn new(targets: Vec<Target>) -> Result<Self, DoeError> {
        if targets.is_empty() {
            return Err(DoeError::Space(ErrorInfo::new(
                "space-empty-objective",
                "objective needs at least one target",
            )));
        }
        for (idx, target) in targets.iter().enumerate() {
            target.validate()?;
            if targets[..idx].iter().any(|t| t.name == target.name) {
                return Err(DoeError::Space(
                    ErrorInfo::new("space-duplicate-target", "duplicate target name")
                        .with_context("target", target.name.clone()),
                ));
            }
        }
        Ok(Self { targets })
    }

    /// Returns the ordered targets.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Returns the required measurement column names.
    pub fn target_names(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.name.clone()).collect()
    }

    /// Transforms raw target columns into optimization signal columns.
    ///
    /// The input must carry every target column with numeric values; other
    /// columns are ignored. The output has one column per target, same row
    /// order as the input.
    pub fn transform(&self, measurements: &DataTable) -> Result<DataTable, DoeError> {
        let mut rows = Vec::with_capacity(measurements.len());
        for (row_idx, _) in measurements.rows().iter().enumerate() {
            let mut row = Vec::with_capacity(self.targets.len());
            for target in &self.targets {
                let cell = measurements.cell(row_idx, &target.name).ok_or_else(|| {
                    DoeError::Schema(
                        ErrorInfo::new("objective-missing-column", "target column missing")
                            .with_context("target", target.name.clone()),
                    )
                })?;
                let value = cell.as_f64().ok_or_else(|| {
                    DoeError::Schema(
                        ErrorInfo::new("objective-non-numeric", "target value is not numeric")
                            .with_context("target", target.name.clone())
                            .with_context("row", row_idx.to_string()),
                    )
                })?;
                row.push(CellValue::Float(target.transform_value(value)));
            }
            rows.push(row);
        }
        DataTable::new(self.target_names(), rows)
    }
}
