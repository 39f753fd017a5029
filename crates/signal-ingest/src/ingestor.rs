//! Signal Ingestor

use crate::error::ValidationError;
use crate::normalizer::normalize_to_peak;
use crate::parse::parse_numeric;
use crate::table::RawTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Minimum number of rows an input must have
    pub min_rows: usize,
    /// Largest tolerated fraction of non-numeric cells
    pub max_non_numeric_ratio: f64,
    /// Row used as the amplitude series; the others are validated but not classified
    pub row_index: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_rows: 5,
            max_non_numeric_ratio: 0.5,
            row_index: 0,
        }
    }
}

/// Canonical time/amplitude signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalSignal {
    /// Sample indices `0..N`
    pub time: Vec<usize>,
    /// Peak-normalized amplitude, `N` samples
    pub amplitude: Vec<f64>,
    /// Samples in the selected row that failed coercion and were zero-filled
    pub missing_samples: usize,
    /// Peak excursion the amplitude was divided by (0.0 when left unscaled)
    pub peak: f64,
    /// Copy of the input table
    #[serde(skip)]
    pub raw: RawTable,
}

impl CanonicalSignal {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.amplitude.len()
    }

    /// Whether the signal has no samples
    pub fn is_empty(&self) -> bool {
        self.amplitude.is_empty()
    }
}

/// Validates raw tables and turns one row into a canonical signal.
///
/// The table is read as rectangular with the first row's width: short rows count
/// their missing cells as non-numeric, cells past that width are ignored.
#[derive(Debug, Clone, Default)]
pub struct SignalIngestor {
    config: IngestConfig,
}

impl SignalIngestor {
    /// Create a new ingestor with given config
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Get the active configuration
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest using the configured signal row
    pub fn ingest(&self, table: &RawTable) -> Result<CanonicalSignal, ValidationError> {
        self.ingest_row(table, self.config.row_index)
    }

    /// Ingest using an explicit signal row
    pub fn ingest_row(
        &self,
        table: &RawTable,
        row_index: usize,
    ) -> Result<CanonicalSignal, ValidationError> {
        self.validate(table)?;

        let columns = table.column_count();
        let row = table.row(row_index).ok_or(ValidationError::RowOutOfRange {
            index: row_index,
            rows: table.row_count(),
        })?;

        let mut missing_samples = 0;
        let mut amplitude: Vec<f64> = (0..columns)
            .map(|col| {
                match row.get(col).map(|cell| parse_numeric(cell)) {
                    Some(Ok(value)) => value,
                    _ => {
                        missing_samples += 1;
                        0.0
                    }
                }
            })
            .collect();

        if missing_samples == columns {
            return Err(ValidationError::NoNumericSamples { row: row_index });
        }

        let peak = normalize_to_peak(&mut amplitude);

        debug!(
            "Ingested signal: rows={}, columns={}, row_index={}, missing={}, peak={:.4}",
            table.row_count(),
            columns,
            row_index,
            missing_samples,
            peak
        );

        Ok(CanonicalSignal {
            time: (0..columns).collect(),
            amplitude,
            missing_samples,
            peak,
            raw: table.clone(),
        })
    }

    /// Check shape and numeric content without building a signal
    pub fn validate(&self, table: &RawTable) -> Result<(), ValidationError> {
        if table.is_empty() {
            return Err(ValidationError::Empty);
        }

        if table.row_count() < self.config.min_rows {
            return Err(ValidationError::TooFewRows {
                min: self.config.min_rows,
                actual: table.row_count(),
            });
        }

        let columns = table.column_count();
        let total = table.row_count() * columns;
        let failed: usize = table
            .rows()
            .map(|row| {
                (0..columns)
                    .filter(|&col| row.get(col).map_or(true, |cell| parse_numeric(cell).is_err()))
                    .count()
            })
            .sum();

        if failed as f64 > self.config.max_non_numeric_ratio * total as f64 {
            return Err(ValidationError::TooManyNonNumeric { failed, total });
        }

        Ok(())
    }
}
