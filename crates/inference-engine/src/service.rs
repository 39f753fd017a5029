//! Classification Service
//!
//! Ingest -> extract -> standardize -> classify, as one call returning everything the
//! display and persistence collaborators need.

use crate::bootstrap::TargetClass;
use crate::engine::{ModelBundle, Prediction};
use crate::InferenceError;
use feature_engine::{FeatureExtractor, FeatureVector};
use serde::Serialize;
use signal_ingest::{
    CanonicalSignal, IngestConfig, RawTable, ReaderConfig, SignalIngestor, TableReader,
    ValidationError,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the classification pipeline
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Feature extraction produced non-finite values for {0:?}")]
    NonFiniteFeatures(Vec<&'static str>),
}

/// Everything one classification produced
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationOutcome {
    /// Label, confidence and class probabilities
    pub prediction: Prediction,
    /// Raw feature vector
    pub features: FeatureVector,
    /// Feature vector after standardization
    pub standardized: FeatureVector,
    /// Sample indices for plotting
    pub time: Vec<usize>,
    /// Normalized amplitude for plotting
    pub amplitude: Vec<f64>,
    /// Row of the table that was classified
    pub row_index: usize,
    /// Samples that failed coercion and were zero-filled
    pub missing_samples: usize,
    /// Wall time of the pipeline in milliseconds
    pub latency_ms: u64,
}

impl ClassificationOutcome {
    /// Predicted class
    pub fn label(&self) -> TargetClass {
        self.prediction.label
    }

    /// Confidence as a percentage
    pub fn confidence(&self) -> f64 {
        self.prediction.confidence
    }
}

/// Composes the ingestor, extractor and a shared [`ModelBundle`]
#[derive(Debug, Clone)]
pub struct ClassificationService {
    reader: TableReader,
    ingestor: SignalIngestor,
    extractor: FeatureExtractor,
    bundle: Arc<ModelBundle>,
}

impl ClassificationService {
    /// Create a service around an already fitted bundle
    pub fn new(bundle: Arc<ModelBundle>, ingest: IngestConfig, reader: ReaderConfig) -> Self {
        Self {
            reader: TableReader::new(reader),
            ingestor: SignalIngestor::new(ingest),
            extractor: FeatureExtractor::new(),
            bundle,
        }
    }

    /// Service with default ingest and reader settings
    pub fn with_defaults(bundle: Arc<ModelBundle>) -> Self {
        Self::new(bundle, IngestConfig::default(), ReaderConfig::default())
    }

    /// Shared model bundle
    pub fn bundle(&self) -> &Arc<ModelBundle> {
        &self.bundle
    }

    /// Classify the configured signal row of a table
    pub fn classify(&self, table: &RawTable) -> Result<ClassificationOutcome, ServiceError> {
        self.classify_row(table, self.ingestor.config().row_index)
    }

    /// Classify an explicit signal row of a table
    pub fn classify_row(
        &self,
        table: &RawTable,
        row_index: usize,
    ) -> Result<ClassificationOutcome, ServiceError> {
        let start = Instant::now();
        let signal = self.ingestor.ingest_row(table, row_index)?;
        self.classify_signal(signal, row_index, start)
    }

    /// Parse delimited text and classify it
    pub fn classify_text(&self, text: &str) -> Result<ClassificationOutcome, ServiceError> {
        let table = self.reader.read_str(text)?;
        self.classify(&table)
    }

    /// Parse delimited text and classify an explicit row
    pub fn classify_text_row(
        &self,
        text: &str,
        row_index: usize,
    ) -> Result<ClassificationOutcome, ServiceError> {
        let table = self.reader.read_str(text)?;
        self.classify_row(&table, row_index)
    }

    /// Read a file and classify it
    pub fn classify_file(&self, path: impl AsRef<Path>) -> Result<ClassificationOutcome, ServiceError> {
        let table = self.reader.read_file(path)?;
        self.classify(&table)
    }

    fn classify_signal(
        &self,
        signal: CanonicalSignal,
        row_index: usize,
        start: Instant,
    ) -> Result<ClassificationOutcome, ServiceError> {
        let features = self.extractor.extract(&signal);
        let standardized = self.bundle.standardize(&features);

        let bad: Vec<&'static str> = features
            .named()
            .zip(standardized.values())
            .filter(|((_, raw), scaled)| !raw.is_finite() || !scaled.is_finite())
            .map(|((name, _), _)| name)
            .collect();
        if !bad.is_empty() {
            warn!("Rejecting non-finite features: {:?}", bad);
            return Err(ServiceError::NonFiniteFeatures(bad));
        }

        let prediction = self.bundle.classifier().predict_class(&standardized)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        info!(
            "Classified {} samples as {} ({:.2}%) in {}ms",
            signal.len(),
            prediction.label,
            prediction.confidence,
            latency_ms
        );

        Ok(ClassificationOutcome {
            prediction,
            features,
            standardized,
            time: signal.time,
            amplitude: signal.amplitude,
            row_index,
            missing_samples: signal.missing_samples,
            latency_ms,
        })
    }
}
