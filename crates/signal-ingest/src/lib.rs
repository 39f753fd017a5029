//! Signal Ingestion and Validation
//!
//! Turns untrusted tabular input into a canonical, peak-normalized time/amplitude signal.

mod error;
mod ingestor;
mod normalizer;
mod parse;
mod reader;
mod table;

pub use error::ValidationError;
pub use ingestor::{CanonicalSignal, IngestConfig, SignalIngestor};
pub use normalizer::{normalize_to_peak, peak_amplitude};
pub use parse::{parse_numeric, ParseFailure};
pub use reader::{ReaderConfig, TableReader};
pub use table::RawTable;
