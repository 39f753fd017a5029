//! Classification History Records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored classification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub id: i64,
    pub timestamp_ms: i64,
    pub filename: Option<String>,
    pub is_sample_data: bool,
    pub classification: String,
    pub confidence: f64,
    pub notes: Option<String>,
}

impl ClassificationRecord {
    /// Creation time in UTC
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp_ms)
    }

    /// `YYYY-MM-DD HH:MM:SS`, UTC
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }

    /// Where the signal came from
    pub fn source_label(&self) -> String {
        if self.is_sample_data {
            "Sample Data".to_string()
        } else {
            format!("File: {}", self.filename.as_deref().unwrap_or("(unnamed)"))
        }
    }

    /// Capitalized class name
    pub fn display_classification(&self) -> String {
        let mut chars = self.classification.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Confidence with two decimals and a percent sign
    pub fn display_confidence(&self) -> String {
        format!("{:.2}%", self.confidence)
    }
}

/// Classification result about to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClassification {
    pub filename: Option<String>,
    pub is_sample_data: bool,
    pub classification: String,
    pub confidence: f64,
    pub notes: Option<String>,
}
