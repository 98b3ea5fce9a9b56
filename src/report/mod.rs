//! Report Module - what a detection run shows the user
//!
//! Counters, the Normal/Threat count chart and the annotated CSV download.

pub mod chart;

use serde::Serialize;

use crate::dataset::{ingest, Dataset, IngestError};
use crate::detection::Detection;

pub use chart::CountChart;

/// Row counters shown above the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_rows: usize,
    pub threat_count: usize,
    pub normal_count: usize,
}

impl Summary {
    pub fn from_detection(detection: &Detection) -> Self {
        let threat_count = detection.threat_count();
        Self {
            total_rows: detection.labels.len(),
            threat_count,
            normal_count: detection.labels.len() - threat_count,
        }
    }
}

/// Append the label column (0/1 per row) to a dataset
pub fn label_dataset(dataset: &mut Dataset, label_column: &str, detection: &Detection) {
    dataset.set_column(
        label_column,
        detection.labels.iter().map(|l| l.as_flag().to_string()),
    );
}

/// CSV bytes offered as the download
pub fn export_csv(dataset: &Dataset) -> Result<Vec<u8>, IngestError> {
    let bytes = ingest::to_csv_bytes(dataset)?;
    tracing::debug!("Exported {} rows ({} bytes)", dataset.row_count(), bytes.len());
    Ok(bytes)
}
