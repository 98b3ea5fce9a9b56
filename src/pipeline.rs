//! Upload -> parse -> features -> detect -> label
//!
//! Every call starts from the raw upload bytes; nothing is kept between calls.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::DetectionSettings;
use crate::dataset::{parse_csv, Dataset, FeatureMatrix, TablePreview};
use crate::detection::{self, Detection};
use crate::report::{self, Summary};
use crate::AppResult;

/// Result of parsing an upload, before detection
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub dataset_sha256: String,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub preview: TablePreview,
    pub numeric_features: Vec<String>,
    pub excluded_columns: Vec<String>,
}

/// A labeled dataset and the detection that produced it
#[derive(Debug, Clone)]
pub struct DetectionRun {
    pub dataset_sha256: String,
    pub dataset: Dataset,
    pub features: Vec<String>,
    pub excluded_columns: Vec<String>,
    pub detection: Detection,
    pub summary: Summary,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Columns kept out of the feature matrix: the profile's list plus the label
fn feature_exclusions(settings: &DetectionSettings) -> Vec<String> {
    let mut excluded = settings.excluded_columns.clone();
    if !excluded.contains(&settings.label_column) {
        excluded.push(settings.label_column.clone());
    }
    excluded
}

fn present(dataset: &Dataset, names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|n| dataset.column_index(n).is_some())
        .cloned()
        .collect()
}

/// Parse an upload and list the features detection would use
pub fn inspect(bytes: &[u8], settings: &DetectionSettings, preview_rows: usize) -> AppResult<Inspection> {
    let dataset = parse_csv(bytes)?;
    let exclusions = feature_exclusions(settings);
    let features = FeatureMatrix::from_dataset(&dataset, &exclusions)?;

    Ok(Inspection {
        dataset_sha256: sha256_hex(bytes),
        row_count: dataset.row_count(),
        columns: dataset.columns().to_vec(),
        preview: dataset.head(preview_rows),
        numeric_features: features.columns().to_vec(),
        excluded_columns: present(&dataset, &exclusions),
    })
}

/// Parse, fit and label an upload
pub fn run(bytes: &[u8], settings: &DetectionSettings) -> AppResult<DetectionRun> {
    let mut dataset = parse_csv(bytes)?;
    let exclusions = feature_exclusions(settings);
    let features = FeatureMatrix::from_dataset(&dataset, &exclusions)?;
    let excluded_columns = present(&dataset, &exclusions);

    tracing::info!(
        "Running detection on {} rows using {} numeric features: {:?}",
        features.nrows(),
        features.ncols(),
        features.columns()
    );

    let detection = detection::detect(&features, settings)?;
    report::label_dataset(&mut dataset, &settings.label_column, &detection);
    let summary = Summary::from_detection(&detection);

    tracing::info!(
        "Detection finished: {} threats, {} normal",
        summary.threat_count,
        summary.normal_count
    );

    Ok(DetectionRun {
        dataset_sha256: sha256_hex(bytes),
        excluded_columns,
        features: features.columns().to_vec(),
        dataset,
        detection,
        summary,
    })
}
