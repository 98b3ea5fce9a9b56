//! Detection Module
//!
//! Fits a fresh anomaly detector on every feature matrix and labels rows.
//! Nothing is cached between calls.

pub mod isolation_forest;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::DetectionSettings;
use crate::dataset::FeatureMatrix;

pub use isolation_forest::IsolationForest;

/// Per-row decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Normal,
    Threat,
}

impl Label {
    /// Value written to the label column
    pub fn as_flag(&self) -> u8 {
        match self {
            Label::Normal => 0,
            Label::Threat => 1,
        }
    }

    /// Chart category
    pub fn category(&self) -> &'static str {
        match self {
            Label::Normal => "Normal",
            Label::Threat => "Threat",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("Feature matrix is empty")]
    EmptyInput,

    #[error("Input contains a non-finite value {value} at row {row}, column {column}")]
    NonFinite { row: usize, column: usize, value: f64 },

    #[error("Contamination must be in (0, 0.5], got {0}")]
    InvalidContamination(f64),

    #[error("Model not fitted")]
    NotFitted,
}

/// Anomaly detector seam
pub trait AnomalyDetector {
    /// Fit on `x` and fix the decision threshold
    fn fit(&mut self, x: &Array2<f64>) -> Result<(), DetectError>;

    /// Anomaly score per row, higher is more anomalous
    fn score_samples(&self, x: &Array2<f64>) -> Result<Vec<f64>, DetectError>;

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Label>, DetectError>;

    fn threshold(&self) -> Option<f64>;
}

/// Output of one detection run
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub labels: Vec<Label>,
    pub scores: Vec<f64>,
    pub threshold: f64,
}

impl Detection {
    pub fn threat_count(&self) -> usize {
        self.labels.iter().filter(|l| **l == Label::Threat).count()
    }

    pub fn normal_count(&self) -> usize {
        self.labels.len() - self.threat_count()
    }

    /// Zero-based indices of rows labeled as threats
    pub fn threat_rows(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == Label::Threat)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Build the detector described by `settings`
pub fn detector_for(settings: &DetectionSettings) -> IsolationForest {
    IsolationForest::new()
        .with_n_estimators(settings.n_estimators)
        .with_max_samples(settings.max_samples)
        .with_contamination(settings.contamination)
        .with_seed(settings.random_seed)
}

/// Fit and label one feature matrix
pub fn detect(features: &FeatureMatrix, settings: &DetectionSettings) -> Result<Detection, DetectError> {
    let mut detector = detector_for(settings);
    run(&mut detector, features.values())
}

/// Fit `detector` on `x`, then label the same rows
pub fn run<D: AnomalyDetector>(detector: &mut D, x: &Array2<f64>) -> Result<Detection, DetectError> {
    detector.fit(x)?;

    let scores = detector.score_samples(x)?;
    let labels = detector.predict(x)?;
    let threshold = detector.threshold().ok_or(DetectError::NotFitted)?;

    Ok(Detection {
        labels,
        scores,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_csv;

    fn matrix(csv: &str) -> FeatureMatrix {
        let dataset = parse_csv(csv.as_bytes()).unwrap();
        FeatureMatrix::from_dataset(&dataset, &[]).unwrap()
    }

    fn wide_csv(rows: usize) -> String {
        let mut csv = String::from("amount,latency,user\n");
        for i in 0..rows {
            csv.push_str(&format!("{},{},u{}\n", 10 + i % 7, 100 + (i * 3) % 11, i));
        }
        csv.push_str("9000,5,intruder\n");
        csv
    }

    #[test]
    fn test_one_label_per_row_and_counts_conserved() {
        let features = matrix(&wide_csv(300));
        let detection = detect(&features, &DetectionSettings::default()).unwrap();

        assert_eq!(detection.labels.len(), 301);
        assert_eq!(detection.scores.len(), 301);
        assert_eq!(detection.threat_count() + detection.normal_count(), 301);
        assert!(detection.labels.iter().all(|l| l.as_flag() <= 1));
        assert!(detection.threat_rows().contains(&300));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let features = matrix(&wide_csv(120));
        let settings = DetectionSettings::default();

        let first = detect(&features, &settings).unwrap();
        let second = detect(&features, &settings).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_label_flags_and_categories() {
        assert_eq!(Label::Normal.as_flag(), 0);
        assert_eq!(Label::Threat.as_flag(), 1);
        assert_eq!(Label::Normal.category(), "Normal");
        assert_eq!(Label::Threat.category(), "Threat");
    }
}
