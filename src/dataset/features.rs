//! Numeric feature extraction

use ndarray::Array2;

use super::{Dataset, IngestError};

/// Cell values read as missing (pandas defaults)
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan",
    "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a",
    "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Parse a present cell as a number
pub fn parse_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

/// Numeric view of a dataset, missing cells filled with zero
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Select every numeric column not listed in `excluded`.
    ///
    /// A column is numeric when all of its present cells parse as numbers;
    /// a column of only missing cells qualifies. Fails with
    /// `NoNumericFeatures` when nothing qualifies or there are no rows.
    pub fn from_dataset(dataset: &Dataset, excluded: &[String]) -> Result<Self, IngestError> {
        if dataset.row_count() == 0 {
            return Err(IngestError::NoNumericFeatures);
        }

        let selected: Vec<usize> = (0..dataset.column_count())
            .filter(|&idx| !excluded.iter().any(|e| e == &dataset.columns()[idx]))
            .filter(|&idx| {
                dataset
                    .column_cells(idx)
                    .all(|cell| is_missing(cell) || parse_numeric(cell).is_some())
            })
            .collect();

        if selected.is_empty() {
            return Err(IngestError::NoNumericFeatures);
        }

        let values = Array2::from_shape_fn((dataset.row_count(), selected.len()), |(r, c)| {
            let cell = &dataset.rows()[r][selected[c]];
            if is_missing(cell) {
                return 0.0;
            }
            // NaN spellings outside the marker list are still missing
            parse_numeric(cell).filter(|v| !v.is_nan()).unwrap_or(0.0)
        });

        let columns = selected
            .iter()
            .map(|&idx| dataset.columns()[idx].clone())
            .collect();

        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }
}
