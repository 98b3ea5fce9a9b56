//! CSV parsing and serialization

use std::collections::HashSet;

use super::Dataset;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Error type for ingestion
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{0}")]
    Parse(String),

    #[error("No numeric features found")]
    NoNumericFeatures,

    #[error("Failed to write CSV: {0}")]
    Write(String),
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Parse(err.to_string())
    }
}

/// Parse CSV bytes into a dataset.
///
/// Short rows are padded with empty cells; long rows are an error.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset, IngestError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(IngestError::Parse("No columns to parse from file".to_string()));
    }

    let columns = dedupe_headers(headers.iter());
    let width = columns.len();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(IngestError::Parse(format!(
                "Expected {} fields in line {}, saw {}",
                width,
                line,
                record.len()
            )));
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    tracing::debug!("Parsed CSV: {} rows x {} columns", rows.len(), width);
    Ok(Dataset::new(columns, rows))
}

/// Serialize a dataset as CSV bytes, header first
pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>, IngestError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| IngestError::Write(e.to_string()))
}

/// Repeated names become `name.1`, `name.2`, ...
fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 1;
        while !used.insert(candidate.clone()) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        out.push(candidate);
    }

    out
}
