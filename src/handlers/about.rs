//! About handler

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub data_sources: &'static [&'static str],
    pub built_with: &'static [&'static str],
}

pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse {
        name: "Threat Detector",
        version: env!("CARGO_PKG_VERSION"),
        description: "Detects anomalies in any CSV-based dataset and lets users download \
                      the annotated results, alongside a short cybersecurity awareness quiz.",
        data_sources: &["Financial records", "System activity logs", "Transaction summaries"],
        built_with: &[
            "Isolation Forest for anomaly detection",
            "Axum for the HTTP interface",
            "SVG count chart for visual output",
        ],
    })
}
