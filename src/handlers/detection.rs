//! Detection handlers

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::upload::{read_upload, ProfileQuery, Upload};
use crate::config::{DetectionSettings, Profile};
use crate::dataset::TablePreview;
use crate::pipeline::{self, DetectionRun, Inspection};
use crate::report::{self, CountChart, Summary};
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub file_name: String,
    pub profile: Profile,
    #[serde(flatten)]
    pub inspection: Inspection,
}

#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub profile: Profile,
    pub file_name: String,
    pub dataset_sha256: String,
    pub settings: DetectionSettings,
    pub features: Vec<String>,
    pub excluded_columns: Vec<String>,
    pub summary: Summary,
    pub chart: CountChart,
    /// Zero-based indices of threat rows
    pub threat_rows: Vec<usize>,
    /// Last rows of the labeled dataset
    pub results: TablePreview,
    pub download_file_name: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileInfo {
    pub name: Profile,
    pub default: bool,
    pub settings: DetectionSettings,
}

/// List detector profiles and their resolved settings
pub async fn profiles(State(state): State<AppState>) -> AppResult<Json<Vec<ProfileInfo>>> {
    let profiles = Profile::ALL
        .iter()
        .map(|&profile| -> AppResult<ProfileInfo> {
            Ok(ProfileInfo {
                name: profile,
                default: profile == state.config.default_profile,
                settings: state.config.settings_for(profile)?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(profiles))
}

/// Parse an upload and report the features detection would use
pub async fn inspect(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
    multipart: Multipart,
) -> AppResult<Json<InspectResponse>> {
    let (profile, settings) = state.resolve(query.profile()?)?;
    let Upload { file_name, bytes } = read_upload(multipart).await?;
    let preview_rows = state.config.preview_rows;

    let inspection: Inspection = blocking(move || pipeline::inspect(&bytes, &settings, preview_rows)).await?;

    tracing::info!(
        "Inspected {}: {} rows, {} numeric features",
        file_name,
        inspection.row_count,
        inspection.numeric_features.len()
    );

    Ok(Json(InspectResponse {
        file_name,
        profile,
        inspection,
    }))
}

/// Run detection and return the full report
pub async fn detect(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
    multipart: Multipart,
) -> AppResult<Json<DetectionResponse>> {
    let (profile, settings) = state.resolve(query.profile()?)?;
    let upload = read_upload(multipart).await?;
    let run = run_detection(&upload, &settings).await?;

    Ok(Json(DetectionResponse {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        profile,
        file_name: upload.file_name,
        dataset_sha256: run.dataset_sha256,
        chart: CountChart::from_detection(profile.chart_title(), &run.detection),
        threat_rows: run.detection.threat_rows(),
        results: run.dataset.tail(state.config.result_rows),
        download_file_name: settings.report_file_name.clone(),
        settings,
        features: run.features,
        excluded_columns: run.excluded_columns,
        summary: run.summary,
    }))
}

/// Run detection and download the labeled CSV
pub async fn download_report(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (_, settings) = state.resolve(query.profile()?)?;
    let upload = read_upload(multipart).await?;
    let run = run_detection(&upload, &settings).await?;

    let csv = report::export_csv(&run.dataset)?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", settings.report_file_name),
        ),
    ];

    Ok((headers, csv).into_response())
}

/// Run detection and return the count chart as SVG
pub async fn chart(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (profile, settings) = state.resolve(query.profile()?)?;
    let upload = read_upload(multipart).await?;
    let run = run_detection(&upload, &settings).await?;

    let svg = CountChart::from_detection(profile.chart_title(), &run.detection).to_svg();

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn run_detection(upload: &Upload, settings: &DetectionSettings) -> AppResult<DetectionRun> {
    let bytes = upload.bytes.clone();
    let settings = settings.clone();
    blocking(move || pipeline::run(&bytes, &settings)).await
}

/// Run CPU-bound work off the async workers and wait for it
async fn blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::InternalError(format!("Detection task failed: {}", e)))?
}
