//! Multipart upload extraction

use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use serde::Deserialize;

use crate::config::Profile;
use crate::{AppError, AppResult};

/// Multipart field carrying the CSV
pub const FILE_FIELD: &str = "file";

/// One uploaded file
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// `?profile=` on detection routes, matched case-insensitively
#[derive(Debug, Deserialize, Default)]
pub struct ProfileQuery {
    pub profile: Option<String>,
}

impl ProfileQuery {
    pub fn profile(&self) -> AppResult<Option<Profile>> {
        self.profile
            .as_deref()
            .map(|name| name.parse::<Profile>().map_err(AppError::BadRequest))
            .transpose()
    }
}

/// Pull the `file` field out of a multipart body
pub async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        check_extension(&file_name)?;

        let bytes = field.bytes().await?;
        tracing::info!("Received file: {} ({} bytes)", file_name, bytes.len());

        return Ok(Upload { file_name, bytes });
    }

    Err(AppError::BadRequest(format!("No '{}' field in upload", FILE_FIELD)))
}

/// Only `.csv` (or extension-less) file names are accepted
fn check_extension(file_name: &str) -> AppResult<()> {
    match Path::new(file_name).extension() {
        Some(ext) if !ext.eq_ignore_ascii_case("csv") => Err(AppError::BadRequest(
            "Supported format: CSV only".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_check() {
        assert!(check_extension("logs.csv").is_ok());
        assert!(check_extension("LOGS.CSV").is_ok());
        assert!(check_extension("export").is_ok());
        assert!(check_extension("book.xlsx").is_err());
    }

    #[test]
    fn test_profile_query_parsing() {
        let query = |p: Option<&str>| ProfileQuery {
            profile: p.map(str::to_string),
        };

        assert_eq!(query(None).profile().unwrap(), None);
        assert_eq!(query(Some("Incident")).profile().unwrap(), Some(Profile::Incident));
        assert!(matches!(
            query(Some("forensics")).profile(),
            Err(AppError::BadRequest(_))
        ));
    }
}
