//! Configuration module

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Name of the column appended to every labeled dataset
pub const LABEL_COLUMN: &str = "Threat_Detected";

/// Detector profile.
///
/// The two dashboards this service replaces only differed in contamination,
/// ignored columns and the name of the downloaded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// General purpose dataset scan
    Dashboard,
    /// Log/incident scan, ignores a ground-truth `Class` column
    Incident,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Dashboard, Profile::Incident];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Dashboard => "dashboard",
            Profile::Incident => "incident",
        }
    }

    /// Title of the Normal/Threat count chart
    pub fn chart_title(&self) -> &'static str {
        match self {
            Profile::Dashboard => "Threat vs Normal Distribution",
            Profile::Incident => "Detection Summary",
        }
    }

    /// Preset settings for this profile, before env overrides
    pub fn preset(&self) -> DetectionSettings {
        match self {
            Profile::Dashboard => DetectionSettings {
                contamination: 0.01,
                excluded_columns: Vec::new(),
                report_file_name: "detection_results.csv".to_string(),
                ..DetectionSettings::default()
            },
            Profile::Incident => DetectionSettings {
                contamination: 0.002,
                excluded_columns: vec!["Class".to_string()],
                report_file_name: "incident_report.csv".to_string(),
                ..DetectionSettings::default()
            },
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Profile::Dashboard),
            "incident" => Ok(Profile::Incident),
            other => Err(format!("Unknown detector profile '{}'", other)),
        }
    }
}

/// Isolation forest and output settings for one detection run
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct DetectionSettings {
    /// Number of trees in the ensemble
    #[validate(range(min = 1, max = 10000))]
    pub n_estimators: usize,

    /// Rows drawn per tree (capped at the row count)
    #[validate(range(min = 1))]
    pub max_samples: usize,

    /// Expected proportion of outliers
    #[validate(range(exclusive_min = 0.0, max = 0.5))]
    pub contamination: f64,

    pub random_seed: u64,

    /// Columns never used as features
    pub excluded_columns: Vec<String>,

    #[validate(length(min = 1))]
    pub label_column: String,

    #[validate(length(min = 1))]
    pub report_file_name: String,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.01,
            random_seed: 42,
            excluded_columns: Vec::new(),
            label_column: LABEL_COLUMN.to_string(),
            report_file_name: "detection_results.csv".to_string(),
        }
    }
}

/// Env overrides applied on top of every profile preset
#[derive(Debug, Clone, Default)]
pub struct DetectorOverrides {
    pub contamination: Option<f64>,
    pub n_estimators: Option<usize>,
    pub random_seed: Option<u64>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Upper bound on a request body, in bytes
    pub max_upload_bytes: usize,

    /// Rows shown when previewing an upload
    pub preview_rows: usize,

    /// Trailing rows shown with detection results
    pub result_rows: usize,

    /// Profile used when a request does not pick one
    pub default_profile: Profile,

    pub overrides: DetectorOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            preview_rows: 5,
            result_rows: 10,
            default_profile: Profile::Dashboard,
            overrides: DetectorOverrides::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parse_var("PORT").unwrap_or(defaults.port),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),

            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),

            preview_rows: parse_var("PREVIEW_ROWS").unwrap_or(defaults.preview_rows),

            result_rows: parse_var("RESULT_ROWS").unwrap_or(defaults.result_rows),

            default_profile: env::var("DETECTOR_PROFILE")
                .ok()
                .and_then(|p| match p.parse() {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        tracing::warn!("{}, falling back to dashboard", e);
                        None
                    }
                })
                .unwrap_or(defaults.default_profile),

            overrides: DetectorOverrides {
                contamination: parse_var("DETECTOR_CONTAMINATION"),
                n_estimators: parse_var("DETECTOR_ESTIMATORS"),
                random_seed: parse_var("DETECTOR_SEED"),
            },
        }
    }

    /// Resolve the settings for a profile, applying env overrides
    pub fn settings_for(&self, profile: Profile) -> Result<DetectionSettings, validator::ValidationErrors> {
        let mut settings = profile.preset();

        if let Some(c) = self.overrides.contamination {
            settings.contamination = c;
        }
        if let Some(n) = self.overrides.n_estimators {
            settings.n_estimators = n;
        }
        if let Some(seed) = self.overrides.random_seed {
            settings.random_seed = seed;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_where_the_dashboards_did() {
        let dashboard = Profile::Dashboard.preset();
        let incident = Profile::Incident.preset();

        assert_eq!(dashboard.n_estimators, 100);
        assert_eq!(incident.n_estimators, 100);
        assert_eq!(dashboard.random_seed, incident.random_seed);
        assert_eq!(dashboard.contamination, 0.01);
        assert_eq!(incident.contamination, 0.002);
        assert!(dashboard.excluded_columns.is_empty());
        assert_eq!(incident.excluded_columns, vec!["Class".to_string()]);
        assert_eq!(incident.report_file_name, "incident_report.csv");
    }

    #[test]
    fn overrides_apply_to_every_profile() {
        let config = Config {
            overrides: DetectorOverrides {
                contamination: Some(0.05),
                n_estimators: Some(20),
                random_seed: Some(7),
            },
            ..Config::default()
        };

        for profile in Profile::ALL {
            let settings = config.settings_for(profile).unwrap();
            assert_eq!(settings.contamination, 0.05);
            assert_eq!(settings.n_estimators, 20);
            assert_eq!(settings.random_seed, 7);
        }
    }

    #[test]
    fn out_of_range_contamination_is_rejected() {
        for bad in [0.0, 0.75, -0.1] {
            let config = Config {
                overrides: DetectorOverrides {
                    contamination: Some(bad),
                    ..DetectorOverrides::default()
                },
                ..Config::default()
            };
            assert!(config.settings_for(Profile::Dashboard).is_err(), "{} accepted", bad);
        }
    }

    #[test]
    fn profile_parsing() {
        assert_eq!("Incident".parse::<Profile>().unwrap(), Profile::Incident);
        assert_eq!(" dashboard ".parse::<Profile>().unwrap(), Profile::Dashboard);
        assert!("admin".parse::<Profile>().is_err());
    }
}
