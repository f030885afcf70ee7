//! Application configuration loaded from environment variables.
//!
//! Variable names are shared with existing deployments and must not change.
//! A `.env` file is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Strava ---
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Redirect URI registered with Strava
    pub oauth_callback_url: String,

    // --- InfluxDB ---
    pub influxdb_url: String,
    pub influxdb_token: String,
    pub influxdb_org: String,
    pub influxdb_bucket: String,

    // --- FTP history ---
    pub project_root_path: PathBuf,
    pub ftp_file_rel_path: PathBuf,

    // --- Runtime ---
    /// Server port
    pub port: u16,
    pub fetch_interval: Duration,
    pub token_refresh_interval: Duration,
    /// Random delay (0..=jitter) added to every scheduled interval
    pub scheduler_jitter: Duration,
    /// Bound on every outbound HTTP request
    pub http_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            oauth_callback_url: "http://localhost:8080/auth/callback".to_string(),
            influxdb_url: "http://localhost:8086".to_string(),
            influxdb_token: "test_influx_token".to_string(),
            influxdb_org: "test-org".to_string(),
            influxdb_bucket: "test-bucket".to_string(),
            project_root_path: PathBuf::from("."),
            ftp_file_rel_path: PathBuf::from("data/ftp.csv"),
            port: 8080,
            fetch_interval: Duration::from_secs(60 * 60),
            token_refresh_interval: Duration::from_secs(24 * 60 * 60),
            scheduler_jitter: Duration::ZERO,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: required("STRAVA_CLIENT_ID")?,
            strava_client_secret: required("STRAVA_CLIENT_SECRET")?,
            oauth_callback_url: env::var("OAUTH_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:8080/auth/callback".to_string()),

            influxdb_url: required("INFLUXDB_URL")?,
            influxdb_token: required("INFLUXDB_TOKEN")?,
            influxdb_org: required("INFLUXDB_ORG")?,
            influxdb_bucket: required("INFLUXDB_BUCKET")?,

            project_root_path: env::var("PROJECT_ROOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            ftp_file_rel_path: required("FTP_FILE_REL_PATH").map(PathBuf::from)?,

            port: parse_or("PORT", 8080)?,
            fetch_interval: Duration::from_secs(parse_or("FETCH_INTERVAL_SECS", 60 * 60)?),
            token_refresh_interval: Duration::from_secs(parse_or(
                "TOKEN_REFRESH_INTERVAL_SECS",
                24 * 60 * 60,
            )?),
            scheduler_jitter: Duration::from_secs(parse_or("SCHEDULER_JITTER_SECS", 0)?),
            http_timeout: Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", 30)?),
        })
    }

    /// Absolute (or root-relative) path of the FTP history CSV.
    pub fn ftp_file_path(&self) -> PathBuf {
        self.project_root_path.join(&self.ftp_file_rel_path)
    }
}

/// Read a required, non-empty variable. Surrounding whitespace is trimmed.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}
