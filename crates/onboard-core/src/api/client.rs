//! API client for the survey platform.
//!
//! This module provides the `SurveyClient` struct for downloading form
//! submissions, and helpers for reading the rotation calendar.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::try_join3;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{RawRecord, RotationWindow};
use crate::pipeline::SourceData;

use super::SurveyError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Full-rotation exports can be large, so this is generous.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum number of retries for rate-limited (429) or 5xx requests.
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds between retries.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Submission download payload. A missing `results` key means no data.
#[derive(Debug, Default, Deserialize)]
struct SubmissionsResponse {
    #[serde(default)]
    results: Vec<RawRecord>,
}

/// Spreadsheet values response: `{"values": [["Rotation No", ...], ...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RotationGrid {
    Bare(Vec<Vec<Value>>),
    Wrapped {
        #[serde(default)]
        values: Vec<Vec<Value>>,
    },
}

/// API client for the survey platform.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct SurveyClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SurveyClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.require_token()?)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Token {}", self.token))?,
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn data_url(&self, asset: &str) -> String {
        format!("{}/assets/{}/data.json", self.base_url, asset)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(response) for success, or the error for the caller to
    /// retry or give up on.
    async fn check_response(
        response: reqwest::Response,
        asset: &str,
    ) -> Result<reqwest::Response, SurveyError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SurveyError::from_status(status, asset, &body))
    }

    async fn get_text(&self, asset: &str, url: &str) -> Result<String> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .send()
                .await
                .map_err(SurveyError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response(response, asset).await {
                Ok(response) => {
                    return response
                        .text()
                        .await
                        .with_context(|| format!("Failed to read response body from {}", url));
                }
                Err(err) if err.is_retryable() && retries < MAX_RETRIES => {
                    retries += 1;
                    warn!(asset = asset, retry = retries, backoff_ms = backoff_ms, error = %err, "Transient failure, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    // ===== Data Fetching Methods =====

    /// Download every submission of a survey asset
    pub async fn fetch_submissions(&self, asset: &str) -> Result<Vec<RawRecord>> {
        let url = self.data_url(asset);
        let body = self.get_text(asset, &url).await?;
        let results = parse_submissions(&body)
            .with_context(|| format!("Failed to parse submissions of asset {}", asset))?;
        debug!(asset = asset, count = results.len(), "Fetched submissions");
        Ok(results)
    }

    /// Medevac forms; an unconfigured asset means no medevacs
    pub async fn fetch_medevac_events(&self, asset: Option<&str>) -> Result<Vec<RawRecord>> {
        match asset {
            Some(asset) => self.fetch_submissions(asset).await,
            None => Ok(Vec::new()),
        }
    }

    /// Disembarkation forms; an unconfigured asset means no disembarkations
    pub async fn fetch_disembark_events(&self, asset: Option<&str>) -> Result<Vec<RawRecord>> {
        match asset {
            Some(asset) => self.fetch_submissions(asset).await,
            None => Ok(Vec::new()),
        }
    }

    /// Fetch the three survey assets concurrently.
    pub async fn fetch_source_data(
        &self,
        config: &Config,
        rotations: Vec<RotationWindow>,
    ) -> Result<SourceData> {
        let asset = config.require_asset()?;
        let (submissions, medevacs, disembarkations) = try_join3(
            self.fetch_submissions(asset),
            self.fetch_medevac_events(config.asset_medevac.as_deref()),
            self.fetch_disembark_events(config.asset_disembark.as_deref()),
        )
        .await?;

        info!(
            submissions = submissions.len(),
            medevacs = medevacs.len(),
            disembarkations = disembarkations.len(),
            rotations = rotations.len(),
            "Fetched source data"
        );

        Ok(SourceData {
            submissions,
            rotations,
            medevacs,
            disembarkations,
        })
    }
}

// ===== Parsing =====

/// Parse a `{"results": [...]}` payload.
pub fn parse_submissions(body: &str) -> Result<Vec<RawRecord>> {
    let parsed: SubmissionsResponse = serde_json::from_str(body)
        .map_err(|e| SurveyError::InvalidResponse(e.to_string()))?;
    Ok(parsed.results)
}

/// Parse a rotation calendar values grid, either wrapped as
/// `{"values": [...]}` or as a bare array of rows.
pub fn parse_rotation_grid(body: &str) -> Result<Vec<RotationWindow>> {
    let grid: RotationGrid =
        serde_json::from_str(body).context("Rotation calendar is not a values grid")?;
    let rows = match grid {
        RotationGrid::Bare(rows) => rows,
        RotationGrid::Wrapped { values } => values,
    };

    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect();
    Ok(RotationWindow::from_value_grid(&rows))
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Read the rotation calendar from a local JSON file.
pub fn load_rotations(path: &Path) -> Result<Vec<RotationWindow>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rotation calendar {}", path.display()))?;
    let rotations = parse_rotation_grid(&contents)
        .with_context(|| format!("Failed to parse rotation calendar {}", path.display()))?;
    if rotations.is_empty() {
        warn!(path = %path.display(), "Rotation calendar has no usable rows");
    }
    Ok(rotations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_submissions() {
        let json = r#"{"count": 2, "next": null, "results": [
            {"_id": 1, "rescue_number": "1", "gender": "female", "_submission_time": "2024-05-02T08:00:00"},
            {"_id": 2, "rescue_number": 2.0, "bracelet_number": 105}
        ]}"#;

        let results = parse_submissions(json).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["gender"], "female");
        assert_eq!(results[1]["bracelet_number"], 105);
    }

    #[test]
    fn test_parse_submissions_without_results() {
        assert!(parse_submissions(r#"{"detail": "empty"}"#).unwrap().is_empty());
        assert!(parse_submissions("<html>").is_err());
    }

    #[test]
    fn test_parse_rotation_grid() {
        let wrapped = r#"{"range": "Rotations!A1:C3", "values": [
            ["Rotation No", "Start date", "End date"],
            ["1", "01/01/2024", "31/01/2024"],
            [2, "01/02/2024", "29/02/2024"]
        ]}"#;
        let rotations = parse_rotation_grid(wrapped).unwrap();
        assert_eq!(rotations.len(), 2);
        assert_eq!(rotations[1].rotation_no, 2);
        assert_eq!(rotations[1].end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let bare = r#"[["Start date", "End date", "Rotation No"], ["05-03-2024", "20-03-2024", "3"]]"#;
        let rotations = parse_rotation_grid(bare).unwrap();
        assert_eq!(rotations[0].rotation_no, 3);
        assert_eq!(rotations[0].start, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_client_urls() {
        let client = SurveyClient::new("https://surveys.example.org/api/v2/", "t0k3n").unwrap();
        assert_eq!(
            client.data_url("aBc"),
            "https://surveys.example.org/api/v2/assets/aBc/data.json"
        );
        let headers = client.auth_headers().unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Token t0k3n");
    }
}
