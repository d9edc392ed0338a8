use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, GraphCredentials};
use crate::docx::DOCX_MIME;
use crate::io::get_default_reports_dir;

pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A report written locally for the user to pick up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub path: PathBuf,
    pub mime: &'static str,
}

/// Write the report into `dir` under `filename`
pub async fn offer_download(buffer: &[u8], dir: &Path, filename: &str) -> Result<Download> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

    let path = dir.join(filename);
    tokio::fs::write(&path, buffer)
        .await
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = buffer.len(), "report saved");
    Ok(Download {
        path,
        mime: DOCX_MIME,
    })
}

/// Result of saving and, when an uploader is given, uploading a report.
/// The two steps fail independently.
#[derive(Debug)]
pub struct PublishOutcome {
    pub download: Result<Download>,
    pub upload: Option<Result<(), UploadError>>,
}

/// Save the report locally, then upload it even if the local save failed.
///
/// `output_dir` falls back to [`get_default_reports_dir`].
pub async fn publish(
    buffer: Vec<u8>,
    filename: &str,
    output_dir: Option<&Path>,
    uploader: Option<&OneDriveUploader>,
) -> PublishOutcome {
    let download = match output_dir {
        Some(dir) => offer_download(&buffer, dir, filename).await,
        None => match get_default_reports_dir() {
            Ok(dir) => offer_download(&buffer, &dir, filename).await,
            Err(e) => Err(e),
        },
    };
    if let Err(e) = &download {
        tracing::debug!(error = %format!("{:#}", e), "local save failed");
    }

    let upload = match uploader {
        Some(uploader) => Some(uploader.upload(buffer, filename).await),
        None => None,
    };

    PublishOutcome { download, upload }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Error getting OneDrive access token: {0}")]
    Token(String),
    #[error("Error uploading file to OneDrive: {0}")]
    Transport(String),
    #[error("Error uploading file to OneDrive: {status} - {body}")]
    Status { status: u16, body: String },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Interpret the upload response. Only 201 Created counts as success.
pub fn evaluate_upload_response(status: u16, body: &str) -> Result<(), UploadError> {
    if status == StatusCode::CREATED.as_u16() {
        Ok(())
    } else {
        Err(UploadError::Status {
            status,
            body: body.to_string(),
        })
    }
}

/// Uploads reports into a fixed OneDrive folder through Microsoft Graph
pub struct OneDriveUploader {
    client: Client,
    credentials: GraphCredentials,
    token_url: String,
    folder_url: String,
}

impl OneDriveUploader {
    pub fn new(credentials: GraphCredentials, folder_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let token_url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            credentials.tenant_id
        );

        Ok(Self {
            client,
            credentials,
            token_url,
            folder_url,
        })
    }

    /// `None` when the config carries no Graph credentials
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        config
            .graph
            .clone()
            .map(|credentials| {
                Self::new(
                    credentials,
                    config.onedrive_folder_url.clone(),
                    DEFAULT_TIMEOUT,
                )
            })
            .transpose()
    }

    /// `<folder><filename>:/content`, with the filename percent-encoded
    pub fn upload_url(&self, filename: &str) -> String {
        format!(
            "{}{}:/content",
            self.folder_url,
            urlencoding::encode(filename)
        )
    }

    async fn access_token(&self) -> Result<String, UploadError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| UploadError::Token(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| UploadError::Token(e.to_string()))?;

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| UploadError::Token(e.to_string()))?;

        Ok(token.access_token)
    }

    /// Exchange credentials for a token, then PUT the document
    pub async fn upload(&self, buffer: Vec<u8>, filename: &str) -> Result<(), UploadError> {
        let token = self.access_token().await?;
        let url = self.upload_url(filename);
        tracing::debug!(%url, bytes = buffer.len(), "uploading report");

        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/octet-stream")
            .body(buffer)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("unknown error"));

        let outcome = evaluate_upload_response(status, &body);
        match &outcome {
            Ok(()) => tracing::info!(filename, "report uploaded"),
            Err(e) => tracing::debug!(error = %e, "report upload failed"),
        }
        outcome
    }
}
