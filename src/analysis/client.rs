use super::types::{AnalysisResult, JobId, PollOutcome};
use crate::config::Config;
use crate::error::AnalyzerError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

/// The two endpoints of the analyzer server.
#[async_trait]
pub trait AnalyzerApi: Send + Sync {
    /// `POST /analyze/upload`; returns the plain-text response body.
    async fn upload(&self, file_name: &str, content: Vec<u8>) -> Result<String, AnalyzerError>;

    /// `GET /results/{projectId}`; a 404 means the result is not ready yet.
    async fn fetch_result(&self, job_id: &JobId) -> Result<PollOutcome, AnalyzerError>;
}

pub struct HttpAnalyzerClient {
    client: Client,
    base_url: Url,
}

impl HttpAnalyzerClient {
    pub fn new(config: &Config) -> Result<Self, AnalyzerError> {
        let base_url = Url::parse(&config.server_url)
            .map_err(|e| AnalyzerError::InvalidServerUrl(format!("{}: {}", config.server_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AnalyzerError::InvalidServerUrl(config.server_url.clone()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AnalyzerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AnalyzerError::InvalidServerUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn upload_url(&self) -> Result<Url, AnalyzerError> {
        self.endpoint(&["analyze", "upload"])
    }

    pub fn result_url(&self, job_id: &JobId) -> Result<Url, AnalyzerError> {
        self.endpoint(&["results", job_id.as_str()])
    }
}

#[async_trait]
impl AnalyzerApi for HttpAnalyzerClient {
    async fn upload(&self, file_name: &str, content: Vec<u8>) -> Result<String, AnalyzerError> {
        let url = self.upload_url()?;
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("application/zip")?;
        let form = Form::new().part("file", part);

        debug!(%url, file_name, "sending upload");
        let response = self.client.post(url).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AnalyzerError::Protocol(body));
        }
        Ok(body)
    }

    async fn fetch_result(&self, job_id: &JobId) -> Result<PollOutcome, AnalyzerError> {
        let url = self.result_url(job_id)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(PollOutcome::NotReady);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AnalyzerError::Protocol(body));
        }
        let result: AnalysisResult = serde_json::from_str(&body)?;
        Ok(PollOutcome::Ready(result))
    }
}
