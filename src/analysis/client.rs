//! Client for the remote vision-simulation service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use super::{wire, AnalysisResult, VisionType};
use crate::config::AnalyzerConfig;
use crate::error::{Error, RequestFailure, Result};

/// Remote collaborator that simulates a vision deficiency on an image and
/// measures its contrast.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// One request, one response. No retry.
    async fn analyze(
        &self,
        file_name: &str,
        image: Vec<u8>,
        vision_type: VisionType,
    ) -> Result<AnalysisResult>;
}

/// HTTP implementation posting a multipart form to the `/analyze` endpoint
pub struct HttpAnalysisService {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnalysisService {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: config.timeout(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(
        &self,
        file_name: &str,
        image: Vec<u8>,
        vision_type: VisionType,
    ) -> Result<AnalysisResult> {
        let size = image.len();
        let form = Form::new()
            .part("file", Part::bytes(image).file_name(file_name.to_string()))
            .text("vision_type", vision_type.as_str());

        debug!(endpoint = %self.endpoint, %vision_type, bytes = size, "posting image for analysis");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(RequestFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestFailure::Status(status.as_u16()).into());
        }

        let body = response.bytes().await.map_err(RequestFailure::Transport)?;
        wire::parse_response(&body)
    }
}
