//! HTTP transport for the intake workflow.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use tracing::debug;

use crate::config::ClientConfig;
use crate::intake::{
    DownloadRequest, ExtractionRequest, ExtractionResponse, IntakeTransport, TransportError,
};

const PROCESS_PATH: [&str; 2] = ["api", "process_doc"];
const DOWNLOAD_PATH: [&str; 2] = ["api", "download_csv"];

/// Talks to the extraction service over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpIntakeTransport {
    client: Client,
    base_url: Url,
}

impl HttpIntakeTransport {
    pub fn new(client: Client, base_url: &str) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| TransportError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Self::new(client, &config.api_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl IntakeTransport for HttpIntakeTransport {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, TransportError> {
        let url = self.endpoint(&PROCESS_PATH)?;
        debug!(%url, files = request.files.len(), "posting extraction batch");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        Self::check(response)
            .await?
            .json::<ExtractionResponse>()
            .await
            .map_err(|err| TransportError::Decode(err.to_string()))
    }

    async fn download_csv(
        &self,
        document_name: &str,
        client_id: &str,
    ) -> Result<Vec<u8>, TransportError> {
        let mut segments = DOWNLOAD_PATH.to_vec();
        segments.push(document_name);
        let url = self.endpoint(&segments)?;
        debug!(%url, "requesting csv artifact");

        let response = self
            .client
            .post(url)
            .json(&DownloadRequest {
                client_id: client_id.to_string(),
            })
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}
