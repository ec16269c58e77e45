use async_trait::async_trait;

use super::wire::{ExtractionRequest, ExtractionResponse};

/// Network boundary of the intake workflow, so dispatch and download can be exercised
/// without a server.
#[async_trait]
pub trait IntakeTransport: Send + Sync {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, TransportError>;

    /// Fetch the CSV artifact generated for `document_name`.
    async fn download_csv(
        &self,
        document_name: &str,
        client_id: &str,
    ) -> Result<Vec<u8>, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Network(String),
    #[error("service responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable service response: {0}")]
    Decode(String),
}
