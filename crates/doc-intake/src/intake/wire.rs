//! JSON bodies exchanged with the extraction service.

use serde::{Deserialize, Serialize};

use super::classifier::FormType;
use super::domain::{ExtractionStatus, FileId};

/// Batch extraction request: one entry per file being (re)submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "versionID")]
    pub version_id: String,
    pub files: Vec<ExtractionFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionFile {
    pub id: FileId,
    pub name: String,
    pub form_type: FormType,
    /// Base64 (standard alphabet) file contents.
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub results: Vec<ExtractionResult>,
}

/// Outcome for one file of the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub id: FileId,
    pub status: ExtractionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<usize>,
}

impl ExtractionResult {
    pub fn new(id: FileId, status: ExtractionStatus) -> Self {
        let error = match &status {
            ExtractionStatus::Failed { reason } if !reason.is_empty() => Some(reason.clone()),
            _ => None,
        };
        Self {
            id,
            status,
            error,
            fields: None,
        }
    }

    pub fn with_fields(mut self, fields: usize) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Status with the error message folded back into failed results.
    pub fn resolved_status(&self) -> ExtractionStatus {
        ExtractionStatus::from_report(self.status.label(), self.error.clone())
    }
}

/// Body of the CSV download request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    #[serde(rename = "clientID")]
    pub client_id: String,
}
