use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::intake::{
    ExtractionFile, ExtractionRequest, ExtractionResponse, ExtractionResult, ExtractionStatus,
    FormType, JobCredentials,
};

use super::csv_export::render_csv;
use super::extractor::{sanitize_blob_name, FieldExtractor};
use super::sorter::{DocumentSorter, KeywordSorter, SortRequest, SortResponse, SortedFile};
use super::store::{DocumentRecord, ExtractionStore, StoreError};

/// Body of `get_client_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDataRequest {
    #[serde(rename = "clientID")]
    pub client_id: String,
}

/// One row of a client's extracted documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDocument {
    pub doc_name: String,
    pub form_type: FormType,
    #[serde(rename = "versionID")]
    pub version_id: String,
    pub field_count: usize,
    pub extracted_at: DateTime<Utc>,
}

impl From<DocumentRecord> for ClientDocument {
    fn from(record: DocumentRecord) -> Self {
        Self {
            doc_name: record.document_name,
            form_type: record.form_type,
            version_id: record.version_id,
            field_count: record.fields.len(),
            extracted_at: record.extracted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDataResponse {
    pub data: Vec<ClientDocument>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("clientID is required")]
    MissingClientId,
    #[error("versionID is required")]
    MissingVersionId,
    #[error("document '{0}' has no extracted data")]
    DocumentNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("could not render csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Server side of the extraction round trip: runs the extractor per file, keeps the
/// latest result per `(client, document)`, renders stored results as CSV, and suggests form
/// types for unsorted uploads.
pub struct ExtractionService<S, E> {
    store: Arc<S>,
    extractor: Arc<E>,
    sorter: Arc<dyn DocumentSorter>,
}

impl<S, E> Clone for ExtractionService<S, E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            extractor: Arc::clone(&self.extractor),
            sorter: Arc::clone(&self.sorter),
        }
    }
}

impl<S, E> ExtractionService<S, E>
where
    S: ExtractionStore + 'static,
    E: FieldExtractor + 'static,
{
    pub fn new(store: Arc<S>, extractor: Arc<E>) -> Self {
        Self {
            store,
            extractor,
            sorter: Arc::new(KeywordSorter),
        }
    }

    pub fn with_sorter(mut self, sorter: Arc<dyn DocumentSorter>) -> Self {
        self.sorter = sorter;
        self
    }

    /// Suggest a form type for each file, in request order. Contents that are not valid
    /// base64 are sorted by file name alone.
    pub fn sort_batch(&self, request: SortRequest) -> SortResponse {
        let sorted_files: Vec<SortedFile> = request
            .files
            .into_iter()
            .map(|file| {
                let content = STANDARD.decode(file.content.as_bytes()).unwrap_or_else(|err| {
                    warn!(file = %file.name, error = %err, "sorting by name only");
                    Vec::new()
                });
                let form_type = self.sorter.sort(&file.name, &content);
                debug!(file = %file.name, form_type = %form_type, "file sorted");
                SortedFile {
                    file_name: file.name,
                    form_type,
                }
            })
            .collect();

        info!(files = sorted_files.len(), "sort batch finished");
        SortResponse { sorted_files }
    }

    /// Process a batch concurrently, one blocking task per file. Results follow the
    /// request order; a failing file never fails the batch.
    pub async fn process_batch(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionResponse, ServiceError> {
        let credentials = credentials(&request)?;
        info!(
            client_id = %credentials.client_id,
            version_id = %credentials.version_id,
            files = request.files.len(),
            "processing extraction batch"
        );

        let handles: Vec<_> = request
            .files
            .into_iter()
            .map(|file| {
                let service = self.clone();
                let credentials = credentials.clone();
                let id = file.id.clone();
                let handle =
                    tokio::task::spawn_blocking(move || service.process_file(&credentials, file));
                (id, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let result = handle.await.unwrap_or_else(|err| {
                warn!(file_id = %id, error = %err, "extraction task aborted");
                ExtractionResult::new(
                    id,
                    ExtractionStatus::Failed {
                        reason: format!("extraction task failed: {err}"),
                    },
                )
            });
            results.push(result);
        }

        Ok(ExtractionResponse { results })
    }

    /// Extract a single file and record the outcome.
    pub fn process_file(
        &self,
        credentials: &JobCredentials,
        file: ExtractionFile,
    ) -> ExtractionResult {
        let failed = |reason: String| {
            warn!(file_id = %file.id, name = %file.name, reason = %reason, "file extraction failed");
            ExtractionResult::new(file.id.clone(), ExtractionStatus::Failed { reason })
        };

        let content = match STANDARD.decode(file.content.as_bytes()) {
            Ok(content) => content,
            Err(err) => return failed(format!("invalid file content: {err}")),
        };

        if !file.form_type.is_extractable() {
            debug!(file_id = %file.id, "no form type; upload only");
            return ExtractionResult::new(file.id.clone(), ExtractionStatus::UploadCompleted);
        }

        let fields = match self.extractor.extract(file.form_type, &content) {
            Ok(fields) => fields,
            Err(err) => return failed(err.to_string()),
        };

        if fields.is_empty() {
            debug!(file_id = %file.id, form_type = %file.form_type, "extraction found no fields");
            return ExtractionResult::new(file.id.clone(), ExtractionStatus::EmptyExtraction);
        }

        let count = fields.len();
        let record = DocumentRecord {
            client_id: credentials.client_id.clone(),
            document_name: sanitize_blob_name(&file.name),
            version_id: credentials.version_id.clone(),
            form_type: file.form_type,
            fields,
            extracted_at: Utc::now(),
        };
        if let Err(err) = self.store.upsert(record) {
            return failed(err.to_string());
        }

        info!(file_id = %file.id, form_type = %file.form_type, fields = count, "file extracted");
        ExtractionResult::new(file.id.clone(), ExtractionStatus::ExtractCompleted).with_fields(count)
    }

    /// CSV artifact of a stored extraction. `document_name` may be the raw upload name.
    pub fn export_csv(&self, client_id: &str, document_name: &str) -> Result<Vec<u8>, ServiceError> {
        let client_id = required_client_id(client_id)?;
        let key = sanitize_blob_name(document_name);
        let record = self
            .store
            .fetch(client_id, &key)?
            .ok_or_else(|| ServiceError::DocumentNotFound(document_name.to_string()))?;

        Ok(render_csv(&record.document_name, &record.fields)?)
    }

    pub fn client_data(&self, client_id: &str) -> Result<Vec<ClientDocument>, ServiceError> {
        let client_id = required_client_id(client_id)?;
        Ok(self
            .store
            .for_client(client_id)?
            .into_iter()
            .map(ClientDocument::from)
            .collect())
    }
}

/// Client ids are stored trimmed, so every lookup trims the same way.
fn required_client_id(client_id: &str) -> Result<&str, ServiceError> {
    match client_id.trim() {
        "" => Err(ServiceError::MissingClientId),
        trimmed => Ok(trimmed),
    }
}

fn credentials(request: &ExtractionRequest) -> Result<JobCredentials, ServiceError> {
    let client_id = required_client_id(&request.client_id)?;
    if request.version_id.trim().is_empty() {
        return Err(ServiceError::MissingVersionId);
    }
    Ok(JobCredentials::new(client_id, request.version_id.trim()))
}
