use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::domain::{ExtractionStatus, FileId};
use super::job::MissingContext;
use super::list::IntakeList;
use super::transport::{IntakeTransport, TransportError};

pub const ARTIFACT_EXTENSION: &str = "csv";
const FALLBACK_ARTIFACT_NAME: &str = "document";

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    MissingContext(#[from] MissingContext),
    #[error("'{document}' is not ready for download (status: {status})")]
    NotReady { document: String, status: String },
    #[error("download of '{document}' failed: {source}")]
    Transport {
        document: String,
        #[source]
        source: TransportError,
    },
    #[error("download of '{document}' returned an empty file")]
    EmptyPayload { document: String },
    #[error("could not save '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a download that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    /// The file left the list before or while the artifact was fetched.
    Discarded,
}

/// Fetches extracted CSV artifacts and saves them into a local directory.
pub struct DownloadInitiator<T> {
    transport: Arc<T>,
    directory: PathBuf,
}

impl<T> Clone for DownloadInitiator<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            directory: self.directory.clone(),
        }
    }
}

impl<T> DownloadInitiator<T>
where
    T: IntakeTransport + 'static,
{
    pub fn new(transport: Arc<T>, directory: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Local file name for a document's artifact. Only the last path component of the
    /// document name is used, so the artifact always lands inside `directory`.
    pub fn artifact_path(&self, document_name: &str) -> PathBuf {
        let base = document_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        let base = match base {
            "" | "." | ".." => FALLBACK_ARTIFACT_NAME,
            other => other,
        };
        self.directory.join(format!("{base}.{ARTIFACT_EXTENSION}"))
    }

    /// Download the artifact of one list entry once its extraction has completed.
    pub async fn download_entity(
        &self,
        list: &Mutex<IntakeList>,
        id: &FileId,
        client_id: &str,
    ) -> Result<DownloadOutcome, DownloadError> {
        let document = {
            let guard = list.lock().await;
            let Some(entity) = guard.get(id) else {
                debug!(file_id = %id, "download ignored for missing file");
                return Ok(DownloadOutcome::Discarded);
            };
            if entity.status != ExtractionStatus::ExtractCompleted {
                return Err(DownloadError::NotReady {
                    document: entity.file.name.clone(),
                    status: entity.status.label().to_string(),
                });
            }
            entity.file.name.clone()
        };

        let bytes = self.fetch(&document, client_id).await?;

        if !list.lock().await.contains(id) {
            debug!(file_id = %id, document = %document, "artifact discarded for removed file");
            return Ok(DownloadOutcome::Discarded);
        }

        self.save(&document, &bytes).await.map(DownloadOutcome::Saved)
    }

    /// Request `document_name`'s artifact for `client_id` and save it as
    /// `{document_name}.csv`.
    pub async fn download(
        &self,
        document_name: &str,
        client_id: &str,
    ) -> Result<PathBuf, DownloadError> {
        let bytes = self.fetch(document_name, client_id).await?;
        self.save(document_name, &bytes).await
    }

    async fn fetch(&self, document: &str, client_id: &str) -> Result<Vec<u8>, DownloadError> {
        let bytes = self
            .transport
            .download_csv(document, client_id)
            .await
            .map_err(|source| {
                warn!(document, error = %source, "artifact download failed");
                DownloadError::Transport {
                    document: document.to_string(),
                    source,
                }
            })?;

        if bytes.is_empty() {
            warn!(document, "artifact download returned no data");
            return Err(DownloadError::EmptyPayload {
                document: document.to_string(),
            });
        }

        Ok(bytes)
    }

    async fn save(&self, document: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        let path = self.artifact_path(document);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;
        info!(document, path = %path.display(), bytes = bytes.len(), "artifact saved");
        Ok(path)
    }
}
