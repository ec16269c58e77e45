use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::intake::{
    ExtractionRequest, ExtractionResponse, ExtractionResult, ExtractionStatus, FileId,
    FormType, IntakeList, IntakeTransport, JobContext, JobCredentials, RawFile,
    TransportError,
};

type Responder =
    Box<dyn Fn(&ExtractionRequest) -> Result<ExtractionResponse, TransportError> + Send + Sync>;

/// In-process stand-in for the extraction service.
pub(super) struct FakeTransport {
    responder: Responder,
    requests: Mutex<Vec<ExtractionRequest>>,
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
    download_calls: Mutex<Vec<(String, String)>>,
    observed_list: Mutex<Option<Arc<tokio::sync::Mutex<IntakeList>>>>,
    statuses_at_send: Mutex<Vec<(FileId, ExtractionStatus)>>,
    sent: Arc<Notify>,
    release: Option<Arc<Notify>>,
    fetching: Arc<Notify>,
    download_release: Option<Arc<Notify>>,
}

impl FakeTransport {
    pub(super) fn new<F>(responder: F) -> Self
    where
        F: Fn(&ExtractionRequest) -> Result<ExtractionResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            artifacts: Mutex::new(HashMap::new()),
            download_calls: Mutex::new(Vec::new()),
            observed_list: Mutex::new(None),
            statuses_at_send: Mutex::new(Vec::new()),
            sent: Arc::new(Notify::new()),
            release: None,
            fetching: Arc::new(Notify::new()),
            download_release: None,
        }
    }

    /// Completes every extractable file and reports `None` files as upload-only.
    pub(super) fn completing() -> Self {
        Self::new(|request| {
            Ok(ExtractionResponse {
                results: request
                    .files
                    .iter()
                    .map(|file| {
                        let status = if file.form_type == FormType::None {
                            ExtractionStatus::UploadCompleted
                        } else {
                            ExtractionStatus::ExtractCompleted
                        };
                        ExtractionResult::new(file.id.clone(), status)
                    })
                    .collect(),
            })
        })
    }

    pub(super) fn failing(status: u16) -> Self {
        Self::new(move |_| {
            Err(TransportError::Status {
                status,
                body: "extraction backend unavailable".to_string(),
            })
        })
    }

    /// Hold every extraction response until the returned handle is notified.
    pub(super) fn gated(mut self) -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        self.release = Some(Arc::clone(&release));
        (self, release)
    }

    /// Hold every artifact download until the returned handle is notified.
    pub(super) fn gated_downloads(mut self) -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        self.download_release = Some(Arc::clone(&release));
        (self, release)
    }

    pub(super) fn with_artifact(self, document: &str, bytes: &[u8]) -> Self {
        self.artifacts
            .lock()
            .expect("artifact mutex")
            .insert(document.to_string(), bytes.to_vec());
        self
    }

    pub(super) fn observe(&self, list: Arc<tokio::sync::Mutex<IntakeList>>) {
        *self.observed_list.lock().expect("observer mutex") = Some(list);
    }

    pub(super) fn sent(&self) -> Arc<Notify> {
        Arc::clone(&self.sent)
    }

    pub(super) fn fetching(&self) -> Arc<Notify> {
        Arc::clone(&self.fetching)
    }

    pub(super) fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().expect("request mutex").clone()
    }

    pub(super) fn statuses_at_send(&self) -> Vec<(FileId, ExtractionStatus)> {
        self.statuses_at_send.lock().expect("status mutex").clone()
    }

    pub(super) fn download_calls(&self) -> Vec<(String, String)> {
        self.download_calls.lock().expect("download mutex").clone()
    }
}

#[async_trait]
impl IntakeTransport for FakeTransport {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, TransportError> {
        self.requests
            .lock()
            .expect("request mutex")
            .push(request.clone());

        let observed = self.observed_list.lock().expect("observer mutex").clone();
        if let Some(list) = observed {
            let guard = list.lock().await;
            let statuses: Vec<(FileId, ExtractionStatus)> = request
                .files
                .iter()
                .filter_map(|file| {
                    guard
                        .get(&file.id)
                        .map(|entity| (file.id.clone(), entity.status.clone()))
                })
                .collect();
            drop(guard);
            self.statuses_at_send
                .lock()
                .expect("status mutex")
                .extend(statuses);
        }

        self.sent.notify_one();
        if let Some(release) = &self.release {
            release.notified().await;
        }

        (self.responder)(request)
    }

    async fn download_csv(
        &self,
        document_name: &str,
        client_id: &str,
    ) -> Result<Vec<u8>, TransportError> {
        self.download_calls
            .lock()
            .expect("download mutex")
            .push((document_name.to_string(), client_id.to_string()));

        self.fetching.notify_one();
        if let Some(release) = &self.download_release {
            release.notified().await;
        }

        self.artifacts
            .lock()
            .expect("artifact mutex")
            .get(document_name)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                status: 404,
                body: "document not found".to_string(),
            })
    }
}

pub(super) fn raw(key: &str, name: &str, body: &str) -> RawFile {
    RawFile::new(key, name, body.as_bytes().to_vec())
}

pub(super) fn job() -> JobContext {
    JobContext::new(Some("C-100".to_string()), Some("2024.1".to_string()))
}

pub(super) fn credentials() -> JobCredentials {
    JobCredentials::new("C-100", "2024.1")
}

pub(super) fn list_with(files: Vec<RawFile>) -> (IntakeList, Vec<FileId>) {
    let mut list = IntakeList::new();
    let report = list.reconcile(files);
    (list, report.added)
}

pub(super) fn status_of(list: &IntakeList, id: &FileId) -> ExtractionStatus {
    list.get(id).expect("file present").status.clone()
}
