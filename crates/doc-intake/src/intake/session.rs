use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::classifier::FormType;
use super::dispatch::{DispatchReport, ExtractionDispatcher, ExtractionTarget};
use super::domain::{FileEntity, FileId, RawFile};
use super::download::{DownloadError, DownloadInitiator, DownloadOutcome};
use super::job::{JobContext, MissingContext};
use super::list::{IntakeList, ReconcileReport};
use super::transport::IntakeTransport;
use super::view::IntakeView;

/// Clonable handle that owns the intake list for one operator session.
///
/// All edits (resync, remove, classify, extract, download) go through here so that
/// overlapping network calls resolve against a single working set.
pub struct IntakeSession<T> {
    list: Arc<Mutex<IntakeList>>,
    job: Arc<RwLock<JobContext>>,
    dispatcher: ExtractionDispatcher<T>,
    downloads: DownloadInitiator<T>,
}

impl<T> Clone for IntakeSession<T> {
    fn clone(&self) -> Self {
        Self {
            list: Arc::clone(&self.list),
            job: Arc::clone(&self.job),
            dispatcher: self.dispatcher.clone(),
            downloads: self.downloads.clone(),
        }
    }
}

impl<T> IntakeSession<T>
where
    T: IntakeTransport + 'static,
{
    pub fn new(transport: Arc<T>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            list: Arc::new(Mutex::new(IntakeList::new())),
            job: Arc::new(RwLock::new(JobContext::default())),
            dispatcher: ExtractionDispatcher::new(Arc::clone(&transport)),
            downloads: DownloadInitiator::new(transport, download_dir),
        }
    }

    /// Shared list, for collaborators that observe it directly.
    pub fn list(&self) -> Arc<Mutex<IntakeList>> {
        Arc::clone(&self.list)
    }

    pub async fn set_job(&self, job: JobContext) {
        *self.job.write().await = job;
    }

    pub async fn job(&self) -> JobContext {
        self.job.read().await.clone()
    }

    pub async fn reconcile(&self, upstream: Vec<RawFile>) -> ReconcileReport {
        self.list.lock().await.reconcile(upstream)
    }

    pub async fn remove(&self, id: &FileId) -> bool {
        self.list.lock().await.remove(id).is_some()
    }

    pub async fn set_form_type(&self, id: &FileId, form_type: FormType) -> bool {
        self.list.lock().await.set_form_type(id, form_type)
    }

    pub async fn snapshot(&self) -> Vec<FileEntity> {
        self.list.lock().await.iter().cloned().collect()
    }

    pub async fn render(&self) -> IntakeView {
        let job = self.job().await;
        self.list.lock().await.render(&job)
    }

    /// Submit files for extraction. Refused until both job identifiers are set.
    pub async fn extract(&self, target: ExtractionTarget) -> Result<DispatchReport, MissingContext> {
        let credentials = self.job().await.require()?;
        Ok(self
            .dispatcher
            .extract(&self.list, &credentials, target)
            .await)
    }

    pub async fn download(&self, id: &FileId) -> Result<DownloadOutcome, DownloadError> {
        let credentials = self.job().await.require()?;
        self.downloads
            .download_entity(&self.list, id, &credentials.client_id)
            .await
    }

    pub fn downloads(&self) -> &DownloadInitiator<T> {
        &self.downloads
    }
}
