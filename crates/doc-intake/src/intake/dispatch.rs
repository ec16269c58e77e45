use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::domain::{ExtractionStatus, FileId};
use super::job::JobCredentials;
use super::list::IntakeList;
use super::transport::IntakeTransport;
use super::wire::{ExtractionFile, ExtractionRequest, ExtractionResponse};

/// Which files an extraction run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionTarget {
    All,
    Only(Vec<FileId>),
}

/// Ids and attempt numbers of the files an in-flight request was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionTicket {
    attempts: HashMap<FileId, u32>,
}

impl ExtractionTicket {
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.attempts.contains_key(id)
    }

    fn attempt(&self, id: &FileId) -> Option<u32> {
        self.attempts.get(id).copied()
    }
}

/// A request that has been staged on the list and is ready to send.
#[derive(Debug, Clone)]
pub struct PendingExtraction {
    pub ticket: ExtractionTicket,
    pub request: ExtractionRequest,
}

/// Summary of one extraction run, including the operator-facing failure message when the
/// request itself did not go through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub requested: usize,
    pub applied: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl DispatchReport {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

const MISSING_RESULT: &str = "no result returned";
const NON_TERMINAL_RESULT: &str = "non-terminal status reported";

impl IntakeList {
    /// Mark the targeted files as extracting and snapshot them into a batch request.
    ///
    /// Every targeted file is `Extracting` before this returns, so no request can be in
    /// flight without its status change being visible.
    pub fn begin_extraction(
        &mut self,
        target: &ExtractionTarget,
        credentials: &JobCredentials,
    ) -> PendingExtraction {
        let selected: Vec<FileId> = match target {
            ExtractionTarget::All => self.ids(),
            ExtractionTarget::Only(ids) => ids
                .iter()
                .filter(|id| self.contains(id))
                .cloned()
                .collect(),
        };

        let mut ticket = ExtractionTicket::default();
        let mut files = Vec::with_capacity(selected.len());

        for id in selected {
            if ticket.contains(&id) {
                continue;
            }
            let Some(entity) = self.get_mut(&id) else {
                continue;
            };

            entity.status = ExtractionStatus::Extracting;
            entity.attempt += 1;
            ticket.attempts.insert(id.clone(), entity.attempt);
            files.push(ExtractionFile {
                id,
                name: entity.file.name.clone(),
                form_type: entity.form_type,
                content: STANDARD.encode(entity.payload.as_bytes()),
            });
        }

        debug!(files = files.len(), "extraction staged");

        PendingExtraction {
            ticket,
            request: ExtractionRequest {
                client_id: credentials.client_id.clone(),
                version_id: credentials.version_id.clone(),
                files,
            },
        }
    }

    /// Apply server results to the files that are still waiting on this attempt.
    ///
    /// Results for files that were removed or resubmitted since the request went out are
    /// dropped, as are results for files the request never contained and repeats of an id
    /// already answered. Requested files the server did not report on, or reported as still
    /// in progress, are marked failed.
    pub fn apply_extraction(
        &mut self,
        ticket: &ExtractionTicket,
        response: ExtractionResponse,
    ) -> DispatchReport {
        let mut report = DispatchReport {
            requested: ticket.len(),
            ..DispatchReport::default()
        };
        let mut answered: HashSet<FileId> = HashSet::with_capacity(response.results.len());

        for result in response.results {
            let Some(attempt) = ticket.attempt(&result.id) else {
                debug!(file_id = %result.id, "result for unrequested file ignored");
                continue;
            };
            if !answered.insert(result.id.clone()) {
                debug!(file_id = %result.id, "duplicate result ignored");
                continue;
            }
            let status = match result.resolved_status() {
                status if status.is_terminal() => status,
                status => ExtractionStatus::Failed {
                    reason: format!("{NON_TERMINAL_RESULT}: '{}'", status.label()),
                },
            };
            if self.settle(&result.id, attempt, status) {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }

        for (id, attempt) in &ticket.attempts {
            if answered.contains(id) {
                continue;
            }
            let status = ExtractionStatus::Failed {
                reason: MISSING_RESULT.to_string(),
            };
            if self.settle(id, *attempt, status) {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }

        info!(
            requested = report.requested,
            applied = report.applied,
            skipped = report.skipped,
            "extraction results applied"
        );
        report
    }

    /// Record a failed request against every file still waiting on this attempt.
    pub fn fail_extraction(&mut self, ticket: &ExtractionTicket, reason: &str) -> DispatchReport {
        let mut report = DispatchReport {
            requested: ticket.len(),
            failure: Some(reason.to_string()),
            ..DispatchReport::default()
        };

        for (id, attempt) in &ticket.attempts {
            let status = ExtractionStatus::Failed {
                reason: reason.to_string(),
            };
            if self.settle(id, *attempt, status) {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }

        warn!(
            requested = report.requested,
            applied = report.applied,
            reason,
            "extraction request failed"
        );
        report
    }

    fn settle(&mut self, id: &FileId, attempt: u32, status: ExtractionStatus) -> bool {
        match self.get_mut(id) {
            Some(entity) if entity.attempt == attempt => {
                debug!(file_id = %id, status = %status, "extraction status updated");
                entity.status = status;
                true
            }
            Some(_) => {
                debug!(file_id = %id, attempt, "stale extraction result dropped");
                false
            }
            None => {
                debug!(file_id = %id, "extraction result for removed file dropped");
                false
            }
        }
    }
}

/// Sends batch extraction requests for a shared intake list.
pub struct ExtractionDispatcher<T> {
    transport: Arc<T>,
}

impl<T> Clone for ExtractionDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> ExtractionDispatcher<T>
where
    T: IntakeTransport + 'static,
{
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Run one extraction round trip. The list lock is released while the request is in
    /// flight, so the list may be edited or resynced before the results come back.
    pub async fn extract(
        &self,
        list: &Mutex<IntakeList>,
        credentials: &JobCredentials,
        target: ExtractionTarget,
    ) -> DispatchReport {
        let pending = list.lock().await.begin_extraction(&target, credentials);
        if pending.ticket.is_empty() {
            debug!("extraction skipped: no matching files");
            return DispatchReport::default();
        }

        info!(
            client_id = %credentials.client_id,
            version_id = %credentials.version_id,
            files = pending.ticket.len(),
            "dispatching extraction batch"
        );

        match self.transport.extract(&pending.request).await {
            Ok(response) => list.lock().await.apply_extraction(&pending.ticket, response),
            Err(err) => list
                .lock()
                .await
                .fail_extraction(&pending.ticket, &err.to_string()),
        }
    }
}
