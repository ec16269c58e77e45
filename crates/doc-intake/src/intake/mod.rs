//! Intake list, classification, extraction dispatch, and artifact download.

pub mod classifier;
pub mod dispatch;
pub mod domain;
pub mod download;
pub mod factory;
pub mod job;
pub mod list;
pub mod session;
pub mod transport;
pub mod view;
pub mod wire;

#[cfg(test)]
mod tests;

pub use classifier::{FormType, InvalidFormType};
pub use dispatch::{
    DispatchReport, ExtractionDispatcher, ExtractionTarget, ExtractionTicket, PendingExtraction,
};
pub use domain::{ExtractionStatus, FileEntity, FileId, FileMeta, FilePayload, RawFile, SourceKey};
pub use download::{DownloadError, DownloadInitiator, DownloadOutcome, ARTIFACT_EXTENSION};
pub use factory::FileEntityFactory;
pub use job::{JobContext, JobCredentials, MissingContext};
pub use list::{IntakeList, ReconcileReport};
pub use session::IntakeSession;
pub use transport::{IntakeTransport, TransportError};
pub use view::{FileRow, IntakeView, MissingPrompt, StatusTone, COLUMN_HEADERS};
pub use wire::{
    DownloadRequest, ExtractionFile, ExtractionRequest, ExtractionResponse, ExtractionResult,
};
