use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::FormType;

/// Identifier assigned to a file when it enters the intake list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a raw file as handed over by the upload queue. The same handle across two
/// resyncs means the same underlying file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceKey(pub String);

impl From<&str> for SourceKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SourceKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Shared, read-only file contents.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePayload(Arc<[u8]>);

impl FilePayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for FilePayload {
    fn from(value: Vec<u8>) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&[u8]> for FilePayload {
    fn from(value: &[u8]) -> Self {
        Self(Arc::from(value))
    }
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilePayload({} bytes)", self.0.len())
    }
}

/// A file exactly as the upload queue supplies it, before it gets an intake identity.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub source: SourceKey,
    pub name: String,
    pub size: u64,
    pub payload: FilePayload,
    pub path: Option<String>,
}

impl RawFile {
    pub fn new(
        source: impl Into<SourceKey>,
        name: impl Into<String>,
        payload: impl Into<FilePayload>,
    ) -> Self {
        let payload = payload.into();
        Self {
            source: source.into(),
            name: name.into(),
            size: payload.len() as u64,
            payload,
            path: None,
        }
    }

    /// Keep a directory-preserving display path instead of the bare name.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Read a file from disk, keyed by the path it was loaded from.
    pub async fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("'{}' has no usable file name", path.display()),
                )
            })?
            .to_string();

        Ok(Self::new(
            SourceKey(path.display().to_string()),
            name,
            bytes,
        ))
    }
}

/// Intrinsic metadata of the underlying file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
}

/// One uploaded file tracked by the intake list.
#[derive(Debug, Clone)]
pub struct FileEntity {
    pub id: FileId,
    pub source: SourceKey,
    pub file: FileMeta,
    pub payload: FilePayload,
    pub path: String,
    pub form_type: FormType,
    pub status: ExtractionStatus,
    /// Number of extraction submissions so far; results from older attempts are dropped.
    pub attempt: u32,
    pub added_at: DateTime<Utc>,
}

impl FileEntity {
    pub fn download_available(&self) -> bool {
        self.status == ExtractionStatus::ExtractCompleted
    }
}

/// Extraction lifecycle of a single file. The server may report states this client does
/// not know about; those are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExtractionStatus {
    Pending,
    Extracting,
    ExtractCompleted,
    EmptyExtraction,
    UploadCompleted,
    Failed { reason: String },
    Other(String),
}

impl ExtractionStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Extracting => "Extracting",
            Self::ExtractCompleted => "Extract Completed",
            Self::EmptyExtraction => "Empty Extraction",
            Self::UploadCompleted => "Upload Completed",
            Self::Failed { .. } => "Error",
            Self::Other(label) => label,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Extracting)
    }

    /// Build a status from the wire label plus the optional error message that accompanies
    /// failed results.
    pub fn from_report(label: &str, error: Option<String>) -> Self {
        match Self::from(label.to_string()) {
            Self::Failed { .. } => Self::Failed {
                reason: error.unwrap_or_default(),
            },
            other => other,
        }
    }
}

impl From<String> for ExtractionStatus {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "Pending" => Self::Pending,
            "Extracting" => Self::Extracting,
            "Extract Completed" => Self::ExtractCompleted,
            "Empty Extraction" => Self::EmptyExtraction,
            "Upload Completed" => Self::UploadCompleted,
            "Error" => Self::Failed {
                reason: String::new(),
            },
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<ExtractionStatus> for String {
    fn from(value: ExtractionStatus) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
