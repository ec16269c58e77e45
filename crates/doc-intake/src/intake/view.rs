use std::fmt;

use serde::Serialize;

use super::classifier::FormType;
use super::domain::{ExtractionStatus, FileEntity, FileId};
use super::job::{JobContext, MissingContext};
use super::list::IntakeList;

pub const COLUMN_HEADERS: [&str; 4] = ["File Name", "File Size", "Status", "Form"];

/// What the intake panel shows for the current list and job context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntakeView {
    /// A job identifier is missing; nothing else is shown.
    Prompt { missing: MissingPrompt },
    /// No files; the panel renders nothing at all.
    Empty,
    Table { rows: Vec<FileRow> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissingPrompt {
    pub message: &'static str,
}

impl From<MissingContext> for MissingPrompt {
    fn from(value: MissingContext) -> Self {
        Self {
            message: value.prompt(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Normal,
    /// Draws attention to documents whose extraction found nothing.
    Alert,
}

impl StatusTone {
    fn for_status(status: &ExtractionStatus) -> Self {
        match status {
            ExtractionStatus::EmptyExtraction => StatusTone::Alert,
            _ => StatusTone::Normal,
        }
    }
}

/// One rendered file row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRow {
    pub id: FileId,
    pub path: String,
    pub size: u64,
    pub status: String,
    pub tone: StatusTone,
    pub form_type: FormType,
    pub download_available: bool,
}

impl From<&FileEntity> for FileRow {
    fn from(entity: &FileEntity) -> Self {
        Self {
            id: entity.id.clone(),
            path: entity.path.clone(),
            size: entity.file.size,
            status: entity.status.label().to_string(),
            tone: StatusTone::for_status(&entity.status),
            form_type: entity.form_type,
            download_available: entity.download_available(),
        }
    }
}

impl IntakeList {
    /// Apply the panel's guard and empty-state rules, then project each file into a row.
    pub fn render(&self, job: &JobContext) -> IntakeView {
        if let Err(missing) = job.require() {
            return IntakeView::Prompt {
                missing: missing.into(),
            };
        }

        if self.is_empty() {
            return IntakeView::Empty;
        }

        IntakeView::Table {
            rows: self.iter().map(FileRow::from).collect(),
        }
    }
}

impl IntakeView {
    pub fn rows(&self) -> &[FileRow] {
        match self {
            IntakeView::Table { rows } => rows,
            _ => &[],
        }
    }
}

impl fmt::Display for IntakeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeView::Prompt { missing } => writeln!(f, "{}", missing.message),
            IntakeView::Empty => Ok(()),
            IntakeView::Table { rows } => {
                writeln!(
                    f,
                    "{:<14} {:<36} {:>10} {:<20} {:<9} {}",
                    "ID",
                    COLUMN_HEADERS[0],
                    COLUMN_HEADERS[1],
                    COLUMN_HEADERS[2],
                    COLUMN_HEADERS[3],
                    ""
                )?;
                for row in rows {
                    let status = match row.tone {
                        StatusTone::Alert => format!("!{}", row.status),
                        StatusTone::Normal => row.status.clone(),
                    };
                    let download = if row.download_available {
                        "download"
                    } else {
                        ""
                    };
                    writeln!(
                        f,
                        "{:<14} {:<36} {:>10} {:<20} {:<9} {}",
                        row.id.0,
                        row.path,
                        row.size,
                        status,
                        row.form_type.label(),
                        download
                    )?;
                }
                Ok(())
            }
        }
    }
}
