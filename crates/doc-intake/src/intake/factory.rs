use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use super::classifier::FormType;
use super::domain::{ExtractionStatus, FileEntity, FileId, FileMeta, RawFile};

static FILE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_file_id() -> FileId {
    let id = FILE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    FileId(format!("file-{id:06}"))
}

/// Turns raw upload-queue files into tracked entities with a fresh identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileEntityFactory;

impl FileEntityFactory {
    pub fn create(&self, raw: RawFile) -> FileEntity {
        let RawFile {
            source,
            name,
            size,
            payload,
            path,
        } = raw;

        FileEntity {
            id: next_file_id(),
            source,
            path: path.unwrap_or_else(|| name.clone()),
            file: FileMeta { name, size },
            payload,
            form_type: FormType::None,
            status: ExtractionStatus::Pending,
            attempt: 0,
            added_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn defaults_new_entities() {
        let entity = FileEntityFactory.create(RawFile::new("q-1", "w2.pdf", b"abc".to_vec()));
        assert!(entity.id.0.starts_with("file-"));
        assert_eq!(entity.path, "w2.pdf");
        assert_eq!(entity.file.name, "w2.pdf");
        assert_eq!(entity.file.size, 3);
        assert_eq!(entity.form_type, FormType::None);
        assert_eq!(entity.status, ExtractionStatus::Pending);
        assert_eq!(entity.attempt, 0);
    }

    #[test]
    fn keeps_path_override() {
        let raw = RawFile::new("q-2", "w2.pdf", Vec::<u8>::new()).with_path("2024/acme/w2.pdf");
        let entity = FileEntityFactory.create(raw);
        assert_eq!(entity.path, "2024/acme/w2.pdf");
        assert_eq!(entity.file.name, "w2.pdf");
    }

    #[test]
    fn identifiers_never_repeat() {
        let ids: HashSet<FileId> = (0..200)
            .map(|n| {
                FileEntityFactory
                    .create(RawFile::new(format!("q-{n}"), "same.pdf", Vec::<u8>::new()))
                    .id
            })
            .collect();
        assert_eq!(ids.len(), 200);
    }
}
