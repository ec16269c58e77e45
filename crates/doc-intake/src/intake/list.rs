use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{FileEntity, FileId, RawFile, SourceKey};
use super::factory::FileEntityFactory;

/// Ordered working set of files shown to the operator.
///
/// Membership always mirrors the most recent upload-queue snapshot, while classification
/// and extraction status survive every resync for files that are still present.
#[derive(Debug, Default)]
pub struct IntakeList {
    factory: FileEntityFactory,
    entities: Vec<FileEntity>,
}

/// What a resync changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: Vec<FileId>,
    pub removed: Vec<FileId>,
    pub retained: usize,
}

impl ReconcileReport {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl IntakeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the upload queue's current files into the list, keyed by source identity.
    ///
    /// Files no longer supplied are dropped, new files get a fresh entity, and surviving
    /// files keep their id, form type, and status. The resulting order follows the
    /// upstream order; repeated source keys within one snapshot count once.
    pub fn reconcile<I>(&mut self, upstream: I) -> ReconcileReport
    where
        I: IntoIterator<Item = RawFile>,
    {
        let previous_order: Vec<SourceKey> = self
            .entities
            .iter()
            .map(|entity| entity.source.clone())
            .collect();
        let mut existing: HashMap<SourceKey, FileEntity> = self
            .entities
            .drain(..)
            .map(|entity| (entity.source.clone(), entity))
            .collect();

        let mut seen: HashSet<SourceKey> = HashSet::new();
        let mut next = Vec::new();
        let mut added = Vec::new();

        for raw in upstream {
            if !seen.insert(raw.source.clone()) {
                debug!(source = %raw.source.0, "duplicate upstream file collapsed");
                continue;
            }

            match existing.remove(&raw.source) {
                Some(entity) => next.push(entity),
                None => {
                    let entity = self.factory.create(raw);
                    added.push(entity.id.clone());
                    next.push(entity);
                }
            }
        }

        let removed: Vec<FileId> = previous_order
            .iter()
            .filter_map(|key| existing.remove(key).map(|entity| entity.id))
            .collect();

        let retained = next.len() - added.len();
        self.entities = next;

        info!(
            added = added.len(),
            removed = removed.len(),
            retained,
            total = self.entities.len(),
            "intake list reconciled"
        );

        ReconcileReport {
            added,
            removed,
            retained,
        }
    }

    /// Drop a file from the list. Absent ids are ignored.
    pub fn remove(&mut self, id: &FileId) -> Option<FileEntity> {
        let index = self.entities.iter().position(|entity| &entity.id == id)?;
        let entity = self.entities.remove(index);
        debug!(file_id = %id, "file removed from intake list");
        Some(entity)
    }

    pub fn get(&self, id: &FileId) -> Option<&FileEntity> {
        self.entities.iter().find(|entity| &entity.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &FileId) -> Option<&mut FileEntity> {
        self.entities.iter_mut().find(|entity| &entity.id == id)
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntity> {
        self.entities.iter()
    }

    pub fn ids(&self) -> Vec<FileId> {
        self.entities.iter().map(|entity| entity.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn find_by_source(&self, source: &SourceKey) -> Option<&FileEntity> {
        self.entities.iter().find(|entity| &entity.source == source)
    }
}
