use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intake::FormType;

/// One extracted `name = value` pair with the extractor's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: String,
    pub value: String,
    pub confidence: f32,
}

impl ExtractedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            confidence,
        }
    }
}

/// Extraction result for one document of one client. Stored under the sanitized
/// document name, which is also what the record carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub client_id: String,
    pub document_name: String,
    pub version_id: String,
    pub form_type: FormType,
    pub fields: Vec<ExtractedField>,
    pub extracted_at: DateTime<Utc>,
}

/// Storage abstraction so the extraction service can be exercised in isolation.
pub trait ExtractionStore: Send + Sync {
    /// Insert or replace the record for `(client_id, document_name)`.
    fn upsert(&self, record: DocumentRecord) -> Result<(), StoreError>;
    fn fetch(
        &self,
        client_id: &str,
        document_name: &str,
    ) -> Result<Option<DocumentRecord>, StoreError>;
    /// All records of a client, ordered by document name.
    fn for_client(&self, client_id: &str) -> Result<Vec<DocumentRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("extraction store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryExtractionStore {
    records: RwLock<BTreeMap<(String, String), DocumentRecord>>,
}

impl InMemoryExtractionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl ExtractionStore for InMemoryExtractionStore {
    fn upsert(&self, record: DocumentRecord) -> Result<(), StoreError> {
        let key = (record.client_id.clone(), record.document_name.clone());
        self.records.write().map_err(poisoned)?.insert(key, record);
        Ok(())
    }

    fn fetch(
        &self,
        client_id: &str,
        document_name: &str,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        let key = (client_id.to_string(), document_name.to_string());
        Ok(self.records.read().map_err(poisoned)?.get(&key).cloned())
    }

    fn for_client(&self, client_id: &str) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|record| record.client_id == client_id)
            .cloned()
            .collect())
    }
}
