//! Reference extraction service: batch field extraction, per-client result storage, CSV
//! export and form type suggestions over HTTP.

pub mod csv_export;
pub mod extractor;
pub mod processor;
pub mod router;
pub mod sorter;
pub mod store;

pub use csv_export::{render_csv, FIELD_HEADER};
pub use extractor::{sanitize_blob_name, ExtractError, FieldExtractor, LineFieldExtractor};
pub use processor::{
    ClientDataRequest, ClientDataResponse, ClientDocument, ExtractionService, ServiceError,
};
pub use router::{extraction_router, MAX_BATCH_BYTES};
pub use sorter::{DocumentSorter, KeywordSorter, SortFile, SortRequest, SortResponse, SortedFile};
pub use store::{
    DocumentRecord, ExtractedField, ExtractionStore, InMemoryExtractionStore, StoreError,
};
