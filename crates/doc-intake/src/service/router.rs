use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::intake::{DownloadRequest, ExtractionRequest};

use super::extractor::FieldExtractor;
use super::processor::{ClientDataRequest, ClientDataResponse, ExtractionService, ServiceError};
use super::sorter::SortRequest;
use super::store::ExtractionStore;

/// Uploads arrive base64-encoded inside JSON, so the default 2 MiB limit is too small.
pub const MAX_BATCH_BYTES: usize = 64 * 1024 * 1024;

/// Router exposing batch extraction, CSV download, the per-client results listing and
/// form type suggestions.
pub fn extraction_router<S, E>(service: Arc<ExtractionService<S, E>>) -> Router
where
    S: ExtractionStore + 'static,
    E: FieldExtractor + 'static,
{
    Router::new()
        .route("/api/process_doc", post(process_handler::<S, E>))
        .route(
            "/api/download_csv/:document_name",
            post(download_handler::<S, E>),
        )
        .route("/api/get_client_data", post(client_data_handler::<S, E>))
        .route("/api/sort", post(sort_handler::<S, E>))
        .layer(DefaultBodyLimit::max(MAX_BATCH_BYTES))
        .with_state(service)
}

pub(crate) async fn process_handler<S, E>(
    State(service): State<Arc<ExtractionService<S, E>>>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Response
where
    S: ExtractionStore + 'static,
    E: FieldExtractor + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.process_batch(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn download_handler<S, E>(
    State(service): State<Arc<ExtractionService<S, E>>>,
    Path(document_name): Path<String>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Response
where
    S: ExtractionStore + 'static,
    E: FieldExtractor + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.export_csv(&request.client_id, &document_name) {
        Ok(bytes) => {
            let mut headers = HeaderMap::new();
            if let Ok(content_type) = HeaderValue::from_str(mime::TEXT_CSV_UTF_8.as_ref()) {
                headers.insert(header::CONTENT_TYPE, content_type);
            }
            let disposition = format!("attachment; filename={document_name}.csv");
            headers.insert(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&disposition)
                    .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
            );
            (StatusCode::OK, headers, bytes).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn client_data_handler<S, E>(
    State(service): State<Arc<ExtractionService<S, E>>>,
    payload: Result<Json<ClientDataRequest>, JsonRejection>,
) -> Response
where
    S: ExtractionStore + 'static,
    E: FieldExtractor + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.client_data(&request.client_id) {
        Ok(data) => (StatusCode::OK, Json(ClientDataResponse { data })).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sort_handler<S, E>(
    State(service): State<Arc<ExtractionService<S, E>>>,
    payload: Result<Json<SortRequest>, JsonRejection>,
) -> Response
where
    S: ExtractionStore + 'static,
    E: FieldExtractor + 'static,
{
    match payload {
        Ok(Json(request)) => (StatusCode::OK, Json(service.sort_batch(request))).into_response(),
        Err(rejection) => rejection_response(rejection),
    }
}

/// Malformed bodies keep axum's status code but answer with the same `{"error": ..}` shape
/// as every other failure.
fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let message = rejection.body_text();
    debug!(%status, error = %message, "request body rejected");
    (status, Json(json!({ "error": message }))).into_response()
}

fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::MissingClientId | ServiceError::MissingVersionId => StatusCode::BAD_REQUEST,
        ServiceError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Store(_) | ServiceError::Csv(_) => {
            warn!(error = %err, "extraction service failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
