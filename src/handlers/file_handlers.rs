//! HTTP handlers for upload, metadata lookup, and download.
//!
//! Uploads buffer the whole payload in memory before the store write begins
//! (the store needs the length up front); downloads stream the payload back
//! without buffering.

use crate::{
    auth::AuthUser,
    errors::AppError,
    models::record::FileRecord,
    services::object_store,
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// Query params accepted by `POST /upload`.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub folder: String,
}

/// Response body for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub folder: String,
    pub filename: String,
}

/// Response body for `GET /file/{id}`.
#[derive(Debug, Serialize)]
pub struct FileMetadataResponse {
    pub file_id: String,
    pub folder: String,
    pub filename: String,
    pub size: i64,
    pub content_type: Option<String>,
}

/// `POST /upload?folder=...` — store a multipart file under a fresh id.
///
/// Writes the payload to the object store under `<folder>/<id>`, then
/// records `id -> {folder, filename}` in the index. The folder is checked
/// against traversal-shaped values before the key is composed.
pub async fn upload_file(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    _auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    object_store::ensure_folder_safe(&query.folder)?;

    let field = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?
        .ok_or_else(|| AppError::bad_request("Missing file field"))?;

    let filename = field
        .file_name()
        .map(|name| name.to_string())
        .ok_or_else(|| AppError::bad_request("File field has no filename"))?;
    let content_type = field.content_type().map(|ct| ct.to_string());
    let data = field
        .bytes()
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    let file_id = Uuid::new_v4().to_string();
    let record = FileRecord {
        folder: query.folder.clone(),
        filename: filename.clone(),
    };
    let key = record.storage_key(&file_id);

    state.store.put_object(&key, content_type, data).await?;

    let value = serde_json::to_string(&record)
        .map_err(|err| AppError::internal(err.to_string()))?;
    state.index.set(&file_id, &value).await?;

    tracing::info!(%file_id, folder = %record.folder, filename = %record.filename, "stored file");

    Ok(Json(UploadResponse {
        file_id,
        folder: record.folder,
        filename: record.filename,
    }))
}

/// Resolve a file id to its index record, or 404 if the id is unknown.
async fn lookup_record(state: &AppState, file_id: &str) -> Result<FileRecord, AppError> {
    let value = state
        .index
        .get(file_id)
        .await?
        .ok_or_else(|| AppError::not_found("File ID not found"))?;

    serde_json::from_str(&value).map_err(|err| AppError::internal(err.to_string()))
}

/// `GET /file/{id}` — metadata only; the payload is never read.
pub async fn get_file_metadata(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    _auth: AuthUser,
) -> Result<Json<FileMetadataResponse>, AppError> {
    let record = lookup_record(&state, &file_id).await?;
    let stat = state.store.stat_object(&record.storage_key(&file_id)).await?;

    Ok(Json(FileMetadataResponse {
        file_id,
        folder: record.folder,
        filename: record.filename,
        size: stat.size_bytes,
        content_type: stat.content_type,
    }))
}

/// `GET /download/{id}` — stream the payload back with an attachment
/// disposition carrying the original filename.
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    _auth: AuthUser,
) -> Result<Response, AppError> {
    let record = lookup_record(&state, &file_id).await?;
    let (stat, file) = state.store.get_object(&record.storage_key(&file_id)).await?;

    let stream = ReaderStream::new(file);
    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    let content_type = stat
        .content_type
        .unwrap_or_else(|| "application/octet-stream".into());
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&stat.size_bytes.max(0).to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    let disposition = format!("attachment; filename={}", record.filename);
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
