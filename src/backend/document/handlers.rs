/**
 * Document Handlers
 *
 * - GET /doc/{doc_id}/open?format=<fmt>&url=<callback url>
 *
 * Streams the requested rendition of a shared document to the editing
 * server. The caller must be authenticated; access to the file itself is
 * granted by the share token embedded in `url`.
 */

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use serde::Deserialize;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

/// Query string of an open-document request
#[derive(Debug, Deserialize)]
pub struct OpenDocumentQuery {
    /// Requested rendition format (file extension)
    pub format: String,
    /// Callback URL carrying the share token
    pub url: String,
}

/// Content type sent for a rendition format
pub fn content_type_for(format: &str) -> &'static str {
    match format.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Handle an open-document request
pub async fn open_document(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(doc_id): Path<i64>,
    Query(query): Query<OpenDocumentQuery>,
) -> Result<Response<Body>, BackendError> {
    tracing::info!(
        "[Document] {} opens document {} as {}",
        user.user_id,
        doc_id,
        query.format
    );

    let stream = app_state
        .documents
        .open_document(doc_id, &query.format, &query.url)
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&query.format))
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("[Document] Failed to build response: {:?}", e);
            BackendError::state("Failed to build response")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("PDF"), "application/pdf");
        assert_eq!(content_type_for("bin"), "application/octet-stream");
    }
}
