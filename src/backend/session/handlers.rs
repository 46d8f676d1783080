/**
 * Session Handlers
 *
 * - POST /doc/{doc_id}/session - mint a session, reply `{"sessionId": ...}`
 * - POST /doc/{doc_id}/session/{session_id} - command entry point
 */

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::controller::{SessionController, SessionReply};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;

/// Response to a session open request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionResponse {
    pub session_id: Uuid,
}

/// Mint a session for the authenticated caller
pub async fn open_session(
    State(controller): State<SessionController>,
    AuthUser(user): AuthUser,
    Path(doc_id): Path<i64>,
) -> Result<Json<OpenSessionResponse>, BackendError> {
    let session_id = controller.open_session(doc_id, &user.user_id).await;
    Ok(Json(OpenSessionResponse { session_id }))
}

/// Command entry point
pub async fn handle_command(
    State(controller): State<SessionController>,
    AuthUser(user): AuthUser,
    Path((doc_id, session_id)): Path<(i64, Uuid)>,
    body: Bytes,
) -> Result<Json<SessionReply>, BackendError> {
    let reply = controller
        .handle(doc_id, session_id, &user.user_id, &body)
        .await?;
    Ok(Json(reply))
}
