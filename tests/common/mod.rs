//! Shared helpers for the integration tests
//!
//! Builds a full router over temporary storage and cache directories and
//! sends requests through it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use xfdocs::backend::auth::create_token;
use xfdocs::backend::document::{LocalDocumentStore, ShareRegistry};
use xfdocs::backend::routes::create_router;
use xfdocs::backend::server::AppState;
use xfdocs::shared::GatewayConfig;

pub const SECRET: &str = "integration-secret";

/// A router over temporary directories
pub struct TestGateway {
    pub app: Router,
    pub shares: ShareRegistry,
    pub storage: TempDir,
    pub cache: TempDir,
}

impl TestGateway {
    pub fn new() -> Self {
        let storage = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let config = GatewayConfig::builder()
            .storage_root(storage.path().to_path_buf())
            .cache_dir(cache.path().to_path_buf())
            .jwt_secret(SECRET.to_string())
            .build()
            .unwrap();

        let shares = ShareRegistry::new(storage.path().to_path_buf());
        let store = LocalDocumentStore::new(cache.path().to_path_buf(), None);
        let state = AppState::new(config, Arc::new(shares.clone()), Arc::new(store));

        Self {
            app: create_router(state),
            shares,
            storage,
            cache,
        }
    }

    /// Put a file in storage and share it
    pub fn share_file(&self, name: &str, contents: &[u8]) -> String {
        std::fs::write(self.storage.path().join(name), contents).unwrap();
        self.shares.issue(name)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Mint a session for `user` and return its id
    pub async fn open_session(&self, user: &str, doc_id: i64) -> String {
        let (status, body) = self
            .send_json(post(&format!("/doc/{}/session", doc_id), Some(user), Body::empty()))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["sessionId"].as_str().unwrap().to_string()
    }

    /// Send a command body on a session
    pub async fn command(
        &self,
        user: &str,
        doc_id: i64,
        session: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let uri = format!("/doc/{}/session/{}", doc_id, session);
        self.send_json(post(&uri, Some(user), Body::from(body.to_string())))
            .await
    }
}

/// `Authorization` header value for `user`
pub fn bearer(user: &str) -> String {
    format!("Bearer {}", create_token(SECRET, user, None).unwrap())
}

pub fn editor_token(user: &str, name: &str) -> String {
    create_token(SECRET, user, Some(name.to_string())).unwrap()
}

pub fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post(uri: &str, user: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    builder.body(body).unwrap()
}

/// Open-document URI for a callback URL
pub fn open_uri(doc_id: i64, format: &str, callback: &str) -> String {
    format!(
        "/doc/{}/open?format={}&url={}",
        doc_id,
        format,
        utf8_percent_encode(callback, NON_ALPHANUMERIC)
    )
}
