//! Shared helpers for service and router tests.

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use keybind_server::{
    middleware::auth::{PRINCIPAL_HEADER, ROLES_HEADER},
    roles::ConfiguredRoles,
    services::cooldown_service::CooldownGate,
    state::{AppState, hash_token},
    store::Store,
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tempfile::TempDir;
use tower::ServiceExt;

pub const GATEWAY_TOKEN: &str = "test-gateway-token";
pub const PURCHASER_ROLE: &str = "100";
pub const ADMIN_ROLE: &str = "200";
pub const CONFIRMATION_AUTHOR: &str = "999";
pub const DAY: Duration = Duration::from_secs(86_400);

/// A store in a fresh temporary directory. Keep the `TempDir` alive for the test.
pub fn temp_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    (dir, store)
}

/// Application state over a fresh store with fixed role ids and no confirmation secret.
pub fn test_state() -> (TempDir, AppState) {
    let (dir, store) = temp_store();
    let state = AppState {
        store,
        roles: Arc::new(ConfiguredRoles {
            purchaser_role_id: PURCHASER_ROLE.to_string(),
            admin_role_id: ADMIN_ROLE.to_string(),
        }),
        cooldown: CooldownGate::new(DAY),
        gateway_token_hash: hash_token(GATEWAY_TOKEN),
        confirmation_author_id: CONFIRMATION_AUTHOR.to_string(),
        confirmation_secret: None,
        key_length: 11,
        max_generate: 100,
    };
    (dir, state)
}

/// A command request from `principal` holding `roles`.
pub fn command(method: &str, uri: &str, principal: &str, roles: &[&str], body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {GATEWAY_TOKEN}"))
        .header(PRINCIPAL_HEADER, principal)
        .header(ROLES_HEADER, roles.join(","));

    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn purchaser(method: &str, uri: &str, principal: &str, body: Option<Value>) -> Request<Body> {
    command(method, uri, principal, &[PURCHASER_ROLE], body)
}

pub fn admin(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    command(method, uri, "admin", &[ADMIN_ROLE], body)
}

/// Send `request` through a clone of `app`, returning status and JSON body (Null if empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
