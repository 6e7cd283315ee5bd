// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for driving the contact relay end to end.
//!
//! Requests go through the real router with `tower::ServiceExt::oneshot`;
//! only the SMTP hop is replaced by [`transport::RecordingTransport`].

#![allow(dead_code)]

pub mod generators;
pub mod logs;
pub mod transport;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use contact_relay::{handlers::router, AppState, Config};
use http_body_util::BodyExt;
use std::sync::Arc;
use transport::RecordingTransport;

pub const OWNER: &str = "owner@example.com";

/// Default configuration with a contact address filled in.
pub fn config() -> Config {
    let mut config = Config::default();
    config.mail.contact_email = Some(OWNER.to_string());
    config
}

/// Router plus a handle on its state, built around `transport`.
pub fn app(transport: RecordingTransport) -> (Router, Arc<AppState<RecordingTransport>>) {
    app_with(config(), transport)
}

pub fn app_with(
    config: Config,
    transport: RecordingTransport,
) -> (Router, Arc<AppState<RecordingTransport>>) {
    let state = Arc::new(AppState::new(config, transport).expect("test config has a recipient"));
    (router(Arc::clone(&state)), state)
}

/// A JSON `POST /api/contact` that appears to come from `client`.
pub fn submission(client: &str, body: &serde_json::Value) -> Request<Body> {
    raw_submission(client, body.to_string())
}

pub fn raw_submission(client: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(body.into())
        .unwrap()
}

pub fn bare(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
