// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay.
//!
//! A submission passes through four gates in order: the per-client rate
//! limit, body parsing, field validation, then email dispatch. The rate
//! limit is consulted before the body is read, so throttled clients cost
//! nothing beyond the lookup.

use crate::config::Config;
use crate::error::ApiError;
use crate::limiter::{RateLimitResult, RateLimiter, UNKNOWN_CLIENT};
use crate::mailer::{DispatchError, EmailDispatcher, MailTransport};
use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use contact_form::{ContactForm, Field, FieldError, INVALID_EMAIL};
use serde::Serialize;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

pub const CONTACT_PATH: &str = "/api/contact";
pub const SENT_MESSAGE: &str = "Message sent successfully! I'll get back to you soon.";

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Shared application state.
pub struct AppState<T> {
    pub limiter: Arc<RateLimiter>,
    pub dispatcher: EmailDispatcher<T>,
    pub config: Config,
}

impl<T: MailTransport> AppState<T> {
    pub fn new(config: Config, transport: T) -> Result<Self, DispatchError> {
        Ok(Self {
            limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            dispatcher: EmailDispatcher::from_config(transport, &config)?,
            config,
        })
    }
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router<T: MailTransport>(state: Arc<AppState<T>>) -> Router {
    // Answers every OPTIONS request itself and tags responses with the
    // allowed origin.
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(
            CONTACT_PATH,
            post(submit::<T>)
                .get(method_not_allowed)
                .put(method_not_allowed)
                .delete(method_not_allowed)
                .patch(method_not_allowed)
                .head(head_not_allowed),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Accept one contact form submission.
pub async fn submit<T: MailTransport>(
    State(state): State<Arc<AppState<T>>>,
    request: Request,
) -> Response {
    let client = client_key(&request);
    let limits = state.limiter.config();

    let remaining = match state.limiter.check(&client).await {
        RateLimitResult::Allowed { remaining, .. } => remaining,
        RateLimitResult::Limited { retry_after } => {
            info!(
                client = %client,
                retry_after_secs = retry_after.as_secs(),
                "Contact submission rate limited"
            );
            return ApiError::RateLimited {
                limit: limits.max_requests,
                retry_after,
            }
            .into_response();
        }
    };

    let headers = rate_limit_headers(limits.max_requests, remaining, limits.window_secs);

    match process(&state, &client, request.into_body()).await {
        Ok(()) => (
            StatusCode::OK,
            headers,
            Json(SubmitResponse {
                success: true,
                message: SENT_MESSAGE,
            }),
        )
            .into_response(),
        Err(err) => (headers, err).into_response(),
    }
}

async fn process<T: MailTransport>(
    state: &AppState<T>,
    client: &str,
    body: Body,
) -> Result<(), ApiError> {
    let bytes = to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    let form = parse_form(&bytes).inspect_err(|e| debug!(client, error = %e, "Rejected body"))?;

    let submission = form.validate().inspect_err(|errors| {
        debug!(client, errors = errors.len(), "Contact form failed validation")
    })?;

    state
        .dispatcher
        .send(&submission.sanitize())
        .await
        .map_err(|e| dispatch_failure(client, e))?;

    info!(client, "Contact submission delivered");
    Ok(())
}

/// A submitter address the mailer cannot use is the client's mistake, not
/// ours, and is answered like any other email rule failure.
fn dispatch_failure(client: &str, err: DispatchError) -> ApiError {
    match err {
        DispatchError::ReplyTo { .. } => {
            debug!(client, error = %err, "Submitter address rejected by mailer");
            ApiError::Validation(FieldError::new(Field::Email, INVALID_EMAIL).into())
        }
        err => {
            error!(client, error = %err, "Failed to send contact notification");
            ApiError::Dispatch(err)
        }
    }
}

/// The body must be a JSON object; anything else is malformed.
fn parse_form(bytes: &[u8]) -> Result<ContactForm, ApiError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    if !value.is_object() {
        return Err(ApiError::MalformedBody("expected a JSON object".to_string()));
    }

    serde_json::from_value(value).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

/// Identify the caller: socket peer first, then the first hop recorded in
/// `X-Forwarded-For`, then the shared `unknown` bucket.
pub fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    forwarded_for(request.headers()).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_owned)
}

pub(crate) fn rate_limit_headers(limit: u32, remaining: u32, reset_secs: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_secs));
    headers
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn head_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST, OPTIONS")])
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    error!(panic = %detail, "Request handler panicked");

    ApiError::Internal.into_response()
}
