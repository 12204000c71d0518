// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP front end.
//
//   POST /print   multipart `carrier` + `file`, bearer token required
//   GET  /health  liveness and the configured device, no auth
//
// Prints run one at a time: the handler holds an async mutex for the whole
// dispatch, and the dispatch itself runs on the blocking pool.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use labelwerk_core::config::ApiToken;
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{DispatchOutcome, PrintRequest, ServerStatus};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::auth::require_bearer;
use crate::dispatch::Dispatcher;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything a request can fail with, mapped to status and JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Print(#[from] LabelwerkError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::MissingToken | Self::InvalidTokenFormat => {
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            Self::InvalidToken => (StatusCode::FORBIDDEN, "Forbidden"),
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
            Self::Print(LabelwerkError::PayloadMismatch(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PayloadMismatch")
            }
            Self::Print(e) => {
                error!(code = e.code(), error = %e, "print failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "PrintFailed")
            }
        };

        let body = Json(json!({
            "error": code,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Shared request state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub token: Arc<ApiToken>,
    pub device: Arc<str>,
    /// Held for the whole print so driver calls never interleave.
    pub print_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, token: ApiToken, device: &str) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            token: Arc::new(token),
            device: Arc::from(device),
            print_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the router. `max_upload_bytes` caps the `/print` body.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let print_routes = Router::new()
        .route("/print", post(print_label))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/health", get(health))
        .merge(print_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "device": &*state.device,
    }))
}

async fn print_label(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> std::result::Result<Json<Value>, ApiError> {
    let mut carrier = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("carrier") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                carrier = Some(text);
            }
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                file = Some(bytes.to_vec());
            }
            other => debug!(field = ?other, "ignoring multipart field"),
        }
    }

    let carrier =
        carrier.ok_or_else(|| ApiError::InvalidRequest("missing field `carrier`".into()))?;
    let payload = file.ok_or_else(|| ApiError::InvalidRequest("missing field `file`".into()))?;
    let request = PrintRequest::new(carrier, payload);

    // The guard moves into the blocking task: a dropped request must not
    // release the printer while its job is still running.
    let print_guard = Arc::clone(&state.print_lock).lock_owned().await;
    let dispatcher = Arc::clone(&state.dispatcher);
    let outcome = tokio::task::spawn_blocking(move || {
        let _print_guard = print_guard;
        dispatcher.dispatch(&request)
    })
    .await
        .map_err(|e| LabelwerkError::Server(format!("print task failed: {e}")))??;

    match outcome {
        DispatchOutcome::Printed { .. } => Ok(Json(json!({ "status": "printed" }))),
        DispatchOutcome::UnknownCarrier { .. } => Ok(Json(json!({ "error": "unknown carrier" }))),
    }
}

// ---------------------------------------------------------------------------
// LabelServer
// ---------------------------------------------------------------------------

/// Owns the listener task and its graceful shutdown.
pub struct LabelServer {
    bind_addr: String,
    local_addr: Option<SocketAddr>,
    status: ServerStatus,
    shutdown_signal: Arc<Notify>,
    task_handle: Option<JoinHandle<()>>,
}

impl LabelServer {
    /// Create a stopped server for `bind_addr` (`host:port`).
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            local_addr: None,
            status: ServerStatus::Stopped,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
        }
    }

    pub fn status(&self) -> ServerStatus {
        self.status
    }

    /// Address actually bound, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind and start serving `app` in a background task.
    pub async fn start(&mut self, app: Router) -> Result<SocketAddr> {
        if let (ServerStatus::Running, Some(addr)) = (self.status, self.local_addr) {
            debug!(%addr, "label server already running");
            return Ok(addr);
        }
        self.status = ServerStatus::Starting;

        let listener = match TcpListener::bind(&self.bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.status = ServerStatus::Stopped;
                return Err(LabelwerkError::Server(format!("bind {}: {e}", self.bind_addr)));
            }
        };
        let addr = listener.local_addr()?;

        let shutdown = Arc::clone(&self.shutdown_signal);
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.notified().await })
                .await;
            if let Err(e) = served {
                error!(error = %e, "label server terminated");
            }
        });

        info!(%addr, "label server listening");
        self.local_addr = Some(addr);
        self.task_handle = Some(handle);
        self.status = ServerStatus::Running;
        Ok(addr)
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn stop(&mut self) -> Result<()> {
        if self.status != ServerStatus::Running {
            return Ok(());
        }
        info!(addr = ?self.local_addr, "stopping label server");

        self.shutdown_signal.notify_one();
        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| LabelwerkError::Server(format!("task join: {e}")))?;
        }

        self.status = ServerStatus::Stopped;
        self.local_addr = None;
        info!("label server stopped");
        Ok(())
    }
}
