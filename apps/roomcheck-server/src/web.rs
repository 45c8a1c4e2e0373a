//! Front-end host. Files are read by hand rather than through `ServeDir` to keep
//! the fixed extension table, the Turkish 404 page and a 500 for directories.

use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

const NOT_FOUND_PAGE: &str = "<h1>404 - Dosya Bulunamadı</h1>";

#[derive(Clone)]
struct StaticRoot(Arc<PathBuf>);

/// Front-end bundle under `root` plus the `/health` probe.
pub fn router(root: PathBuf, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .fallback(serve_static)
        .with_state(StaticRoot(Arc::new(root)))
        .layer(create_trace_layer())
        .layer(TimeoutLayer::new(request_timeout))
}

/// Serve `app` until `signal` resolves, then drain open connections.
/// With `grace` set, connections still open after it elapses are dropped.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Option<Duration>,
) -> Result<()>
where
    F: Future<Output = Result<()>> + Send,
{
    info!("HTTP server bound on {}", listener.local_addr()?);

    let cancel = CancellationToken::new();
    let shutdown = {
        let cancel = cancel.clone();
        async move { cancel.cancelled().await }
    };
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    });

    tokio::select! {
        res = &mut server => {
            return res
                .context("HTTP server task panicked")?
                .context("HTTP server failed");
        }
        res = signal => res.context("failed to wait for shutdown signal")?,
    }

    info!("HTTP server shutting down gracefully");
    cancel.cancel();
    let res = match grace {
        Some(grace) => match tokio::time::timeout(grace, &mut server).await {
            Ok(res) => res,
            Err(_) => {
                warn!(?grace, "Grace period elapsed, dropping open connections");
                server.abort();
                return Ok(());
            }
        },
        None => server.await,
    };
    res.context("HTTP server task panicked")?
        .context("HTTP server failed")
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn serve_static(State(root): State<StaticRoot>, uri: Uri) -> Response {
    let Some(rel) = relative_path(uri.path()) else {
        warn!(path = %uri.path(), "Rejected path outside the static root");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };

    match tokio::fs::read(root.0.join(&rel)).await {
        Ok(body) => ([(header::CONTENT_TYPE, content_type_for(&rel))], body).into_response(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %uri.path(), "Static file not found");
            (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
        }
        Err(e) => {
            error!(path = %uri.path(), error = %e, "Failed to read static file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Sunucu Hatası: {}", e.kind()),
            )
                .into_response()
        }
    }
}

/// Request path → path under the static root; `None` unless every
/// component is a plain name.
fn relative_path(uri_path: &str) -> Option<PathBuf> {
    let trimmed = uri_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(PathBuf::from("index.html"));
    }
    let rel = Path::new(trimmed);
    rel.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| rel.to_path_buf())
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "html" => "text/html",
        "js" => "text/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" => "image/jpg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}

fn create_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri().path(),
            version = ?req.version(),
        )
    })
}
