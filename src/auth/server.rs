//! Edge server
//!
//! An axum front for the static site. Every request passes the
//! [`BasicAuthGate`] before `ServeDir` answers it from the site root.
//!
//! # Example
//! ```ignore
//! let gate = Arc::new(BasicAuthGate::from_config(&config.auth));
//! let server = EdgeServer::start(&config.server, gate).await?;
//! println!("listening on {}", server.local_addr());
//! server.stop().await;
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn, Span};

use super::{BasicAuthGate, Challenge, CredentialVerifier, GateDecision};
use crate::config::ServerConfig;
use crate::errors::ServerError;
use crate::observability::telemetry::{redact_credentials, request_span, sanitize_for_log};

/// Build the edge router: site files behind the gate.
///
/// Layers run outermost first: tracing, request head size limit, the auth
/// gate, then the method check in front of `ServeDir`.
pub fn router<V>(gate: Arc<BasicAuthGate<V>>, site_root: &Path, max_header_bytes: usize) -> Router
where
    V: CredentialVerifier + 'static,
{
    let site = ServeDir::new(site_root).append_index_html_on_directories(true);

    Router::new()
        .fallback_service(site)
        .layer(middleware::from_fn(allow_read_methods))
        .layer(middleware::from_fn_with_state(gate, basic_auth::<V>))
        .layer(middleware::from_fn_with_state(max_header_bytes, limit_head_size))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    request_span(request.method().as_str(), request.uri().path())
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    debug!(latency_ms = latency.as_millis() as u64, "Request handled");
                }),
        )
}

/// Render the gate's 401 challenge.
pub fn challenge_response(challenge: &Challenge) -> Response {
    let status = StatusCode::from_u16(challenge.status).unwrap_or(StatusCode::UNAUTHORIZED);
    (
        status,
        [(header::WWW_AUTHENTICATE, challenge.www_authenticate.clone())],
        challenge.body,
    )
        .into_response()
}

async fn basic_auth<V>(
    State(gate): State<Arc<BasicAuthGate<V>>>,
    request: Request,
    next: Next,
) -> Response
where
    V: CredentialVerifier + 'static,
{
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let decision = gate.check(request.uri().path(), authorization);

    match decision {
        GateDecision::Proceed => next.run(request).await,
        GateDecision::Challenge(challenge) => {
            if let Some(auth) = authorization {
                debug!(
                    authorization = redact_credentials(&sanitize_for_log(auth)).as_str(),
                    "Rejected credentials"
                );
            }
            challenge_response(&challenge)
        }
    }
}

async fn allow_read_methods(request: Request, next: Next) -> Response {
    if request.method() == Method::GET || request.method() == Method::HEAD {
        return next.run(request).await;
    }
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET, HEAD")],
        "Method not allowed",
    )
        .into_response()
}

/// Bytes in the request line target and headers, as sent on the wire.
fn head_size(request: &Request) -> usize {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().len())
        .unwrap_or(1);
    let headers: usize = request
        .headers()
        .iter()
        .map(|(name, value)| name.as_str().len() + value.len() + 4)
        .sum();
    request.method().as_str().len() + target + headers
}

async fn limit_head_size(State(limit): State<usize>, request: Request, next: Next) -> Response {
    if head_size(&request) > limit {
        warn!(limit, "Request head too large");
        return (
            StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            "Request header fields too large",
        )
            .into_response();
    }
    next.run(request).await
}

/// Handle to a running edge server.
pub struct EdgeServer {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    handle: tokio::task::JoinHandle<()>,
}

impl EdgeServer {
    /// Bind to `config.bind` and start serving in a background task.
    pub async fn start<V>(
        config: &ServerConfig,
        gate: Arc<BasicAuthGate<V>>,
    ) -> Result<Self, ServerError>
    where
        V: CredentialVerifier + 'static,
    {
        if !config.site_root.is_dir() {
            return Err(ServerError::SiteRoot {
                path: config.site_root.clone(),
            });
        }

        let listener = TcpListener::bind(&config.bind)
            .await
            .map_err(|e| ServerError::Bind {
                addr: config.bind.clone(),
                message: e.to_string(),
            })?;
        let local_addr = listener.local_addr()?;

        let app = router(gate, &config.site_root, config.max_header_bytes);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                warn!(error = %e, "Edge server failed");
            }
            debug!("Edge server stopped");
        });

        Ok(Self {
            local_addr,
            shutdown_tx,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }
}
