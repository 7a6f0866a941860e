//! Verdict endpoint.
//!
//! # Responsibilities
//! - Answer every path and method with the current verdict
//! - Wire up middleware (tracing, request timeout)
//! - Serve until the shared shutdown signal fires
//!
//! # Design Decisions
//! - The verdict is computed per request from the shared signal state
//! - Client errors never reach callers: only the reason string does

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::health::{Monitor, Verdict};

/// HTTP server exposing the monitor's verdict.
pub struct VerdictServer {
    router: Router,
}

impl VerdictServer {
    /// Create a server answering from `monitor`.
    pub fn new(monitor: Monitor, request_timeout: Duration) -> Self {
        Self {
            router: Self::build_router(monitor, request_timeout),
        }
    }

    #[allow(deprecated)]
    fn build_router(monitor: Monitor, request_timeout: Duration) -> Router {
        Router::new()
            .fallback(verdict_handler)
            .with_state(monitor)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires. The listener is closed on return.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Verdict endpoint listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!(address = %addr, "Verdict endpoint stopped");
        Ok(())
    }
}

async fn verdict_handler(State(monitor): State<Monitor>, method: Method, uri: Uri) -> Response {
    let verdict = monitor.verdict();
    tracing::debug!(
        method = %method,
        path = %uri.path(),
        healthy = verdict.is_healthy(),
        "Verdict requested"
    );

    match verdict {
        Verdict::Healthy => (StatusCode::OK, "healthy").into_response(),
        Verdict::Unhealthy(reason) => {
            (StatusCode::SERVICE_UNAVAILABLE, reason.to_string()).into_response()
        }
    }
}
