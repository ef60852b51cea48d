use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::middleware::track_requests;
use crate::services::{InMemorySessionStore, PortalClient, SessionStore};
use crate::AppState;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// Port 0 binds a random free port, which tests rely on.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let portal = PortalClient::new(config.portal.clone())?;
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(
            chrono::Duration::minutes(config.session.ttl_minutes),
        ));

        tracing::info!(
            portal = %config.portal.base_url,
            ttl_minutes = config.session.ttl_minutes,
            "portal client initialized"
        );

        let state = AppState {
            portal,
            sessions,
            config: config.clone(),
        };

        let router = build_router(state);

        let address = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!(port = self.port, "ipu-bridge listening");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/captcha", get(handlers::captcha::fetch_captcha))
        .route("/login", post(handlers::login::submit_login))
        .route("/results", get(handlers::results::fetch_results))
        .route("/health", get(handlers::app::health_check))
        .route("/metrics", get(handlers::app::metrics))
        .layer(from_fn(track_requests))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}
