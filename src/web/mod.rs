//! Web layer module
//!
//! HTTP and WebSocket interface of the live engagement service. Handlers are
//! thin and delegate to [`crate::services::LiveEngagementService`].

use anyhow::Result;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, services::LiveEngagementService};

pub mod api;
pub mod handlers;
pub mod responses;

pub use responses::ApiResponse;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
    engagement: LiveEngagementService,
}

impl WebServer {
    pub fn new(config: Config, engagement: LiveEngagementService) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let app = Self::create_router(AppState::new(config, engagement.clone()));
        Ok(Self {
            app,
            addr,
            engagement,
        })
    }

    /// Router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health::health_check))
            .route(
                "/ws/engage/{video_id}",
                get(handlers::engagement::engagement_socket),
            )
            .route(
                "/ws/engage/{video_id}/",
                get(handlers::engagement::engagement_socket),
            )
            .nest("/api/v1", Self::api_v1_routes())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    fn api_v1_routes() -> Router<AppState> {
        Router::new().route("/live/groups", get(api::live_groups::list_live_groups))
    }

    /// Serve until SIGTERM or SIGINT
    pub async fn serve_with_signal(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
    ) -> Result<()> {
        self.serve_with_cancellation(ready_signal, None).await
    }

    /// Serve with cancellation support and ready notification
    pub async fn serve_with_cancellation(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<()> {
        let listener = match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => listener,
            Err(bind_error) => {
                let bind_err_msg = format!("Failed to bind to {}: {}", self.addr, bind_error);
                let _ = ready_signal.send(Err(anyhow::anyhow!("{}", bind_err_msg)));
                return Err(anyhow::anyhow!("{}", bind_err_msg));
            }
        };
        let _ = ready_signal.send(Ok(()));

        let engagement = self.engagement.clone();
        let shutdown_signal = async move {
            match cancellation_token {
                Some(token) => {
                    token.cancelled().await;
                    tracing::info!("Web server received cancellation signal, shutting down gracefully");
                }
                None => wait_for_termination().await,
            }
            // Upgraded connections are not tracked by the server; close them explicitly
            engagement.shutdown();
        };

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to install signal handlers: {}", e);
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, shutting down gracefully");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engagement: LiveEngagementService,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: Config, engagement: LiveEngagementService) -> Self {
        Self {
            config,
            engagement,
            start_time: chrono::Utc::now(),
        }
    }
}
