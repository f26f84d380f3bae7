//! Server execution logic.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ConnectClientUseCase, DisconnectClientUseCase, FindMatchUseCase, GetStatsUseCase,
    LeaveChatUseCase, RelaySignalUseCase, ReportUserUseCase, SendMessageUseCase,
};

use super::{
    handler::{get_stats, health_check, notify_match, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Pairing broker server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_client_usecase,
///     disconnect_client_usecase,
///     find_match_usecase,
///     leave_chat_usecase,
///     relay_signal_usecase,
///     send_message_usecase,
///     report_user_usecase,
///     get_stats_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080, Duration::from_secs(5)).await?;
/// ```
pub struct Server {
    app_state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_client_usecase: Arc<ConnectClientUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        find_match_usecase: Arc<FindMatchUseCase>,
        leave_chat_usecase: Arc<LeaveChatUseCase>,
        relay_signal_usecase: Arc<RelaySignalUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        report_user_usecase: Arc<ReportUserUseCase>,
        get_stats_usecase: Arc<GetStatsUseCase>,
    ) -> Self {
        Self {
            app_state: Arc::new(AppState {
                connect_client_usecase,
                disconnect_client_usecase,
                find_match_usecase,
                leave_chat_usecase,
                relay_signal_usecase,
                send_message_usecase,
                report_user_usecase,
                get_stats_usecase,
            }),
        }
    }

    /// Build the axum router (also used by integration tests)
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/debug/stats", get(get_stats))
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state.clone())
    }

    /// Run the pairing broker server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    /// * `sweep_interval` - How often leftover compatible waiters are paired
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(
        self,
        host: String,
        port: u16,
        sweep_interval: Duration,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Periodic backstop: pairs compatible waiters that arrival-time
        // matching missed (e.g. entries freed up by a cancel)
        let sweep_state = self.app_state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            interval.tick().await; // the first tick fires immediately
            loop {
                interval.tick().await;
                let pairs = sweep_state.find_match_usecase.sweep().await;
                for (first, second) in &pairs {
                    notify_match(&sweep_state, first, second).await;
                }
                if !pairs.is_empty() {
                    tracing::info!("Swept {} waiting pair(s) into sessions", pairs.len());
                }
            }
        });

        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!("Pairing broker listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // ConnectInfo is required to resolve the peer address as a stable id
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
