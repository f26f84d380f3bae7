//! Pairing and signaling broker server.
//!
//! Pairs anonymous clients for one-to-one video/text conversation and relays
//! opaque signaling and chat payloads between matched peers.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;
use std::time::Duration;

use aiseki::{
    common::logger::setup_logger,
    domain::Broker,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        profanity::WordListProfanityFilter,
        repository::{InMemoryBrokerRepository, InMemoryModerationRepository},
    },
    ui::Server,
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, FindMatchUseCase, GetStatsUseCase,
        LeaveChatUseCase, RelaySignalUseCase, ReportUserUseCase, SendMessageUseCase,
    },
};
use clap::Parser;
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Pairing and signaling broker for anonymous one-to-one chat", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Interval in seconds for the waiting-pool sweep
    #[arg(long, default_value = "5")]
    sweep_interval_secs: u64,

    /// Number of reports that triggers a ban
    #[arg(long, default_value = "3")]
    ban_threshold: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. MessagePusher + ProfanityFilter
    // 3. UseCases
    // 4. Server

    // 1. Create Repositories (in-memory)
    let broker = Arc::new(Mutex::new(Broker::new()));
    let repository = Arc::new(InMemoryBrokerRepository::new(broker));
    let moderation = Arc::new(InMemoryModerationRepository::new());

    // 2. Create MessagePusher (WebSocket implementation) and ProfanityFilter
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let filter = Arc::new(WordListProfanityFilter::new());

    // 3. Create UseCases
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        repository.clone(),
        moderation.clone(),
        message_pusher.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let find_match_usecase = Arc::new(FindMatchUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let leave_chat_usecase = Arc::new(LeaveChatUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let relay_signal_usecase = Arc::new(RelaySignalUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        filter,
    ));
    let report_user_usecase = Arc::new(ReportUserUseCase::new(
        repository.clone(),
        moderation,
        message_pusher,
        args.ban_threshold,
    ));
    let get_stats_usecase = Arc::new(GetStatsUseCase::new(repository));

    // 4. Create and run the server
    let server = Server::new(
        connect_client_usecase,
        disconnect_client_usecase,
        find_match_usecase,
        leave_chat_usecase,
        relay_signal_usecase,
        send_message_usecase,
        report_user_usecase,
        get_stats_usecase,
    );
    if let Err(e) = server
        .run(
            args.host,
            args.port,
            Duration::from_secs(args.sweep_interval_secs),
        )
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
