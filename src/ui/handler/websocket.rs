//! WebSocket connection handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    common::time::get_unix_timestamp,
    domain::{ConnectionId, FileBlob, MatchOutcome, MessageContent, StableId},
    infrastructure::dto::{
        conversion::preferences_from_dto,
        websocket::{ClientMessage, FileBlobDto, PreferencesDto, ServerMessage},
    },
    ui::state::AppState,
    usecase::{ConnectError, LeaveOutcome, ReportOutcome},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let stable_id = resolve_stable_id(&headers, addr);
    tracing::debug!("WebSocket upgrade from '{}'", stable_id.as_str());
    ws.on_upgrade(move |socket| handle_socket(socket, state, stable_id))
}

/// Resolves the caller's stable identity: the first entry of the
/// X-Forwarded-For header when present, otherwise the peer address.
fn resolve_stable_id(headers: &HeaderMap, addr: SocketAddr) -> StableId {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| StableId::new(first.trim().to_string()).ok())
        .unwrap_or_else(|| {
            StableId::new(addr.ip().to_string()).expect("peer address is never empty")
        })
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This function handles the outbound message flow: relayed payloads and
/// broker notices (via rx channel) are sent to this client's connection.
/// The task ends when the channel closes, which also happens when the
/// client is kicked after a ban.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, stable_id: StableId) {
    let (mut sender, mut receiver) = socket.split();

    // Admit the client (ban check + registration happen inside the UseCase)
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = match state
        .connect_client_usecase
        .execute(stable_id.clone(), tx)
        .await
    {
        Ok((connection_id, _connected_at)) => {
            tracing::info!(
                "Client '{}' admitted (stable id '{}')",
                connection_id,
                stable_id.as_str()
            );
            connection_id
        }
        Err(ConnectError::Banned { reason }) => {
            tracing::warn!("Refused banned client '{}'", stable_id.as_str());
            let notice = ServerMessage::Banned { reason };
            let json = serde_json::to_string(&notice).unwrap();
            let _ = sender.send(Message::Text(json.into())).await;
            let _ = sender.close().await;
            return;
        }
        Err(e) => {
            tracing::error!("Failed to admit client '{}': {}", stable_id.as_str(), e);
            return;
        }
    };

    // Tell the client its assigned connection id
    {
        let welcome = ServerMessage::Connected {
            connection_id: connection_id.as_str().to_string(),
        };
        let json = serde_json::to_string(&welcome).unwrap();
        if sender.send(Message::Text(json.into())).await.is_err() {
            tracing::warn!("Client '{}' vanished before welcome", connection_id);
            state.disconnect_client_usecase.execute(&connection_id).await;
            return;
        }
    }

    // Spawn a task to receive messages from other clients and send to this client
    let mut send_task = pusher_loop(rx, sender);

    // Spawn a task to receive messages from this client
    let state_clone = state.clone();
    let conn_for_recv = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch_client_message(&state_clone, &conn_for_recv, &text).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", conn_for_recv);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Cleanup runs on every exit path, graceful or not
    let cleanup = state.disconnect_client_usecase.execute(&connection_id).await;
    if let Some(partner) = cleanup.partner {
        let notice = ServerMessage::PartnerLeft {
            partner_id: connection_id.as_str().to_string(),
        };
        let json = serde_json::to_string(&notice).unwrap();
        if let Err(e) = state
            .disconnect_client_usecase
            .notify_partner_left(&partner, &json)
            .await
        {
            tracing::warn!("Failed to notify abandoned partner '{}': {}", partner, e);
        }
    }
    tracing::info!("Client '{}' disconnected and cleaned up", connection_id);
}

/// Parses one inbound frame and routes it to the matching UseCase.
///
/// Malformed or state-conflicting messages are logged and dropped; the
/// connection always stays alive.
async fn dispatch_client_message(state: &Arc<AppState>, connection_id: &ConnectionId, text: &str) {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Failed to parse message from '{}': {}", connection_id, e);
            return;
        }
    };

    match msg {
        ClientMessage::FindMatch {
            chat_type,
            preferences,
        } => {
            handle_find_match(state, connection_id, &chat_type, preferences).await;
        }
        ClientMessage::LeaveChat => {
            handle_leave_chat(state, connection_id).await;
        }
        ClientMessage::Signal { to, signal } => {
            let outbound = ServerMessage::Signal {
                from: connection_id.as_str().to_string(),
                signal,
            };
            relay(state, connection_id, to, outbound).await;
        }
        ClientMessage::ScreenShare { to, stream } => {
            let outbound = ServerMessage::ScreenShare {
                from: connection_id.as_str().to_string(),
                stream,
            };
            relay(state, connection_id, to, outbound).await;
        }
        ClientMessage::Message { to, text, file } => {
            handle_message(state, connection_id, to, text, file).await;
        }
        ClientMessage::ReportUser {
            target_id,
            reason,
            details,
        } => {
            handle_report(state, connection_id, target_id, reason, details).await;
        }
    }
}

async fn handle_find_match(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    chat_type: &str,
    preferences: PreferencesDto,
) {
    let preferences = match preferences_from_dto(chat_type, preferences) {
        Ok(preferences) => preferences,
        Err(e) => {
            tracing::warn!("Rejected findMatch from '{}': {}", connection_id, e);
            return;
        }
    };

    match state
        .find_match_usecase
        .execute(connection_id, preferences)
        .await
    {
        Ok(MatchOutcome::Matched { partner }) => {
            tracing::info!("Matched '{}' with '{}'", connection_id, partner);
            notify_match(state, connection_id, &partner).await;
        }
        Ok(MatchOutcome::Queued) => {
            tracing::info!("Client '{}' queued for matching", connection_id);
        }
        Err(e) => {
            // 状態遷移違反は接続を生かしたまま握りつぶす
            tracing::warn!("Rejected findMatch from '{}': {}", connection_id, e);
        }
    }
}

/// Sends `matchFound` to both members of a freshly established pair.
pub(crate) async fn notify_match(
    state: &Arc<AppState>,
    first: &ConnectionId,
    second: &ConnectionId,
) {
    let for_first = ServerMessage::MatchFound {
        partner_id: second.as_str().to_string(),
    };
    let for_second = ServerMessage::MatchFound {
        partner_id: first.as_str().to_string(),
    };
    if let Err(e) = state
        .find_match_usecase
        .notify_matched(
            first,
            &serde_json::to_string(&for_first).unwrap(),
            second,
            &serde_json::to_string(&for_second).unwrap(),
        )
        .await
    {
        tracing::warn!("Failed to deliver match notice: {}", e);
    }
}

async fn handle_leave_chat(state: &Arc<AppState>, connection_id: &ConnectionId) {
    match state.leave_chat_usecase.execute(connection_id).await {
        LeaveOutcome::SessionEnded { partner } => {
            tracing::info!("Client '{}' left session with '{}'", connection_id, partner);
            let notice = ServerMessage::PartnerLeft {
                partner_id: connection_id.as_str().to_string(),
            };
            let json = serde_json::to_string(&notice).unwrap();
            if let Err(e) = state
                .leave_chat_usecase
                .notify_partner_left(&partner, &json)
                .await
            {
                tracing::warn!("Failed to notify partner '{}': {}", partner, e);
            }
        }
        LeaveOutcome::SearchCancelled => {
            tracing::info!("Client '{}' cancelled its search", connection_id);
        }
        LeaveOutcome::Idle => {
            tracing::debug!("Client '{}' left while idle", connection_id);
        }
    }
}

/// Authorizes and forwards an opaque payload (signaling or screen share).
async fn relay(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    to: String,
    outbound: ServerMessage,
) {
    let to = match ConnectionId::new(to) {
        Ok(to) => to,
        Err(e) => {
            tracing::warn!("Dropped relay from '{}': {}", connection_id, e);
            return;
        }
    };
    let json = serde_json::to_string(&outbound).unwrap();
    if let Err(e) = state
        .relay_signal_usecase
        .execute(connection_id, &to, &json)
        .await
    {
        tracing::warn!("Dropped relay from '{}': {}", connection_id, e);
    }
}

async fn handle_message(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    to: String,
    text: Option<String>,
    file: Option<FileBlobDto>,
) {
    let to = match ConnectionId::new(to) {
        Ok(to) => to,
        Err(e) => {
            tracing::warn!("Dropped message from '{}': {}", connection_id, e);
            return;
        }
    };

    // 本文は配送前にサニタイズしてから長さを検証する
    let text = match text {
        Some(raw) => {
            let cleaned = state.send_message_usecase.filter_text(&raw);
            match MessageContent::new(cleaned) {
                Ok(content) => Some(content),
                Err(e) => {
                    tracing::warn!("Dropped message from '{}': {}", connection_id, e);
                    return;
                }
            }
        }
        None => None,
    };
    let file = match file {
        Some(dto) => match FileBlob::try_from(dto) {
            Ok(blob) => Some(blob),
            Err(e) => {
                tracing::warn!("Dropped attachment from '{}': {}", connection_id, e);
                return;
            }
        },
        None => None,
    };
    if text.is_none() && file.is_none() {
        tracing::warn!("Dropped empty message from '{}'", connection_id);
        return;
    }

    let outbound = ServerMessage::Message {
        from: connection_id.as_str().to_string(),
        text: text.map(|content| content.as_str().to_string()),
        file: file.map(Into::into),
        timestamp: get_unix_timestamp(),
    };
    let json = serde_json::to_string(&outbound).unwrap();
    if let Err(e) = state
        .send_message_usecase
        .execute(connection_id, &to, &json)
        .await
    {
        tracing::warn!("Dropped message from '{}': {}", connection_id, e);
    }
}

async fn handle_report(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    target_id: String,
    reason: String,
    details: String,
) {
    let target = match ConnectionId::new(target_id) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!("Dropped report from '{}': {}", connection_id, e);
            return;
        }
    };

    match state
        .report_user_usecase
        .execute(connection_id, &target, reason, details)
        .await
    {
        Ok(ReportOutcome::Recorded { count }) => {
            tracing::info!(
                "Report against '{}' recorded ({} total)",
                target,
                count
            );
        }
        Ok(ReportOutcome::TargetBanned { reason }) => {
            tracing::info!("Client '{}' reached the ban threshold", target);
            let notice = ServerMessage::Banned { reason };
            let json = serde_json::to_string(&notice).unwrap();
            state.report_user_usecase.kick(&target, &json).await;
        }
        Err(e) => {
            tracing::warn!("Dropped report from '{}': {}", connection_id, e);
        }
    }
}
