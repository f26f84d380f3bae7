//! Server state shared across handlers.

use std::sync::Arc;

use crate::usecase::{
    ConnectClientUseCase, DisconnectClientUseCase, FindMatchUseCase, GetStatsUseCase,
    LeaveChatUseCase, RelaySignalUseCase, ReportUserUseCase, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（接続受付のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（切断処理のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// FindMatchUseCase（マッチング検索のユースケース）
    pub find_match_usecase: Arc<FindMatchUseCase>,
    /// LeaveChatUseCase（チャット離脱のユースケース）
    pub leave_chat_usecase: Arc<LeaveChatUseCase>,
    /// RelaySignalUseCase（シグナリング転送のユースケース）
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// SendMessageUseCase（チャット送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// ReportUserUseCase（通報処理のユースケース）
    pub report_user_usecase: Arc<ReportUserUseCase>,
    /// GetStatsUseCase（統計取得のユースケース）
    pub get_stats_usecase: Arc<GetStatsUseCase>,
}
