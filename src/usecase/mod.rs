//! UseCase 層
//!
//! ブローカーの各操作を1つずつ UseCase として定義します。
//! UI 層（WebSocket / HTTP ハンドラ）は UseCase のみを呼び、
//! Repository や MessagePusher には直接触れません。

pub mod connect_client;
pub mod disconnect_client;
pub mod error;
pub mod find_match;
pub mod get_stats;
pub mod leave_chat;
pub mod relay_signal;
pub mod report_user;
pub mod send_message;

pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{ConnectError, FindMatchError, RelayError, ReportError};
pub use find_match::FindMatchUseCase;
pub use get_stats::{BrokerStats, GetStatsUseCase};
pub use leave_chat::{LeaveChatUseCase, LeaveOutcome};
pub use relay_signal::RelaySignalUseCase;
pub use report_user::{ReportOutcome, ReportUserUseCase};
pub use send_message::SendMessageUseCase;
