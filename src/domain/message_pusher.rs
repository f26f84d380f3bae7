//! MessagePusher trait 定義
//!
//! クライアントへのアウトバウンド送信の抽象化。UseCase 層はこの trait に
//! 依存し、WebSocket などの具体的な実装には依存しません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::ConnectionId;

/// クライアント1人分のアウトバウンドチャンネル
///
/// 送信側1本・読み手1本の FIFO なので、同一送信者からのメッセージは
/// 送信順のままパートナーに届きます。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントのチャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントのチャンネルを破棄
    ///
    /// 送信側を drop するためクライアントのポンプループが終了し、結果と
    /// して接続が閉じます（BAN 時の強制切断にも使われます）。
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントへ送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
