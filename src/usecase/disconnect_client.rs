//! UseCase: クライアント切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 接続抹消と連鎖掃除（待機エントリ・セッション）の実行
//!
//! ### なぜこのテストが必要か
//! - 切断はグレースフルな leave を経ずに起きるのが通常ケースであり、
//!   どの状態（未検索・検索中・マッチ済み）からでも完全に掃除される必要がある
//! - 重複した切断シグナルに対して冪等であることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系: 検索中のクライアントの切断
//! - 正常系: マッチ済みクライアントの切断（パートナーへの通知対象を返す）
//! - エッジケース: 同じ接続の二重切断

use std::sync::Arc;

use crate::domain::{
    BrokerRepository, ConnectionId, DisconnectCleanup, MessagePushError, MessagePusher,
};

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn BrokerRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(
        repository: Arc<dyn BrokerRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 切断処理を実行（冪等）
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 切断した接続の ID
    ///
    /// # Returns
    ///
    /// 掃除結果。`partner` が Some ならセッションが解消されており、
    /// 呼び出し側は `notify_partner_left` で残された側に通知します。
    pub async fn execute(&self, connection_id: &ConnectionId) -> DisconnectCleanup {
        let cleanup = self.repository.unregister_connection(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;
        cleanup
    }

    /// セッション解消を残された側に通知
    ///
    /// # Arguments
    ///
    /// * `partner` - 残された側の接続 ID
    /// * `message` - 通知メッセージ（JSON）
    pub async fn notify_partner_left(
        &self,
        partner: &ConnectionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(partner, message).await
    }
}
