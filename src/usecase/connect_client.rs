//! UseCase: クライアント接続受付
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - BAN チェック → 接続 ID 採番 → 登録 → チャンネル登録の一連の流れ
//!
//! ### なぜこのテストが必要か
//! - BAN 済みクライアントの拒否は接続受付の唯一のゲートであり、
//!   ここを素通りすると以降のどの状態にも入れてはいけない
//! - 採番した接続 ID がレジストリとチャンネルの両方に行き渡ることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系: 新規クライアントの接続
//! - 異常系: BAN 済み安定識別子での接続試行
//! - 異常系: BAN レコード読み取りの失敗

use std::sync::Arc;

use crate::common::time::get_unix_timestamp;
use crate::domain::{
    BrokerRepository, Connection, ConnectionId, ConnectionIdFactory, MessagePusher,
    ModerationRepository, PusherChannel, StableId, Timestamp,
};

use super::error::ConnectError;

/// クライアント接続受付のユースケース
pub struct ConnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn BrokerRepository>,
    /// Moderation Repository（BAN チェック用）
    moderation: Arc<dyn ModerationRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(
        repository: Arc<dyn BrokerRepository>,
        moderation: Arc<dyn ModerationRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            moderation,
            message_pusher,
        }
    }

    /// 接続受付を実行
    ///
    /// # Arguments
    ///
    /// * `stable_id` - クライアントの安定識別子（Domain Model）
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok((ConnectionId, Timestamp))` - 受付成功（採番した接続 ID と接続時刻）
    /// * `Err(ConnectError)` - 受付拒否（BAN 済みなど）
    pub async fn execute(
        &self,
        stable_id: StableId,
        sender: PusherChannel,
    ) -> Result<(ConnectionId, Timestamp), ConnectError> {
        // 1. BAN チェック（接続状態を一切作る前に弾く）
        if let Some(ban) = self.moderation.get_ban(&stable_id).await? {
            return Err(ConnectError::Banned { reason: ban.reason });
        }

        // 2. 接続 ID を採番してレジストリに登録
        let connection_id = ConnectionIdFactory::generate();
        let connected_at = Timestamp::new(get_unix_timestamp());
        self.repository
            .register_connection(Connection::new(
                connection_id.clone(),
                stable_id,
                connected_at,
            ))
            .await?;

        // 3. MessagePusher にクライアントを登録
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        Ok((connection_id, connected_at))
    }
}
