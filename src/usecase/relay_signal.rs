//! UseCase: シグナリング転送
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelaySignalUseCase::execute() メソッド
//! - 認可（宛先がパートナーであること）と配送
//!
//! ### なぜこのテストが必要か
//! - 認可は fail-closed が絶対条件: パートナー以外に WebRTC ハンドシェイク
//!   が漏れると第三者との接続が確立してしまう
//! - ペイロードは不透明に扱い、中身を一切解釈しないことが前提
//!
//! ### どのような状況を想定しているか
//! - 正常系: パートナー宛の転送
//! - 異常系: セッションを持たない送信者、パートナー以外への宛先

use std::sync::Arc;

use crate::domain::{BrokerRepository, ConnectionId, MessagePusher};

use super::error::RelayError;

/// シグナリング転送のユースケース
///
/// シグナリング（SDP / ICE candidate）と画面共有制御イベントの両方で
/// 使われます。ペイロードは UI 層で送信元タグつきの JSON に組み立て済み
/// であり、ここでは認可と配送だけを行います。
pub struct RelaySignalUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn BrokerRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    /// 新しい RelaySignalUseCase を作成
    pub fn new(
        repository: Arc<dyn BrokerRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 転送を実行
    ///
    /// # Arguments
    ///
    /// * `from` - 送信元の接続 ID
    /// * `to` - クライアントが指定した宛先の接続 ID
    /// * `message` - 配送するメッセージ（JSON、送信元タグつき）
    ///
    /// # Returns
    ///
    /// * `Err(RelayError::NoPartner)` - 送信者がセッションを持たない
    /// * `Err(RelayError::NotPartner)` - 宛先が実際のパートナーではない
    pub async fn execute(
        &self,
        from: &ConnectionId,
        to: &ConnectionId,
        message: &str,
    ) -> Result<(), RelayError> {
        let partner = self
            .repository
            .partner_of(from)
            .await
            .ok_or(RelayError::NoPartner)?;
        if partner != *to {
            return Err(RelayError::NotPartner);
        }
        self.message_pusher.push_to(&partner, message).await?;
        Ok(())
    }
}
